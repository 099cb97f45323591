use axum::extract::State;

use super::super::AppState;
use super::{ApiResult, ok};

pub async fn get_health(State(state): State<AppState>) -> ApiResult {
    ok(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSecs": state.started_at.elapsed().as_secs(),
    }))
}
