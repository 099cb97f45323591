use axum::extract::State;

use super::super::AppState;
use super::{ApiResult, ok};
use crate::core::logs::tail_first_existing;

pub async fn get_logs(State(state): State<AppState>) -> ApiResult {
    let lines = tail_first_existing(&state.log_search_paths).await;
    ok(serde_json::json!({ "lines": lines }))
}
