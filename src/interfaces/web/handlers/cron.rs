use axum::extract::State;

use super::super::AppState;
use super::{ApiResult, ok};

pub async fn get_cron_jobs(State(state): State<AppState>) -> ApiResult {
    ok(state.dashboard.cron_jobs().await)
}
