use axum::extract::State;

use super::super::AppState;
use super::super::error::ApiError;
use super::{ApiResult, ok};

pub async fn get_status(State(state): State<AppState>) -> ApiResult {
    match state.dashboard.status().await {
        Some(record) => ok(record),
        None => Err(ApiError::StatusUnavailable),
    }
}

pub async fn get_sessions(State(state): State<AppState>) -> ApiResult {
    let count = state.dashboard.session_count().await;
    ok(serde_json::json!({ "count": count }))
}
