pub(crate) mod activity;
pub(crate) mod cron;
pub(crate) mod health;
pub(crate) mod logs;
pub(crate) mod status;

use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;

pub(crate) type ApiResult = Result<Json<Value>, ApiError>;

/// Wraps a payload in the `{status: "ok", data}` envelope.
pub(crate) fn ok<T: Serialize>(data: T) -> ApiResult {
    Ok(Json(serde_json::json!({
        "status": "ok",
        "data": serde_json::to_value(data)?,
    })))
}
