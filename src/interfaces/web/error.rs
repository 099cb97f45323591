use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use super::context::RequestContext;

/// Handler failures. The `Display` text is what the client sees, so it must
/// never include internal detail; the detail goes to the log.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to get status")]
    StatusUnavailable,
    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = RequestContext::current_id();
        match &self {
            Self::StatusUnavailable => {
                error!(request_id = %request_id, "status CLI invocation failed")
            }
            Self::Internal(e) => {
                error!(request_id = %request_id, error = ?e, "request handler failed")
            }
        }
        error_response(StatusCode::INTERNAL_SERVER_ERROR, &self.to_string())
    }
}

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "status": "error", "message": message })),
    )
        .into_response()
}
