use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// JSON error reply in the dashboard's `{ ok: false, error }` shape.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn invalid_json() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid JSON")
    }

    pub fn persist_failed() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to persist data")
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        if e.is_client_error() {
            return Self::new(StatusCode::BAD_REQUEST, e.to_string());
        }
        // details stay in the server log
        error!(error = %e, "request failed");
        Self::persist_failed()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({"ok": false, "error": self.message}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_hide_details() {
        let e: ApiError = ServiceError::Storage("/srv/data/edb.json: permission denied".into()).into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.message, "Failed to persist data");
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let e: ApiError = ServiceError::Validation("expected a JSON object".into()).into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
    }
}
