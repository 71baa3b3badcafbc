//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::agents::OperationError;
use crate::storage::StorageError;

/// Errors surfaced by route handlers, rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// Request shape rejected by an agent (422).
    Operation(OperationError),
    /// Unknown record (404).
    NotFound(String),
    /// Malformed request outside JSON extraction (400).
    BadRequest(String),
    /// Anything else (500).
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Operation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::Operation(e) => e.to_string(),
            Self::NotFound(msg) | Self::BadRequest(msg) | Self::Internal(msg) => msg.clone(),
        }
    }
}

impl From<OperationError> for ApiError {
    fn from(err: OperationError) -> Self {
        Self::Operation(err)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => Self::NotFound(format!("Document not found: {what}")),
            StorageError::InvalidData(msg) => Self::BadRequest(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), detail = %self.detail(), "Request failed");
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}

/// Result type of route handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let missing = ApiError::from(OperationError::MissingField {
            operation: "analyze_climate".to_string(),
            field: "location".to_string(),
        });
        assert_eq!(missing.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(missing.detail().contains("location"));

        let not_found = ApiError::from(StorageError::NotFound("farms/x".to_string()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = ApiError::from(StorageError::InvalidData("bad".to_string()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let internal = ApiError::Internal("lock poisoned".to_string());
        assert_eq!(internal.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
