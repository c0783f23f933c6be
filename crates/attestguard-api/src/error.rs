// crates/attestguard-api/src/error.rs
// ============================================================================
// Module: API Errors
// Description: Closed error enum for the HTTP task API, with its HTTP mapping.
// Purpose: Give every handler one `Result<_, ApiError>` return type.
// Dependencies: axum, attestguard-queue, attestguard-store, thiserror
// ============================================================================

use attestguard_queue::QueueError;
use attestguard_store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde_json::json;

/// Errors surfaced by the HTTP task API (spec.md §4.10).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The referenced application or task does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The request body failed validation (spec.md §4.10 CLI exit code `2`).
    #[error("validation error: {0}")]
    Validation(String),
    /// The `CRON_API_KEY` header was missing or did not match
    /// (spec.md §4.10 CLI exit code `4`).
    #[error("unauthorized")]
    Unauthorized,
    /// A downstream dependency (store, blob, queue) is unavailable
    /// (spec.md §4.10 CLI exit code `3`).
    #[error("downstream unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(message) => Self::NotFound(message),
            StoreError::Conflict(message) | StoreError::InvalidTransition(message) => {
                Self::Validation(message)
            }
            StoreError::Invalid(message) => Self::Validation(message),
            StoreError::Io(message) => Self::Unavailable(message),
        }
    }
}

impl From<QueueError> for ApiError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Store(inner) => inner.into(),
            QueueError::Blob(message) => Self::Unavailable(message.to_string()),
            QueueError::InvalidTask(message) => Self::Validation(message),
            QueueError::Exhausted(message) => Self::Unavailable(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test-only response inspection")]

    use axum::response::IntoResponse;

    use super::ApiError;

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError::NotFound("app x".to_string()).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_400() {
        let response = ApiError::Validation("bad input".to_string()).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn unavailable_maps_to_503() {
        let response = ApiError::Unavailable("store down".to_string()).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn store_conflict_maps_to_validation() {
        let err: ApiError = attestguard_store::StoreError::Conflict("dup".to_string()).into();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn store_not_found_maps_to_not_found() {
        let err: ApiError = attestguard_store::StoreError::NotFound("task".to_string()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
