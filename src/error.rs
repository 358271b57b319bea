//! Unified error types for the UniMind backend.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Client-facing API error, serialized as `{"error": message}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A required request field is missing or empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A referenced journal entry does not exist.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// Storage backend failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Anything else that escaped a handler.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiError::EntryNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Document store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The addressed document does not exist.
    #[error("document not found: {0}")]
    NotFound(String),

    /// HTTP transport failure talking to the store.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with something we could not use.
    #[error("unexpected store response: {0}")]
    Unexpected(String),
}

/// Third-party provider errors (emotion, completion, places).
///
/// Handlers never surface these to clients; they degrade to the documented
/// fallback value and log instead.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No API key was configured at startup.
    #[error("provider not configured")]
    NotConfigured,

    /// HTTP transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the provider.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code returned.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Response body did not match the expected shape.
    #[error("failed to parse provider response: {0}")]
    Parse(String),
}

/// Convenient Result type alias for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_maps_to_400() {
        assert_eq!(
            ApiError::MissingField("user_id").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            ApiError::EntryNotFound("abc".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Store(StoreError::NotFound("abc".to_string())).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn store_failure_maps_to_500() {
        let err = ApiError::Store(StoreError::Unexpected("boom".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
