//! API error types and their HTTP status mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use slotsync_store::StoreError;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced to HTTP callers.
///
/// Multi-subject operations (group aggregation) never surface per-member
/// errors through this type; those are downgraded to `missingMembers`
/// entries and the call still succeeds.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Deployment misconfiguration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Caller identity missing or invalid.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Caller lacks rights over the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Referenced group, credential, or appointment is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or malformed request parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The subject has no usable calendar credential.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// The external provider failed or returned an unexpected shape.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The shared store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Creates an unauthenticated error.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Creates a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Creates a bad-request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Creates a missing-credential error.
    pub fn missing_credential(message: impl Into<String>) -> Self {
        Self::MissingCredential(message.into())
    }

    /// Creates an upstream error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Config(_) | Self::Upstream(_) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::MissingCredential(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, "{self}");
        } else {
            warn!(%status, "{self}");
        }
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}
