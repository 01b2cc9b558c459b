//! Error types for Google API operations.

use thiserror::Error;

/// Result type for Google API operations.
pub type GoogleResult<T> = Result<T, GoogleError>;

/// An error from the OAuth or Calendar API boundary.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// Deployment misconfiguration (missing client credentials).
    #[error("OAuth client configuration error: {0}")]
    Config(String),

    /// The provider rejected the credential: expired or invalid access
    /// token, revoked refresh token, or an unreachable token endpoint.
    ///
    /// Signals that the caller should attempt one refresh and retry once.
    #[error("auth provider error: {0}")]
    AuthProvider(String),

    /// The provider was unavailable or returned an unexpected shape.
    #[error("upstream calendar error: {0}")]
    Upstream(String),
}

impl GoogleError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an auth provider error.
    pub fn auth_provider(message: impl Into<String>) -> Self {
        Self::AuthProvider(message.into())
    }

    /// Creates an upstream error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// Returns true if this error should trigger a refresh-and-retry.
    pub fn is_auth_provider(&self) -> bool {
        matches!(self, Self::AuthProvider(_))
    }
}
