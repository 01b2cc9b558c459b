//! Google client configuration.

use std::time::Duration;

use crate::error::{GoogleError, GoogleResult};

/// Google OAuth endpoints and API base.
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// OAuth 2.0 client configuration.
///
/// Built once at startup and injected into the clients that need it;
/// business logic never reads these from the process environment itself.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: String,
    /// The redirect URI registered for the authorization callback.
    pub redirect_uri: String,
}

impl OAuthConfig {
    /// Creates a new OAuth client configuration.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Loads the configuration from `OAUTH_CLIENT_ID`, `OAUTH_CLIENT_SECRET`,
    /// and `OAUTH_REDIRECT_URI`.
    ///
    /// Intended for the binary's startup path only.
    pub fn from_env() -> GoogleResult<Self> {
        let get = |name: &str| {
            std::env::var(name)
                .map_err(|_| GoogleError::config(format!("missing {name} in environment")))
        };
        let config = Self::new(
            get("OAUTH_CLIENT_ID")?,
            get("OAUTH_CLIENT_SECRET")?,
            get("OAUTH_REDIRECT_URI")?,
        );
        config.validate()?;
        Ok(config)
    }

    /// Validates that all fields are present.
    pub fn validate(&self) -> GoogleResult<()> {
        if self.client_id.is_empty() {
            return Err(GoogleError::config("client_id is required"));
        }
        if self.client_secret.is_empty() {
            return Err(GoogleError::config("client_secret is required"));
        }
        if self.redirect_uri.is_empty() {
            return Err(GoogleError::config("redirect_uri is required"));
        }
        Ok(())
    }
}

/// Configuration for the Google OAuth and Calendar clients.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth client credentials and redirect URI.
    pub oauth: OAuthConfig,

    /// Authorization (consent screen) endpoint.
    pub auth_url: String,

    /// Token endpoint, used for code exchange and refresh.
    pub token_url: String,

    /// Calendar API base URL.
    pub api_base: String,

    /// OAuth scopes requested during the handoff.
    pub scopes: Vec<String>,

    /// Request timeout for all provider calls.
    pub timeout: Duration,
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Scopes needed to read free/busy data and write events.
    pub const DEFAULT_SCOPES: [&'static str; 3] = [
        "https://www.googleapis.com/auth/calendar.events",
        "https://www.googleapis.com/auth/calendar.readonly",
        "https://www.googleapis.com/auth/calendar.freebusy",
    ];

    /// Creates a new configuration with default endpoints and scopes.
    pub fn new(oauth: OAuthConfig) -> Self {
        Self {
            oauth,
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            api_base: CALENDAR_API_BASE.to_string(),
            scopes: Self::DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the authorization endpoint.
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    /// Sets the token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Sets the Calendar API base URL.
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> GoogleResult<()> {
        self.oauth.validate()?;
        if self.scopes.is_empty() {
            return Err(GoogleError::config("at least one OAuth scope is required"));
        }
        Ok(())
    }
}
