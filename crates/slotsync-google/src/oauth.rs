//! OAuth 2.0 server-side web flow for Google APIs.
//!
//! This module implements the redirect-based authorization code flow: the
//! service sends the user's agent to Google's consent screen, receives the
//! one-time code on its callback endpoint, and exchanges it for tokens.
//! It also performs access-token refresh against the same token endpoint.
//!
//! Refresh is a single request with no internal retry; the retry-once
//! policy lives with the caller.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::GoogleConfig;
use crate::error::{GoogleError, GoogleResult};

/// OAuth client for Google's token and authorization endpoints.
#[derive(Debug)]
pub struct OAuthClient {
    config: GoogleConfig,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates a new OAuth client with the given configuration.
    pub fn new(config: GoogleConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Builds the consent-screen URL that starts an authorization attempt.
    ///
    /// `state` is the opaque correlation token echoed back on the callback;
    /// it is the only channel binding the callback to a user.
    /// `access_type=offline` with `prompt=consent` asks Google to issue a
    /// refresh token.
    pub fn consent_url(&self, state: &str) -> GoogleResult<String> {
        self.config.validate()?;
        let scope = self.config.scopes.join(" ");

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&\
            access_type=offline&prompt=consent&scope={}&state={}",
            self.config.auth_url,
            urlencoding::encode(&self.config.oauth.client_id),
            urlencoding::encode(&self.config.oauth.redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(state),
        ))
    }

    /// Exchanges a one-time authorization code for a token grant.
    ///
    /// Failure here is terminal for the authorization attempt; the user
    /// must restart the handoff.
    pub async fn exchange_code(&self, code: &str) -> GoogleResult<TokenGrant> {
        self.config.validate()?;
        let params = [
            ("code", code),
            ("client_id", self.config.oauth.client_id.as_str()),
            ("client_secret", self.config.oauth.client_secret.as_str()),
            ("redirect_uri", self.config.oauth.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!("exchanging authorization code for tokens");
        let grant = self.token_request(&params, GoogleError::Upstream).await?;
        info!("authorization code exchanged");
        Ok(grant)
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// Fails with an auth-provider error when the endpoint is unreachable
    /// or the refresh token has been revoked. Never retries.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> GoogleResult<TokenGrant> {
        self.config.validate()?;
        let params = [
            ("client_id", self.config.oauth.client_id.as_str()),
            ("client_secret", self.config.oauth.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        debug!("refreshing access token");
        let grant = self
            .token_request(&params, GoogleError::AuthProvider)
            .await?;
        info!("access token refreshed");
        Ok(grant)
    }

    /// Posts to the token endpoint and parses the grant.
    ///
    /// `classify` maps every non-config failure to the error kind the
    /// operation surfaces.
    async fn token_request(
        &self,
        params: &[(&str, &str)],
        classify: fn(String) -> GoogleError,
    ) -> GoogleResult<TokenGrant> {
        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| classify(format!("token request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify(format!("failed to read token response: {e}")))?;

        if !status.is_success() {
            return Err(classify(format!("token endpoint returned {status}: {body}")));
        }

        let grant: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| classify(format!("invalid token response: {e}")))?;
        if let Some(error) = grant.error {
            let detail = grant.error_description.unwrap_or_default();
            return Err(classify(format!("token endpoint rejected request: {error} {detail}")));
        }
        let access_token = grant
            .access_token
            .ok_or_else(|| classify("token response missing access_token".to_string()))?;

        Ok(TokenGrant {
            access_token,
            refresh_token: grant.refresh_token,
            expires_in: grant.expires_in,
            scope: grant.scope.unwrap_or_default(),
        })
    }
}

/// A successful response from the token endpoint.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    /// The new access token.
    pub access_token: String,
    /// A refresh token, when the grant type yields one.
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds, if reported.
    pub expires_in: Option<i64>,
    /// The granted scopes, space-separated.
    pub scope: String,
}

impl TokenGrant {
    /// Converts the relative lifetime into an absolute expiry.
    ///
    /// Returns `None` when the endpoint did not report a lifetime, in which
    /// case the token is assumed valid until a call fails.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in.map(|secs| now + Duration::seconds(secs))
    }
}

/// Wire shape of Google's token endpoint responses.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OAuthConfig;
    use chrono::TimeZone;

    fn client() -> OAuthClient {
        OAuthClient::new(GoogleConfig::new(OAuthConfig::new(
            "id.apps.googleusercontent.com",
            "secret",
            "https://example.com/authCallback",
        )))
    }

    #[test]
    fn consent_url_format() {
        let url = client().consent_url("user-17").unwrap();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=id.apps.googleusercontent.com"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fexample.com%2FauthCallback"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("state=user-17"));
        assert!(url.contains("calendar.freebusy"));
    }

    #[test]
    fn consent_url_requires_config() {
        let client = OAuthClient::new(GoogleConfig::new(OAuthConfig::new("", "", "")));
        assert!(matches!(
            client.consent_url("u1"),
            Err(GoogleError::Config(_))
        ));
    }

    #[test]
    fn grant_expiry_is_absolute() {
        let grant = TokenGrant {
            access_token: "at".into(),
            refresh_token: None,
            expires_in: Some(3600),
            scope: String::new(),
        };
        let now = Utc.with_ymd_and_hms(2025, 2, 5, 10, 0, 0).unwrap();
        assert_eq!(
            grant.expires_at(now),
            Some(Utc.with_ymd_and_hms(2025, 2, 5, 11, 0, 0).unwrap())
        );
    }

    #[test]
    fn grant_without_lifetime_has_no_expiry() {
        let grant = TokenGrant {
            access_token: "at".into(),
            refresh_token: None,
            expires_in: None,
            scope: String::new(),
        };
        assert_eq!(grant.expires_at(Utc::now()), None);
    }
}
