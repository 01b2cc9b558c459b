//! Lazy refresh and retry-once policy over credential records.
//!
//! Provider calls follow a two-step policy: refresh proactively when the
//! stored expiry has passed, attempt the call, and on an auth-provider
//! failure refresh once more and retry exactly once. A second failure is
//! permanent for that request. Refresh results are always persisted, even
//! when the caller has already given up on the response.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use slotsync_google::{GoogleError, GoogleResult, OAuthClient};
use slotsync_store::{StoreError, TokenStore};

/// Errors from the token flow.
#[derive(Debug, Error)]
pub enum TokenFlowError {
    /// The user has no credential record.
    #[error("no credential record for user")]
    Missing,

    /// A refresh attempt failed; the credential is unusable.
    #[error("token refresh failed: {0}")]
    Refresh(#[source] GoogleError),

    /// The provider call itself failed after the retry policy ran out.
    #[error(transparent)]
    Provider(GoogleError),

    /// The credential record could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Executes provider calls under the lazy-refresh policy for one user.
#[derive(Clone)]
pub struct TokenFlow {
    oauth: Arc<OAuthClient>,
    tokens: TokenStore,
}

impl TokenFlow {
    /// Creates a token flow over the given OAuth client and token store.
    pub fn new(oauth: Arc<OAuthClient>, tokens: TokenStore) -> Self {
        Self { oauth, tokens }
    }

    /// Runs `op` with a usable access token for `uid`.
    ///
    /// `op` receives the access token and may be invoked twice: once with
    /// the stored (possibly proactively refreshed) token, and once more
    /// after a reactive refresh when the provider rejected the first
    /// attempt. Concurrent flows for the same user may refresh redundantly;
    /// both refreshed tokens are individually valid and the store resolves
    /// the race last-write-wins.
    pub async fn with_token<T, F, Fut>(&self, uid: &str, mut op: F) -> Result<T, TokenFlowError>
    where
        F: FnMut(String) -> Fut,
        Fut: std::future::Future<Output = GoogleResult<T>>,
    {
        let record = self
            .tokens
            .load(uid)
            .await?
            .ok_or(TokenFlowError::Missing)?;
        let now = Utc::now();
        let mut access = record.access_token.clone();
        let mut refreshed = false;

        if record.is_expired(now)
            && let Some(refresh_token) = record.refresh_token.as_deref()
        {
            debug!(uid, "access token expired, refreshing before call");
            access = self.refresh_and_persist(uid, refresh_token, now).await?;
            refreshed = true;
        }

        match op(access).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_auth_provider() && !refreshed => {
                let Some(refresh_token) = record.refresh_token.as_deref() else {
                    return Err(TokenFlowError::Provider(err));
                };
                debug!(uid, "provider rejected token, refreshing and retrying once");
                let access = self
                    .refresh_and_persist(uid, refresh_token, Utc::now())
                    .await?;
                op(access).await.map_err(TokenFlowError::Provider)
            }
            Err(err) => Err(TokenFlowError::Provider(err)),
        }
    }

    /// Refreshes once and persists the new access token and expiry.
    async fn refresh_and_persist(
        &self,
        uid: &str,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenFlowError> {
        let grant = self
            .oauth
            .refresh_access_token(refresh_token)
            .await
            .map_err(TokenFlowError::Refresh)?;
        self.tokens
            .update_access(uid, &grant.access_token, grant.expires_at(now), now)
            .await?;
        Ok(grant.access_token)
    }
}
