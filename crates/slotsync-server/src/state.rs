//! Shared application state.

use std::sync::Arc;

use slotsync_google::{GoogleConfig, OAuthClient};
use slotsync_store::{AppointmentStore, GroupStore, Store, TokenStore};

use crate::config::ServerConfig;
use crate::credentials::TokenFlow;
use crate::identity::IdentityVerifier;

/// State shared by all request handlers.
///
/// Everything here is cheap to clone; no per-request state is carried
/// between requests.
#[derive(Clone)]
pub struct AppState {
    /// Server tuning knobs.
    pub config: Arc<ServerConfig>,
    /// Google endpoints and OAuth client configuration.
    pub google: Arc<GoogleConfig>,
    /// OAuth client for consent URLs, code exchange, and refresh.
    pub oauth: Arc<OAuthClient>,
    /// Credential records, keyed per user.
    pub tokens: TokenStore,
    /// Group snapshots (read-only for this engine).
    pub groups: GroupStore,
    /// Appointment records and their event links.
    pub appointments: AppointmentStore,
    /// Bearer identity verification.
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    /// Creates the application state over the given store and verifier.
    pub fn new(
        config: ServerConfig,
        google: GoogleConfig,
        store: Arc<dyn Store>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        let oauth = Arc::new(OAuthClient::new(google.clone()));
        Self {
            config: Arc::new(config),
            google: Arc::new(google),
            oauth,
            tokens: TokenStore::new(store.clone()),
            groups: GroupStore::new(store.clone()),
            appointments: AppointmentStore::new(store),
            verifier,
        }
    }

    /// Returns the lazy-refresh token flow over this state's stores.
    pub fn token_flow(&self) -> TokenFlow {
        TokenFlow::new(self.oauth.clone(), self.tokens.clone())
    }
}
