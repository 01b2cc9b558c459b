//! slotsync service binary.
//!
//! Configuration comes from the environment:
//! - `OAUTH_CLIENT_ID` / `OAUTH_CLIENT_SECRET` / `OAUTH_REDIRECT_URI`
//! - `BIND_ADDR` (default `0.0.0.0:8080`)
//! - `IDENTITY_TOKENS` - `token:uid[:email]` entries separated by `;`,
//!   seeding the static identity verifier for local runs

use std::net::SocketAddr;
use std::sync::Arc;

use slotsync_core::{TracingConfig, init_tracing};
use slotsync_google::{GoogleConfig, OAuthConfig};
use slotsync_server::{AppState, ServerConfig, StaticIdentityVerifier, serve};
use slotsync_store::MemoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(TracingConfig::service())?;

    let oauth = OAuthConfig::from_env()?;
    let google = GoogleConfig::new(oauth);

    let bind_addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;
    let config = ServerConfig::new(bind_addr);

    let verifier = StaticIdentityVerifier::from_spec(
        &std::env::var("IDENTITY_TOKENS").unwrap_or_default(),
    );

    let state = AppState::new(
        config.clone(),
        google,
        Arc::new(MemoryStore::new()),
        Arc::new(verifier),
    );

    serve(config.bind_addr, state).await?;
    Ok(())
}
