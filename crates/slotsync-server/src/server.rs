//! HTTP server startup.

use std::net::SocketAddr;

use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::routes;
use crate::state::AppState;

/// Binds the listener and serves requests until the process exits.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = routes().layer(CorsLayer::permissive()).with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}
