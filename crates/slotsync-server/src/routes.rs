//! Route table.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Builds the router over the application state.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/authStart", get(handlers::auth_start))
        .route("/authCallback", get(handlers::auth_callback))
        .route("/fetchFreeBusy", get(handlers::fetch_free_busy))
        .route("/groupFreeBusy", get(handlers::group_free_busy))
        .route("/createEvent", post(handlers::create_event))
        .route("/deleteEvent", post(handlers::delete_event))
}
