//! HTTP service: group availability aggregation and calendar sync.
//!
//! This crate ties the engine together:
//! - OAuth handoff endpoints that connect a user's Google calendar
//! - per-user and per-group free/busy endpoints
//! - event create/delete endpoints that push appointments into the
//!   owner's primary calendar
//!
//! Every request is handled independently and statelessly; the shared
//! key-value store is the only mutable resource.

pub mod aggregator;
pub mod config;
pub mod credentials;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod routes;
pub mod server;
pub mod state;
pub mod sync;

pub use aggregator::{GroupAvailability, group_free_busy};
pub use config::ServerConfig;
pub use credentials::{TokenFlow, TokenFlowError};
pub use error::{ApiError, ApiResult};
pub use identity::{Identity, IdentityVerifier, StaticIdentityVerifier, bearer_token};
pub use routes::routes;
pub use server::serve;
pub use state::AppState;
pub use sync::{CreatedEventSummary, create_event, delete_event};
