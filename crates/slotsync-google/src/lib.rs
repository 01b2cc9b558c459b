//! Google OAuth and Calendar API client.
//!
//! This crate covers the external provider boundary:
//!
//! - [`OAuthClient`] - consent URL building, authorization-code exchange,
//!   and access-token refresh
//! - [`CalendarClient`] - free/busy queries and event insert/delete against
//!   the owner's primary calendar
//! - [`GoogleError`] - error classification that drives the caller's
//!   refresh-and-retry policy
//!
//! Neither client retries or persists anything; retry policy and credential
//! storage belong to the caller.

pub mod client;
pub mod config;
pub mod error;
pub mod oauth;

pub use client::{
    BusyEntry, CalendarBusy, CalendarClient, CreatedEvent, EventDraft, FreeBusyCalendars,
};
pub use config::{GoogleConfig, OAuthConfig};
pub use error::{GoogleError, GoogleResult};
pub use oauth::{OAuthClient, TokenGrant};
