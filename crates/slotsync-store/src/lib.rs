//! Boundary to the shared key-value store.
//!
//! Appointments, groups, and calendar credentials live in a shared store
//! addressed by hierarchical paths (`calendarTokens/{uid}`,
//! `groups/{groupId}`, `appointments/{uid}/{appointmentId}`). This crate
//! defines the [`Store`] trait over that key space, the record types stored
//! under it, and typed accessors that do nothing beyond (de)serialization.
//!
//! The store itself is owned elsewhere; [`MemoryStore`] is the in-process
//! implementation used by tests and local runs.

pub mod appointments;
pub mod error;
pub mod groups;
pub mod records;
pub mod store;
pub mod tokens;

pub use appointments::AppointmentStore;
pub use error::{StoreError, StoreResult};
pub use groups::GroupStore;
pub use records::{AppointmentRecord, CredentialRecord, GroupSnapshot, MemberProfile};
pub use store::{MemoryStore, Store};
pub use tokens::TokenStore;
