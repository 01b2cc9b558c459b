//! Record types stored in the shared key space.
//!
//! Field names match the store schema (camelCase), which is shared with the
//! other consumers of the database. Timestamps are RFC 3339 in UTC.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user's external calendar authorization, stored under
/// `calendarTokens/{uid}`.
///
/// Created on the first successful authorization handoff and fully replaced
/// on every subsequent one. Only the accessToken/expiresAt pair (plus
/// updatedAt) is ever partially mutated, by a token refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    /// Short-lived access token for API calls.
    pub access_token: String,

    /// Long-lived refresh token. Absent for providers that never issue one.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// When the access token expires. `None` means unknown: the token is
    /// assumed valid until a call fails.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,

    /// The granted OAuth scopes, space-separated.
    pub scope: String,

    /// When this record was last written.
    pub updated_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Returns true if the access token is known to be expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if now > expires_at)
    }

    /// Returns true if a refresh can be attempted.
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }
}

/// A member entry inside a group record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    /// The member's user id.
    pub uid: String,
    /// Display name.
    #[serde(default)]
    pub username: String,
    /// Contact email, used for event invitations.
    #[serde(default)]
    pub email: Option<String>,
}

/// A read-only snapshot of a group, stored under `groups/{groupId}`.
///
/// Membership is owned by the CRUD layer; it may change between this
/// snapshot and any per-member fetch, which callers tolerate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSnapshot {
    /// Group display name.
    #[serde(default)]
    pub name: String,
    /// The group owner's user id.
    #[serde(default)]
    pub owner_uid: String,
    /// Members keyed by user id.
    #[serde(default)]
    pub members: BTreeMap<String, MemberProfile>,
}

impl GroupSnapshot {
    /// Returns true if `uid` is a listed member.
    pub fn is_member(&self, uid: &str) -> bool {
        self.members.contains_key(uid)
    }

    /// Returns the member ids in deterministic order.
    pub fn member_ids(&self) -> Vec<String> {
        self.members.keys().cloned().collect()
    }

    /// Returns the members' emails, skipping entries without one.
    pub fn member_emails(&self) -> Vec<String> {
        self.members
            .values()
            .filter_map(|member| member.email.clone())
            .collect()
    }
}

/// An appointment, stored owner-scoped under
/// `appointments/{uid}/{appointmentId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    /// Appointment title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Start of the appointment.
    pub starts_at: DateTime<Utc>,
    /// End of the appointment.
    pub ends_at: DateTime<Utc>,
    /// Group whose members are invited, if any.
    #[serde(default)]
    pub group_id: Option<String>,
    /// External calendar event this appointment is linked to, if created.
    #[serde(default)]
    pub google_event_id: Option<String>,
}
