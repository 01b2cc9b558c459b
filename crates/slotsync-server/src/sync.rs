//! Event synchronization with the owner's external calendar.
//!
//! Creates or deletes a calendar event in the appointment owner's primary
//! calendar. These are single-subject operations: a refresh failure for
//! the owner's token is fatal to the call, not a partial result. Delete is
//! idempotent and proceeds best-effort even when the appointment record
//! has already been removed from the store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use slotsync_google::{CalendarClient, EventDraft, GoogleError};

use crate::credentials::TokenFlowError;
use crate::error::{ApiError, ApiResult};
use crate::identity::Identity;
use crate::state::AppState;

/// The result of a successful event creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEventSummary {
    /// The external event identifier.
    pub event_id: String,
    /// How many attendees were invited.
    pub attendees_added: usize,
}

/// Creates a calendar event for an appointment owned by the caller.
///
/// Attendees come from the group's membership when `group_id` is given,
/// falling back to the owner's own email when no attendee emails resolve.
pub async fn create_event(
    state: &AppState,
    owner: &Identity,
    appointment_id: &str,
    title: &str,
    description: &str,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    group_id: Option<&str>,
) -> ApiResult<CreatedEventSummary> {
    // Ownership check: the appointment must exist under the caller's key.
    if state
        .appointments
        .load(&owner.uid, appointment_id)
        .await?
        .is_none()
    {
        return Err(ApiError::forbidden(
            "appointment does not belong to caller",
        ));
    }

    let attendees = resolve_attendees(state, group_id, owner.email.as_deref()).await?;
    let draft = EventDraft {
        summary: title.to_string(),
        description: description.to_string(),
        start: starts_at,
        end: ends_at,
        attendees: attendees.clone(),
    };

    let google = state.google.clone();
    let created = state
        .token_flow()
        .with_token(&owner.uid, move |access| {
            let google = google.clone();
            let draft = draft.clone();
            async move {
                CalendarClient::new(&google.api_base, access, google.timeout)
                    .insert_event(&draft)
                    .await
            }
        })
        .await
        .map_err(owner_flow_error)?;

    // The event link is a weak reference; failing to record it must not
    // undo the external create.
    if let Err(err) = state
        .appointments
        .link_event(&owner.uid, appointment_id, &created.id)
        .await
    {
        warn!(
            uid = %owner.uid,
            appointment_id,
            error = %err,
            "created event but failed to record link"
        );
    }

    info!(
        uid = %owner.uid,
        appointment_id,
        event_id = %created.id,
        attendees = attendees.len(),
        "created calendar event for appointment"
    );

    Ok(CreatedEventSummary {
        event_id: created.id,
        attendees_added: attendees.len(),
    })
}

/// Deletes the calendar event linked to an appointment.
///
/// Idempotent: an event already removed upstream still reports success.
/// Works from the identifiers alone, so it also succeeds when the
/// appointment record was already deleted optimistically by the caller.
pub async fn delete_event(
    state: &AppState,
    owner_uid: &str,
    appointment_id: &str,
    event_id: &str,
) -> ApiResult<()> {
    if state
        .appointments
        .load(owner_uid, appointment_id)
        .await?
        .is_none()
    {
        info!(
            uid = owner_uid,
            appointment_id, "appointment record already gone, deleting calendar event anyway"
        );
    }

    let google = state.google.clone();
    state
        .token_flow()
        .with_token(owner_uid, move |access| {
            let google = google.clone();
            async move {
                CalendarClient::new(&google.api_base, access, google.timeout)
                    .delete_event(event_id)
                    .await
            }
        })
        .await
        .map_err(owner_flow_error)?;

    info!(uid = owner_uid, event_id, "calendar event deleted");
    Ok(())
}

/// Resolves the attendee email list for an event.
///
/// Group members without an email are skipped; duplicates are dropped
/// while preserving order. When nothing resolves, the owner's own email
/// (if known) becomes the sole attendee.
async fn resolve_attendees(
    state: &AppState,
    group_id: Option<&str>,
    owner_email: Option<&str>,
) -> ApiResult<Vec<String>> {
    let mut attendees: Vec<String> = Vec::new();

    if let Some(group_id) = group_id
        && let Some(group) = state.groups.load(group_id).await?
    {
        for email in group.member_emails() {
            if !attendees.contains(&email) {
                attendees.push(email);
            }
        }
    }

    if attendees.is_empty()
        && let Some(email) = owner_email
    {
        attendees.push(email.to_string());
    }

    Ok(attendees)
}

/// Maps owner token-flow failures onto the API error taxonomy.
fn owner_flow_error(err: TokenFlowError) -> ApiError {
    match err {
        TokenFlowError::Missing => {
            ApiError::missing_credential("owner has no calendar connected")
        }
        TokenFlowError::Refresh(e) => ApiError::missing_credential(format!(
            "could not refresh owner token, reconnect the calendar: {e}"
        )),
        TokenFlowError::Provider(GoogleError::AuthProvider(m)) => {
            ApiError::missing_credential(format!("owner token rejected: {m}"))
        }
        TokenFlowError::Provider(GoogleError::Config(m)) => ApiError::Config(m),
        TokenFlowError::Provider(GoogleError::Upstream(m)) => ApiError::upstream(m),
        TokenFlowError::Store(e) => ApiError::Store(e),
    }
}
