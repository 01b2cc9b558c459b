//! Google Calendar API client.
//!
//! A low-level HTTP client for the Calendar API v3 operations this service
//! needs: free/busy queries against the primary calendar, and event
//! insert/delete in the owner's primary calendar.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use slotsync_core::{Interval, TimeWindow};

use crate::error::{GoogleError, GoogleResult};

/// Google Calendar API client bound to one access token.
#[derive(Debug)]
pub struct CalendarClient {
    http_client: reqwest::Client,
    api_base: String,
    access_token: String,
}

impl CalendarClient {
    /// Creates a new Calendar client.
    pub fn new(api_base: impl Into<String>, access_token: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http_client,
            api_base: api_base.into(),
            access_token: access_token.into(),
        }
    }

    /// Updates the access token (after a refresh).
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
    }

    /// Queries free/busy data for the primary calendar.
    ///
    /// Returns the per-calendar busy map as reported by the provider.
    pub async fn fetch_free_busy(&self, window: &TimeWindow) -> GoogleResult<FreeBusyCalendars> {
        let url = format!("{}/freeBusy", self.api_base);
        let body = json!({
            "timeMin": rfc3339(window.start),
            "timeMax": rfc3339(window.end),
            "items": [{"id": "primary"}],
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| GoogleError::upstream(format!("freeBusy request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GoogleError::auth_provider(
                "access token expired or invalid",
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleError::upstream(format!(
                "freeBusy returned {status}: {body}"
            )));
        }

        let parsed: FreeBusyResponse = response
            .json()
            .await
            .map_err(|e| GoogleError::upstream(format!("invalid freeBusy response: {e}")))?;

        debug!(
            calendars = parsed.calendars.len(),
            "fetched free/busy data"
        );
        Ok(FreeBusyCalendars {
            calendars: parsed.calendars,
        })
    }

    /// Returns the primary calendar's busy intervals within `window`.
    ///
    /// The provider does not guarantee ordering or disjointness; callers
    /// normalize through the interval merger.
    pub async fn fetch_busy(&self, window: &TimeWindow) -> GoogleResult<Vec<Interval>> {
        let free_busy = self.fetch_free_busy(window).await?;
        Ok(free_busy.primary_busy())
    }

    /// Inserts an event into the primary calendar, inviting the attendees.
    ///
    /// Invitation emails are sent to all attendees; reminders follow the
    /// calendar's defaults.
    pub async fn insert_event(&self, draft: &EventDraft) -> GoogleResult<CreatedEvent> {
        let url = format!("{}/calendars/primary/events", self.api_base);
        let attendees: Vec<_> = draft
            .attendees
            .iter()
            .map(|email| json!({"email": email}))
            .collect();
        let mut body = json!({
            "summary": draft.summary,
            "description": draft.description,
            "start": {"dateTime": rfc3339(draft.start)},
            "end": {"dateTime": rfc3339(draft.end)},
            "reminders": {"useDefault": true},
        });
        if !attendees.is_empty() {
            body["attendees"] = json!(attendees);
        }

        let response = self
            .http_client
            .post(&url)
            .query(&[("sendUpdates", "all")])
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| GoogleError::upstream(format!("event insert failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GoogleError::auth_provider(
                "access token expired or invalid",
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleError::upstream(format!(
                "event insert returned {status}: {body}"
            )));
        }

        let created: CreatedEvent = response
            .json()
            .await
            .map_err(|e| GoogleError::upstream(format!("invalid event response: {e}")))?;

        info!(event_id = %created.id, "created calendar event");
        Ok(created)
    }

    /// Deletes an event from the primary calendar.
    ///
    /// A provider "not found"/"gone" response means the event was already
    /// removed (possibly by the user directly) and is treated as success.
    pub async fn delete_event(&self, event_id: &str) -> GoogleResult<()> {
        let url = format!(
            "{}/calendars/primary/events/{}",
            self.api_base,
            urlencoding::encode(event_id)
        );

        let response = self
            .http_client
            .delete(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| GoogleError::upstream(format!("event delete failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
            info!(event_id, "event already removed upstream");
            return Ok(());
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GoogleError::auth_provider(
                "access token expired or invalid",
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleError::upstream(format!(
                "event delete returned {status}: {body}"
            )));
        }

        info!(event_id, "deleted calendar event");
        Ok(())
    }
}

fn rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// An event to be created in the owner's primary calendar.
#[derive(Debug, Clone)]
pub struct EventDraft {
    /// Event title.
    pub summary: String,
    /// Free-form description.
    pub description: String,
    /// Event start.
    pub start: DateTime<Utc>,
    /// Event end.
    pub end: DateTime<Utc>,
    /// Attendee emails to invite.
    pub attendees: Vec<String>,
}

/// The provider's response to an event insert.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedEvent {
    /// The external event identifier.
    pub id: String,
}

/// Per-calendar busy data from a free/busy query.
#[derive(Debug, Clone, Serialize)]
pub struct FreeBusyCalendars {
    /// Busy data keyed by calendar id (`primary` for this service).
    pub calendars: BTreeMap<String, CalendarBusy>,
}

impl FreeBusyCalendars {
    /// Returns the primary calendar's busy entries as intervals.
    pub fn primary_busy(&self) -> Vec<Interval> {
        self.calendars
            .get("primary")
            .map(|calendar| {
                calendar
                    .busy
                    .iter()
                    .map(|entry| Interval::new(entry.start, entry.end))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Busy entries for one calendar.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarBusy {
    /// The reported busy ranges, not necessarily sorted or disjoint.
    #[serde(default)]
    pub busy: Vec<BusyEntry>,
}

/// One busy range as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusyEntry {
    /// Range start.
    pub start: DateTime<Utc>,
    /// Range end.
    pub end: DateTime<Utc>,
}

/// Wire shape of the freeBusy endpoint response.
#[derive(Debug, Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: BTreeMap<String, CalendarBusy>,
}
