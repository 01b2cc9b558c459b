//! HTTP endpoint handlers.
//!
//! Request parsing and identity checks live here; the actual engine work
//! is in [`crate::aggregator`] and [`crate::sync`].

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use slotsync_core::{Interval, TimeWindow};
use slotsync_google::{CalendarBusy, CalendarClient, GoogleError};
use slotsync_store::CredentialRecord;

use crate::aggregator;
use crate::credentials::TokenFlowError;
use crate::error::{ApiError, ApiResult};
use crate::identity::{Identity, bearer_token};
use crate::state::AppState;
use crate::sync::{self, CreatedEventSummary};

/// Confirmation page shown after a successful authorization handoff.
const CONNECTED_PAGE: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>Calendar connected</title>
    <style>
      body { font-family: system-ui, -apple-system, BlinkMacSystemFont, sans-serif;
             padding: 24px; max-width: 480px; margin: 40px auto; line-height: 1.5; }
      h1 { font-size: 20px; margin-bottom: 12px; }
      p { font-size: 15px; color: #444; }
      button { margin-top: 24px; padding: 8px 16px; border-radius: 4px; border: none;
               background: #2563eb; color: white; font-size: 14px; cursor: pointer; }
    </style>
  </head>
  <body>
    <h1>Your calendar is now connected</h1>
    <p>You can close this page and return to the app.</p>
    <button onclick="window.close()">Close window</button>
  </body>
</html>"#;

/// Query parameters for `/authStart`.
#[derive(Debug, Deserialize)]
pub struct AuthStartParams {
    uid: Option<String>,
}

/// Query parameters for `/authCallback`.
#[derive(Debug, Deserialize)]
pub struct AuthCallbackParams {
    code: Option<String>,
    state: Option<String>,
}

/// Query parameters for `/fetchFreeBusy`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyParams {
    time_min: Option<String>,
    time_max: Option<String>,
}

/// Query parameters for `/groupFreeBusy`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFreeBusyParams {
    group_id: Option<String>,
    time_min: Option<String>,
    time_max: Option<String>,
}

/// Body of `/createEvent`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    appointment_id: Option<String>,
    title: Option<String>,
    #[serde(default)]
    description: String,
    starts_at: Option<String>,
    ends_at: Option<String>,
    group_id: Option<String>,
}

/// Body of `/deleteEvent`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEventRequest {
    appointment_id: Option<String>,
    event_id: Option<String>,
    owner_uid: Option<String>,
}

/// Response of `/fetchFreeBusy`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyResponse {
    time_min: DateTime<Utc>,
    time_max: DateTime<Utc>,
    calendars: BTreeMap<String, CalendarBusy>,
}

/// Response of `/groupFreeBusy`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFreeBusyResponse {
    time_min: DateTime<Utc>,
    time_max: DateTime<Utc>,
    free_slots: Vec<Interval>,
    missing_members: Vec<String>,
}

/// Response of `/deleteEvent`.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    deleted: bool,
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// `GET /authStart?uid=<id>` - redirects to the provider consent screen.
///
/// The user id travels as the state parameter, the only channel binding
/// the eventual callback to a user.
pub async fn auth_start(
    State(state): State<AppState>,
    Query(params): Query<AuthStartParams>,
) -> ApiResult<Response> {
    let uid = non_empty(params.uid)
        .ok_or_else(|| ApiError::bad_request("missing uid parameter"))?;

    let url = state.oauth.consent_url(&uid).map_err(config_or_upstream)?;
    info!(uid, "starting authorization handoff");
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}

/// `GET /authCallback?code=<c>&state=<uid>` - exchanges the one-time code
/// and persists the credential record, overwriting any prior one.
pub async fn auth_callback(
    State(state): State<AppState>,
    Query(params): Query<AuthCallbackParams>,
) -> ApiResult<Html<&'static str>> {
    let (code, uid) = match (non_empty(params.code), non_empty(params.state)) {
        (Some(code), Some(uid)) => (code, uid),
        _ => return Err(ApiError::bad_request("missing code or state parameter")),
    };

    let grant = state
        .oauth
        .exchange_code(&code)
        .await
        .map_err(config_or_upstream)?;

    let now = Utc::now();
    let record = CredentialRecord {
        access_token: grant.access_token.clone(),
        refresh_token: grant.refresh_token.clone(),
        expires_at: grant.expires_at(now),
        scope: grant.scope.clone(),
        updated_at: now,
    };
    state.tokens.save(&uid, &record).await?;

    info!(uid, "calendar connected");
    Ok(Html(CONNECTED_PAGE))
}

/// `GET /fetchFreeBusy?timeMin&timeMax` - one user's raw free/busy data.
pub async fn fetch_free_busy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<FreeBusyParams>,
) -> ApiResult<Json<FreeBusyResponse>> {
    let identity = require_identity(&state, &headers).await?;
    let window = resolve_window(
        params.time_min.as_deref(),
        params.time_max.as_deref(),
        state.config.user_window_days,
        Utc::now(),
    )?;

    let google = state.google.clone();
    let free_busy = state
        .token_flow()
        .with_token(&identity.uid, move |access| {
            let google = google.clone();
            async move {
                CalendarClient::new(&google.api_base, access, google.timeout)
                    .fetch_free_busy(&window)
                    .await
            }
        })
        .await
        .map_err(|err| match err {
            TokenFlowError::Missing => {
                ApiError::not_found("no calendar connected for this user")
            }
            TokenFlowError::Refresh(e) => ApiError::upstream(e.to_string()),
            TokenFlowError::Provider(GoogleError::Config(m)) => ApiError::Config(m),
            TokenFlowError::Provider(e) => ApiError::upstream(e.to_string()),
            TokenFlowError::Store(e) => ApiError::Store(e),
        })?;

    Ok(Json(FreeBusyResponse {
        time_min: window.start,
        time_max: window.end,
        calendars: free_busy.calendars,
    }))
}

/// `GET /groupFreeBusy?groupId&timeMin&timeMax` - shared free slots for
/// a group, with unreachable members reported rather than failing.
pub async fn group_free_busy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<GroupFreeBusyParams>,
) -> ApiResult<Json<GroupFreeBusyResponse>> {
    let identity = require_identity(&state, &headers).await?;
    let group_id = non_empty(params.group_id)
        .ok_or_else(|| ApiError::bad_request("missing groupId parameter"))?;
    let window = resolve_window(
        params.time_min.as_deref(),
        params.time_max.as_deref(),
        state.config.group_window_days,
        Utc::now(),
    )?;

    let availability =
        aggregator::group_free_busy(&state, &group_id, &identity.uid, window).await?;

    Ok(Json(GroupFreeBusyResponse {
        time_min: window.start,
        time_max: window.end,
        free_slots: availability.free_slots,
        missing_members: availability.missing_members,
    }))
}

/// `POST /createEvent` - creates the external event for an appointment.
pub async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateEventRequest>,
) -> ApiResult<Json<CreatedEventSummary>> {
    let identity = require_identity(&state, &headers).await?;

    let appointment_id = non_empty(req.appointment_id)
        .ok_or_else(|| ApiError::bad_request("missing appointmentId"))?;
    let title = non_empty(req.title).ok_or_else(|| ApiError::bad_request("missing title"))?;
    let starts_at = req
        .starts_at
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("missing startsAt"))
        .and_then(|s| parse_rfc3339("startsAt", s))?;
    let ends_at = req
        .ends_at
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("missing endsAt"))
        .and_then(|s| parse_rfc3339("endsAt", s))?;

    let summary = sync::create_event(
        &state,
        &identity,
        &appointment_id,
        &title,
        &req.description,
        starts_at,
        ends_at,
        req.group_id.as_deref(),
    )
    .await?;

    Ok(Json(summary))
}

/// `POST /deleteEvent` - removes the external event for an appointment.
///
/// The bearer identity is optional; the body-supplied `ownerUid` is the
/// fallback so cleanup still works after the caller's session ended.
pub async fn delete_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<DeleteEventRequest>,
) -> ApiResult<Json<DeletedResponse>> {
    let verified_uid = match bearer_token(&headers) {
        Some(token) => state.verifier.verify(token).await.map(|i| i.uid),
        None => None,
    };
    let owner_uid = verified_uid
        .or_else(|| non_empty(req.owner_uid))
        .ok_or_else(|| ApiError::bad_request("missing ownerUid"))?;

    let appointment_id = non_empty(req.appointment_id)
        .ok_or_else(|| ApiError::bad_request("missing appointmentId"))?;
    let event_id =
        non_empty(req.event_id).ok_or_else(|| ApiError::bad_request("missing eventId"))?;

    sync::delete_event(&state, &owner_uid, &appointment_id, &event_id).await?;
    Ok(Json(DeletedResponse { deleted: true }))
}

/// Verifies the bearer identity token or fails with 401.
async fn require_identity(state: &AppState, headers: &HeaderMap) -> ApiResult<Identity> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::unauthenticated("missing bearer identity token"))?;
    state
        .verifier
        .verify(token)
        .await
        .ok_or_else(|| ApiError::unauthenticated("invalid identity token"))
}

/// Resolves the query window, applying the default span when bounds are
/// absent.
fn resolve_window(
    time_min: Option<&str>,
    time_max: Option<&str>,
    default_days: i64,
    now: DateTime<Utc>,
) -> ApiResult<TimeWindow> {
    let start = match time_min {
        Some(value) => parse_rfc3339("timeMin", value)?,
        None => now,
    };
    let end = match time_max {
        Some(value) => parse_rfc3339("timeMax", value)?,
        None => start + Duration::days(default_days),
    };
    if start > end {
        return Err(ApiError::bad_request("timeMin must not be after timeMax"));
    }
    Ok(TimeWindow::new(start, end))
}

fn parse_rfc3339(name: &str, value: &str) -> ApiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::bad_request(format!("invalid {name}: expected RFC 3339 timestamp")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn config_or_upstream(err: GoogleError) -> ApiError {
    match err {
        GoogleError::Config(m) => ApiError::Config(m),
        other => ApiError::upstream(other.to_string()),
    }
}
