//! Shared fixtures for server integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use wiremock::MockServer;

use slotsync_google::{GoogleConfig, OAuthConfig};
use slotsync_server::{AppState, Identity, ServerConfig, StaticIdentityVerifier};
use slotsync_store::{CredentialRecord, MemoryStore, Store};

/// A mock Google backend plus application state wired against it.
pub struct TestContext {
    pub google_api: MockServer,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

/// Builds a context with two known identities: `tok-ana` -> ana and
/// `tok-bo` -> bo.
pub async fn context() -> TestContext {
    let google_api = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());

    let google = GoogleConfig::new(OAuthConfig::new(
        "id.apps.googleusercontent.com",
        "secret",
        "https://example.com/authCallback",
    ))
    .with_token_url(format!("{}/token", google_api.uri()))
    .with_api_base(format!("{}/calendar/v3", google_api.uri()))
    .with_timeout(Duration::from_secs(5));

    let verifier = StaticIdentityVerifier::new()
        .with_identity("tok-ana", Identity::new("ana", Some("ana@example.com".into())))
        .with_identity("tok-bo", Identity::new("bo", Some("bo@example.com".into())));

    let store_handle: Arc<dyn Store> = store.clone();
    let state = AppState::new(
        ServerConfig::default(),
        google,
        store_handle,
        Arc::new(verifier),
    );

    TestContext {
        google_api,
        store,
        state,
    }
}

/// February 2025 timestamp helper (Feb 3 is a Monday).
pub fn utc(day: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, day, h, min, 0).unwrap()
}

/// Builds a credential record for seeding.
pub fn credential(
    access: &str,
    expires_at: Option<DateTime<Utc>>,
    refresh: Option<&str>,
) -> CredentialRecord {
    CredentialRecord {
        access_token: access.into(),
        refresh_token: refresh.map(String::from),
        expires_at,
        scope: "https://www.googleapis.com/auth/calendar.freebusy".into(),
        updated_at: utc(1, 0, 0),
    }
}

/// Seeds a group with the given `(uid, email)` members.
pub async fn seed_group(store: &MemoryStore, group_id: &str, members: &[(&str, Option<&str>)]) {
    let mut member_map = serde_json::Map::new();
    for (uid, email) in members {
        let mut profile = json!({"uid": uid, "username": uid});
        if let Some(email) = email {
            profile["email"] = json!(email);
        }
        member_map.insert(uid.to_string(), profile);
    }
    store
        .set(
            &format!("groups/{group_id}"),
            json!({
                "name": group_id,
                "ownerUid": members.first().map(|(uid, _)| *uid).unwrap_or_default(),
                "members": member_map,
            }),
        )
        .await
        .unwrap();
}

/// Seeds an appointment record owned by `uid`.
pub async fn seed_appointment(store: &MemoryStore, uid: &str, appointment_id: &str) {
    store
        .set(
            &format!("appointments/{uid}/{appointment_id}"),
            json!({
                "title": "planning",
                "startsAt": "2025-02-03T10:00:00Z",
                "endsAt": "2025-02-03T11:00:00Z",
            }),
        )
        .await
        .unwrap();
}
