//! Endpoint-level tests over the full router.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{TestContext, context, credential, seed_appointment, seed_group};
use slotsync_server::routes;

fn app(ctx: &TestContext) -> Router {
    routes().with_state(ctx.state.clone())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, bearer: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn health_responds() {
    let ctx = context().await;
    let response = app(&ctx).oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_start_redirects_to_consent_screen() {
    let ctx = context().await;
    let response = app(&ctx)
        .oneshot(get("/authStart?uid=ana", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.contains("client_id=id.apps.googleusercontent.com"));
    assert!(location.contains("state=ana"));
    assert!(location.contains("access_type=offline"));
}

#[tokio::test]
async fn auth_start_requires_uid() {
    let ctx = context().await;
    let response = app(&ctx).oneshot(get("/authStart", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn auth_callback_persists_credential_record() {
    let ctx = context().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at-1",
            "refresh_token": "rt-1",
            "expires_in": 3599,
            "scope": "https://www.googleapis.com/auth/calendar.freebusy",
        })))
        .mount(&ctx.google_api)
        .await;

    let response = app(&ctx)
        .oneshot(get("/authCallback?code=one-time&state=ana", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let record = ctx.state.tokens.load("ana").await.unwrap().unwrap();
    assert_eq!(record.access_token, "at-1");
    assert_eq!(record.refresh_token.as_deref(), Some("rt-1"));
    assert!(record.expires_at.is_some());
}

#[tokio::test]
async fn auth_callback_requires_code_and_state() {
    let ctx = context().await;
    let response = app(&ctx)
        .oneshot(get("/authCallback?code=only-code", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn auth_callback_exchange_failure_is_server_error() {
    let ctx = context().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
        })))
        .mount(&ctx.google_api)
        .await;

    let response = app(&ctx)
        .oneshot(get("/authCallback?code=bad&state=ana", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn fetch_free_busy_requires_identity() {
    let ctx = context().await;
    let response = app(&ctx)
        .oneshot(get("/fetchFreeBusy", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app(&ctx)
        .oneshot(get("/fetchFreeBusy", Some("tok-unknown")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn fetch_free_busy_without_credential_is_not_found() {
    let ctx = context().await;
    let response = app(&ctx)
        .oneshot(get("/fetchFreeBusy", Some("tok-ana")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fetch_free_busy_returns_calendars() {
    let ctx = context().await;
    ctx.state
        .tokens
        .save("ana", &credential("at-1", None, None))
        .await
        .unwrap();
    Mock::given(method("POST"))
        .and(path("/calendar/v3/freeBusy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "calendars": {"primary": {"busy": [
                {"start": "2025-02-03T10:00:00Z", "end": "2025-02-03T11:00:00Z"},
            ]}}
        })))
        .mount(&ctx.google_api)
        .await;

    let response = app(&ctx)
        .oneshot(get("/fetchFreeBusy", Some("tok-ana")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body.get("timeMin").is_some());
    assert!(body.get("timeMax").is_some());
    assert_eq!(body["calendars"]["primary"]["busy"][0]["start"], "2025-02-03T10:00:00Z");
}

#[tokio::test]
async fn group_free_busy_returns_partial_result() {
    let ctx = context().await;
    seed_group(&ctx.store, "g1", &[("ana", None), ("bo", None)]).await;
    ctx.state
        .tokens
        .save("ana", &credential("at-1", None, None))
        .await
        .unwrap();
    Mock::given(method("POST"))
        .and(path("/calendar/v3/freeBusy"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"calendars": {"primary": {"busy": []}}})),
        )
        .mount(&ctx.google_api)
        .await;

    let response = app(&ctx)
        .oneshot(get(
            "/groupFreeBusy?groupId=g1&timeMin=2025-02-03T00:00:00Z&timeMax=2025-02-05T00:00:00Z",
            Some("tok-ana"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["missingMembers"], json!(["bo"]));
    assert_eq!(body["freeSlots"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn group_free_busy_rejects_non_member() {
    let ctx = context().await;
    seed_group(&ctx.store, "g1", &[("bo", None)]).await;

    let response = app(&ctx)
        .oneshot(get("/groupFreeBusy?groupId=g1", Some("tok-ana")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn group_free_busy_requires_group_id() {
    let ctx = context().await;
    let response = app(&ctx)
        .oneshot(get("/groupFreeBusy", Some("tok-ana")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_event_invites_group_members_without_duplicating_owner() {
    let ctx = context().await;
    // The owner is also a group member; their email must appear once.
    seed_group(
        &ctx.store,
        "g1",
        &[
            ("ana", Some("ana@example.com")),
            ("bo", Some("bo@example.com")),
        ],
    )
    .await;
    seed_appointment(&ctx.store, "ana", "a1").await;
    ctx.state
        .tokens
        .save("ana", &credential("at-1", None, None))
        .await
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/calendar/v3/calendars/primary/events"))
        .and(body_string_contains("ana@example.com"))
        .and(body_string_contains("bo@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ev-1"})))
        .mount(&ctx.google_api)
        .await;

    let request_body = json!({
        "appointmentId": "a1",
        "title": "planning",
        "description": "quarterly planning",
        "startsAt": "2025-02-03T10:00:00Z",
        "endsAt": "2025-02-03T11:00:00Z",
        "groupId": "g1",
    });
    let response = app(&ctx)
        .oneshot(post("/createEvent", Some("tok-ana"), &request_body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["eventId"], "ev-1");
    assert_eq!(body["attendeesAdded"], 2);

    // The event link is written back onto the appointment record.
    let record = ctx
        .state
        .appointments
        .load("ana", "a1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.google_event_id.as_deref(), Some("ev-1"));
}

#[tokio::test]
async fn create_event_for_foreign_appointment_is_forbidden() {
    let ctx = context().await;
    seed_appointment(&ctx.store, "bo", "a1").await;

    let request_body = json!({
        "appointmentId": "a1",
        "title": "planning",
        "startsAt": "2025-02-03T10:00:00Z",
        "endsAt": "2025-02-03T11:00:00Z",
    });
    let response = app(&ctx)
        .oneshot(post("/createEvent", Some("tok-ana"), &request_body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_event_requires_fields() {
    let ctx = context().await;
    let response = app(&ctx)
        .oneshot(post(
            "/createEvent",
            Some("tok-ana"),
            &json!({"title": "planning"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_event_without_credential_is_bad_request() {
    let ctx = context().await;
    seed_appointment(&ctx.store, "ana", "a1").await;

    let request_body = json!({
        "appointmentId": "a1",
        "title": "planning",
        "startsAt": "2025-02-03T10:00:00Z",
        "endsAt": "2025-02-03T11:00:00Z",
    });
    let response = app(&ctx)
        .oneshot(post("/createEvent", Some("tok-ana"), &request_body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_event_is_idempotent_and_works_from_body_owner() {
    let ctx = context().await;
    // No bearer identity, no appointment record: the delete still runs
    // from the identifiers alone.
    ctx.state
        .tokens
        .save("ana", &credential("at-1", None, None))
        .await
        .unwrap();
    Mock::given(method("DELETE"))
        .and(path("/calendar/v3/calendars/primary/events/ev-1"))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&ctx.google_api)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/calendar/v3/calendars/primary/events/ev-1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&ctx.google_api)
        .await;

    let request_body = json!({
        "appointmentId": "a1",
        "eventId": "ev-1",
        "ownerUid": "ana",
    });
    for _ in 0..2 {
        let response = app(&ctx)
            .oneshot(post("/deleteEvent", None, &request_body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["deleted"], true);
    }
}

#[tokio::test]
async fn delete_event_requires_owner_and_ids() {
    let ctx = context().await;
    let response = app(&ctx)
        .oneshot(post(
            "/deleteEvent",
            None,
            &json!({"appointmentId": "a1", "eventId": "ev-1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
