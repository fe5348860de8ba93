//! HTTP API integration tests.
//!
//! These tests drive the full router with in-process requests.

use poolfilter::api::{build_router, create_api_state, ApiState};
use poolfilter::hardware::{PumpDriver, RecordingDriver};
use poolfilter::scheduler::Scheduler;
use poolfilter::storage::InMemoryStore;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test API state over an empty in-memory store.
fn create_test_state() -> ApiState<InMemoryStore> {
    let store = Arc::new(InMemoryStore::default());
    let driver = Arc::new(RecordingDriver::new()) as Arc<dyn PumpDriver>;
    let scheduler = Arc::new(Scheduler::new(Arc::clone(&store), driver));
    create_api_state(scheduler, store)
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn send(router: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request(method, uri))
        .await
        .unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

/// Test: index page responds with html.
#[tokio::test]
async fn index_serves_info_page() {
    let router = build_router(create_test_state());
    let response = router.oneshot(request(Method::GET, "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(std::str::from_utf8(&body).unwrap().contains("Pool Filter"));
}

/// Test: idle controller reports speed 0 and empty window.
#[tokio::test]
async fn current_program_idle() {
    let router = build_router(create_test_state());
    let (status, json) = send(&router, Method::GET, "/program/now").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["speed"], 0);
    assert_eq!(json["start"], "");
    assert_eq!(json["end"], "");
}

/// Test: add then list then delete round trip.
#[tokio::test]
async fn program_round_trip() {
    let router = build_router(create_test_state());

    let (status, json) = send(
        &router,
        Method::POST,
        "/program/add?speed=4&start=08:00:00&summer_duration=00:15:00&winter_duration=00:10:00",
    )
    .await;
    assert_eq!(status, StatusCode::OK, "add failed: {json}");

    let (status, json) = send(&router, Method::GET, "/program/all").await;
    assert_eq!(status, StatusCode::OK);
    let programs = json.as_array().unwrap();
    assert_eq!(programs.len(), 1);
    assert_eq!(programs[0]["speed"], 4);
    assert_eq!(programs[0]["start"], "08:00:00");
    assert_eq!(programs[0]["summer_duration"], "00:15:00");
    assert_eq!(programs[0]["winter_duration"], "00:10:00");
    let id = programs[0]["id"].as_i64().unwrap();

    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/program/delete?id={id}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&router, Method::GET, "/program/all").await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

/// Test: missing add parameters yield a field-level 400.
#[tokio::test]
async fn add_program_reports_missing_fields() {
    let router = build_router(create_test_state());
    let (status, json) = send(&router, Method::POST, "/program/add?speed=4&start=08:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["parameter"]["speed"], false);
    assert_eq!(json["parameter"]["summer_duration"], true);
    assert_eq!(json["parameter"]["winter_duration"], true);
}

/// Test: duplicate start times are rejected.
#[tokio::test]
async fn duplicate_start_time_is_rejected() {
    let router = build_router(create_test_state());
    let uri = "/program/add?speed=4&start=08:00:00&summer_duration=00:15:00&winter_duration=00:10:00";
    let (status, _) = send(&router, Method::POST, uri).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = send(&router, Method::POST, uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Start times must be unique");
}

/// Test: update rewrites program fields.
#[tokio::test]
async fn update_program_changes_fields() {
    let router = build_router(create_test_state());
    send(
        &router,
        Method::POST,
        "/program/add?speed=4&start=08:00:00&summer_duration=00:15:00&winter_duration=00:10:00",
    )
    .await;

    let (_, json) = send(&router, Method::GET, "/program/all").await;
    let id = json[0]["id"].as_i64().unwrap();

    let (status, _) = send(
        &router,
        Method::PUT,
        &format!("/program/update?id={id}&speed=7&start=09:30:00"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&router, Method::GET, "/program/all").await;
    assert_eq!(json[0]["speed"], 7);
    assert_eq!(json[0]["start"], "09:30:00");
    // Durations untouched.
    assert_eq!(json[0]["summer_duration"], "00:15:00");
}

/// Test: update of an unknown id is a 404.
#[tokio::test]
async fn update_unknown_program_is_not_found() {
    let router = build_router(create_test_state());
    let (status, _) = send(&router, Method::PUT, "/program/update?id=99&speed=7").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Test: delete without an id is a 400, unknown id a 404.
#[tokio::test]
async fn delete_validates_id() {
    let router = build_router(create_test_state());
    let (status, _) = send(&router, Method::DELETE, "/program/delete").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&router, Method::DELETE, "/program/delete?id=banana").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&router, Method::DELETE, "/program/delete?id=99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Test: seasons endpoint returns MM-DD boundary dates.
#[tokio::test]
async fn seasons_endpoint_returns_dates() {
    let router = build_router(create_test_state());
    let (status, json) = send(&router, Method::GET, "/seasons/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["summer"]["peak"], "07-15");
    assert_eq!(json["winter"]["peak"], "01-15");
    assert_eq!(json["summer"]["start"], "05-01");
}

/// Test: override validation.
#[tokio::test]
async fn override_requires_speed_and_duration() {
    let router = build_router(create_test_state());

    let (status, json) = send(&router, Method::PUT, "/override").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Speed not provided to override");

    // Turning the pump on needs an explicit duration.
    let (status, _) = send(&router, Method::PUT, "/override?speed=4").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Turning it off does not.
    let (status, _) = send(&router, Method::PUT, "/override?speed=0").await;
    assert_eq!(status, StatusCode::OK);
}

/// Test: override stop always succeeds and replaces a pending override.
#[tokio::test]
async fn override_stop_replaces_pending() {
    let router = build_router(create_test_state());
    let (status, _) = send(
        &router,
        Method::PUT,
        "/override?speed=4&duration=00:10:00",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&router, Method::PUT, "/override/stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Overwrote current program");
}
