//! End-to-end smoke tests for the full afterglowd stack.
//!
//! Each test spins up the complete application (virtual device platform,
//! real scheduler, real event bus, real axum router) and exercises the HTTP
//! layer via `tower::ServiceExt::oneshot` — no TCP port is bound.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use afterglow_adapter_http_axum::router;
use afterglow_adapter_http_axum::state::AppState;
use afterglow_adapter_virtual::VirtualActuator;
use afterglow_app::countdown::TokioCountdown;
use afterglow_app::event_bus::InProcessTimerBus;
use afterglow_app::scheduler::DeviceTimerScheduler;
use afterglow_app::services::DirectoryService;
use afterglow_domain::id::DeviceId;

/// Build a fully-wired router backed by the demo device platform.
async fn app() -> axum::Router {
    let platform = Arc::new(
        VirtualActuator::with_demo_devices()
            .await
            .expect("demo devices should build"),
    );
    let event_bus = Arc::new(InProcessTimerBus::new(256));
    let scheduler = DeviceTimerScheduler::new(
        Arc::clone(&platform),
        Arc::clone(&event_bus),
        TokioCountdown::new(),
    );
    let directory = Arc::new(DirectoryService::new(Arc::clone(&platform)));

    router::build(AppState::new(scheduler, directory, event_bus))
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let resp = app()
        .await
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Device listings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_list_demo_devices() {
    let app = app().await;

    let (status, body) = get_json(&app, "/api/devices").await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Hallway Light", "Kitchen Socket", "Reading Lamp"]);
}

#[tokio::test]
async fn should_autocomplete_devices_by_zone_and_capability() {
    let app = app().await;

    let (_, by_zone) = get_json(&app, "/api/devices/search?q=kitchen").await;
    assert_eq!(by_zone.as_array().unwrap().len(), 1);
    assert_eq!(by_zone[0]["name"], "Kitchen Socket");

    let (_, dimmable) = get_json(&app, "/api/devices/search?capability=dim").await;
    assert_eq!(dimmable.as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Timer lifecycle over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_run_full_timer_lifecycle() {
    let app = app().await;

    let (_, devices) = get_json(&app, "/api/devices").await;
    let device = devices[0]["id"].as_str().unwrap().to_string();

    // Trigger the deferred action.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/timers/{device}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"time_on": 300, "brightness_level": 0.8, "restore": true}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["outcome"], "armed");

    // The condition endpoint and the export both see it.
    let (_, running) = get_json(&app, &format!("/api/timers/{device}/running")).await;
    assert_eq!(running["running"], true);
    let (_, timers) = get_json(&app, "/api/timers").await;
    assert!(timers.get(device.as_str()).is_some());

    // Cancel it again.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/timers/{device}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let (_, running) = get_json(&app, &format!("/api/timers/{device}/running")).await;
    assert_eq!(running["running"], false);
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_reject_malformed_device_id_with_bad_request() {
    let resp = app()
        .await
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/timers/not-a-uuid")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"time_on": 60}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_map_unknown_device_to_bad_gateway() {
    let unknown = DeviceId::new();

    let resp = app()
        .await
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/timers/{unknown}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"time_on": 60}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}
