//! Integration tests for the Axum adapter's router, driven in-process via
//! `tower::ServiceExt::oneshot` rather than a bound TCP listener.
//!
//! Verifies that:
//! - `/health` is reachable with no setup
//! - `/api/runs` accepts a run creation request and returns it via GET
//! - `/api/scripts` round-trips a script through the repository

use std::collections::HashMap;
use std::time::Duration;

use http_body_util::BodyExt;
use hyper::{Request, StatusCode};
use speechbench_axum::bootstrap::CorsConfig;
use speechbench_axum::{bootstrap, create_router};
use speechbench_core::Settings;
use tower::ServiceExt;

fn test_settings(db_path: &std::path::Path, storage_dir: &std::path::Path) -> Settings {
    Settings {
        database_path: db_path.to_string_lossy().into_owned(),
        storage_dir: storage_dir.to_string_lossy().into_owned(),
        max_concurrency: 2,
        call_timeout: Duration::from_secs(5),
        max_retries: 0,
        port: 0,
        lookback_days: 7,
        default_synth_vendor: Some("local".to_string()),
        default_evaluator_vendor: Some("local".to_string()),
        vendor_credentials: HashMap::new(),
    }
}

async fn test_router() -> axum::Router {
    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(&dir.path().join("speechbench.db"), &dir.path().join("storage"));
    // Leak the tempdir so the database file outlives this function; tests
    // run in separate processes so this is bounded.
    std::mem::forget(dir);
    let ctx = bootstrap(&settings).await.expect("bootstrap failed");
    create_router(ctx, &CorsConfig::AllowAll)
}

#[tokio::test]
async fn health_check_requires_no_setup() {
    let app = test_router().await;
    let response = app
        .oneshot(Request::builder().uri("/health").body(axum::body::Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_and_fetch_run_round_trips() {
    let app = test_router().await;

    let payload = serde_json::json!({
        "mode": "isolated",
        "vendors": ["local"],
        "service": "tts",
        "chain": null,
        "voice_id": null,
        "language": null,
        "input_source": { "type": "direct", "texts": ["hello world"] },
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/runs")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "run creation should succeed");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let created: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(created["accepted_items_count"], 1);
    let run_id = created["run_id"].as_str().expect("response should include a run_id");

    let response = app
        .oneshot(Request::builder().uri(format!("/api/runs/{run_id}")).body(axum::body::Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "fetching the created run should succeed");
}

#[tokio::test]
async fn create_script_then_list_includes_it() {
    let app = test_router().await;

    let payload = serde_json::json!({
        "name": "smoke test script",
        "input_texts": ["one", "two", "three"],
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/scripts")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let created: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(created["item_count"], 3);

    let response = app
        .oneshot(Request::builder().uri("/api/scripts").body(axum::body::Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let listed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_run_id_returns_not_found() {
    let app = test_router().await;
    let missing = uuid::Uuid::new_v4();

    let response = app
        .oneshot(Request::builder().uri(format!("/api/runs/{missing}")).body(axum::body::Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
