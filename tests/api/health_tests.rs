//! Health Check Tests
//!
//! The basic and liveness probes have no dependencies and can be called
//! directly. Readiness needs live Postgres/Redis and is exercised in
//! deployment smoke tests instead.

use axum::http::StatusCode;
use axum::response::IntoResponse;

use campus_match::presentation::http::handlers::health::{health_check, liveness};

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await.into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["status"], "ok");
    assert!(json["version"].as_str().is_some());
    assert!(json["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn liveness_always_responds() {
    let response = liveness().await.into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["status"], "alive");
}
