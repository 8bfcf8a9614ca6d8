//! Error Body Shape Tests
//!
//! Every error the API produces must serialize into the same JSON body:
//! `{error, message, trace_id, timestamp, validation_errors?}`.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use pretty_assertions::assert_eq;

use campus_match::shared::error::{AppError, FieldError};

async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn not_found_maps_to_404_with_code() {
    let (status, json) = body_json(AppError::NotFound("Match not found".into())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
    assert_eq!(json["message"], "Match not found");
    assert!(json["trace_id"].as_str().is_some());
    assert!(json["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn internal_errors_hide_details() {
    let (status, json) =
        body_json(AppError::Internal("postgres://secret@db failed".into())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "internal_error");
    assert_eq!(json["message"], "Internal server error");
    assert!(!json.to_string().contains("postgres://"));
}

#[tokio::test]
async fn validation_fields_are_listed() {
    let err = AppError::ValidationFields(vec![FieldError {
        field: "email".into(),
        message: "Invalid email format".into(),
    }]);
    let (status, json) = body_json(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_failed");
    assert_eq!(json["validation_errors"][0]["field"], "email");
}

#[tokio::test]
async fn rate_limited_maps_to_429() {
    let (status, json) = body_json(AppError::RateLimited).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"], "rate_limited");
}
