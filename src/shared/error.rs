//! Application Error Types
//!
//! Centralized error handling with Axum integration. Every service error is
//! eventually mapped onto one of these variants, and every variant serializes
//! into the same JSON body shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation failed")]
    ValidationFields(Vec<FieldError>),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Business rule violated: {0}")]
    BusinessRule(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl AppError {
    /// Machine-readable error code used in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) | AppError::ValidationFields(_) => "validation_failed",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::BusinessRule(_) => "business_rule_violation",
            AppError::Conflict(_) => "conflict",
            AppError::RateLimited => "rate_limited",
            AppError::Internal(_) | AppError::Database(_) | AppError::Redis(_) => "internal_error",
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::ValidationFields(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BusinessRule(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) | AppError::Database(_) | AppError::Redis(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The human-readable message carried by the variant.
    fn message(&self) -> String {
        match self {
            AppError::NotFound(m)
            | AppError::Validation(m)
            | AppError::Unauthorized(m)
            | AppError::Forbidden(m)
            | AppError::BusinessRule(m)
            | AppError::Conflict(m) => m.clone(),
            AppError::ValidationFields(fields) => fields
                .first()
                .map(|e| format!("{}: {}", e.field, e.message))
                .unwrap_or_else(|| "Validation failed".into()),
            AppError::RateLimited => "Rate limited".into(),
            // Never leak internals to clients
            AppError::Internal(_) | AppError::Database(_) | AppError::Redis(_) => {
                "Internal server error".into()
            }
        }
    }
}

/// Uniform error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (snake_case)
    pub error: String,
    pub message: String,
    pub trace_id: String,
    /// RFC3339 timestamp of when the error was produced
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: code.to_string(),
            message: message.into(),
            trace_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            validation_errors: None,
        }
    }
}

/// Field-level validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = ErrorResponse::new(self.code(), self.message());

        if let AppError::ValidationFields(fields) = &self {
            body.validation_errors = Some(fields.clone());
        }

        match &self {
            AppError::Internal(msg) => {
                tracing::error!(trace_id = %body.trace_id, "Internal error: {}", msg);
            }
            AppError::Database(e) => {
                tracing::error!(trace_id = %body.trace_id, "Database error: {}", e);
            }
            AppError::Redis(e) => {
                tracing::error!(trace_id = %body.trace_id, "Redis error: {}", e);
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_snake_case() {
        assert_eq!(AppError::NotFound("x".into()).code(), "not_found");
        assert_eq!(AppError::RateLimited.code(), "rate_limited");
        assert_eq!(
            AppError::BusinessRule("x".into()).code(),
            "business_rule_violation"
        );
        assert_eq!(AppError::Internal("x".into()).code(), "internal_error");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::BusinessRule("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_internal_errors_never_leak_details() {
        let err = AppError::Internal("connection string leaked".into());
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_error_response_body_shape() {
        let body = ErrorResponse::new("not_found", "Student not found");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["error"], "not_found");
        assert_eq!(json["message"], "Student not found");
        assert!(json.get("trace_id").is_some());
        assert!(json.get("timestamp").is_some());
        assert!(json.get("validation_errors").is_none());
    }

    #[test]
    fn test_validation_errors_serialized_when_present() {
        let err = AppError::ValidationFields(vec![FieldError {
            field: "name".into(),
            message: "too short".into(),
        }]);
        assert_eq!(err.message(), "name: too short");
    }
}
