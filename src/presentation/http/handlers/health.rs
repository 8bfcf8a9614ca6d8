//! Health Check Handlers
//!
//! Kubernetes-style probes:
//! - `GET /health` - basic status and version
//! - `GET /health/live` - liveness (is the process up?)
//! - `GET /health/ready` - readiness (Postgres and Redis reachable?)

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use redis::AsyncCommands;
use serde::Serialize;

use crate::startup::AppState;

/// Basic health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// Readiness response with per-dependency checks
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: HealthStatus,
    pub timestamp: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: ServiceHealth,
    pub redis: ServiceHealth,
    pub hub: HubHealth,
}

#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HubHealth {
    pub status: HealthStatus,
    pub active_connections: usize,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Basic health check
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Liveness probe
pub async fn liveness() -> impl IntoResponse {
    Json(HealthResponse {
        status: "alive",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness probe: checks Postgres and Redis, reports hub load
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let database = check_database(&state).await;
    let redis = check_redis(&state).await;

    let hub = HubHealth {
        status: HealthStatus::Healthy,
        active_connections: state.hub.connection_count(),
    };

    let healthy =
        database.status == HealthStatus::Healthy && redis.status == HealthStatus::Healthy;

    let response = ReadinessResponse {
        status: if healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        },
        timestamp: Utc::now().to_rfc3339(),
        checks: HealthChecks {
            database,
            redis,
            hub,
        },
    };

    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(response))
}

async fn check_database(state: &AppState) -> ServiceHealth {
    let start = Instant::now();
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => ServiceHealth {
            status: HealthStatus::Healthy,
            latency_ms: Some(start.elapsed().as_millis() as u64),
            message: None,
        },
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            ServiceHealth {
                status: HealthStatus::Unhealthy,
                latency_ms: None,
                message: Some("Database unreachable".to_string()),
            }
        }
    }
}

async fn check_redis(state: &AppState) -> ServiceHealth {
    let start = Instant::now();
    let mut conn = state.redis.clone();
    let result: Result<String, redis::RedisError> = conn.ping().await;
    match result {
        Ok(_) => ServiceHealth {
            status: HealthStatus::Healthy,
            latency_ms: Some(start.elapsed().as_millis() as u64),
            message: None,
        },
        Err(e) => {
            tracing::error!("Redis health check failed: {}", e);
            ServiceHealth {
                status: HealthStatus::Unhealthy,
                latency_ms: None,
                message: Some("Redis unreachable".to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unhealthy).unwrap(),
            "\"unhealthy\""
        );
    }
}
