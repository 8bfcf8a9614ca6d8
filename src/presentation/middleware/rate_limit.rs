//! Rate Limiting Middleware
//!
//! Redis-based distributed rate limiting using a sliding window. The
//! window state lives in a Redis sorted set per identifier, so limits
//! hold across multiple server instances.

use std::net::IpAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};

use crate::infrastructure::cache::keys;
use crate::presentation::middleware::auth::AuthUser;
use crate::shared::error::ErrorResponse;
use crate::startup::AppState;

/// Configuration for rate limiting behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window for this endpoint type
    pub requests_per_window: u32,
    /// Window duration in seconds
    pub window_seconds: u64,
    /// Optional burst allowance above base limit
    pub burst_allowance: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 60,
            window_seconds: 60,
            burst_allowance: 10,
        }
    }
}

/// Predefined rate limit configurations for different endpoint types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointType {
    /// Auth endpoints: strict, against credential stuffing
    Auth,
    /// Standard API endpoints
    Api,
    /// Swiping: relaxed, the core interaction loop
    Swipe,
    /// Hub connection establishment
    Hub,
}

impl EndpointType {
    pub fn config(&self) -> RateLimitConfig {
        match self {
            EndpointType::Auth => RateLimitConfig {
                requests_per_window: 5,
                window_seconds: 60,
                burst_allowance: 2,
            },
            EndpointType::Api => RateLimitConfig {
                requests_per_window: 60,
                window_seconds: 60,
                burst_allowance: 20,
            },
            EndpointType::Swipe => RateLimitConfig {
                requests_per_window: 120,
                window_seconds: 60,
                burst_allowance: 30,
            },
            EndpointType::Hub => RateLimitConfig {
                requests_per_window: 10,
                window_seconds: 60,
                burst_allowance: 5,
            },
        }
    }

    fn bucket(&self) -> &'static str {
        match self {
            EndpointType::Auth => "auth",
            EndpointType::Api => "api",
            EndpointType::Swipe => "swipe",
            EndpointType::Hub => "hub",
        }
    }
}

/// Information about rate limit status returned to clients.
#[derive(Debug, Serialize)]
pub struct RateLimitInfo {
    pub limit: u32,
    pub remaining: u32,
    /// Unix timestamp when the window resets
    pub reset_at: i64,
    pub retry_after: u64,
}

/// Redis-based sliding window rate limiter.
///
/// A sorted set per identifier holds one member per request, scored by
/// timestamp in milliseconds. Each check trims entries outside the
/// window, counts what remains, and either admits or rejects. The whole
/// sequence runs as a Lua script so concurrent requests cannot race.
#[derive(Clone)]
pub struct RateLimiter {
    redis: ConnectionManager,
    config: RateLimitConfig,
    endpoint_type: EndpointType,
}

impl RateLimiter {
    pub fn new(redis: ConnectionManager, endpoint_type: EndpointType) -> Self {
        Self {
            redis,
            config: endpoint_type.config(),
            endpoint_type,
        }
    }

    /// Check if a request should be allowed.
    ///
    /// Returns `Ok(RateLimitInfo)` if allowed, `Err(RateLimitInfo)` if limited.
    pub async fn check(&self, identifier: &str) -> Result<RateLimitInfo, RateLimitInfo> {
        let key = format!(
            "{}{}:{}",
            keys::RATE_LIMIT,
            self.endpoint_type.bucket(),
            identifier
        );
        let now_ms = chrono::Utc::now().timestamp_millis();
        let window_ms = (self.config.window_seconds * 1000) as i64;
        let window_start = now_ms - window_ms;
        let max_requests = self.config.requests_per_window + self.config.burst_allowance;

        let mut conn = self.redis.clone();

        let script = redis::Script::new(
            r#"
            local key = KEYS[1]
            local now_ms = tonumber(ARGV[1])
            local window_start = tonumber(ARGV[2])
            local max_requests = tonumber(ARGV[3])
            local window_seconds = tonumber(ARGV[4])

            redis.call('ZREMRANGEBYSCORE', key, '-inf', window_start)

            local current_count = redis.call('ZCARD', key)

            if current_count < max_requests then
                local member = now_ms .. ':' .. math.random(1000000)
                redis.call('ZADD', key, now_ms, member)
                redis.call('EXPIRE', key, window_seconds + 1)
                return {1, current_count + 1, max_requests}
            else
                local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
                local retry_after = 0
                if oldest and #oldest >= 2 then
                    retry_after = oldest[2] + (window_seconds * 1000) - now_ms
                end
                return {0, current_count, max_requests, retry_after}
            end
            "#,
        );

        let result: Vec<i64> = script
            .key(&key)
            .arg(now_ms)
            .arg(window_start)
            .arg(max_requests as i64)
            .arg(self.config.window_seconds as i64)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                tracing::error!("Rate limiter Redis error: {}", e);
                // A Redis outage must not turn into total service denial
                RateLimitInfo {
                    limit: max_requests,
                    remaining: 1,
                    reset_at: (now_ms / 1000) + self.config.window_seconds as i64,
                    retry_after: 0,
                }
            })?;

        let allowed = result[0] == 1;
        let current_count = result[1] as u32;
        let remaining = max_requests.saturating_sub(current_count);
        let reset_at = (now_ms / 1000) + self.config.window_seconds as i64;

        let info = RateLimitInfo {
            limit: max_requests,
            remaining,
            reset_at,
            retry_after: if allowed {
                0
            } else {
                let retry_ms = result.get(3).copied().unwrap_or(0);
                ((retry_ms as f64) / 1000.0).ceil() as u64
            },
        };

        if allowed {
            Ok(info)
        } else {
            Err(info)
        }
    }
}

/// Extract the rate limit identifier from a request.
///
/// Prefers the authenticated student id; falls back to forwarded or
/// connection IP.
fn extract_identifier(request: &Request) -> String {
    if let Some(auth_user) = request.extensions().get::<AuthUser>() {
        return format!("student:{}", auth_user.student_id);
    }

    // X-Forwarded-For is only meaningful behind a trusted proxy
    if let Some(forwarded_for) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(first_ip) = forwarded_for.split(',').next() {
            let ip = first_ip.trim();
            if ip.parse::<IpAddr>().is_ok() {
                return format!("ip:{}", ip);
            }
        }
    }

    // ConnectInfo lands in extensions via into_make_service_with_connect_info
    if let Some(ConnectInfo(addr)) = request
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
    {
        return format!("ip:{}", addr.ip());
    }

    tracing::warn!("Could not determine client identifier for rate limiting");
    "ip:unknown".to_string()
}

/// Rate limiting middleware for authentication endpoints.
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    rate_limit_inner(state, request, next, EndpointType::Auth).await
}

/// Rate limiting middleware for standard API endpoints.
pub async fn rate_limit_api(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    rate_limit_inner(state, request, next, EndpointType::Api).await
}

/// Rate limiting middleware for the swipe endpoint.
pub async fn rate_limit_swipe(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    rate_limit_inner(state, request, next, EndpointType::Swipe).await
}

/// Rate limiting middleware for hub connection attempts.
pub async fn rate_limit_hub(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    rate_limit_inner(state, request, next, EndpointType::Hub).await
}

async fn rate_limit_inner(
    state: AppState,
    request: Request,
    next: Next,
    endpoint_type: EndpointType,
) -> Response {
    if !state.settings.rate_limit.enabled {
        return next.run(request).await;
    }

    let identifier = extract_identifier(&request);

    let limiter = RateLimiter::new(state.redis.clone(), endpoint_type);

    match limiter.check(&identifier).await {
        Ok(info) => {
            let mut response = next.run(request).await;
            add_rate_limit_headers(response.headers_mut(), &info);
            response
        }
        Err(info) => {
            tracing::warn!(
                identifier = %identifier,
                endpoint_type = ?endpoint_type,
                "Rate limit exceeded"
            );
            create_rate_limit_response(info)
        }
    }
}

fn add_rate_limit_headers(headers: &mut header::HeaderMap, info: &RateLimitInfo) {
    if let Ok(v) = header::HeaderValue::from_str(&info.limit.to_string()) {
        headers.insert("X-RateLimit-Limit", v);
    }
    if let Ok(v) = header::HeaderValue::from_str(&info.remaining.to_string()) {
        headers.insert("X-RateLimit-Remaining", v);
    }
    if let Ok(v) = header::HeaderValue::from_str(&info.reset_at.to_string()) {
        headers.insert("X-RateLimit-Reset", v);
    }
}

/// 429 response carrying the standard error body plus window details.
fn create_rate_limit_response(info: RateLimitInfo) -> Response {
    #[derive(Serialize)]
    struct RateLimitExceededResponse {
        #[serde(flatten)]
        error: ErrorResponse,
        rate_limit: RateLimitInfo,
    }

    let retry_after = info.retry_after;
    let body = RateLimitExceededResponse {
        error: ErrorResponse::new("rate_limited", "Too many requests. Please slow down."),
        rate_limit: RateLimitInfo {
            remaining: 0,
            ..info
        },
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

    if let Ok(v) = header::HeaderValue::from_str(&retry_after.to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, v);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_identifier_prefers_auth_user_then_connect_info() {
        let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(extract_identifier(&request), "ip:unknown");

        let addr: std::net::SocketAddr = "10.0.0.7:4321".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(extract_identifier(&request), "ip:10.0.0.7");

        request.extensions_mut().insert(AuthUser {
            student_id: 42,
            is_admin: false,
        });
        assert_eq!(extract_identifier(&request), "student:42");
    }

    #[test]
    fn test_forwarded_for_beats_connect_info() {
        let mut request = Request::builder()
            .uri("/")
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        let addr: std::net::SocketAddr = "10.0.0.7:4321".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(extract_identifier(&request), "ip:203.0.113.9");
    }

    #[test]
    fn test_auth_limits_are_strictest() {
        let auth = EndpointType::Auth.config();
        let api = EndpointType::Api.config();
        let swipe = EndpointType::Swipe.config();
        assert!(auth.requests_per_window < api.requests_per_window);
        assert!(api.requests_per_window < swipe.requests_per_window);
    }

    #[test]
    fn test_buckets_are_distinct() {
        let buckets = [
            EndpointType::Auth.bucket(),
            EndpointType::Api.bucket(),
            EndpointType::Swipe.bucket(),
            EndpointType::Hub.bucket(),
        ];
        for (i, a) in buckets.iter().enumerate() {
            for b in buckets.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
