//! Request Logging Middleware
//!
//! Structured request/response logging via tower-http's TraceLayer,
//! plus a lightweight middleware recording Prometheus HTTP metrics.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::metrics;

/// Create the HTTP trace layer used on the whole router
pub fn create_trace_layer() -> TraceLayer<tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>>
{
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

/// Record request count and latency metrics.
///
/// Uses the matched route pattern, not the raw URI, so path parameters
/// do not explode label cardinality.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<axum::extract::MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    metrics::record_http_request(&method, &path, response.status().as_u16(), duration);

    response
}
