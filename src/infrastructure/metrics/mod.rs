//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Active hub connection gauge
//! - Domain counters: swipes, matches, messages
//! - Background job run counters

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace("campus_match"),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace("campus_match")
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Active hub connections gauge
pub static HUB_CONNECTIONS_ACTIVE: Lazy<GaugeVec> = Lazy::new(|| {
    GaugeVec::new(
        Opts::new(
            "hub_connections_active",
            "Number of active realtime hub connections",
        )
        .namespace("campus_match"),
        &["state"], // "connected", "authenticated"
    )
    .expect("Failed to create HUB_CONNECTIONS_ACTIVE metric")
});

/// Swipe counter by direction and whether a match resulted
pub static SWIPES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("swipes_total", "Total number of recorded swipes").namespace("campus_match"),
        &["direction", "matched"],
    )
    .expect("Failed to create SWIPES_TOTAL metric")
});

/// Chat message counter by transport
pub static MESSAGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("messages_total", "Total number of chat messages sent")
            .namespace("campus_match"),
        &["transport"], // "hub", "rest"
    )
    .expect("Failed to create MESSAGES_TOTAL metric")
});

/// Background job run counter
pub static JOB_RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("job_runs_total", "Background job executions").namespace("campus_match"),
        &["job", "outcome"], // outcome: "ok", "error"
    )
    .expect("Failed to create JOB_RUNS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(HUB_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register HUB_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(SWIPES_TOTAL.clone()))
        .expect("Failed to register SWIPES_TOTAL");
    registry
        .register(Box::new(MESSAGES_TOTAL.clone()))
        .expect("Failed to register MESSAGES_TOTAL");
    registry
        .register(Box::new(JOB_RUNS_TOTAL.clone()))
        .expect("Failed to register JOB_RUNS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Metrics should be valid UTF-8")
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to record a swipe
pub fn record_swipe(direction: &str, matched: bool) {
    SWIPES_TOTAL
        .with_label_values(&[direction, if matched { "true" } else { "false" }])
        .inc();
}

/// Helper to record a chat message
pub fn record_message(transport: &str) {
    MESSAGES_TOTAL.with_label_values(&[transport]).inc();
}

/// Helper to record a background job run
pub fn record_job_run(job: &str, ok: bool) {
    JOB_RUNS_TOTAL
        .with_label_values(&[job, if ok { "ok" } else { "error" }])
        .inc();
}

/// Helper to update hub connection counts
pub fn set_hub_connections(connected: i64, authenticated: i64) {
    HUB_CONNECTIONS_ACTIVE
        .with_label_values(&["connected"])
        .set(connected as f64);
    HUB_CONNECTIONS_ACTIVE
        .with_label_values(&["authenticated"])
        .set(authenticated as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // Force lazy initialization
        let _ = &*REGISTRY;
        let _ = &*HTTP_REQUESTS_TOTAL;
        let _ = &*HTTP_REQUEST_DURATION_SECONDS;
        let _ = &*HUB_CONNECTIONS_ACTIVE;
        let _ = &*SWIPES_TOTAL;
    }

    #[test]
    fn test_gather_metrics() {
        // Label-vecs with no samples export nothing, so record one first
        record_http_request("GET", "/health", 200, 0.001);
        let metrics = gather_metrics();
        assert!(!metrics.is_empty());
    }

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/health", 200, 0.001);
        let metrics = gather_metrics();
        assert!(metrics.contains("http_requests_total"));
    }
}
