//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): latency by method, route
//! - `gateway_auth_failures_total` (counter): rejected credentials by reason
//!
//! # Design Decisions
//! - Labels use the route pattern, never the raw path, to bound cardinality
//! - Exposed through the Prometheus exporter's own HTTP listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

pub const REQUESTS_TOTAL: &str = "gateway_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "gateway_request_duration_seconds";
pub const AUTH_FAILURES_TOTAL: &str = "gateway_auth_failures_total";

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let method = method.to_string();
    let route = route.to_string();

    counter!(
        REQUESTS_TOTAL,
        "method" => method.clone(),
        "status" => status.to_string(),
        "route" => route.clone()
    )
    .increment(1);

    histogram!(
        REQUEST_DURATION_SECONDS,
        "method" => method,
        "route" => route
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a bearer token rejected by the auth gate.
pub fn record_auth_failure(reason: &'static str) {
    counter!(AUTH_FAILURES_TOTAL, "reason" => reason).increment(1);
}
