//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define resource pipeline metrics
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `resource_responses_total` (counter): resource responses by status
//! - `resource_not_modified_total` (counter): conditional requests answered 304
//! - `filter_redirects_total` (counter): trailing-slash redirects issued
//! - `autocomplete_requests_total` (counter): autocomplete callbacks by field
//! - `resource_response_duration_seconds` (histogram): responder latency
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Without an installed recorder every call is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::StatusCode;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a finished resource response and its latency.
pub fn record_resource_response(scope: &str, status: StatusCode, start: Instant) {
    let status = status.as_u16().to_string();
    counter!("resource_responses_total", "scope" => scope.to_string(), "status" => status).increment(1);
    histogram!("resource_response_duration_seconds", "scope" => scope.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_not_modified(scope: &str) {
    counter!("resource_not_modified_total", "scope" => scope.to_string()).increment(1);
}

pub fn record_redirect() {
    counter!("filter_redirects_total").increment(1);
}

pub fn record_autocomplete_request(component_id: &str) {
    counter!("autocomplete_requests_total", "component" => component_id.to_string()).increment(1);
}
