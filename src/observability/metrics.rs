//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): calls by endpoint, status
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency
//! - `gateway_upstream_errors_total` (counter): upstream failures by class
//!
//! # Design Decisions
//! - Unknown endpoint names share the `unknown` label
//! - Without an installed recorder every call is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(endpoint: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "gateway_request_duration_seconds",
        "endpoint" => endpoint.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_error(endpoint: &str, class: &'static str) {
    metrics::counter!(
        "gateway_upstream_errors_total",
        "endpoint" => endpoint.to_string(),
        "class" => class
    )
    .increment(1);
}
