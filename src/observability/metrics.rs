//! Metrics collection and exposition.
//!
//! # Metrics
//! - `endpoint_dispatch_total` (counter): inbound requests by operation, status
//! - `endpoint_dispatch_duration_seconds` (histogram): inbound latency by operation
//! - `endpoint_client_calls_total` (counter): outbound calls by operation, outcome
//! - `endpoint_client_call_duration_seconds` (histogram): outbound latency by operation
//!
//! Without an installed recorder every update is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with an HTTP scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one inbound dispatch. `operation` is `"none"` when no route matched.
pub fn record_dispatch(operation: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "endpoint_dispatch_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "endpoint_dispatch_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one outbound call.
pub fn record_call(operation: &str, outcome: &'static str, start: Instant) {
    ::metrics::counter!(
        "endpoint_client_calls_total",
        "operation" => operation.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    ::metrics::histogram!(
        "endpoint_client_call_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
