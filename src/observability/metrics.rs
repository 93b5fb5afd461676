//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_gate_rejections_total` (counter): rejections by gate, reason
//! - `gateway_tokens_issued_total` (counter): successful enrollments
//! - `gateway_panics_recovered_total` (counter): faults caught by recovery
//! - `gateway_limiter_buckets` (gauge): callers tracked by the limiter
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_rejection(gate: &'static str, reason: &'static str) {
    metrics::counter!("gateway_gate_rejections_total", "gate" => gate, "reason" => reason)
        .increment(1);
}

pub fn record_token_issued() {
    metrics::counter!("gateway_tokens_issued_total").increment(1);
}

pub fn record_panic_recovered() {
    metrics::counter!("gateway_panics_recovered_total").increment(1);
}

pub fn record_limiter_buckets(count: usize) {
    metrics::gauge!("gateway_limiter_buckets").set(count as f64);
}
