//! Metrics collection and exposition.
//!
//! # Metrics
//! - `tripit_provider_attempts_total` (counter): attempts by outcome
//! - `tripit_provider_retries_total` (counter): retries by reason
//! - `tripit_provider_request_duration_seconds` (histogram): per-attempt latency
//! - `tripit_rpc_requests_total` (counter): inbound RPC by method, outcome
//! - `tripit_tool_calls_total` (counter): tool invocations by tool, outcome
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! tests pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one provider attempt and its latency.
pub fn record_attempt(outcome: &'static str, started: Instant) {
    ::metrics::counter!("tripit_provider_attempts_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("tripit_provider_request_duration_seconds")
        .record(started.elapsed().as_secs_f64());
}

/// Record a scheduled retry.
pub fn record_retry(reason: &'static str) {
    ::metrics::counter!("tripit_provider_retries_total", "reason" => reason).increment(1);
}

/// Record one dispatched RPC request.
pub fn record_rpc(method: &str, outcome: &'static str) {
    ::metrics::counter!(
        "tripit_rpc_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record one tool invocation. `tool` must come from a fixed set.
pub fn record_tool_call(tool: &'static str, outcome: &'static str) {
    ::metrics::counter!(
        "tripit_tool_calls_total",
        "tool" => tool,
        "outcome" => outcome
    )
    .increment(1);
}
