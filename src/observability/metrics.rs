//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route, status
//! - `gateway_upstream_latency_seconds` (histogram): time until the client
//!   response was committed
//! - `gateway_streams_total` (counter): finished relays by route, outcome
//! - `gateway_stream_bytes_total` (counter): bytes relayed by route
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a handled request once its response status is known.
pub fn record_request(route: &'static str, status: u16, start_time: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_upstream_latency_seconds", "route" => route)
        .record(start_time.elapsed().as_secs_f64());
}

/// Record a finished relay.
pub fn record_stream(route: &'static str, outcome: &'static str, bytes: u64) {
    metrics::counter!("gateway_streams_total", "route" => route, "outcome" => outcome)
        .increment(1);
    metrics::counter!("gateway_stream_bytes_total", "route" => route).increment(bytes);
}
