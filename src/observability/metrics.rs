//! Metrics collection and exposition.
//!
//! # Metrics
//! - `matebot_handshake_total` (counter): link/promote resolutions by outcome
//! - `matebot_purchase_total` (counter): purchase attempts by outcome
//! - `matebot_gateway_errors_total` (counter): exhausted gateway calls by endpoint
//!
//! # Design Decisions
//! - Counter updates are cheap atomics and safe to call before the
//!   exporter is installed (they become no-ops)
//! - Labels carry stable low-cardinality kinds, never user input

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(address: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(address).install() {
        Ok(()) => tracing::info!(%address, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one handshake resolution. `outcome` is "ok" or an error kind.
pub fn record_handshake(outcome: &str) {
    metrics::counter!("matebot_handshake_total", "outcome" => outcome.to_string()).increment(1);
}

/// Count one purchase attempt. `outcome` is "ok" or an error kind.
pub fn record_purchase(outcome: &str) {
    metrics::counter!("matebot_purchase_total", "outcome" => outcome.to_string()).increment(1);
}

/// Count a gateway call that failed past its retry bound.
pub fn record_gateway_error(endpoint: &str) {
    metrics::counter!("matebot_gateway_errors_total", "endpoint" => endpoint.to_string())
        .increment(1);
}
