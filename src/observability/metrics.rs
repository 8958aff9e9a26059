//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lb_requests_total` (counter): proxied HTTP requests by method,
//!   status, backend
//! - `lb_relay_connections_total` (counter): relayed TCP connections by
//!   backend
//! - `lb_fallback_selections_total` (counter): degraded-mode selections
//!   made with no valid backend
//! - `lb_backend_health` (gauge): 1=enabled, 0=disabled per backend
//!
//! # Design Decisions
//! - Recording is always on and cheap; the Prometheus exporter is only
//!   installed when enabled in config

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(error) => {
            tracing::error!(error = %error, "Failed to install metrics exporter");
        }
    }
}

/// Record one proxied HTTP request.
pub fn record_request(method: &str, status: u16, backend: &str) {
    counter!(
        "lb_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "backend" => backend.to_string()
    )
    .increment(1);
}

/// Record one relayed TCP connection.
pub fn record_relay_connection(backend: &str) {
    counter!("lb_relay_connections_total", "backend" => backend.to_string()).increment(1);
}

/// Record a degraded-mode selection made with an empty valid set.
pub fn record_fallback_selection() {
    counter!("lb_fallback_selections_total").increment(1);
}

/// Record a backend's health state after a probe.
pub fn record_backend_health(backend: &str, healthy: bool) {
    gauge!("lb_backend_health", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
