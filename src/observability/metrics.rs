//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dynroute_requests_total` (counter): dispatched requests by method, route, status
//! - `dynroute_request_duration_seconds` (histogram): dispatch latency
//! - `dynroute_handler_failures_total` (counter): handler errors and panics by route
//! - `dynroute_registrations_total` (counter): registration attempts by outcome
//! - `dynroute_registered_routes` (gauge): current route count
//!
//! # Design Decisions
//! - Without an installed recorder every call is a no-op
//! - Route labels use the registered path, or `none` for unmatched requests,
//!   so arbitrary request paths never become label values

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Route label for requests that matched nothing.
pub const NO_ROUTE: &str = "none";

/// Install the Prometheus recorder with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a dispatched request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "dynroute_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "dynroute_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a handler that failed or panicked.
pub fn record_handler_failure(route: &str) {
    counter!("dynroute_handler_failures_total", "route" => route.to_string()).increment(1);
}

/// Record a registration attempt.
pub fn record_registration(outcome: &'static str) {
    counter!("dynroute_registrations_total", "outcome" => outcome).increment(1);
}

pub fn set_registered_routes(count: usize) {
    gauge!("dynroute_registered_routes").set(count as f64);
}
