//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, outcome, status
//! - `proxy_request_duration_seconds` (histogram): handler latency by outcome
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    metrics::describe_counter!(
        "proxy_requests_total",
        "Requests answered, by method, outcome and status"
    );
    metrics::describe_histogram!(
        "proxy_request_duration_seconds",
        metrics::Unit::Seconds,
        "Time to produce the response head"
    );

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one answered request.
pub fn record_request(method: &Method, outcome: &'static str, status: StatusCode, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("outcome", outcome.to_string()),
        ("status", status.as_u16().to_string()),
    ];
    metrics::counter!("proxy_requests_total", &labels).increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
