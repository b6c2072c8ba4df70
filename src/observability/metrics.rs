//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_endpoint_health` (gauge): 1=healthy, 0=unhealthy, per chain/endpoint
//! - `gateway_endpoint_height` (gauge): last observed block height
//! - `gateway_probe_duration_seconds` (histogram): probe latency
//! - `gateway_probe_failures_total` (counter): failed probes
//! - `gateway_requests_total` (counter): API requests by route and status
//! - `gateway_request_duration_seconds` (histogram): API latency
//!
//! Without an installed recorder every call is a no-op, which keeps tests quiet.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::load_balancer::endpoint::Endpoint;

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one health probe.
pub fn record_probe(endpoint: &Endpoint, latency: Duration, healthy: bool) {
    let chain = endpoint.chain_id().to_string();
    let address = endpoint.redacted_address().to_string();

    metrics::histogram!(
        "gateway_probe_duration_seconds",
        "chain" => chain.clone(),
        "endpoint" => address.clone()
    )
    .record(latency.as_secs_f64());

    if !healthy {
        metrics::counter!(
            "gateway_probe_failures_total",
            "chain" => chain.clone(),
            "endpoint" => address.clone()
        )
        .increment(1);
    }

    metrics::gauge!("gateway_endpoint_health", "chain" => chain, "endpoint" => address)
        .set(if healthy { 1.0 } else { 0.0 });
}

/// Record the latest block height seen on an endpoint.
pub fn record_endpoint_height(endpoint: &Endpoint, height: u64) {
    metrics::gauge!(
        "gateway_endpoint_height",
        "chain" => endpoint.chain_id().to_string(),
        "endpoint" => endpoint.redacted_address().to_string()
    )
    .set(height as f64);
}

/// Record a served API request.
pub fn record_request(method: &str, route: &'static str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("gateway_requests_total", &labels).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}
