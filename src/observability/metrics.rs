//! Metrics collection and exposition.
//!
//! # Metrics
//! - `testsuite_receipt_lookups_total` (counter): receipt lookups by result
//!   (`found`, `pending`, `error`)
//! - `testsuite_confirmations_total` (counter): wait outcomes by outcome
//!   (`confirmed`, `timed_out`, `cancelled`)
//! - `testsuite_rpc_health` (gauge): 1=reachable, 0=unreachable
//!
//! Recording is a no-op until an exporter is installed.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_receipt_lookup(result: &'static str) {
    metrics::counter!("testsuite_receipt_lookups_total", "result" => result).increment(1);
}

pub fn record_confirmation(outcome: &'static str) {
    metrics::counter!("testsuite_confirmations_total", "outcome" => outcome).increment(1);
}

pub fn record_rpc_health(endpoint: &str, healthy: bool) {
    metrics::gauge!("testsuite_rpc_health", "endpoint" => endpoint.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
