//! Metrics collection and exposition.
//!
//! # Metrics
//! - `responses_total` (counter): responses by method and final status
//! - `response_bytes` (histogram): body bytes accepted per response
//! - `response_duration_seconds` (histogram): handler latency
//!
//! # Design Decisions
//! - Labels carry the status actually sent, after any intercept
//! - Exporter is optional; without it the macros record nothing

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

/// Record one served response.
pub fn record_response(method: &str, status: u16, size: usize, start_time: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];

    counter!("responses_total", &labels).increment(1);
    histogram!("response_bytes", &labels).record(size as f64);
    histogram!("response_duration_seconds", &labels)
        .record(start_time.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_recorder() {
        record_response("GET", 200, 13, Instant::now());
    }
}
