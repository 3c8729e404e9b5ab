//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define dispatch metrics (requests, latency, filter stops, misses)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `tinyweb_requests_total` (counter): total requests by method, status
//! - `tinyweb_request_duration_seconds` (histogram): latency distribution
//! - `tinyweb_filter_stops_total` (counter): chains cut short by a filter
//! - `tinyweb_routes_not_found_total` (counter): requests with no endpoint
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels kept low-cardinality: method and status code only

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the global Prometheus recorder and its scrape listener.
///
/// Fails if a recorder is already installed or the address cannot be bound.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one completed request.
pub fn record_request(method: &Method, status: StatusCode, start_time: Instant) {
    let labels = [
        ("method", method.as_str().to_owned()),
        ("status", status.as_u16().to_string()),
    ];
    ::metrics::counter!("tinyweb_requests_total", &labels).increment(1);
    ::metrics::histogram!("tinyweb_request_duration_seconds", &labels)
        .record(start_time.elapsed().as_secs_f64());
}

/// Record a chain that a filter stopped before the endpoint ran.
pub fn record_filter_stop() {
    ::metrics::counter!("tinyweb_filter_stops_total").increment(1);
}

/// Record a request that resolved to no endpoint.
pub fn record_not_found() {
    ::metrics::counter!("tinyweb_routes_not_found_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_render_in_prometheus_format() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        ::metrics::with_local_recorder(&recorder, || {
            record_request(&Method::GET, StatusCode::FORBIDDEN, Instant::now());
            record_filter_stop();
            record_filter_stop();
            record_not_found();
        });

        let rendered = handle.render();
        assert!(rendered.contains("tinyweb_filter_stops_total 2"), "{}", rendered);
        assert!(rendered.contains("tinyweb_routes_not_found_total 1"), "{}", rendered);
        assert!(rendered.contains(r#"tinyweb_requests_total{method="GET",status="403"} 1"#), "{}", rendered);
    }

    #[test]
    fn recording_without_recorder_is_harmless() {
        record_request(&Method::GET, StatusCode::OK, Instant::now());
        record_filter_stop();
        record_not_found();
    }
}
