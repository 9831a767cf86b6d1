//! Metrics collection and exposition.
//!
//! # Metrics
//! - `locale_requests_total` (counter): requests by method, status
//! - `locale_request_duration_seconds` (histogram): latency distribution
//! - `locale_rewrites_total` (counter): internal rewrites performed
//! - `locale_rewrite_limit_exceeded_total` (counter): requests stopped by the loop guard
//! - `locale_template_fallbacks_total` (counter): re-dispatches to a route template
//!
//! Recording is a no-op until a recorder is installed, so library code and
//! tests can call these freely.

use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

static DESCRIBED: OnceLock<()> = OnceLock::new();

fn describe_metrics() {
    DESCRIBED.get_or_init(|| {
        describe_counter!("locale_requests_total", "Total requests handled");
        describe_histogram!(
            "locale_request_duration_seconds",
            "Request duration in seconds"
        );
        describe_counter!("locale_rewrites_total", "Internal locale rewrites performed");
        describe_counter!(
            "locale_rewrite_limit_exceeded_total",
            "Requests refused because the rewrite limit was reached"
        );
        describe_counter!(
            "locale_template_fallbacks_total",
            "Re-dispatches to an uninstantiated route template"
        );
    });
}

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe_metrics();
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "locale_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("locale_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rewrite() {
    counter!("locale_rewrites_total").increment(1);
}

pub fn record_rewrite_limit_exceeded() {
    counter!("locale_rewrite_limit_exceeded_total").increment(1);
}

pub fn record_template_fallback() {
    counter!("locale_template_fallbacks_total").increment(1);
}
