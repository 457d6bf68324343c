//! # Prometheus Metrics
//!
//! HTTP-level metrics (request counts, latency, errors) are recorded in
//! middleware. Screening metrics (decisions, upstream failures, audit
//! failures) are recorded by the screening handler.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use prometheus::core::Collector;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct ScreeningMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,

    // -- HTTP middleware metrics --
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,

    // -- Screening metrics --
    decisions_total: IntCounterVec,
    screen_failures_total: IntCounterVec,
    audit_failures_total: IntCounter,
}

impl std::fmt::Debug for ScreeningMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreeningMetrics")
            .field("requests", &self.requests())
            .field("audit_failures", &self.audit_failures())
            .finish()
    }
}

impl ScreeningMetrics {
    /// Create a new metrics instance with a fresh Prometheus registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("screening_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )?;
        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "screening_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
            ]),
            &["method", "path"],
        )?;
        let http_errors_total = IntCounterVec::new(
            Opts::new("screening_http_errors_total", "Total HTTP errors (4xx and 5xx)"),
            &["method", "path", "status"],
        )?;
        let decisions_total = IntCounterVec::new(
            Opts::new("screening_decisions_total", "Screening decisions by outcome"),
            &["decision", "risk_level"],
        )?;
        let screen_failures_total = IntCounterVec::new(
            Opts::new(
                "screening_failures_total",
                "Screens that produced no decision, by cause",
            ),
            &["cause"],
        )?;
        let audit_failures_total = IntCounter::new(
            "screening_audit_write_failures_total",
            "Audit records that could not be persisted",
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_errors_total.clone()))?;
        registry.register(Box::new(decisions_total.clone()))?;
        registry.register(Box::new(screen_failures_total.clone()))?;
        registry.register(Box::new(audit_failures_total.clone()))?;

        Ok(Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
                decisions_total,
                screen_failures_total,
                audit_failures_total,
            }),
        })
    }

    /// Current total request count (sum across all labels).
    pub fn requests(&self) -> u64 {
        sum_counters(&self.inner.http_requests_total)
    }

    /// Current total HTTP error count.
    pub fn errors(&self) -> u64 {
        sum_counters(&self.inner.http_errors_total)
    }

    pub fn audit_failures(&self) -> u64 {
        self.inner.audit_failures_total.get()
    }

    /// Decisions recorded with the given label.
    pub fn decisions(&self, decision: &str) -> u64 {
        let mut total = 0u64;
        for mf in self.inner.decisions_total.collect() {
            for m in mf.get_metric() {
                if m.get_label().iter().any(|l| l.get_name() == "decision" && l.get_value() == decision) {
                    total += m.get_counter().get_value() as u64;
                }
            }
        }
        total
    }

    pub fn record_decision(&self, decision: &str, risk_level: &str) {
        self.inner
            .decisions_total
            .with_label_values(&[decision, risk_level])
            .inc();
    }

    /// `cause` is one of `invalid_input`, `upstream_not_ready`, `upstream_failure`.
    pub fn record_failure(&self, cause: &str) {
        self.inner
            .screen_failures_total
            .with_label_values(&[cause])
            .inc();
    }

    pub fn record_audit_failure(&self) {
        self.inner.audit_failures_total.inc();
    }

    /// Record an HTTP request (called by the middleware).
    fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();

        self.inner
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);

        if status >= 400 {
            self.inner
                .http_errors_total
                .with_label_values(&[method, path, &status_str])
                .inc();
        }
    }

    /// Gather all metrics and encode to Prometheus text format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| format!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer).map_err(|e| format!("metrics encoding produced invalid UTF-8: {e}"))
    }
}

fn sum_counters(vec: &IntCounterVec) -> u64 {
    let mut total = 0u64;
    for mf in vec.collect() {
        for m in mf.get_metric() {
            total += m.get_counter().get_value() as u64;
        }
    }
    total
}

/// Collapse unknown paths into one label value to bound cardinality.
fn normalize_path(path: &str) -> &str {
    const KNOWN: &[&str] = &[
        "/",
        "/health",
        "/health/liveness",
        "/health/readiness",
        "/metrics",
        "/openapi.json",
        "/v1/sanctions/screen/person",
    ];
    KNOWN.iter().copied().find(|p| *p == path).unwrap_or("other")
}

/// Middleware that records HTTP request metrics via Prometheus.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ScreeningMetrics>().cloned();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path()).to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        let duration = start.elapsed().as_secs_f64();
        m.record_request(&method, &path, response.status().as_u16(), duration);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let m = ScreeningMetrics::new().unwrap();
        assert_eq!(m.requests(), 0);
        assert_eq!(m.errors(), 0);
        assert_eq!(m.audit_failures(), 0);
    }

    #[test]
    fn request_and_error_counts_independent() {
        let m = ScreeningMetrics::new().unwrap();
        for _ in 0..5 {
            m.record_request("POST", "/v1/sanctions/screen/person", 200, 0.01);
        }
        m.record_request("POST", "/v1/sanctions/screen/person", 502, 0.1);
        m.record_request("POST", "/v1/sanctions/screen/person", 400, 0.05);
        assert_eq!(m.requests(), 7);
        assert_eq!(m.errors(), 2);
    }

    #[test]
    fn decisions_are_counted_by_label() {
        let m = ScreeningMetrics::new().unwrap();
        m.record_decision("clear", "none");
        m.record_decision("block", "critical");
        m.record_decision("block", "critical");
        assert_eq!(m.decisions("block"), 2);
        assert_eq!(m.decisions("clear"), 1);
        assert_eq!(m.decisions("review"), 0);
    }

    #[test]
    fn encoded_output_names_screening_metrics() {
        let m = ScreeningMetrics::new().unwrap();
        m.record_decision("review", "medium");
        m.record_failure("upstream_failure");
        m.record_audit_failure();
        let text = m.gather_and_encode().unwrap();
        assert!(text.contains("screening_decisions_total"));
        assert!(text.contains("screening_failures_total"));
        assert!(text.contains("screening_audit_write_failures_total 1"));
    }

    #[test]
    fn unknown_paths_share_a_label() {
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(normalize_path("/wp-admin/login.php"), "other");
    }
}
