//! Gateway outcome metrics: admissions, rejections and upstream calls.

use metrics::{counter, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas del gateway.
pub fn register_gateway_metrics() {
    metrics::describe_counter!(
        "quotegate_rate_limit_rejections_total",
        "Requests denied by the rate limiter"
    );
    metrics::describe_counter!(
        "quotegate_upstream_requests_total",
        "Calls made to the upstream API, by source and result"
    );
    metrics::describe_histogram!(
        "quotegate_upstream_request_duration_seconds",
        "Upstream call latency in seconds"
    );
}

/// Counters for what the gateway did with each request.
#[derive(Debug, Clone, Default)]
pub struct GatewayMetrics {
    rejected: Arc<AtomicU64>,
    upstream_calls: Arc<AtomicU64>,
    upstream_failures: Arc<AtomicU64>,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        counter!("quotegate_rate_limit_rejections_total").increment(1);
    }

    /// Registra una llamada upstream terminada.
    pub fn record_upstream(&self, source: &str, success: bool, duration: Duration) {
        self.upstream_calls.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.upstream_failures.fetch_add(1, Ordering::Relaxed);
        }

        let result = if success { "success" } else { "failure" };
        counter!(
            "quotegate_upstream_requests_total",
            "source" => source.to_string(),
            "result" => result
        )
        .increment(1);
        histogram!(
            "quotegate_upstream_request_duration_seconds",
            "source" => source.to_string()
        )
        .record(duration.as_secs_f64());
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn upstream_calls(&self) -> u64 {
        self.upstream_calls.load(Ordering::Relaxed)
    }

    pub fn upstream_failures(&self) -> u64 {
        self.upstream_failures.load(Ordering::Relaxed)
    }
}
