//! The caching gateway.
//!
//! Each request runs through the same fixed sequence:
//!
//! 1. rate limiter (a rejection touches nothing else)
//! 2. cache lookup under the normalized key (a fresh entry is returned as is)
//! 3. one upstream call on a miss or a stale entry
//! 4. on success the payload is stored and returned; on failure nothing is
//!    stored and the upstream status and message are reported
//!
//! No lock is held across the upstream call. Two concurrent misses for the
//! same key may both reach the upstream; the later write wins.

use std::sync::Arc;
use std::time::Instant;

use quotegate_core::{Clock, ProxyError, RateLimitConfig, RateLimiter, RequestDescriptor, SystemClock};
use quotegate_upstream::MarketDataSource;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::cache::{CacheConfig, CacheKey, Lookup, ResponseCache};
use crate::metrics::GatewayMetrics;

/// Limits and cache policy for a [`Gateway`].
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
}

/// How a successful response was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Served from a fresh cache entry without calling upstream.
    CacheHit,
    /// Fetched from upstream and stored.
    Fetched,
}

impl Outcome {
    /// Value for the `x-cache` response header.
    pub fn as_header_value(self) -> &'static str {
        match self {
            Outcome::CacheHit => "HIT",
            Outcome::Fetched => "MISS",
        }
    }
}

/// A successful gateway response.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub outcome: Outcome,
    pub payload: Arc<Value>,
}

/// Rate-limited, caching front for a [`MarketDataSource`].
///
/// Constructed once at startup and shared by handle; tests build isolated
/// instances with a [`ManualClock`](quotegate_core::ManualClock).
pub struct Gateway {
    limiter: RateLimiter,
    cache: ResponseCache,
    upstream: Arc<dyn MarketDataSource>,
    clock: Arc<dyn Clock>,
    metrics: GatewayMetrics,
}

impl Gateway {
    /// Creates a gateway driven by the system clock.
    pub fn new(config: GatewayConfig, upstream: Arc<dyn MarketDataSource>) -> Self {
        Self::with_clock(config, upstream, Arc::new(SystemClock))
    }

    /// Creates a gateway whose limiter and cache share `clock`.
    pub fn with_clock(
        config: GatewayConfig,
        upstream: Arc<dyn MarketDataSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            limiter: RateLimiter::with_shared_clock(config.rate_limit, Arc::clone(&clock)),
            cache: ResponseCache::new(config.cache),
            upstream,
            clock,
            metrics: GatewayMetrics::new(),
        }
    }

    /// Answers one request.
    ///
    /// # Errors
    ///
    /// - `ProxyError::RateLimited` when the window budget is spent
    /// - `ProxyError::Upstream` when the upstream call fails
    #[instrument(skip_all, fields(endpoint = %request.endpoint_path()))]
    pub async fn handle(&self, request: &RequestDescriptor) -> Result<GatewayResponse, ProxyError> {
        if !self.limiter.admit().is_allowed() {
            self.metrics.record_rejection();
            debug!("Request rejected by rate limiter");
            return Err(ProxyError::RateLimited);
        }

        let key = CacheKey::from_request(request);

        match self.cache.lookup(&key, self.clock.now_millis()).await {
            Lookup::Fresh(payload) => {
                debug!(key = %key, "Cache hit");
                return Ok(GatewayResponse {
                    outcome: Outcome::CacheHit,
                    payload,
                });
            },
            Lookup::Stale { age_ms } => debug!(key = %key, age_ms, "Cache entry stale"),
            Lookup::Missing => debug!(key = %key, "Cache miss"),
        }

        let start = Instant::now();
        let result = self.upstream.fetch(request).await;
        self.metrics
            .record_upstream(self.upstream.name(), result.is_ok(), start.elapsed());

        match result {
            Ok(payload) => {
                let payload = Arc::new(payload);
                self.cache
                    .insert(key, Arc::clone(&payload), self.clock.now_millis())
                    .await;

                Ok(GatewayResponse {
                    outcome: Outcome::Fetched,
                    payload,
                })
            },
            Err(error) => {
                warn!(key = %key, error = %error, "Proxy error");
                Err(error.into())
            },
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quotegate_core::ManualClock;
    use quotegate_upstream::UpstreamError;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Upstream stub that counts calls and replays a scripted answer.
    struct StubSource {
        calls: AtomicUsize,
        answer: Mutex<Result<Value, UpstreamError>>,
    }

    impl StubSource {
        fn ok(payload: Value) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                answer: Mutex::new(Ok(payload)),
            })
        }

        fn failing(error: UpstreamError) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                answer: Mutex::new(Err(error)),
            })
        }

        fn set_answer(&self, answer: Result<Value, UpstreamError>) {
            *self.answer.lock().unwrap() = answer;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataSource for StubSource {
        async fn fetch(&self, _request: &RequestDescriptor) -> Result<Value, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.lock().unwrap().clone()
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn gateway(stub: &Arc<StubSource>, clock: &ManualClock, max_requests: u32) -> Gateway {
        let config = GatewayConfig {
            rate_limit: RateLimitConfig::new(max_requests, Duration::from_millis(60_000)),
            cache: CacheConfig {
                freshness: Duration::from_millis(60_000),
                ..CacheConfig::default()
            },
        };
        Gateway::with_clock(config, stub.clone(), Arc::new(clock.clone()))
    }

    fn eth_quote() -> RequestDescriptor {
        RequestDescriptor::new("/quotes/latest").with_param("symbol", "ETH")
    }

    #[tokio::test]
    async fn test_end_to_end_fetch_hit_and_refresh() {
        let stub = StubSource::ok(json!({"price": 1850}));
        let clock = ManualClock::new(0);
        let gateway = gateway(&stub, &clock, 30);

        let first = gateway.handle(&eth_quote()).await.unwrap();
        assert_eq!(first.outcome, Outcome::Fetched);
        assert_eq!(*first.payload, json!({"price": 1850}));
        assert_eq!(stub.calls(), 1);

        let second = gateway.handle(&eth_quote()).await.unwrap();
        assert_eq!(second.outcome, Outcome::CacheHit);
        assert_eq!(*second.payload, json!({"price": 1850}));
        assert_eq!(stub.calls(), 1);

        clock.advance(Duration::from_millis(60_000));
        let third = gateway.handle(&eth_quote()).await.unwrap();
        assert_eq!(third.outcome, Outcome::Fetched);
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn test_freshness_boundary() {
        let stub = StubSource::ok(json!(1));
        let clock = ManualClock::new(1_000);
        let gateway = gateway(&stub, &clock, 30);

        gateway.handle(&eth_quote()).await.unwrap();

        clock.set(1_000 + 59_999);
        assert_eq!(
            gateway.handle(&eth_quote()).await.unwrap().outcome,
            Outcome::CacheHit
        );
        assert_eq!(stub.calls(), 1);

        clock.set(1_000 + 60_000);
        assert_eq!(
            gateway.handle(&eth_quote()).await.unwrap().outcome,
            Outcome::Fetched
        );
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn test_parameter_order_shares_cache_entry() {
        let stub = StubSource::ok(json!({"BTC": 1}));
        let clock = ManualClock::new(0);
        let gateway = gateway(&stub, &clock, 30);

        let forward = RequestDescriptor::from_parts(
            "/quotes/latest",
            vec![("symbol", "BTC"), ("convert", "INR")],
        );
        let reverse = RequestDescriptor::from_parts(
            "/quotes/latest",
            vec![("convert", "INR"), ("symbol", "BTC")],
        );

        gateway.handle(&forward).await.unwrap();
        let second = gateway.handle(&reverse).await.unwrap();

        assert_eq!(second.outcome, Outcome::CacheHit);
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn test_rejection_bypasses_cache_and_upstream() {
        let stub = StubSource::ok(json!(1));
        let clock = ManualClock::new(0);
        let gateway = gateway(&stub, &clock, 0);

        let result = gateway.handle(&eth_quote()).await;

        assert_eq!(result.unwrap_err(), ProxyError::RateLimited);
        assert_eq!(stub.calls(), 0);
        assert_eq!(gateway.cache().metrics().hits(), 0);
        assert_eq!(gateway.cache().metrics().misses(), 0);
        assert_eq!(gateway.metrics().rejected(), 1);
    }

    #[tokio::test]
    async fn test_cache_hits_count_against_rate_limit() {
        let stub = StubSource::ok(json!(1));
        let clock = ManualClock::new(0);
        let gateway = gateway(&stub, &clock, 2);

        gateway.handle(&eth_quote()).await.unwrap();
        gateway.handle(&eth_quote()).await.unwrap();

        let other = RequestDescriptor::new("/quotes/latest").with_param("symbol", "BTC");
        assert_eq!(
            gateway.handle(&other).await.unwrap_err(),
            ProxyError::RateLimited
        );
        assert_eq!(stub.calls(), 1);

        clock.advance(Duration::from_millis(60_000));
        assert!(gateway.handle(&other).await.is_ok());
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let stub = StubSource::failing(UpstreamError::status(
            400,
            Some("Invalid value for \"symbol\"".to_string()),
        ));
        let clock = ManualClock::new(0);
        let gateway = gateway(&stub, &clock, 30);

        let err = gateway.handle(&eth_quote()).await.unwrap_err();
        assert_eq!(
            err,
            ProxyError::upstream(Some(400), Some("Invalid value for \"symbol\"".to_string()))
        );

        clock.advance(Duration::from_millis(1_000));
        assert!(gateway.handle(&eth_quote()).await.is_err());
        assert_eq!(stub.calls(), 2);
        assert!(gateway.cache().entry(&CacheKey::from(&eth_quote())).await.is_none());
        assert_eq!(gateway.metrics().upstream_failures(), 2);
    }

    #[tokio::test]
    async fn test_failure_after_stale_entry_keeps_old_entry_unserved() {
        let stub = StubSource::ok(json!("old"));
        let clock = ManualClock::new(0);
        let gateway = gateway(&stub, &clock, 30);

        gateway.handle(&eth_quote()).await.unwrap();
        clock.advance(Duration::from_millis(90_000));
        stub.set_answer(Err(UpstreamError::Transport("reset".to_string())));

        let err = gateway.handle(&eth_quote()).await.unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.client_message(), "Internal server error");

        let entry = gateway
            .cache()
            .entry(&CacheKey::from(&eth_quote()))
            .await
            .unwrap();
        assert_eq!(*entry.payload, json!("old"));
        assert_eq!(entry.stored_at, 0);
    }

    #[tokio::test]
    async fn test_success_after_failure_is_cached() {
        let stub = StubSource::failing(UpstreamError::status(503, None));
        let clock = ManualClock::new(0);
        let gateway = gateway(&stub, &clock, 30);

        assert!(gateway.handle(&eth_quote()).await.is_err());

        stub.set_answer(Ok(json!({"price": 1900})));
        assert_eq!(
            gateway.handle(&eth_quote()).await.unwrap().outcome,
            Outcome::Fetched
        );
        assert_eq!(
            gateway.handle(&eth_quote()).await.unwrap().outcome,
            Outcome::CacheHit
        );
        assert_eq!(stub.calls(), 2);
    }

    #[test]
    fn test_outcome_header_values() {
        assert_eq!(Outcome::CacheHit.as_header_value(), "HIT");
        assert_eq!(Outcome::Fetched.as_header_value(), "MISS");
    }
}
