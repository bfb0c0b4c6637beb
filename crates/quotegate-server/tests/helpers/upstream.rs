//! Upstreams de prueba: un stub en memoria y el cliente real contra wiremock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quotegate_core::{ManualClock, RateLimitConfig, RequestDescriptor};
use quotegate_server::{Gateway, GatewayConfig, cache::CacheConfig};
use quotegate_upstream::{CoinMarketCapClient, MarketDataSource, UpstreamConfig, UpstreamError};
use serde_json::Value;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-api-key";

/// Upstream en memoria que cuenta llamadas y repite una respuesta fija.
pub struct StubSource {
    calls: AtomicUsize,
    answer: Mutex<Result<Value, UpstreamError>>,
}

impl StubSource {
    pub fn ok(payload: Value) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            answer: Mutex::new(Ok(payload)),
        })
    }

    pub fn failing(error: UpstreamError) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            answer: Mutex::new(Err(error)),
        })
    }

    pub fn calls(&self) -> usize {
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

/// Limites usados por los tests: 60 segundos de ventana y de frescura.
pub fn gateway_config(max_requests: u32) -> GatewayConfig {
    GatewayConfig {
        rate_limit: RateLimitConfig::new(max_requests, Duration::from_secs(60)),
        cache: CacheConfig::default(),
    }
}

/// Gateway con reloj manual.
pub fn gateway_with(
    upstream: Arc<dyn MarketDataSource>,
    clock: &ManualClock,
    max_requests: u32,
) -> Arc<Gateway> {
    Arc::new(Gateway::with_clock(
        gateway_config(max_requests),
        upstream,
        Arc::new(clock.clone()),
    ))
}

/// Cliente CoinMarketCap real apuntando a `<mock>/v1`.
pub fn coinmarketcap_client(server: &MockServer) -> Arc<dyn MarketDataSource> {
    let config = UpstreamConfig::builder()
        .base_url(format!("{}/v1", server.uri()))
        .api_key(TEST_API_KEY)
        .build()
        .unwrap();

    Arc::new(CoinMarketCapClient::new(config).unwrap())
}
