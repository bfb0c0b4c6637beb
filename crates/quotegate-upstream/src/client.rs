//! CoinMarketCap-style HTTP client.
//!
//! Every request is a single `GET <base_url><endpoint_path>?<query>` carrying
//! the configured API-key header. The endpoint path never leaves the base
//! path: segments are re-encoded and dot segments are refused. Nothing is retried; a failure is classified
//! and handed back to the gateway.

use async_trait::async_trait;
use quotegate_core::RequestDescriptor;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::source::MarketDataSource;

/// Upstream client for the CoinMarketCap Pro API (or anything shaped like it).
///
/// The client is `Clone` and can be shared across tasks; reqwest pools
/// connections internally.
#[derive(Clone)]
pub struct CoinMarketCapClient {
    client: Client,
    config: UpstreamConfig,
    api_key_header: HeaderName,
    api_key_value: HeaderValue,
}

impl CoinMarketCapClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::InvalidConfig` if the base URL does not parse,
    /// the API key cannot be sent as a header, or the HTTP client cannot be
    /// built.
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        reqwest::Url::parse(config.base_url()).map_err(|e| {
            UpstreamError::InvalidConfig(format!("invalid base_url '{}': {}", config.base_url(), e))
        })?;

        let api_key_header = HeaderName::from_bytes(config.api_key_header().as_bytes())
            .map_err(|e| UpstreamError::InvalidConfig(format!("invalid api key header: {}", e)))?;
        let mut api_key_value = HeaderValue::from_str(config.api_key())
            .map_err(|e| UpstreamError::InvalidConfig(format!("invalid api key: {}", e)))?;
        api_key_value.set_sensitive(true);

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| UpstreamError::InvalidConfig(format!("failed to build client: {}", e)))?;

        Ok(Self {
            client,
            config,
            api_key_header,
            api_key_value,
        })
    }

    fn classify_error(error: reqwest::Error) -> UpstreamError {
        if error.is_timeout() {
            UpstreamError::Transport(format!("request timed out: {}", error))
        } else if error.is_decode() {
            UpstreamError::Decode(error.to_string())
        } else {
            UpstreamError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl MarketDataSource for CoinMarketCapClient {
    #[instrument(skip_all, fields(endpoint = %request.endpoint_path()))]
    async fn fetch(&self, request: &RequestDescriptor) -> Result<Value, UpstreamError> {
        let url = self.config.endpoint_url(request).map_err(|e| {
            warn!(error = %e, "Refusing to build upstream URL");
            e
        })?;

        let response = self
            .client
            .get(url)
            .query(request.query())
            .header(self.api_key_header.clone(), self.api_key_value.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                let error = Self::classify_error(e);
                warn!(error = %error, "Upstream request failed");
                error
            })?;

        let status = response.status();
        if status.is_success() {
            let body = response.json::<Value>().await.map_err(|e| {
                warn!(status = status.as_u16(), error = %e, "Upstream returned an unreadable body");
                UpstreamError::Decode(e.to_string())
            })?;
            debug!(status = status.as_u16(), "Upstream request succeeded");
            return Ok(body);
        }

        // Error bodies are best-effort: an unreadable body still yields the status.
        let body = response.bytes().await.unwrap_or_default();
        let message = extract_error_message(&body);

        warn!(
            status = status.as_u16(),
            message = message.as_deref().unwrap_or("<none>"),
            "Upstream returned an error"
        );

        Err(UpstreamError::status(status.as_u16(), message))
    }

    fn name(&self) -> &str {
        "coinmarketcap"
    }
}

/// Pulls `status.error_message` out of a CoinMarketCap error body.
pub fn extract_error_message(body: &[u8]) -> Option<String> {
    let json: Value = serde_json::from_slice(body).ok()?;

    json.get("status")
        .and_then(|status| status.get("error_message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
