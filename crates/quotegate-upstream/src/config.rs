//! Upstream client configuration.

use std::fmt;
use std::time::Duration;

use quotegate_core::RequestDescriptor;
use reqwest::Url;

use crate::error::UpstreamError;

/// Header CoinMarketCap reads the API key from.
pub const DEFAULT_API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// Configuration for [`CoinMarketCapClient`](crate::CoinMarketCapClient).
#[derive(Clone)]
pub struct UpstreamConfig {
    /// Base URL every endpoint path is appended to.
    base_url: String,

    /// API key sent on every request.
    api_key: String,

    /// Header carrying the API key.
    api_key_header: String,

    /// Whole-request timeout. `None` waits for as long as the upstream takes.
    timeout: Option<Duration>,
}

impl UpstreamConfig {
    /// Creates a new builder for UpstreamConfig.
    pub fn builder() -> UpstreamConfigBuilder {
        UpstreamConfigBuilder::default()
    }

    /// Returns the base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the name of the API key header.
    pub fn api_key_header(&self) -> &str {
        &self.api_key_header
    }

    /// Returns the request timeout, if one is set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Full URL for a request's endpoint path, without the query.
    ///
    /// Each path segment is appended below the base path and re-encoded, so an
    /// escaped `/`, `?` or `#` stays inside its segment.
    ///
    /// # Errors
    ///
    /// - `UpstreamError::InvalidPath` if a segment decodes to `.` or `..`
    /// - `UpstreamError::InvalidConfig` if the base URL cannot carry a path
    pub fn endpoint_url(&self, request: &RequestDescriptor) -> Result<Url, UpstreamError> {
        if request.has_dot_segments() {
            return Err(UpstreamError::InvalidPath(
                request.endpoint_path().to_string(),
            ));
        }

        let mut url = Url::parse(&self.base_url).map_err(|e| {
            UpstreamError::InvalidConfig(format!("invalid base_url '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                UpstreamError::InvalidConfig(format!(
                    "base_url '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(request.decoded_segments());

        Ok(url)
    }
}

// The API key stays out of logs.
impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("api_key_header", &self.api_key_header)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for UpstreamConfig.
#[derive(Debug, Default)]
pub struct UpstreamConfigBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    api_key_header: Option<String>,
    timeout: Option<Duration>,
}

impl UpstreamConfigBuilder {
    /// Sets the upstream base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Overrides the API key header name.
    pub fn api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = Some(header.into());
        self
    }

    /// Sets a whole-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or API key is missing or blank.
    pub fn build(self) -> Result<UpstreamConfig, &'static str> {
        let base_url = self
            .base_url
            .filter(|u| !u.trim().is_empty())
            .ok_or("base_url is required")?;
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or("api_key is required")?;

        Ok(UpstreamConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            api_key_header: self
                .api_key_header
                .unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string()),
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_minimal() {
        let config = UpstreamConfig::builder()
            .base_url("https://pro-api.coinmarketcap.com/v1")
            .api_key("secret")
            .build()
            .unwrap();

        assert_eq!(config.base_url(), "https://pro-api.coinmarketcap.com/v1");
        assert_eq!(config.api_key(), "secret");
        assert_eq!(config.api_key_header(), DEFAULT_API_KEY_HEADER);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_builder_full() {
        let config = UpstreamConfig::builder()
            .base_url("https://sandbox-api.coinmarketcap.com/v1/")
            .api_key("secret")
            .api_key_header("X-Api-Key")
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        assert_eq!(config.base_url(), "https://sandbox-api.coinmarketcap.com/v1");
        assert_eq!(config.api_key_header(), "X-Api-Key");
        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
    }

    fn cmc_config(base_url: &str) -> UpstreamConfig {
        UpstreamConfig::builder()
            .base_url(base_url)
            .api_key("secret")
            .build()
            .unwrap()
    }

    fn url_for(config: &UpstreamConfig, path: &str) -> String {
        config
            .endpoint_url(&RequestDescriptor::new(path))
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_endpoint_url_joins_path() {
        let config = cmc_config("https://pro-api.coinmarketcap.com/v1/");

        assert_eq!(
            url_for(&config, "/cryptocurrency/quotes/latest"),
            "https://pro-api.coinmarketcap.com/v1/cryptocurrency/quotes/latest"
        );
        assert_eq!(url_for(&config, "/"), "https://pro-api.coinmarketcap.com/v1/");
    }

    #[test]
    fn test_endpoint_url_without_base_path() {
        let config = cmc_config("https://pro-api.coinmarketcap.com");

        assert_eq!(
            url_for(&config, "/v1/key/info"),
            "https://pro-api.coinmarketcap.com/v1/key/info"
        );
    }

    #[test]
    fn test_endpoint_url_keeps_escaped_separators_inside_segment() {
        let config = cmc_config("https://pro-api.coinmarketcap.com/v1");

        assert_eq!(
            url_for(&config, "/..%2Fv2%2Fsecret"),
            "https://pro-api.coinmarketcap.com/v1/..%2Fv2%2Fsecret"
        );
        assert_eq!(
            url_for(&config, "/quotes%3Fsymbol%3DBTC%23frag"),
            "https://pro-api.coinmarketcap.com/v1/quotes%3Fsymbol=BTC%23frag"
        );
    }

    #[test]
    fn test_endpoint_url_rejects_dot_segments() {
        let config = cmc_config("https://pro-api.coinmarketcap.com/v1");

        for path in ["/../v2/secret", "/%2e%2e/v2", "/quotes/."] {
            let result = config.endpoint_url(&RequestDescriptor::new(path));
            assert!(
                matches!(result, Err(UpstreamError::InvalidPath(_))),
                "{} accepted",
                path
            );
        }
    }

    #[test]
    fn test_builder_missing_fields() {
        assert!(UpstreamConfig::builder().api_key("secret").build().is_err());
        assert!(
            UpstreamConfig::builder()
                .base_url("https://example.com")
                .api_key("  ")
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = UpstreamConfig::builder()
            .base_url("https://example.com")
            .api_key("super-secret-key")
            .build()
            .unwrap();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("<redacted>"));
    }
}
