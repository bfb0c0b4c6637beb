//! Runtime settings read from the process environment.
//!
//! An optional `.env` file is loaded first, then every recognized variable is
//! read through the `config` crate. Unset variables take the defaults below;
//! the upstream base URL and API key have none.

use std::collections::HashMap;
use std::time::Duration;

use axum::http::HeaderValue;
use config::{Config, Environment};
use quotegate_core::{ProxyError, RateLimitConfig};
use quotegate_upstream::{DEFAULT_API_KEY_HEADER, UpstreamConfig};
use serde::Deserialize;
use tracing::debug;

use crate::cache::CacheConfig;
use crate::gateway::GatewayConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_ROUTE_PREFIX: &str = "/api/crypto";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Variables as they appear in the environment, before validation.
#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    coinmarketcap_base_url: Option<String>,
    coinmarketcap_api_key: Option<String>,
    #[serde(default = "default_api_key_header")]
    upstream_api_key_header: String,
    upstream_timeout_ms: Option<u64>,
    #[serde(default = "default_route_prefix")]
    route_prefix: String,
    #[serde(default = "default_cors_origin")]
    cors_allowed_origin: String,
    #[serde(default = "default_max_requests")]
    rate_limit_max_requests: u32,
    #[serde(default = "default_window_ms")]
    rate_limit_window_ms: u64,
    #[serde(default = "default_freshness_ms")]
    cache_freshness_ms: u64,
    #[serde(default = "default_max_entries")]
    cache_max_entries: u64,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_api_key_header() -> String {
    DEFAULT_API_KEY_HEADER.to_string()
}

fn default_route_prefix() -> String {
    DEFAULT_ROUTE_PREFIX.to_string()
}

fn default_cors_origin() -> String {
    DEFAULT_CORS_ORIGIN.to_string()
}

fn default_max_requests() -> u32 {
    RateLimitConfig::default().max_requests
}

fn default_window_ms() -> u64 {
    RateLimitConfig::default().window.as_millis() as u64
}

fn default_freshness_ms() -> u64 {
    CacheConfig::default().freshness.as_millis() as u64
}

fn default_max_entries() -> u64 {
    CacheConfig::default().max_capacity
}

/// Validated server settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Path prefix of the proxy route, leading slash, no trailing slash.
    pub route_prefix: String,
    /// The single origin allowed by CORS.
    pub cors_allowed_origin: HeaderValue,
    pub upstream: UpstreamConfig,
    pub gateway: GatewayConfig,
}

impl Settings {
    /// Loads `.env` if present, then reads the process environment.
    ///
    /// # Errors
    ///
    /// Fails when a required variable is missing or a value is unusable.
    pub fn from_env() -> Result<Self, ProxyError> {
        if let Ok(path) = dotenv::dotenv() {
            debug!(path = %path.display(), "Loaded .env file");
        }

        let config = Config::builder()
            .add_source(Environment::default().ignore_empty(true))
            .build()
            .map_err(invalid_environment)?;

        Self::from_config(config)
    }

    /// Builds settings from an explicit variable map instead of the process
    /// environment.
    pub fn from_map(vars: HashMap<String, String>) -> Result<Self, ProxyError> {
        let config = Config::builder()
            .add_source(Environment::default().ignore_empty(true).source(Some(vars)))
            .build()
            .map_err(invalid_environment)?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self, ProxyError> {
        let raw: RawSettings = config.try_deserialize().map_err(invalid_environment)?;
        Self::validate(raw)
    }

    fn validate(raw: RawSettings) -> Result<Self, ProxyError> {
        let base_url = required(raw.coinmarketcap_base_url, "COINMARKETCAP_BASE_URL")?;
        let api_key = required(raw.coinmarketcap_api_key, "COINMARKETCAP_API_KEY")?;

        let mut upstream = UpstreamConfig::builder()
            .base_url(base_url)
            .api_key(api_key)
            .api_key_header(raw.upstream_api_key_header);
        if let Some(timeout_ms) = raw.upstream_timeout_ms {
            if timeout_ms == 0 {
                return Err(ProxyError::invalid_configuration(
                    "UPSTREAM_TIMEOUT_MS",
                    "must be greater than zero",
                ));
            }
            upstream = upstream.timeout(Duration::from_millis(timeout_ms));
        }
        let upstream = upstream
            .build()
            .map_err(|reason| ProxyError::invalid_configuration("COINMARKETCAP_BASE_URL", reason))?;

        let rate_limit = RateLimitConfig::new(
            raw.rate_limit_max_requests,
            Duration::from_millis(raw.rate_limit_window_ms),
        );
        rate_limit.validate()?;

        if raw.cache_freshness_ms == 0 {
            return Err(ProxyError::invalid_configuration(
                "CACHE_FRESHNESS_MS",
                "must be greater than zero",
            ));
        }
        if raw.cache_max_entries == 0 {
            return Err(ProxyError::invalid_configuration(
                "CACHE_MAX_ENTRIES",
                "must be greater than zero",
            ));
        }
        let cache = CacheConfig {
            freshness: Duration::from_millis(raw.cache_freshness_ms),
            max_capacity: raw.cache_max_entries,
        };

        let cors_allowed_origin = parse_origin(&raw.cors_allowed_origin)?;
        let route_prefix = normalize_prefix(&raw.route_prefix)?;

        Ok(Self {
            host: raw.host,
            port: raw.port,
            route_prefix,
            cors_allowed_origin,
            upstream,
            gateway: GatewayConfig { rate_limit, cache },
        })
    }
}

fn invalid_environment(err: config::ConfigError) -> ProxyError {
    ProxyError::invalid_configuration("environment", err.to_string())
}

fn required(value: Option<String>, key: &str) -> Result<String, ProxyError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ProxyError::configuration_missing(key))
}

fn parse_origin(origin: &str) -> Result<HeaderValue, ProxyError> {
    let origin = origin.trim().trim_end_matches('/');
    if !(origin.starts_with("http://") || origin.starts_with("https://")) {
        return Err(ProxyError::invalid_configuration(
            "CORS_ALLOWED_ORIGIN",
            "must be an http or https origin",
        ));
    }

    HeaderValue::from_str(origin).map_err(|e| {
        ProxyError::invalid_configuration("CORS_ALLOWED_ORIGIN", e.to_string())
    })
}

fn normalize_prefix(prefix: &str) -> Result<String, ProxyError> {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(ProxyError::invalid_configuration(
            "ROUTE_PREFIX",
            "must not be empty",
        ));
    }
    if trimmed.contains(['{', '}', '*']) {
        return Err(ProxyError::invalid_configuration(
            "ROUTE_PREFIX",
            "must be a literal path",
        ));
    }

    Ok(format!("/{}", trimmed))
}
