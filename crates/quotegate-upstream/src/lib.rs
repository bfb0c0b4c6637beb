//! # Quotegate Upstream
//!
//! Market-data sources the Quotegate gateway forwards cache misses to.
//!
//! ## Features
//!
//! - Async trait-based source abstraction ([`MarketDataSource`])
//! - CoinMarketCap-style HTTP client with a configurable API-key header
//! - Extraction of `status.error_message` from upstream error bodies
//! - No retries: each miss is exactly one upstream call
//!
//! ## Example
//!
//! ```ignore
//! use quotegate_core::RequestDescriptor;
//! use quotegate_upstream::{CoinMarketCapClient, MarketDataSource, UpstreamConfig};
//!
//! let config = UpstreamConfig::builder()
//!     .base_url("https://pro-api.coinmarketcap.com/v1")
//!     .api_key(std::env::var("COINMARKETCAP_API_KEY")?)
//!     .build()?;
//!
//! let client = CoinMarketCapClient::new(config)?;
//!
//! let request = RequestDescriptor::new("/cryptocurrency/quotes/latest").with_param("symbol", "BTC");
//! let body = client.fetch(&request).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod source;

// Re-exports
pub use client::{CoinMarketCapClient, extract_error_message};
pub use config::{DEFAULT_API_KEY_HEADER, UpstreamConfig, UpstreamConfigBuilder};
pub use error::UpstreamError;
pub use source::MarketDataSource;

// Re-export quotegate_core for consumers
pub use quotegate_core;
