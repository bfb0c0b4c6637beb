//! Market-data source trait definition.

use async_trait::async_trait;
use quotegate_core::RequestDescriptor;
use serde_json::Value;

use crate::error::UpstreamError;

/// An upstream API the gateway can forward requests to.
///
/// The gateway only knows this trait; the production implementation is
/// [`CoinMarketCapClient`](crate::CoinMarketCapClient) and tests plug in
/// in-memory stubs.
///
/// # Example
///
/// ```ignore
/// use quotegate_upstream::{MarketDataSource, UpstreamError};
///
/// struct Fixed;
///
/// #[async_trait]
/// impl MarketDataSource for Fixed {
///     async fn fetch(&self, request: &RequestDescriptor) -> Result<Value, UpstreamError> {
///         Ok(json!({ "price": 1850 }))
///     }
///
///     fn name(&self) -> &str {
///         "fixed"
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Forwards one request and returns the decoded JSON body.
    ///
    /// Called at most once per gateway miss; implementations must not retry.
    ///
    /// # Errors
    ///
    /// - `UpstreamError::Status` when the upstream answered with an error
    /// - `UpstreamError::Transport` when no response was received
    /// - `UpstreamError::Decode` when a success body was not JSON
    async fn fetch(&self, request: &RequestDescriptor) -> Result<Value, UpstreamError>;

    /// Returns the name of this source, for logs and metrics labels.
    fn name(&self) -> &str;
}
