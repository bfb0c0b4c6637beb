//! Cache key generation and normalization.

use std::fmt;

use quotegate_core::RequestDescriptor;

/// Cache key for an upstream response.
///
/// Built from the endpoint path and the query parameters sorted by name, so
/// two requests with the same parameter set share an entry regardless of
/// the order the client sent them in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Crea la key de un request.
    ///
    /// # Examples
    ///
    /// ```
    /// use quotegate_core::RequestDescriptor;
    /// use quotegate_server::cache::CacheKey;
    ///
    /// let request = RequestDescriptor::new("/quotes/latest")
    ///     .with_param("symbol", "BTC")
    ///     .with_param("convert", "INR");
    ///
    /// let key = CacheKey::from_request(&request);
    /// assert_eq!(key.as_str(), "/quotes/latest?convert=INR&symbol=BTC");
    /// ```
    pub fn from_request(request: &RequestDescriptor) -> Self {
        Self(format!(
            "{}?{}",
            request.endpoint_path(),
            request.canonical_query()
        ))
    }

    /// Retorna la key como string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&RequestDescriptor> for CacheKey {
    fn from(request: &RequestDescriptor) -> Self {
        Self::from_request(request)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
