//! Cache module for Quotegate.
//!
//! Upstream payloads are stored under a normalized [`CacheKey`] with the time
//! they were written. Freshness is checked lazily on read against the
//! gateway clock; Moka supplies concurrent storage and a capacity ceiling.

pub mod keys;
pub mod response_cache;

// Re-exports
pub use keys::CacheKey;
pub use response_cache::{CacheConfig, CacheEntry, Lookup, ResponseCache};
