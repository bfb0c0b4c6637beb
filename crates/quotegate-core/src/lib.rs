//! Quotegate Core - domain types for the market-data gateway
//!
//! This crate holds the pieces of the gateway that do not depend on HTTP:
//!
//! - [`Clock`] and its implementations, so time can be driven by tests
//! - [`RequestDescriptor`], the normalized shape of an inbound request
//! - [`RateLimiter`], a fixed-window admission counter
//! - [`ProxyError`], the error taxonomy reported to callers

pub mod clock;
pub mod error;
pub mod rate_limit;
pub mod request;

pub use clock::{Clock, ManualClock, Millis, SystemClock, elapsed_since};
pub use error::{
    DEFAULT_UPSTREAM_MESSAGE, INVALID_PATH_MESSAGE, ProxyError, RATE_LIMITED_MESSAGE, Result,
};
pub use rate_limit::{Decision, RateLimitConfig, RateLimiter, RateWindow, RateWindowSnapshot};
pub use request::RequestDescriptor;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }

    #[test]
    fn version_is_semver() {
        let v = version();
        assert_eq!(v.split('.').count(), 3, "Version should be semver");
    }
}
