//! Error types for Quotegate.
//!
//! Every failure the gateway can report to a caller is a [`ProxyError`].
//! None of them is fatal once the server is running: a rejected or failed
//! request is answered and the process keeps serving.
//!
//! # Example
//!
//! ```
//! use quotegate_core::ProxyError;
//!
//! let error = ProxyError::upstream(Some(401), Some("API key missing.".into()));
//! assert_eq!(error.status_code(), 401);
//! assert_eq!(error.client_message(), "API key missing.");
//! ```

use thiserror::Error;

/// Message returned to clients when the rate limiter denies a request.
pub const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

/// Message returned for an endpoint path that would leave the upstream base.
pub const INVALID_PATH_MESSAGE: &str = "Invalid endpoint path";

/// Message returned when the upstream failed without a usable error body.
pub const DEFAULT_UPSTREAM_MESSAGE: &str = "Internal server error";

/// Errors surfaced by the gateway and its bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    /// The shared request budget for the current window is exhausted.
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    /// The upstream API answered with an error or could not be reached.
    #[error(
        "upstream request failed with status {}: {}",
        display_status(*status),
        message.as_deref().unwrap_or(DEFAULT_UPSTREAM_MESSAGE)
    )]
    Upstream {
        /// HTTP status reported by the upstream, if any.
        status: Option<u16>,
        /// Human-readable message extracted from the upstream error body.
        message: Option<String>,
    },

    /// The endpoint path contains a `.` or `..` segment.
    #[error("invalid endpoint path '{path}'")]
    InvalidPath {
        /// Path as the client sent it.
        path: String,
    },

    /// A required configuration value is absent.
    #[error("missing required configuration value '{key}'")]
    ConfigurationMissing {
        /// Environment key that was expected.
        key: String,
    },

    /// A configuration value is present but unusable.
    #[error("invalid configuration value '{key}': {reason}")]
    InvalidConfiguration {
        /// Environment key holding the bad value.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ProxyError {
    /// Creates an upstream failure.
    pub fn upstream(status: Option<u16>, message: Option<String>) -> Self {
        Self::Upstream { status, message }
    }

    /// Creates an invalid-path error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into() }
    }

    /// Creates a missing-configuration error.
    pub fn configuration_missing(key: impl Into<String>) -> Self {
        Self::ConfigurationMissing { key: key.into() }
    }

    /// Creates an invalid-configuration error.
    pub fn invalid_configuration(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status this error maps to when answered over HTTP.
    ///
    /// Upstream failures keep the upstream status when it is a valid error
    /// status and fall back to 500 otherwise.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RateLimited => 429,
            Self::Upstream {
                status: Some(status),
                ..
            } if (400..=599).contains(status) => *status,
            Self::Upstream { .. } => 500,
            Self::InvalidPath { .. } => 400,
            Self::ConfigurationMissing { .. } | Self::InvalidConfiguration { .. } => 500,
        }
    }

    /// Message placed in the `error` field of the response body.
    pub fn client_message(&self) -> String {
        match self {
            Self::RateLimited => RATE_LIMITED_MESSAGE.to_string(),
            Self::Upstream { message, .. } => message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_UPSTREAM_MESSAGE.to_string()),
            Self::InvalidPath { .. } => INVALID_PATH_MESSAGE.to_string(),
            Self::ConfigurationMissing { .. } | Self::InvalidConfiguration { .. } => {
                DEFAULT_UPSTREAM_MESSAGE.to_string()
            },
        }
    }

    /// Returns true if the caller can succeed by retrying later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    /// Returns true if this error came from the upstream API.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}

fn display_status(status: Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

/// Type alias for results carrying a [`ProxyError`].
pub type Result<T> = std::result::Result<T, ProxyError>;
