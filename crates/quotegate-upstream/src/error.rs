//! Error types for upstream sources.

use quotegate_core::ProxyError;

/// Errors that can occur when calling an upstream market-data API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-success status.
    #[error("upstream returned {status}{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        status: u16,
        /// Message extracted from the error body, if the body had one.
        message: Option<String>,
    },

    /// The request never produced a response (DNS, connect, reset, timeout).
    #[error("upstream unreachable: {0}")]
    Transport(String),

    /// The upstream answered successfully but the body was not JSON.
    #[error("failed to decode upstream response: {0}")]
    Decode(String),

    /// The endpoint path would climb out of the base URL.
    #[error("invalid endpoint path: {0}")]
    InvalidPath(String),

    /// The client was configured with unusable values.
    #[error("invalid upstream configuration: {0}")]
    InvalidConfig(String),
}

impl UpstreamError {
    /// Creates a new status error.
    pub fn status(status: u16, message: Option<String>) -> Self {
        Self::Status { status, message }
    }

    /// HTTP status reported by the upstream, if it answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message extracted from the upstream error body.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Returns true if the request never reached the upstream.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<UpstreamError> for ProxyError {
    fn from(error: UpstreamError) -> Self {
        match error {
            UpstreamError::Status { status, message } => ProxyError::upstream(Some(status), message),
            UpstreamError::InvalidPath(path) => ProxyError::invalid_path(path),
            UpstreamError::InvalidConfig(reason) => {
                ProxyError::invalid_configuration("COINMARKETCAP_BASE_URL", reason)
            },
            UpstreamError::Transport(_) | UpstreamError::Decode(_) => {
                ProxyError::upstream(None, None)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UpstreamError::status(401, Some("API key missing.".to_string()));
        assert_eq!(err.to_string(), "upstream returned 401: API key missing.");

        let err = UpstreamError::status(503, None);
        assert_eq!(err.to_string(), "upstream returned 503");

        let err = UpstreamError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "upstream unreachable: connection refused");
    }

    #[test]
    fn test_into_proxy_error_keeps_status_and_message() {
        let err: ProxyError = UpstreamError::status(429, Some("quota".to_string())).into();

        assert_eq!(err, ProxyError::upstream(Some(429), Some("quota".to_string())));
        assert_eq!(err.status_code(), 429);
    }

    #[test]
    fn test_transport_failure_becomes_generic_500() {
        let err: ProxyError = UpstreamError::Transport("reset".to_string()).into();

        assert_eq!(err.status_code(), 500);
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_invalid_path_becomes_400() {
        let err: ProxyError = UpstreamError::InvalidPath("/../v2".to_string()).into();

        assert_eq!(err, ProxyError::invalid_path("/../v2"));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_accessors() {
        let err = UpstreamError::status(400, Some("bad symbol".to_string()));
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(err.upstream_message(), Some("bad symbol"));
        assert!(!err.is_transport());

        let err = UpstreamError::Transport("timeout".to_string());
        assert_eq!(err.status_code(), None);
        assert!(err.is_transport());
    }
}
