use axum::{
    extract::{FromRequestParts, MatchedPath, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use quotegate_core::{ProxyError, RequestDescriptor};

use crate::error::AppError;

/// Capture segment that ends the proxy route template.
pub const ENDPOINT_CAPTURE: &str = "{*endpoint}";

/// Extracts the upstream request from `<prefix>/{*endpoint}` or `<prefix>/`.
///
/// The endpoint path is the raw request path after the route prefix, with
/// percent-escapes left as the client sent them. Every query parameter is
/// forwarded, and a repeated parameter keeps its last value. Paths with a
/// `.` or `..` segment are rejected with 400 before any budget is spent.
#[derive(Debug)]
pub struct EndpointRequest(pub RequestDescriptor);

impl<S> FromRequestParts<S> for EndpointRequest
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let matched = MatchedPath::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let prefix = matched
            .as_str()
            .strip_suffix(ENDPOINT_CAPTURE)
            .unwrap_or(matched.as_str());
        let endpoint = parts.uri.path().strip_prefix(prefix).unwrap_or_default().to_owned();

        let Query(params) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let request = RequestDescriptor::from_parts(endpoint, params);
        if request.has_dot_segments() {
            return Err(
                AppError::Proxy(ProxyError::invalid_path(request.endpoint_path())).into_response(),
            );
        }

        Ok(EndpointRequest(request))
    }
}
