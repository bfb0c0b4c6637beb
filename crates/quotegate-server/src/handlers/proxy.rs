//! Proxy endpoint handler.

use axum::{
    Json,
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use quotegate_core::ProxyError;

use crate::error::AppError;
use crate::extractors::EndpointRequest;
use crate::state::AppState;

/// Header telling the client whether the body came from the cache.
pub static CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache");

/// Handler for GET `<prefix>/` and `<prefix>/{*endpoint}`.
pub async fn proxy_request(
    State(state): State<AppState>,
    EndpointRequest(request): EndpointRequest,
) -> Result<Response, AppError> {
    let gateway = state.gateway();

    let result = gateway.handle(&request).await.map_err(|err| match err {
        ProxyError::RateLimited => AppError::RateLimited {
            retry_after: gateway.limiter().retry_after(),
        },
        other => AppError::Proxy(other),
    })?;

    let mut response = Json(result.payload.as_ref()).into_response();
    response.headers_mut().insert(
        CACHE_STATUS_HEADER.clone(),
        HeaderValue::from_static(result.outcome.as_header_value()),
    );

    Ok(response)
}
