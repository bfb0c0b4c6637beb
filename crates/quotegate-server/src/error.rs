use std::time::Duration;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use quotegate_core::{ProxyError, RATE_LIMITED_MESSAGE};
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    /// Presupuesto de la ventana agotado
    RateLimited { retry_after: Duration },

    /// Error del gateway o del upstream
    Proxy(ProxyError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Proxy(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl From<ProxyError> for AppError {
    fn from(err: ProxyError) -> Self {
        AppError::Proxy(err)
    }
}

/// Whole seconds until the window resets, never less than one.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs();
    if retry_after.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            AppError::RateLimited { retry_after } => {
                let body = Json(ErrorResponse {
                    error: RATE_LIMITED_MESSAGE.to_string(),
                });
                let mut response = (status, body).into_response();
                response.headers_mut().insert(
                    header::RETRY_AFTER,
                    HeaderValue::from(retry_after_secs(retry_after)),
                );
                response
            },
            AppError::Proxy(err) => {
                let body = Json(ErrorResponse {
                    error: err.client_message().to_string(),
                });
                (status, body).into_response()
            },
        }
    }
}
