//! Middleware stack para el servidor HTTP.
//!
//! - `RequestIdLayer`: genera o propaga `x-request-id`
//! - `LoggingLayer`: una linea estructurada por request, con el resultado del cache

mod logging;
mod request_id;

pub use logging::{LoggingLayer, LoggingMiddleware};
pub use request_id::{REQUEST_ID_HEADER, RequestIdLayer, RequestIdMiddleware};
