//! # Quotegate Server
//!
//! HTTP gateway that sits between browser clients and a rate-limited
//! market-data API. Every request under the proxy prefix consumes one unit
//! of a process-wide fixed-window budget; admitted requests are answered
//! from a freshness-checked cache or forwarded to the upstream exactly once.
//!
//! ## Endpoints
//!
//! - `GET /api/crypto/{*endpoint}` proxied to `<base_url>/<endpoint>`
//! - `GET /api/crypto/` proxied to `<base_url>/`
//! - `GET /health` cache size and rate window
//! - `GET /metrics` Prometheus text format

pub mod cache;
pub mod error;
pub mod extractors;
pub mod gateway;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod settings;
pub mod state;

pub use error::AppError;
pub use gateway::{Gateway, GatewayConfig, GatewayResponse, Outcome};
pub use server::{RouterConfig, create_router, run_server};
pub use settings::Settings;
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
