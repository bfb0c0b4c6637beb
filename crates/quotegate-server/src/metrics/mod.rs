//! Metrics module for Quotegate.

pub mod cache;
pub mod gateway;
pub mod http;
pub mod setup;

pub use cache::CacheMetrics;
pub use gateway::GatewayMetrics;
pub use setup::{detached_handle, init_metrics};
