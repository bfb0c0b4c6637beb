//! Extractores de requests.

pub mod endpoint;

pub use endpoint::{ENDPOINT_CAPTURE, EndpointRequest};
