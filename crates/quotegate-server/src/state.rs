//! Application state.

use std::sync::Arc;

use crate::gateway::Gateway;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    gateway: Arc<Gateway>,
}

impl AppState {
    /// Creates a new AppState around the gateway.
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    /// Creates an AppState sharing an existing gateway.
    pub fn from_shared(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Returns a reference to the gateway.
    pub fn gateway(&self) -> &Gateway {
        self.gateway.as_ref()
    }
}
