//! Application state.

use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::registry::NodeRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: RegistryConfig,
    pub registry: Arc<NodeRegistry>,
}

impl AppState {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            registry: Arc::new(NodeRegistry::new()),
        }
    }
}
