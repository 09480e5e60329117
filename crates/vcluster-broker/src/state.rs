//! Application state.

use std::sync::Arc;

use vcluster_client::RegistryClient;
use vcluster_media::VideoCodec;

use crate::config::BrokerConfig;
use crate::dispatcher::Dispatcher;
use crate::store::InMemoryJobStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: BrokerConfig,
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Build state around the given codec with an in-memory job store.
    pub fn new(config: BrokerConfig, codec: Arc<dyn VideoCodec>) -> Self {
        let dispatcher = Dispatcher::new(
            config.dispatcher.clone(),
            codec,
            RegistryClient::new(config.registry_url.clone()),
            Arc::new(InMemoryJobStore::new()),
        );
        Self { config, dispatcher }
    }
}
