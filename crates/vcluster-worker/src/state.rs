//! Application state.

use crate::config::WorkerConfig;
use crate::processor::FrameProcessor;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: WorkerConfig,
    pub processor: FrameProcessor,
}

impl AppState {
    pub fn new(config: WorkerConfig) -> Self {
        let processor = FrameProcessor::new(config.transform);
        Self { config, processor }
    }
}
