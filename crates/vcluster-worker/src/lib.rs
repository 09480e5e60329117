//! Frame processing worker.
//!
//! A worker is stateless: it receives one frame, applies the transform it
//! was started with, and returns the result. On startup it registers itself
//! with the node registry and keeps re-registering as a heartbeat.

pub mod config;
pub mod error;
pub mod handlers;
pub mod network;
pub mod processor;
pub mod registration;
pub mod routes;
pub mod state;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use processor::FrameProcessor;
pub use registration::{generate_node_id, FailureTracker, Registrar};
pub use routes::create_router;
pub use state::AppState;
