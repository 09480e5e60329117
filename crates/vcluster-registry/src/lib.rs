//! Node registry service.
//!
//! Keeps the authoritative in-memory list of worker endpoints. Workers
//! register themselves on startup (and periodically, as a heartbeat); the
//! broker lists them once per job.

pub mod config;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod routes;
pub mod state;
pub mod sweeper;

pub use config::RegistryConfig;
pub use error::{ApiError, ApiResult};
pub use registry::{NodeEntry, NodeRegistry};
pub use routes::create_router;
pub use state::AppState;
pub use sweeper::NodeSweeper;
