//! Frame dispatcher service.
//!
//! Accepts a video, splits it into frames, sends every frame to one of the
//! healthy registered workers (round robin, with per-frame failover), and
//! reassembles the processed frames in their original order.
//!
//! Pipeline per job:
//! 1. decode the upload into ordered frames
//! 2. list registered nodes, keep the ones that answer `/health`
//! 3. dispatch frames in bounded concurrent waves
//! 4. collect results by index and encode the output container

pub mod assignment;
pub mod collector;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod store;

pub use assignment::{batch_size, node_for};
pub use collector::FrameCollector;
pub use config::{BrokerConfig, DispatcherConfig};
pub use dispatcher::{dispatch_with_failover, Dispatcher, FetchOutcome};
pub use error::{ApiError, ApiResult, DispatchError, DispatchResult};
pub use routes::create_router;
pub use state::AppState;
pub use store::{InMemoryJobStore, JobStore};
