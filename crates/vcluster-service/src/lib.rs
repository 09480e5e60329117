//! Plumbing shared by the registry, worker and broker services.

pub mod env;
pub mod error;
pub mod health;
pub mod middleware;
pub mod shutdown;
pub mod telemetry;

pub use env::{env_flag, env_list, env_or, env_string, is_production};
pub use error::ErrorResponse;
pub use health::HealthResponse;
pub use middleware::{cors_layer, request_id, request_logging};
pub use shutdown::shutdown_signal;
pub use telemetry::init_tracing;
