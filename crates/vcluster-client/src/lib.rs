//! HTTP clients for the frame cluster services.
//!
//! - `RegistryClient`: register a node, list registered nodes
//! - `WorkerClient`: probe a worker's health, send it a frame

pub mod error;
pub mod registry;
pub mod worker;

pub use error::{ClientError, ClientResult};
pub use registry::RegistryClient;
pub use worker::WorkerClient;
