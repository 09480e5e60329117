//! Shared data models for the video frame cluster.
//!
//! This crate provides Serde-serializable types for:
//! - Worker node records exchanged with the registry
//! - Frame tasks and results exchanged with workers
//! - Jobs and their client-facing status
//! - The closed set of per-frame transforms a worker can apply

pub mod encoding;
pub mod frame;
pub mod job;
pub mod job_status;
pub mod node;
pub mod transform;

// Re-export common types
pub use frame::{FrameResult, FrameTask};
pub use job::{Job, JobId, JobState};
pub use job_status::{JobStatus, JobSummary, StatusResponse, SubmitResponse};
pub use node::{NodeRecord, NodesResponse, RegisterResponse, WorkerHealth};
pub use transform::{FrameTransform, TransformParseError};
