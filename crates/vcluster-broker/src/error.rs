//! Broker error types.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use vcluster_client::ClientError;
use vcluster_media::MediaError;
use vcluster_service::ErrorResponse;

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Failures that end a job in the `Error` state.
///
/// Per-attempt worker failures are not here: they are `ClientError`s,
/// logged and absorbed by failover until a frame runs out of nodes.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Failed to decode video: {0}")]
    Decode(String),

    #[error("No worker nodes registered")]
    NoNodes,

    #[error("No registered worker node is reachable")]
    NoReachableNodes,

    #[error("Registry unavailable: {0}")]
    Registry(#[source] ClientError),

    #[error("Frame {frame_index} failed on all {attempts} nodes")]
    FrameDispatchExhausted { frame_index: u32, attempts: usize },

    #[error("Rejected frame {frame_index}: {reason}")]
    UnexpectedFrame { frame_index: u32, reason: &'static str },

    #[error("Collected {received} of {expected} frames")]
    IncompleteFrames { expected: u32, received: u32 },

    #[error("Failed to encode video: {0}")]
    Encode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Job cancelled")]
    Cancelled,

    #[error("Job timed out after {0:?}")]
    Timeout(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    pub fn decode(err: MediaError) -> Self {
        Self::Decode(err.to_string())
    }

    pub fn encode(err: MediaError) -> Self {
        Self::Encode(err.to_string())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short label used in metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Decode(_) => "decode",
            DispatchError::NoNodes => "no_nodes",
            DispatchError::NoReachableNodes => "no_reachable_nodes",
            DispatchError::Registry(_) => "registry",
            DispatchError::FrameDispatchExhausted { .. } => "frame_exhausted",
            DispatchError::UnexpectedFrame { .. } | DispatchError::IncompleteFrames { .. } => {
                "collect"
            }
            DispatchError::Encode(_) => "encode",
            DispatchError::Storage(_) => "storage",
            DispatchError::Cancelled => "cancelled",
            DispatchError::Timeout(_) => "timeout",
            DispatchError::Internal(_) => "internal",
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Job {job_id} is not ready (status: {status})")]
    NotReady { job_id: String, status: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotReady { .. } => StatusCode::CONFLICT,
            ApiError::Internal(_) | ApiError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::NotReady { .. } => ErrorResponse::new(self.to_string()).with_code("not_ready"),
            ApiError::Internal(_) | ApiError::Dispatch(_) => ErrorResponse::internal(self.to_string()),
            _ => ErrorResponse::new(self.to_string()),
        };
        body.into_response_with(status)
    }
}
