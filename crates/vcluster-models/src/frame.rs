//! Frame tasks sent to workers and the results they return.

use serde::{Deserialize, Serialize};

use crate::JobId;

/// One frame of a job, addressed to a worker.
///
/// Immutable once built. Retries against other workers reuse the same task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTask {
    /// Owning job
    #[serde(alias = "video_id")]
    pub job_id: JobId,
    /// 0-based position of the frame in display order
    pub frame_index: u32,
    /// Encoded image (PNG) bytes, base64 on the wire
    #[serde(with = "crate::encoding::base64_bytes")]
    pub image: Vec<u8>,
}

impl FrameTask {
    /// Create a new frame task.
    pub fn new(job_id: JobId, frame_index: u32, image: Vec<u8>) -> Self {
        Self {
            job_id,
            frame_index,
            image,
        }
    }

    /// Build the result for this task, echoing its identity.
    pub fn respond(&self, image: Vec<u8>) -> FrameResult {
        FrameResult {
            job_id: self.job_id.clone(),
            frame_index: self.frame_index,
            image,
        }
    }
}

/// A processed frame returned by a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameResult {
    #[serde(alias = "video_id")]
    pub job_id: JobId,
    pub frame_index: u32,
    #[serde(with = "crate::encoding::base64_bytes")]
    pub image: Vec<u8>,
}

impl FrameResult {
    /// Check that this result answers the given task.
    pub fn answers(&self, task: &FrameTask) -> bool {
        self.job_id == task.job_id && self.frame_index == task.frame_index
    }
}
