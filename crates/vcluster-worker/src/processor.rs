//! Frame processing.

use vcluster_media::{apply_transform, decode_image, encode_png};
use vcluster_models::{FrameResult, FrameTask, FrameTransform};

use crate::error::{WorkerError, WorkerResult};

/// Applies the worker's configured transform to incoming frames.
#[derive(Debug, Clone, Copy)]
pub struct FrameProcessor {
    transform: FrameTransform,
}

impl FrameProcessor {
    pub fn new(transform: FrameTransform) -> Self {
        Self { transform }
    }

    pub fn transform(&self) -> FrameTransform {
        self.transform
    }

    /// Process one frame. Image work runs on the blocking pool.
    ///
    /// Only a frame that fails to decode is the caller's fault; an encode
    /// failure is reported as a server error.
    pub async fn process(&self, task: FrameTask) -> WorkerResult<FrameResult> {
        let transform = self.transform;
        let (task, image) = tokio::task::spawn_blocking(move || {
            let image = apply(transform, &task.image);
            (task, image)
        })
        .await
        .map_err(|e| WorkerError::processing_failed(format!("frame task panicked: {}", e)))?;

        Ok(task.respond(image?))
    }
}

fn apply(transform: FrameTransform, bytes: &[u8]) -> WorkerResult<Vec<u8>> {
    let img = decode_image(bytes).map_err(WorkerError::invalid_image)?;
    Ok(encode_png(&apply_transform(transform, img))?)
}
