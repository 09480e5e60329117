//! Worker client: health probes and frame dispatch.

use std::time::Duration;

use vcluster_models::{FrameResult, FrameTask, NodeRecord};

use crate::error::{ClientError, ClientResult};
use crate::registry::read_json;

/// Client for worker nodes. One instance serves every node.
#[derive(Debug, Clone)]
pub struct WorkerClient {
    http: reqwest::Client,
    frame_timeout: Duration,
}

impl WorkerClient {
    /// Create a client whose frame calls time out after `frame_timeout`.
    pub fn new(frame_timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            frame_timeout,
        }
    }

    /// Probe `GET /health`. Any 2xx within `timeout` counts as healthy.
    pub async fn health(&self, node: &NodeRecord, timeout: Duration) -> ClientResult<()> {
        let url = node.url("/health");
        let response = self
            .http
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ClientError::transport(&url, e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::Status {
                url,
                status: response.status().as_u16(),
            })
        }
    }

    /// Send a frame to `POST /process-frame`.
    ///
    /// A result that does not echo the task's `job_id` and `frame_index` is
    /// reported as malformed.
    pub async fn process_frame(
        &self,
        node: &NodeRecord,
        task: &FrameTask,
    ) -> ClientResult<FrameResult> {
        let url = node.url("/process-frame");
        let response = self
            .http
            .post(&url)
            .timeout(self.frame_timeout)
            .json(task)
            .send()
            .await
            .map_err(|e| ClientError::transport(&url, e))?;

        let result: FrameResult = read_json(&url, response).await?;
        if !result.answers(task) {
            return Err(ClientError::malformed(
                &url,
                format!(
                    "expected frame {} of job {}, got frame {} of job {}",
                    task.frame_index, task.job_id, result.frame_index, result.job_id
                ),
            ));
        }
        Ok(result)
    }
}
