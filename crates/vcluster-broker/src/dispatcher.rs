//! The dispatch pipeline.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{watch, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, info_span, warn, Instrument};
use vcluster_client::{RegistryClient, WorkerClient};
use vcluster_media::VideoCodec;
use vcluster_models::{FrameResult, FrameTask, Job, JobId, JobState, JobStatus, NodeRecord};

use crate::assignment::{batch_size, node_for};
use crate::collector::FrameCollector;
use crate::config::DispatcherConfig;
use crate::error::{DispatchError, DispatchResult};
use crate::metrics;
use crate::store::JobStore;

/// Result of asking for a job's artifact.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The encoded output video
    Ready(Vec<u8>),
    /// Known job without an artifact (still processing, or failed)
    NotReady(JobStatus),
    /// Unrecognised job id
    Unknown,
}

/// Owns every job: accepts uploads, runs their pipelines, answers queries.
///
/// Cheap to clone; clones share the same job table.
#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<DispatcherConfig>,
    codec: Arc<dyn VideoCodec>,
    registry: RegistryClient,
    workers: WorkerClient,
    store: Arc<dyn JobStore>,
    cancellations: Arc<Mutex<HashMap<JobId, watch::Sender<bool>>>>,
}

impl Dispatcher {
    pub fn new(
        config: DispatcherConfig,
        codec: Arc<dyn VideoCodec>,
        registry: RegistryClient,
        store: Arc<dyn JobStore>,
    ) -> Self {
        let workers = WorkerClient::new(config.frame_timeout);
        Self {
            config: Arc::new(config),
            codec,
            registry,
            workers,
            store,
            cancellations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Accept a video and start processing it in the background.
    ///
    /// The job is visible as `Processing` before this returns.
    pub async fn submit(&self, video: Vec<u8>) -> JobId {
        let id = JobId::new();
        self.store.put(Job::new(id.clone())).await;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        self.cancellations.lock().await.insert(id.clone(), cancel_tx);

        metrics::record_job_submitted();
        info!(job_id = %id, bytes = video.len(), "Job submitted");

        let span = info_span!("job", job_id = %id);
        let dispatcher = self.clone();
        let job_id = id.clone();
        tokio::spawn(
            async move {
                dispatcher.run_job(job_id, video, cancel_rx).await;
            }
            .instrument(span),
        );

        id
    }

    /// Client-facing status. Unknown ids yield `JobStatus::Unknown`.
    pub async fn status(&self, id: &JobId) -> JobStatus {
        match self.store.get(id).await {
            Some(job) => job.state.into(),
            None => JobStatus::Unknown,
        }
    }

    /// Full job record.
    pub async fn job(&self, id: &JobId) -> Option<Job> {
        self.store.get(id).await
    }

    /// All jobs, oldest first.
    pub async fn list_jobs(&self) -> Vec<Job> {
        self.store.list().await
    }

    /// The artifact of a finished job. Never waits on processing.
    pub async fn fetch(&self, id: &JobId) -> DispatchResult<FetchOutcome> {
        let Some(job) = self.store.get(id).await else {
            return Ok(FetchOutcome::Unknown);
        };

        match (job.state, job.output_path) {
            (JobState::Done, Some(path)) => Ok(FetchOutcome::Ready(tokio::fs::read(path).await?)),
            (state, _) => Ok(FetchOutcome::NotReady(state.into())),
        }
    }

    /// Request cancellation of a running job.
    ///
    /// Returns `false` for unknown or already finished jobs.
    pub async fn cancel(&self, id: &JobId) -> bool {
        match self.cancellations.lock().await.get(id) {
            Some(tx) => {
                info!(job_id = %id, "Cancellation requested");
                tx.send(true).is_ok()
            }
            None => false,
        }
    }

    async fn run_job(self, id: JobId, video: Vec<u8>, mut cancel: watch::Receiver<bool>) {
        let started = Instant::now();

        let outcome = tokio::select! {
            result = self.process(&id, video) => result,
            _ = cancelled(&mut cancel) => Err(DispatchError::Cancelled),
            _ = deadline(self.config.job_timeout) => {
                Err(DispatchError::Timeout(self.config.job_timeout.unwrap_or_default()))
            }
        };

        // Once the sender is gone `cancel` reports false, so a cancel it
        // already acknowledged must win over a pipeline that just finished
        self.cancellations.lock().await.remove(&id);
        let cancel_requested = *cancel.borrow();
        let outcome = discard_if_cancelled(outcome, cancel_requested).await;
        let elapsed = started.elapsed().as_secs_f64();

        match outcome {
            Ok(path) => {
                info!(output = %path.display(), elapsed_secs = elapsed, "Job completed");
                self.update_job(&id, |job| {
                    job.complete(path);
                })
                .await;
                metrics::record_job_completed(elapsed);
            }
            Err(e) => {
                error!(elapsed_secs = elapsed, "Job failed: {}", e);
                let message = e.to_string();
                self.update_job(&id, |job| {
                    job.fail(message);
                })
                .await;
                metrics::record_job_failed(e.kind(), elapsed);
            }
        }
    }

    async fn process(&self, id: &JobId, video: Vec<u8>) -> DispatchResult<PathBuf> {
        let decoded = self
            .codec
            .decode(&video)
            .await
            .map_err(DispatchError::decode)?;
        drop(video);

        if decoded.frames.is_empty() {
            return Err(DispatchError::Decode("video contains no frames".to_string()));
        }
        let frame_count = u32::try_from(decoded.frame_count())
            .map_err(|_| DispatchError::Decode("too many frames".to_string()))?;
        self.update_job(id, |job| job.set_frame_count(frame_count))
            .await;
        info!(frames = frame_count, fps = decoded.format.fps, "Extracted frames");

        let nodes = self
            .registry
            .list_nodes()
            .await
            .map_err(DispatchError::Registry)?;
        if nodes.is_empty() {
            return Err(DispatchError::NoNodes);
        }

        let nodes = self.healthy_nodes(nodes).await;
        if nodes.is_empty() {
            return Err(DispatchError::NoReachableNodes);
        }

        let frames = self.dispatch_frames(id, decoded.frames, nodes).await?;

        let output = self
            .codec
            .encode(&frames, &decoded.format)
            .await
            .map_err(DispatchError::encode)?;

        self.write_artifact(id, &output).await
    }

    /// Probe every node concurrently, keeping responders in snapshot order.
    async fn healthy_nodes(&self, nodes: Vec<NodeRecord>) -> Vec<NodeRecord> {
        let timeout = self.config.health_timeout;
        let checks = nodes.iter().map(|node| self.workers.health(node, timeout));
        let results = futures::future::join_all(checks).await;

        let total = nodes.len();
        let healthy: Vec<NodeRecord> = nodes
            .into_iter()
            .zip(results)
            .filter_map(|(node, result)| match result {
                Ok(()) => Some(node),
                Err(e) => {
                    warn!(node_id = %node.id, endpoint = %node.endpoint, "Skipping unhealthy node: {}", e);
                    None
                }
            })
            .collect();

        metrics::set_healthy_nodes(healthy.len());
        info!(healthy = healthy.len(), registered = total, "Health check complete");
        healthy
    }

    /// Send every frame out in waves and collect the results in order.
    ///
    /// A wave must fully resolve before the next starts. The first frame
    /// that exhausts its rotation fails the job; returning early drops the
    /// wave's `JoinSet`, aborting whatever is still in flight.
    async fn dispatch_frames(
        &self,
        id: &JobId,
        frames: Vec<Vec<u8>>,
        nodes: Vec<NodeRecord>,
    ) -> DispatchResult<Vec<Vec<u8>>> {
        let nodes: Arc<[NodeRecord]> = nodes.into();
        let wave_size = batch_size(nodes.len(), self.config.max_batch);
        let mut collector = FrameCollector::new(frames.len() as u32);
        let mut pending = frames.into_iter().enumerate().peekable();
        let mut wave_number = 0usize;

        while pending.peek().is_some() {
            let mut wave = JoinSet::new();
            for (index, image) in pending.by_ref().take(wave_size) {
                let task = FrameTask::new(id.clone(), index as u32, image);
                let workers = self.workers.clone();
                let nodes = Arc::clone(&nodes);
                wave.spawn(
                    async move { dispatch_with_failover(&workers, &nodes, task).await }
                        .in_current_span(),
                );
            }

            while let Some(joined) = wave.join_next().await {
                let result = joined
                    .map_err(|e| DispatchError::internal(format!("frame task failed: {}", e)))??;
                collector.insert(result.frame_index, result.image)?;
            }

            wave_number += 1;
            let collected = collector.len() as u32;
            debug!(wave = wave_number, collected, "Wave complete");
            self.update_job(id, |job| job.set_progress(collected)).await;
        }

        collector.into_ordered()
    }

    async fn write_artifact(&self, id: &JobId, bytes: &[u8]) -> DispatchResult<PathBuf> {
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let path = self.config.output_dir.join(format!("{}_output.mp4", id));
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    async fn update_job<F>(&self, id: &JobId, f: F)
    where
        F: FnOnce(&mut Job),
    {
        if let Some(mut job) = self.store.get(id).await {
            f(&mut job);
            self.store.put(job).await;
        }
    }
}

/// Send one frame, walking the node rotation until a node succeeds.
///
/// Attempt `a` goes to `nodes[(frame_index + a) % nodes.len()]`. Any transport
/// error, non-success status, or mismatched body moves on to the next node.
pub async fn dispatch_with_failover(
    workers: &WorkerClient,
    nodes: &[NodeRecord],
    task: FrameTask,
) -> DispatchResult<FrameResult> {
    let node_count = nodes.len();

    for attempt in 0..node_count {
        let Some(position) = node_for(task.frame_index, node_count, attempt) else {
            break;
        };
        let node = &nodes[position];

        match workers.process_frame(node, &task).await {
            Ok(result) => {
                if attempt > 0 {
                    info!(
                        frame_index = task.frame_index,
                        node_id = %node.id,
                        attempt,
                        "Frame recovered on fallback node"
                    );
                    metrics::record_frame_failover();
                }
                metrics::record_frame_dispatched();
                return Ok(result);
            }
            Err(e) => {
                warn!(
                    frame_index = task.frame_index,
                    node_id = %node.id,
                    attempt,
                    "Frame attempt failed: {}", e
                );
                metrics::record_frame_attempt_failed(&node.id);
            }
        }
    }

    Err(DispatchError::FrameDispatchExhausted {
        frame_index: task.frame_index,
        attempts: node_count,
    })
}

/// Turn a finished pipeline into `Cancelled` when a cancel was acknowledged,
/// deleting the artifact it wrote.
async fn discard_if_cancelled(
    outcome: DispatchResult<PathBuf>,
    cancel_requested: bool,
) -> DispatchResult<PathBuf> {
    match outcome {
        Ok(path) if cancel_requested => {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!(output = %path.display(), "Failed to remove cancelled artifact: {}", e);
            }
            Err(DispatchError::Cancelled)
        }
        other => other,
    }
}

/// Resolve once cancellation is requested. Never resolves if the sender is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn deadline(timeout: Option<Duration>) {
    match timeout {
        Some(timeout) => tokio::time::sleep(timeout).await,
        None => std::future::pending::<()>().await,
    }
}
