//! Job table.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use vcluster_models::{Job, JobId};

/// Storage for job records.
///
/// Each job has a single writer (its pipeline task), so a plain
/// get-modify-put is enough.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get(&self, id: &JobId) -> Option<Job>;

    /// Insert or replace a job.
    async fn put(&self, job: Job);

    /// All jobs, oldest first.
    async fn list(&self) -> Vec<Job>;
}

/// Process-local job store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs.read().await.get(id).cloned()
    }

    async fn put(&self, job: Job) {
        self.jobs.write().await.insert(job.id.clone(), job);
    }

    async fn list(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        jobs
    }
}
