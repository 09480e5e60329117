//! Client-facing job status and dispatcher response bodies.

use serde::{Deserialize, Serialize};

use crate::{Job, JobState};

/// Job status as reported to clients.
///
/// `Unknown` is a sentinel for ids the dispatcher has never seen; it is
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Done,
    Error,
    Unknown,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
            JobStatus::Unknown => "unknown",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }
}

impl From<JobState> for JobStatus {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Processing => JobStatus::Processing,
            JobState::Done => JobStatus::Done,
            JobState::Error => JobStatus::Error,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Response body of a video upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub job_id: String,
    pub status: JobStatus,
}

/// Response body of `GET /status/{job_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames_total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames_completed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResponse {
    /// Status for an id the dispatcher does not know.
    pub fn unknown(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Unknown,
            frames_total: None,
            frames_completed: None,
            error: None,
        }
    }
}

impl From<&Job> for StatusResponse {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id.to_string(),
            status: job.state.into(),
            frames_total: (job.frame_count > 0).then_some(job.frame_count),
            frames_completed: (job.frame_count > 0).then_some(job.frames_completed),
            error: job.error.clone(),
        }
    }
}

/// Entry of the job listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_id: String,
    pub status: JobStatus,
    pub frame_count: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id.to_string(),
            status: job.state.into(),
            frame_count: job.frame_count,
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}
