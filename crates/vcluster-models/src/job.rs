//! Job definitions for the frame dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a job.
///
/// `Processing -> {Done | Error}`; both terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Processing,
    Done,
    Error,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Processing => "processing",
            JobState::Done => "done",
            JobState::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Error)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One end-to-end request to transform a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job ID
    #[serde(rename = "job_id")]
    pub id: JobId,

    /// Current state
    #[serde(default)]
    pub state: JobState,

    /// Number of frames extracted from the input (0 until extraction finishes)
    #[serde(default)]
    pub frame_count: u32,

    /// Frames collected from workers so far
    #[serde(default)]
    pub frames_completed: u32,

    /// Location of the reassembled artifact, set once the job is done
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    /// Failure cause, set once the job errored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new job in the `Processing` state.
    pub fn new(id: JobId) -> Self {
        let now = Utc::now();
        Self {
            id,
            state: JobState::Processing,
            frame_count: 0,
            frames_completed: 0,
            output_path: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Record the number of frames extracted from the input.
    pub fn set_frame_count(&mut self, frame_count: u32) {
        if self.is_terminal() {
            return;
        }
        self.frame_count = frame_count;
        self.updated_at = Utc::now();
    }

    /// Record how many frames have been collected.
    pub fn set_progress(&mut self, frames_completed: u32) {
        if self.is_terminal() {
            return;
        }
        self.frames_completed = frames_completed.min(self.frame_count);
        self.updated_at = Utc::now();
    }

    /// Mark the job done with its artifact.
    ///
    /// Returns `false` (and changes nothing) if the job is already terminal.
    pub fn complete(&mut self, output_path: PathBuf) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.state = JobState::Done;
        self.frames_completed = self.frame_count;
        self.output_path = Some(output_path);
        self.updated_at = Utc::now();
        true
    }

    /// Mark the job failed.
    ///
    /// Returns `false` (and changes nothing) if the job is already terminal.
    pub fn fail(&mut self, error: impl Into<String>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.state = JobState::Error;
        self.error = Some(error.into());
        self.updated_at = Utc::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_is_uuid() {
        let id = JobId::new();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_job_completes_once() {
        let mut job = Job::new(JobId::new());
        job.set_frame_count(6);
        job.set_progress(3);
        assert_eq!(job.frames_completed, 3);

        assert!(job.complete(PathBuf::from("out.mp4")));
        assert_eq!(job.state, JobState::Done);
        assert_eq!(job.frames_completed, 6);

        // Terminal: no further mutation
        assert!(!job.fail("late failure"));
        assert_eq!(job.state, JobState::Done);
        assert!(job.error.is_none());
    }

    #[test]
    fn test_failed_job_stays_failed() {
        let mut job = Job::new(JobId::new());
        assert!(job.fail("no nodes registered"));
        assert!(!job.complete(PathBuf::from("out.mp4")));
        job.set_frame_count(10);

        assert_eq!(job.state, JobState::Error);
        assert_eq!(job.frame_count, 0);
        assert!(job.output_path.is_none());
    }

    #[test]
    fn test_job_serializes_id_as_job_id() {
        let job = Job::new(JobId::from_string("abc"));
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["job_id"], "abc");
        assert_eq!(json["state"], "processing");
        assert!(json.get("output_path").is_none());
    }
}
