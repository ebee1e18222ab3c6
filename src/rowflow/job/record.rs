//! Job lifecycle records.
//!
//! A [`JobRecord`] is the persisted state of one asynchronously executed
//! query. Its status follows a small linear state machine:
//!
//! ```text
//! queued -> running -> succeeded | failed | canceled
//! ```
//!
//! with cancellation also allowed straight from `queued`. All three
//! outcomes are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl JobStatus {
    /// True for the three end states
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Canceled
        )
    }

    /// Whether the state machine allows moving from `self` to `next`.
    /// Re-asserting the current status is always allowed.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Queued, JobStatus::Canceled)
                | (JobStatus::Running, JobStatus::Succeeded)
                | (JobStatus::Running, JobStatus::Failed)
                | (JobStatus::Running, JobStatus::Canceled)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
        };
        write!(f, "{}", name)
    }
}

/// The persisted state of one job.
///
/// `params` is opaque to the store; it is passed through for the runner.
/// The artifact and log paths are derived from the job id at creation, so
/// the mapping from a job to its result file never requires reading the
/// record first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub status: JobStatus,
    /// Submitting surface (cli, api, ...), free-form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Where the submitted parameter file lives, when there was one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params_path: Option<String>,
    /// Opaque job parameters, passed through to the runner
    pub params: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    /// PID of the process running the job, while one is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_pid: Option<u32>,
    /// Result row count, set on success
    #[serde(default)]
    pub row_count: Option<u64>,
    pub artifact_path: String,
    pub log_path: String,
    /// Failure message, set on failure
    #[serde(default)]
    pub error: Option<String>,
}

/// A set of field changes to merge into a job record.
///
/// Only the fields given are touched; everything else keeps its stored
/// value. `updated_at` is stamped by the store on every write.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub runner_pid: Option<u32>,
    pub row_count: Option<u64>,
    pub error: Option<String>,
}

impl JobUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn started_at(mut self, at: DateTime<Utc>) -> Self {
        self.started_at = Some(at);
        self
    }

    pub fn finished_at(mut self, at: DateTime<Utc>) -> Self {
        self.finished_at = Some(at);
        self
    }

    pub fn runner_pid(mut self, pid: u32) -> Self {
        self.runner_pid = Some(pid);
        self
    }

    pub fn row_count(mut self, rows: u64) -> Self {
        self.row_count = Some(rows);
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Merge the given fields into `record`
    pub fn apply(&self, record: &mut JobRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(at) = self.started_at {
            record.started_at = Some(at);
        }
        if let Some(at) = self.finished_at {
            record.finished_at = Some(at);
        }
        if let Some(pid) = self.runner_pid {
            record.runner_pid = Some(pid);
        }
        if let Some(rows) = self.row_count {
            record.row_count = Some(rows);
        }
        if let Some(error) = &self.error {
            record.error = Some(error.clone());
        }
    }
}
