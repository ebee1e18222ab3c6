//! File-backed job record store.
//!
//! One JSON file per job under a base directory, written with atomic
//! replace-on-write: content goes to a temporary sibling file which is
//! then renamed into place. The rename is the only point where visible
//! state changes, so a concurrent reader sees either the fully-old or the
//! fully-new record and a crash mid-write leaves the previous record
//! intact.
//!
//! The store does not lock across writers to the same job id; callers own
//! a job's writes exclusively (one submitter, one runner).

use log::{info, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::Utc;
use tempfile::NamedTempFile;
use uuid::Uuid;

use super::record::{JobRecord, JobStatus, JobUpdate};

/// Errors from job record persistence
#[derive(Debug, thiserror::Error)]
pub enum JobStoreError {
    #[error("job '{0}' not found")]
    NotFound(String),

    #[error("invalid status transition {from} -> {to} for job '{job_id}'")]
    InvalidTransition {
        job_id: String,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("corrupt job record at {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode job record: {0}")]
    Encode(serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A directory of job records
#[derive(Debug, Clone)]
pub struct JobStore {
    base_dir: PathBuf,
}

impl JobStore {
    /// Open a store at `base_dir`, creating the directory if needed
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, JobStoreError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(JobStore { base_dir })
    }

    /// The store's base directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of a job's record file
    pub fn record_path(&self, job_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", job_id))
    }

    /// Path reserved for a job's result artifact.
    ///
    /// Derived from the id alone, so job and artifact can be related
    /// without reading the record.
    pub fn artifact_path(&self, job_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.csv", job_id))
    }

    /// Path reserved for a job's log file
    pub fn log_path(&self, job_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.log", job_id))
    }

    /// Create a new job in `queued` state and persist its initial record.
    ///
    /// The id carries a UTC time prefix so on-disk listings sort naturally
    /// chronological, plus a random suffix for uniqueness.
    pub fn create(
        &self,
        params: serde_json::Value,
        source: Option<&str>,
    ) -> Result<JobRecord, JobStoreError> {
        let job_id = new_job_id();
        let now = Utc::now();

        let record = JobRecord {
            job_id: job_id.clone(),
            status: JobStatus::Queued,
            source: source.map(str::to_string),
            params_path: None,
            params,
            created_at: now,
            updated_at: now,
            started_at: None,
            finished_at: None,
            runner_pid: None,
            row_count: None,
            artifact_path: self.artifact_path(&job_id).to_string_lossy().into_owned(),
            log_path: self.log_path(&job_id).to_string_lossy().into_owned(),
            error: None,
        };

        self.write_record(&record)?;
        info!("created job {} ({})", record.job_id, record.status);
        Ok(record)
    }

    /// Merge `update` into an existing record and persist it atomically.
    ///
    /// Stamps `updated_at`; rejects status changes the state machine does
    /// not allow.
    pub fn update(&self, job_id: &str, update: JobUpdate) -> Result<JobRecord, JobStoreError> {
        let mut record = self
            .load(job_id)?
            .ok_or_else(|| JobStoreError::NotFound(job_id.to_string()))?;

        if let Some(next) = update.status {
            if !record.status.can_transition_to(next) {
                return Err(JobStoreError::InvalidTransition {
                    job_id: job_id.to_string(),
                    from: record.status,
                    to: next,
                });
            }
        }

        update.apply(&mut record);
        record.updated_at = Utc::now();
        self.write_record(&record)?;
        Ok(record)
    }

    /// Load a record by id; `None` when no such job exists
    pub fn load(&self, job_id: &str) -> Result<Option<JobRecord>, JobStoreError> {
        let path = self.record_path(job_id);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = serde_json::from_str(&text).map_err(|source| JobStoreError::Corrupt {
            path: path.to_string_lossy().into_owned(),
            source,
        })?;
        Ok(Some(record))
    }

    /// The `limit` most recently updated records, newest first.
    ///
    /// Ordered by file modification time. Record files that fail to parse
    /// are logged and skipped; a corrupted record never aborts a listing.
    pub fn list(&self, limit: usize) -> Result<Vec<JobRecord>, JobStoreError> {
        let mut entries: Vec<(PathBuf, SystemTime)> = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push((path, modified));
        }

        entries.sort_by(|a, b| b.1.cmp(&a.1));

        let mut records = Vec::new();
        for (path, _) in entries {
            if records.len() >= limit {
                break;
            }
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    warn!("skipping unreadable job record {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_str::<JobRecord>(&text) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("skipping corrupt job record {}: {}", path.display(), e);
                }
            }
        }

        Ok(records)
    }

    /// Write a record to a temporary sibling file, then rename into place.
    fn write_record(&self, record: &JobRecord) -> Result<(), JobStoreError> {
        let bytes = serde_json::to_vec_pretty(record).map_err(JobStoreError::Encode)?;

        let mut tmp = NamedTempFile::new_in(&self.base_dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(self.record_path(&record.job_id))
            .map_err(|e| JobStoreError::Io(e.error))?;
        Ok(())
    }
}

fn new_job_id() -> String {
    let prefix = Utc::now().format("%Y%m%d%H%M%S");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &suffix[..8])
}
