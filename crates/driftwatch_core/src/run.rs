//! Job run lifecycle tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a job run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    /// Created but not yet started
    Pending,
    /// Currently executing
    Running,
    /// Finished successfully
    Completed,
    /// Finished with a run-level error
    Failed,
}

impl JobStatus {
    /// Whether the run has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One execution instance of a job config.
///
/// Runs are terminal on completion or failure. A failed run carries an
/// `error_message`; its drift results (if any) must not be trusted as a
/// complete set, so callers check `status` before reading results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRun {
    /// Unique run id
    pub id: Uuid,
    /// The config this run executes
    pub job_config_id: Uuid,
    /// Current lifecycle state
    pub status: JobStatus,
    /// When the run started; backfill runs use the historical period end
    pub started_at: DateTime<Utc>,
    /// When the run reached a terminal state
    pub completed_at: Option<DateTime<Utc>>,
    /// Run-level failure description
    pub error_message: Option<String>,
}

impl JobRun {
    /// Create a run in the `Running` state starting now.
    pub fn start(job_config_id: Uuid) -> Self {
        Self::start_at(job_config_id, Utc::now())
    }

    /// Create a run in the `Running` state with an explicit start time.
    ///
    /// Backfill uses the historical period end so history renders in period
    /// order.
    pub fn start_at(job_config_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_config_id,
            status: JobStatus::Running,
            started_at,
            completed_at: None,
            error_message: None,
        }
    }

    /// Transition to `Completed`.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.status = JobStatus::Completed;
        self.completed_at = Some(at);
    }

    /// Transition to `Failed` with an error message.
    pub fn fail(&mut self, at: DateTime<Utc>, message: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.completed_at = Some(at);
        self.error_message = Some(message.into());
    }

    /// A lightweight view for run history listings.
    pub fn summary(&self) -> JobRunSummary {
        JobRunSummary {
            id: self.id,
            status: self.status,
            started_at: self.started_at,
            completed_at: self.completed_at,
            error_message: self.error_message.clone(),
        }
    }
}

/// Summary of a job run without result details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRunSummary {
    /// Run id
    pub id: Uuid,
    /// Lifecycle state
    pub status: JobStatus,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// Terminal time, if reached
    pub completed_at: Option<DateTime<Utc>>,
    /// Failure description, if failed
    pub error_message: Option<String>,
}
