//! Collaborator traits for the drift engine.
//!
//! The engine owns no storage of its own: schema definitions, inference and
//! reference records, persisted runs/results, and notification delivery are
//! all reached through these traits. Implementations live with the
//! surrounding application (database repositories, API clients, or in-memory
//! fakes in tests).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use driftwatch_core::{DriftResult, FieldDirection, JobRun, Notification, SchemaField};
use driftwatch_error::DriftwatchResult;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Read-only access to a model version's schema fields.
///
/// The field set is locked once the first job run exists; the engine treats
/// whatever this returns as an immutable snapshot for the duration of a run.
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// The monitored fields of a model version.
    async fn schema_fields(&self, version_id: Uuid) -> DriftwatchResult<Vec<SchemaField>>;
}

/// Access to inference and reference records.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Raw values of one field from inference records in `[from, to)`.
    async fn fetch_records(
        &self,
        version_id: Uuid,
        field_name: &str,
        direction: FieldDirection,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DriftwatchResult<Vec<JsonValue>>;

    /// Raw values of one field from the stored reference set.
    async fn fetch_reference(
        &self,
        version_id: Uuid,
        field_name: &str,
        direction: FieldDirection,
    ) -> DriftwatchResult<Vec<JsonValue>>;

    /// Number of inference records in `[from, to)`, for the window
    /// resolver's sample probe.
    async fn count_records(
        &self,
        version_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DriftwatchResult<u64>;

    /// Timestamp of the earliest inference record, bounding backfill.
    async fn earliest_record(&self, version_id: Uuid) -> DriftwatchResult<Option<DateTime<Utc>>>;
}

/// Persistence for job runs and drift results.
///
/// `save_job_run` is called on creation and again on every status
/// transition; `save_drift_result` appends exactly once per field per run.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Create or update a job run.
    async fn save_job_run(&self, run: &JobRun) -> DriftwatchResult<()>;

    /// Append one drift result.
    async fn save_drift_result(&self, result: &DriftResult) -> DriftwatchResult<()>;
}

/// Sink for drifted-field notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Record one notification; invoked once per drifted field.
    async fn create_notification(&self, notification: Notification) -> DriftwatchResult<()>;
}
