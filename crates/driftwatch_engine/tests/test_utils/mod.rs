//! In-memory collaborators for engine integration tests.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use driftwatch_core::{DriftResult, FieldDirection, JobRun, Notification, SchemaField};
use driftwatch_engine::interface::{DataStore, NotificationSink, ResultStore, SchemaStore};
use driftwatch_error::{DriftwatchResult, StoreError, StoreErrorKind};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Schema store serving a fixed field list.
pub struct MemorySchema {
    fields: Vec<SchemaField>,
}

impl MemorySchema {
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }
}

#[async_trait]
impl SchemaStore for MemorySchema {
    async fn schema_fields(&self, _version_id: Uuid) -> DriftwatchResult<Vec<SchemaField>> {
        Ok(self.fields.clone())
    }
}

/// Inference rows plus reference sets, built up before the test runs.
#[derive(Default)]
pub struct MemoryData {
    rows: Vec<(DateTime<Utc>, HashMap<String, JsonValue>)>,
    reference: HashMap<String, Vec<JsonValue>>,
}

impl MemoryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_row(&mut self, ts: DateTime<Utc>, values: &[(&str, JsonValue)]) {
        let values = values
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        self.rows.push((ts, values));
    }

    pub fn set_reference(&mut self, field_name: &str, values: Vec<JsonValue>) {
        self.reference.insert(field_name.to_string(), values);
    }
}

#[async_trait]
impl DataStore for MemoryData {
    async fn fetch_records(
        &self,
        _version_id: Uuid,
        field_name: &str,
        _direction: FieldDirection,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DriftwatchResult<Vec<JsonValue>> {
        Ok(self
            .rows
            .iter()
            .filter(|(ts, _)| *ts >= from && *ts < to)
            .filter_map(|(_, values)| values.get(field_name).cloned())
            .collect())
    }

    async fn fetch_reference(
        &self,
        _version_id: Uuid,
        field_name: &str,
        _direction: FieldDirection,
    ) -> DriftwatchResult<Vec<JsonValue>> {
        Ok(self.reference.get(field_name).cloned().unwrap_or_default())
    }

    async fn count_records(
        &self,
        _version_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DriftwatchResult<u64> {
        Ok(self
            .rows
            .iter()
            .filter(|(ts, _)| *ts >= from && *ts < to)
            .count() as u64)
    }

    async fn earliest_record(&self, _version_id: Uuid) -> DriftwatchResult<Option<DateTime<Utc>>> {
        Ok(self.rows.iter().map(|(ts, _)| *ts).min())
    }
}

/// A data store that fails record fetches for one field, for testing
/// per-field failure isolation.
pub struct FlakyData {
    inner: MemoryData,
    fail_field: String,
}

impl FlakyData {
    pub fn new(inner: MemoryData, fail_field: &str) -> Self {
        Self {
            inner,
            fail_field: fail_field.to_string(),
        }
    }
}

#[async_trait]
impl DataStore for FlakyData {
    async fn fetch_records(
        &self,
        version_id: Uuid,
        field_name: &str,
        direction: FieldDirection,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DriftwatchResult<Vec<JsonValue>> {
        if field_name == self.fail_field {
            Err(StoreError::new(StoreErrorKind::FetchFailed(format!(
                "simulated fetch failure for {field_name}"
            ))))?;
        }
        self.inner
            .fetch_records(version_id, field_name, direction, from, to)
            .await
    }

    async fn fetch_reference(
        &self,
        version_id: Uuid,
        field_name: &str,
        direction: FieldDirection,
    ) -> DriftwatchResult<Vec<JsonValue>> {
        self.inner
            .fetch_reference(version_id, field_name, direction)
            .await
    }

    async fn count_records(
        &self,
        version_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DriftwatchResult<u64> {
        self.inner.count_records(version_id, from, to).await
    }

    async fn earliest_record(&self, version_id: Uuid) -> DriftwatchResult<Option<DateTime<Utc>>> {
        self.inner.earliest_record(version_id).await
    }
}

/// A data store that stalls record fetches for one field, for testing the
/// per-field deadline.
pub struct SlowData {
    inner: MemoryData,
    slow_field: String,
    delay: std::time::Duration,
}

impl SlowData {
    pub fn new(inner: MemoryData, slow_field: &str, delay: std::time::Duration) -> Self {
        Self {
            inner,
            slow_field: slow_field.to_string(),
            delay,
        }
    }
}

#[async_trait]
impl DataStore for SlowData {
    async fn fetch_records(
        &self,
        version_id: Uuid,
        field_name: &str,
        direction: FieldDirection,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DriftwatchResult<Vec<JsonValue>> {
        if field_name == self.slow_field {
            tokio::time::sleep(self.delay).await;
        }
        self.inner
            .fetch_records(version_id, field_name, direction, from, to)
            .await
    }

    async fn fetch_reference(
        &self,
        version_id: Uuid,
        field_name: &str,
        direction: FieldDirection,
    ) -> DriftwatchResult<Vec<JsonValue>> {
        self.inner
            .fetch_reference(version_id, field_name, direction)
            .await
    }

    async fn count_records(
        &self,
        version_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DriftwatchResult<u64> {
        self.inner.count_records(version_id, from, to).await
    }

    async fn earliest_record(&self, version_id: Uuid) -> DriftwatchResult<Option<DateTime<Utc>>> {
        self.inner.earliest_record(version_id).await
    }
}

/// Schema store whose lookups always fail.
pub struct BrokenSchema;

#[async_trait]
impl SchemaStore for BrokenSchema {
    async fn schema_fields(&self, _version_id: Uuid) -> DriftwatchResult<Vec<SchemaField>> {
        Err(StoreError::new(StoreErrorKind::FetchFailed(
            "schema database offline".to_string(),
        )))?
    }
}

/// Notification sink that rejects every notification.
pub struct BrokenSink;

#[async_trait]
impl NotificationSink for BrokenSink {
    async fn create_notification(&self, _notification: Notification) -> DriftwatchResult<()> {
        Err(StoreError::new(StoreErrorKind::FetchFailed(
            "notification channel closed".to_string(),
        )))?
    }
}

/// Recording result store; `save_job_run` upserts by run id.
#[derive(Default)]
pub struct MemoryResults {
    runs: Mutex<Vec<JobRun>>,
    results: Mutex<Vec<DriftResult>>,
}

impl MemoryResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> Vec<JobRun> {
        self.runs.lock().unwrap().clone()
    }

    pub fn results(&self) -> Vec<DriftResult> {
        self.results.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultStore for MemoryResults {
    async fn save_job_run(&self, run: &JobRun) -> DriftwatchResult<()> {
        let mut runs = self.runs.lock().unwrap();
        match runs.iter_mut().find(|existing| existing.id == run.id) {
            Some(existing) => *existing = run.clone(),
            None => runs.push(run.clone()),
        }
        Ok(())
    }

    async fn save_drift_result(&self, result: &DriftResult) -> DriftwatchResult<()> {
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }
}

/// Recording notification sink.
#[derive(Default)]
pub struct MemorySink {
    notifications: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    async fn create_notification(&self, notification: Notification) -> DriftwatchResult<()> {
        self.notifications.lock().unwrap().push(notification);
        Ok(())
    }
}

/// Initialize test logging once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
