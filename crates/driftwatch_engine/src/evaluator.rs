//! Drift evaluation: one job run from creation to terminal status.

use crate::interface::{DataStore, NotificationSink, ResultStore, SchemaStore};
use crate::window::{ResolvedWindow, WindowPolicy, WindowResolver};
use chrono::{DateTime, Utc};
use driftwatch_core::{
    ComparisonType, DriftResult, JobConfig, JobRun, MetricName, Notification, SchemaField,
};
use driftwatch_error::{
    DriftwatchError, DriftwatchErrorKind, DriftwatchResult, MetricError, MetricErrorKind,
    StoreError, StoreErrorKind,
};
use driftwatch_metrics::{MetricOutput, compute_drift, default_threshold, select_metric};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Why a run was created; backfill runs are historical and silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// Fired by the cron due check
    Scheduled,
    /// Explicitly triggered by an operator
    Manual,
    /// Retroactive execution of a missed historical period
    Backfill,
}

impl RunKind {
    /// Whether drifted fields should produce notifications.
    ///
    /// Historical backfill periods must not page an operator.
    pub fn notifies(&self) -> bool {
        !matches!(self, RunKind::Backfill)
    }

    /// Whether the run's timestamps record the historical period rather
    /// than wall-clock execution time.
    pub fn historical(&self) -> bool {
        matches!(self, RunKind::Backfill)
    }
}

/// Evaluator tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct EvaluatorConfig {
    /// Deadline for one field's fetch-and-score step; a timeout is a
    /// per-field failure, not a run failure.
    pub field_timeout: Duration,
    /// Window resolution constants
    pub window_policy: WindowPolicy,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            field_timeout: Duration::from_secs(30),
            window_policy: WindowPolicy::default(),
        }
    }
}

/// Runs one job run to completion: per field, resolve comparison data,
/// aggregate, score, persist, and notify on drift.
///
/// Per-field failures (bad data, metric math failure, timeout, a reference
/// set missing for one field) are recorded in that field's result and do
/// not stop evaluation of remaining fields. Run-level failures (schema or
/// data store unreachable, no inference data at all, no reference data for
/// any field in vs-reference mode) mark the whole run failed with an error
/// message.
pub struct DriftEvaluator {
    schema: Arc<dyn SchemaStore>,
    data: Arc<dyn DataStore>,
    results: Arc<dyn ResultStore>,
    notifications: Arc<dyn NotificationSink>,
    config: EvaluatorConfig,
}

impl DriftEvaluator {
    /// Create an evaluator over the four collaborators.
    pub fn new(
        schema: Arc<dyn SchemaStore>,
        data: Arc<dyn DataStore>,
        results: Arc<dyn ResultStore>,
        notifications: Arc<dyn NotificationSink>,
        config: EvaluatorConfig,
    ) -> Self {
        Self {
            schema,
            data,
            results,
            notifications,
            config,
        }
    }

    /// Execute one run of `job` for the period ending at `period_end`.
    ///
    /// The returned run is terminal: `Completed`, or `Failed` with its
    /// `error_message` set. Persistence of the run itself happens here, on
    /// creation and again at the terminal transition.
    #[instrument(skip(self, job), fields(job_id = %job.id, kind = ?kind))]
    pub async fn execute(
        &self,
        job: &JobConfig,
        period_end: DateTime<Utc>,
        kind: RunKind,
    ) -> DriftwatchResult<JobRun> {
        let mut run = if kind.historical() {
            JobRun::start_at(job.id, period_end)
        } else {
            JobRun::start(job.id)
        };
        self.save_run(&run).await?;

        let finished_at = if kind.historical() {
            period_end
        } else {
            Utc::now()
        };
        match self.evaluate_fields(job, period_end, run.id, kind).await {
            Ok(field_count) => {
                info!(run_id = %run.id, field_count, "Job run completed");
                run.complete(finished_at);
            }
            Err(e) => {
                warn!(run_id = %run.id, error = %e, "Job run failed");
                run.fail(finished_at, e.to_string());
            }
        }
        self.save_run(&run).await?;
        Ok(run)
    }

    /// Persist a run, mapping collaborator failures into the persistence
    /// error kind.
    async fn save_run(&self, run: &JobRun) -> DriftwatchResult<()> {
        self.results.save_job_run(run).await.map_err(|e| {
            StoreError::new(StoreErrorKind::PersistFailed {
                entity: "job run".to_string(),
                reason: e.to_string(),
            })
            .into()
        })
    }

    /// Evaluate every schema field for one run. Returns the number of
    /// fields evaluated.
    async fn evaluate_fields(
        &self,
        job: &JobConfig,
        period_end: DateTime<Utc>,
        run_id: Uuid,
        kind: RunKind,
    ) -> DriftwatchResult<usize> {
        let fields = self
            .schema
            .schema_fields(job.model_version_id)
            .await
            .map_err(|e| StoreError::new(StoreErrorKind::SchemaUnavailable(e.to_string())))?;

        let resolver = WindowResolver::new(self.data.as_ref(), self.config.window_policy);
        let window = resolver
            .resolve(
                job.model_version_id,
                period_end,
                job.window_size,
                job.min_samples,
            )
            .await?;

        if window.sample_count == 0 {
            Err(StoreError::new(StoreErrorKind::FetchFailed(format!(
                "no inference data for period ending {period_end}"
            ))))?;
        }

        let mut reference_missing = 0usize;
        for field in &fields {
            // Threshold and metric are captured here, once per field, so a
            // concurrent config edit cannot change an in-flight comparison.
            let (metric, threshold) = resolve_metric_and_threshold(field);

            let outcome = tokio::time::timeout(
                self.config.field_timeout,
                self.evaluate_field(job, field, &window),
            )
            .await;

            let result = match outcome {
                Ok(Ok(output)) => result_from_output(run_id, field, threshold, output, &window),
                Ok(Err(e)) => {
                    if is_reference_missing(&e) {
                        reference_missing += 1;
                    }
                    warn!(field = %field.field_name, error = %e, "Field evaluation failed");
                    failed_result(run_id, field, metric, threshold, e.to_string(), &window)
                }
                Err(_) => {
                    let timeout = MetricError::new(MetricErrorKind::Timeout {
                        field: field.field_name.clone(),
                        seconds: self.config.field_timeout.as_secs(),
                    });
                    warn!(field = %field.field_name, "Field evaluation timed out");
                    failed_result(run_id, field, metric, threshold, timeout.to_string(), &window)
                }
            };

            self.results.save_drift_result(&result).await.map_err(|e| {
                StoreError::new(StoreErrorKind::PersistFailed {
                    entity: "drift result".to_string(),
                    reason: e.to_string(),
                })
            })?;

            if result.is_drifted && kind.notifies() {
                self.notify_drift(job, field, &result).await?;
            }
        }

        // A version with no reference data at all should read as a failed
        // run in history, not a wall of green insufficient-data runs.
        if !fields.is_empty() && reference_missing == fields.len() {
            Err(StoreError::new(StoreErrorKind::ReferenceMissing(
                job.model_version_id.to_string(),
            )))?;
        }

        Ok(fields.len())
    }

    /// Fetch both sides of the comparison for one field and score them.
    async fn evaluate_field(
        &self,
        job: &JobConfig,
        field: &SchemaField,
        window: &ResolvedWindow,
    ) -> DriftwatchResult<MetricOutput> {
        let metric = select_metric(field.data_type, field.drift_metric)?;
        let threshold = field
            .alert_threshold
            .unwrap_or_else(|| default_threshold(metric));

        let current = self
            .data
            .fetch_records(
                job.model_version_id,
                &field.field_name,
                field.direction,
                window.from,
                window.to,
            )
            .await?;

        let baseline = match job.comparison_type {
            ComparisonType::VsReference => {
                let reference = self
                    .data
                    .fetch_reference(job.model_version_id, &field.field_name, field.direction)
                    .await?;
                if reference.is_empty() {
                    Err(StoreError::new(StoreErrorKind::ReferenceMissing(
                        job.model_version_id.to_string(),
                    )))?;
                }
                reference
            }
            ComparisonType::RollingWindow => {
                let (from, to) = window.preceding();
                self.data
                    .fetch_records(
                        job.model_version_id,
                        &field.field_name,
                        field.direction,
                        from,
                        to,
                    )
                    .await?
            }
        };

        debug!(
            field = %field.field_name,
            metric = %metric,
            baseline_len = baseline.len(),
            current_len = current.len(),
            "Scoring field"
        );
        let output = compute_drift(metric, &baseline, &current, threshold);
        // A NaN score would make every threshold comparison silently false;
        // surface it as a per-field failure instead.
        if output.score.is_some_and(|score| !score.is_finite()) {
            Err(MetricError::new(MetricErrorKind::NonFiniteScore {
                metric: metric.to_string(),
                field: field.field_name.clone(),
            }))?;
        }
        Ok(output)
    }

    /// Hand a drifted field to the notification sink.
    async fn notify_drift(
        &self,
        job: &JobConfig,
        field: &SchemaField,
        result: &DriftResult,
    ) -> DriftwatchResult<()> {
        // is_drifted implies a score is present
        let score = result.score.unwrap_or_default();
        let severity = Notification::grade_severity(score, result.threshold);
        let message = format!(
            "Drift detected in field \"{}\" ({}): {} = {:.6} (threshold: {})",
            field.field_name, field.direction, result.metric_name, score, result.threshold,
        );
        info!(field = %field.field_name, %severity, "Creating drift notification");
        self.notifications
            .create_notification(Notification {
                model_version_id: job.model_version_id,
                title: format!("Drift detected: {}", field.field_name),
                severity,
                message,
            })
            .await
            .map_err(|e| {
                StoreError::new(StoreErrorKind::NotificationFailed(e.to_string())).into()
            })
    }
}

/// Whether a field's error was an absent reference set.
fn is_reference_missing(err: &DriftwatchError) -> bool {
    match err.kind() {
        DriftwatchErrorKind::Store(store) => {
            matches!(store.kind, StoreErrorKind::ReferenceMissing(_))
        }
        _ => false,
    }
}

/// The metric and threshold snapshot for a field, falling back to the
/// data-type default metric when the configured override is invalid.
fn resolve_metric_and_threshold(field: &SchemaField) -> (MetricName, f64) {
    let metric = select_metric(field.data_type, field.drift_metric)
        .unwrap_or_else(|_| match select_metric(field.data_type, None) {
            Ok(m) => m,
            // Both data types have a default, so this arm is unreachable.
            Err(_) => MetricName::Psi,
        });
    let threshold = field
        .alert_threshold
        .unwrap_or_else(|| default_threshold(metric));
    (metric, threshold)
}

/// Turn a metric output into a persisted result with window diagnostics.
fn result_from_output(
    run_id: Uuid,
    field: &SchemaField,
    threshold: f64,
    output: MetricOutput,
    window: &ResolvedWindow,
) -> DriftResult {
    let output = output.with_window(window.diagnostics());
    match output.score {
        Some(score) => DriftResult::scored(
            run_id,
            field.id,
            &field.field_name,
            output.metric_name,
            score,
            threshold,
            output.details,
        ),
        None => DriftResult::unscored(
            run_id,
            field.id,
            &field.field_name,
            output.metric_name,
            threshold,
            output.details,
        ),
    }
}

/// A per-field failure marker result.
fn failed_result(
    run_id: Uuid,
    field: &SchemaField,
    metric: MetricName,
    threshold: f64,
    error: String,
    window: &ResolvedWindow,
) -> DriftResult {
    DriftResult::unscored(
        run_id,
        field.id,
        &field.field_name,
        metric,
        threshold,
        json!({
            "status": "failed",
            "error": error,
            "window": window.diagnostics(),
        }),
    )
}
