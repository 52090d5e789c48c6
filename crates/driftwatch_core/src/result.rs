//! Persisted drift results.

use crate::MetricName;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// The scored comparison for one field in one job run.
///
/// Immutable after creation. `score` is `None` when the field could not be
/// scored (insufficient data or a per-field failure); in that case
/// `is_drifted` is false and `details` carries a `"status"` marker.
///
/// # Examples
///
/// ```
/// use driftwatch_core::{DriftResult, MetricName};
/// use uuid::Uuid;
///
/// let result = DriftResult::scored(
///     Uuid::new_v4(),
///     Uuid::new_v4(),
///     "age",
///     MetricName::Psi,
///     0.37,
///     0.2,
///     serde_json::json!({}),
/// );
/// assert!(result.is_drifted);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftResult {
    /// Unique result id
    pub id: Uuid,
    /// The run that produced this result
    pub job_run_id: Uuid,
    /// The schema field that was scored
    pub schema_field_id: Uuid,
    /// Field name, denormalized for history listings
    pub field_name: String,
    /// The metric that scored the field
    pub metric_name: MetricName,
    /// The drift score; `None` when the field could not be scored
    pub score: Option<f64>,
    /// The threshold the score was compared against
    pub threshold: f64,
    /// Whether `score > threshold`
    pub is_drifted: bool,
    /// Structured diagnostics (bucket breakdowns, window info, status markers)
    pub details: JsonValue,
}

impl DriftResult {
    /// A scored result; `is_drifted` is derived from the score and threshold.
    pub fn scored(
        job_run_id: Uuid,
        schema_field_id: Uuid,
        field_name: impl Into<String>,
        metric_name: MetricName,
        score: f64,
        threshold: f64,
        details: JsonValue,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_run_id,
            schema_field_id,
            field_name: field_name.into(),
            metric_name,
            score: Some(score),
            threshold,
            is_drifted: score > threshold,
            details,
        }
    }

    /// An unscored result recording why the field produced no score.
    pub fn unscored(
        job_run_id: Uuid,
        schema_field_id: Uuid,
        field_name: impl Into<String>,
        metric_name: MetricName,
        threshold: f64,
        details: JsonValue,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_run_id,
            schema_field_id,
            field_name: field_name.into(),
            metric_name,
            score: None,
            threshold,
            is_drifted: false,
            details,
        }
    }
}
