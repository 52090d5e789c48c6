//! Job configuration for scheduled drift checks.

use crate::WindowSize;
use driftwatch_error::{ConfigError, ConfigErrorKind, DriftwatchResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// How the current data window is compared against a baseline.
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
pub enum ComparisonType {
    /// Compare against the stored reference (e.g. training) distribution
    VsReference,
    /// Compare against the immediately preceding window of equal size
    RollingWindow,
}

/// Normalize a 5-field cron expression to the 6-field grammar the `cron`
/// crate parses, validating it in the process.
///
/// The operator-facing schedule format is the classic 5-field form
/// (minute hour day month weekday); the `cron` crate wants a leading
/// seconds field.
///
/// # Examples
///
/// ```
/// use driftwatch_core::normalize_cron;
///
/// assert_eq!(normalize_cron("0 9 * * *").unwrap(), "0 0 9 * * *");
/// assert!(normalize_cron("not a cron").is_err());
/// ```
pub fn normalize_cron(expression: &str) -> Result<String, ConfigError> {
    let trimmed = expression.trim();
    if trimmed.split_whitespace().count() != 5 {
        return Err(ConfigError::new(ConfigErrorKind::InvalidCron(
            expression.to_string(),
        )));
    }
    let normalized = format!("0 {trimmed}");
    cron::Schedule::from_str(&normalized)
        .map_err(|_| ConfigError::new(ConfigErrorKind::InvalidCron(expression.to_string())))?;
    Ok(normalized)
}

/// A schedule for running drift checks against one model version.
///
/// One config is auto-created per model version; operators may edit the
/// schedule, comparison type, window size, and minimum sample count. Edits
/// take effect at the next due check or explicit trigger and never affect an
/// in-flight run.
///
/// # Examples
///
/// ```
/// use driftwatch_core::{ComparisonType, JobConfig};
/// use uuid::Uuid;
///
/// let config = JobConfig::new(
///     Uuid::new_v4(),
///     "daily drift check",
///     "0 9 * * *",
///     ComparisonType::VsReference,
///     "7d".parse().unwrap(),
///     200,
/// )
/// .unwrap();
/// assert!(config.is_active);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Unique config id
    pub id: Uuid,
    /// The model version this config monitors
    pub model_version_id: Uuid,
    /// Operator-facing name
    pub name: String,
    /// 5-field cron expression
    pub schedule: String,
    /// Comparison mode
    pub comparison_type: ComparisonType,
    /// Configured comparison window
    pub window_size: WindowSize,
    /// Minimum samples the window resolver aims for
    pub min_samples: u32,
    /// Whether the scheduler considers this config at due checks
    pub is_active: bool,
}

impl JobConfig {
    /// Create and validate a new job config.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the cron expression does not parse
    /// or `min_samples` is zero.
    pub fn new(
        model_version_id: Uuid,
        name: impl Into<String>,
        schedule: impl Into<String>,
        comparison_type: ComparisonType,
        window_size: WindowSize,
        min_samples: u32,
    ) -> DriftwatchResult<Self> {
        let config = Self {
            id: Uuid::new_v4(),
            model_version_id,
            name: name.into(),
            schedule: schedule.into(),
            comparison_type,
            window_size,
            min_samples,
            is_active: true,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the schedule and sample constraints.
    pub fn validate(&self) -> DriftwatchResult<()> {
        normalize_cron(&self.schedule)?;
        if self.min_samples == 0 {
            Err(ConfigError::new(ConfigErrorKind::NonPositiveMinSamples(0)))?;
        }
        Ok(())
    }

    /// Apply a validated update in place.
    ///
    /// All changes are validated before any is applied, so a rejected update
    /// leaves the config untouched.
    pub fn apply(&mut self, update: JobConfigUpdate) -> DriftwatchResult<()> {
        let mut candidate = self.clone();
        if let Some(schedule) = update.schedule {
            candidate.schedule = schedule;
        }
        if let Some(comparison_type) = update.comparison_type {
            candidate.comparison_type = comparison_type;
        }
        if let Some(window_size) = update.window_size {
            candidate.window_size = window_size;
        }
        if let Some(min_samples) = update.min_samples {
            candidate.min_samples = min_samples;
        }
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }
}

/// A partial edit to a job config; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobConfigUpdate {
    /// New 5-field cron expression
    pub schedule: Option<String>,
    /// New comparison mode
    pub comparison_type: Option<ComparisonType>,
    /// New comparison window
    pub window_size: Option<WindowSize>,
    /// New minimum sample count
    pub min_samples: Option<u32>,
}
