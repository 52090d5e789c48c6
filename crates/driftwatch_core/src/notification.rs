//! Drift notifications handed to the external notification sink.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification severity levels.
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
pub enum NotificationSeverity {
    /// Informational
    Info,
    /// Drift moderately above the threshold
    Warning,
    /// Drift far above the threshold
    Critical,
}

/// Payload for one drifted-field notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// The model version whose field drifted
    pub model_version_id: Uuid,
    /// Short title for notification lists
    pub title: String,
    /// Severity graded by how far the score exceeds the threshold
    pub severity: NotificationSeverity,
    /// Human-readable description with metric, score, and threshold
    pub message: String,
}

impl Notification {
    /// Grade severity by how far a score exceeds its threshold.
    ///
    /// Bounded-score metrics (the `1 - p` convention, thresholds near 1.0)
    /// escalate past the midpoint between threshold and 1.0; distance metrics
    /// (PSI, JSD, KS statistic) escalate past double the threshold.
    pub fn grade_severity(score: f64, threshold: f64) -> NotificationSeverity {
        const BOUNDED_METRIC_THRESHOLD: f64 = 0.5;

        let critical = if threshold >= BOUNDED_METRIC_THRESHOLD {
            score > (1.0 + threshold) / 2.0
        } else {
            score > threshold * 2.0
        };
        if critical {
            NotificationSeverity::Critical
        } else {
            NotificationSeverity::Warning
        }
    }
}
