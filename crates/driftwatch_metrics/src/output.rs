//! Result container for a single metric computation.

use driftwatch_core::MetricName;
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

/// The outcome of scoring one field pair with one metric.
///
/// `score` is `None` when the pair could not be scored; the details bag then
/// carries a `"status": "insufficient_data"` marker and counts describing
/// what was seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricOutput {
    /// The metric that produced this output
    pub metric_name: MetricName,
    /// The drift score, `None` when unscorable
    pub score: Option<f64>,
    /// Whether `score > threshold`
    pub is_drifted: bool,
    /// Structured diagnostics
    pub details: JsonValue,
}

impl MetricOutput {
    /// A scored output; drift is derived from the score and threshold.
    pub fn scored(metric_name: MetricName, score: f64, threshold: f64, details: JsonValue) -> Self {
        Self {
            metric_name,
            score: Some(score),
            is_drifted: score > threshold,
            details,
        }
    }

    /// An insufficient-data output: never drifted, never a crash.
    pub fn insufficient(
        metric_name: MetricName,
        reason: &str,
        reference_count: usize,
        current_count: usize,
    ) -> Self {
        Self {
            metric_name,
            score: None,
            is_drifted: false,
            details: json!({
                "status": "insufficient_data",
                "reason": reason,
                "reference_count": reference_count,
                "current_count": current_count,
            }),
        }
    }

    /// Attach window diagnostics to the details bag.
    pub fn with_window(mut self, window: JsonValue) -> Self {
        if let JsonValue::Object(map) = &mut self.details {
            map.insert("window".to_string(), window);
        }
        self
    }
}
