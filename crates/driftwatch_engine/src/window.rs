//! Comparison window resolution with geometric extension.

use crate::interface::DataStore;
use chrono::{DateTime, Duration, Utc};
use driftwatch_core::WindowSize;
use driftwatch_error::DriftwatchResult;
use serde_json::{Value as JsonValue, json};
use tracing::debug;
use uuid::Uuid;

/// Tunable constants for window resolution.
///
/// The configured window is doubled while the sample probe comes back below
/// `min_samples`, up to `max_extension_multiple` times the configured
/// length. A window still short of `min_samples` at the cap proceeds anyway,
/// marked low-confidence, so data scarcity never blocks a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    /// Multiplier applied at each extension step
    pub extension_factor: u32,
    /// Hard cap as a multiple of the configured window
    pub max_extension_multiple: u32,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            extension_factor: 2,
            max_extension_multiple: 4,
        }
    }
}

/// The actual date range a comparison will query, plus diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWindow {
    /// Start of the current window
    pub from: DateTime<Utc>,
    /// End of the current window (the period end)
    pub to: DateTime<Utc>,
    /// The window length the operator configured
    pub configured: Duration,
    /// The window length actually used after extension
    pub actual: Duration,
    /// Whether the window was extended beyond its configured length
    pub window_extended: bool,
    /// The minimum sample count the resolver aimed for
    pub min_samples: u32,
    /// Records counted in the resolved window
    pub sample_count: u64,
    /// True when even the capped extension fell short of `min_samples`
    pub low_confidence: bool,
}

impl ResolvedWindow {
    /// Window diagnostics for the drift result details bag.
    pub fn diagnostics(&self) -> JsonValue {
        json!({
            "configured_window_days": self.configured.num_seconds() as f64 / 86_400.0,
            "actual_window_days": self.actual.num_seconds() as f64 / 86_400.0,
            "window_extended": self.window_extended,
            "min_samples": self.min_samples,
            "sample_count": self.sample_count,
            "low_confidence": self.low_confidence,
        })
    }

    /// The equal-length window immediately preceding this one, used as the
    /// rolling-window baseline.
    pub fn preceding(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.from - self.actual, self.from)
    }
}

/// Resolves the date range a comparison should query, extending the
/// configured window backward when the sample is too small.
pub struct WindowResolver<'a> {
    data: &'a dyn DataStore,
    policy: WindowPolicy,
}

impl<'a> WindowResolver<'a> {
    /// Create a resolver over a data store with the given policy.
    pub fn new(data: &'a dyn DataStore, policy: WindowPolicy) -> Self {
        Self { data, policy }
    }

    /// Resolve the window ending at `period_end`.
    ///
    /// Probes the sample count and doubles the window while it falls short
    /// of `min_samples`, up to the policy cap. Only the current side of a
    /// comparison is ever extended; the reference set is whole and has no
    /// window.
    pub async fn resolve(
        &self,
        version_id: Uuid,
        period_end: DateTime<Utc>,
        configured: WindowSize,
        min_samples: u32,
    ) -> DriftwatchResult<ResolvedWindow> {
        let configured = configured.as_duration();
        let cap = configured * self.policy.max_extension_multiple as i32;

        let mut actual = configured;
        let mut sample_count = self
            .data
            .count_records(version_id, period_end - actual, period_end)
            .await?;

        while sample_count < min_samples as u64 && actual < cap {
            actual = std::cmp::min(actual * self.policy.extension_factor as i32, cap);
            sample_count = self
                .data
                .count_records(version_id, period_end - actual, period_end)
                .await?;
            debug!(
                window_days = actual.num_days(),
                sample_count, "Extended comparison window"
            );
        }

        Ok(ResolvedWindow {
            from: period_end - actual,
            to: period_end,
            configured,
            actual,
            window_extended: actual > configured,
            min_samples,
            sample_count,
            low_confidence: sample_count < min_samples as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use driftwatch_core::FieldDirection;
    use std::sync::Mutex;

    /// Data store stub whose count probe returns a scripted sequence.
    struct ScriptedCounts {
        counts: Mutex<Vec<u64>>,
    }

    impl ScriptedCounts {
        fn new(counts: Vec<u64>) -> Self {
            Self {
                counts: Mutex::new(counts),
            }
        }
    }

    #[async_trait]
    impl DataStore for ScriptedCounts {
        async fn fetch_records(
            &self,
            _: Uuid,
            _: &str,
            _: FieldDirection,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
        ) -> DriftwatchResult<Vec<JsonValue>> {
            Ok(vec![])
        }

        async fn fetch_reference(
            &self,
            _: Uuid,
            _: &str,
            _: FieldDirection,
        ) -> DriftwatchResult<Vec<JsonValue>> {
            Ok(vec![])
        }

        async fn count_records(
            &self,
            _: Uuid,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
        ) -> DriftwatchResult<u64> {
            let mut counts = self.counts.lock().unwrap();
            Ok(if counts.len() > 1 {
                counts.remove(0)
            } else {
                counts[0]
            })
        }

        async fn earliest_record(&self, _: Uuid) -> DriftwatchResult<Option<DateTime<Utc>>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_no_extension_when_samples_suffice() {
        let data = ScriptedCounts::new(vec![500]);
        let resolver = WindowResolver::new(&data, WindowPolicy::default());
        let window = resolver
            .resolve(Uuid::new_v4(), Utc::now(), WindowSize::days(7), 200)
            .await
            .unwrap();
        assert!(!window.window_extended);
        assert_eq!(window.actual, Duration::days(7));
        assert!(!window.low_confidence);
        assert_eq!(window.sample_count, 500);
    }

    #[tokio::test]
    async fn test_doubles_until_min_samples_met() {
        // 7d -> 14d -> 28d
        let data = ScriptedCounts::new(vec![50, 120, 300]);
        let resolver = WindowResolver::new(&data, WindowPolicy::default());
        let window = resolver
            .resolve(Uuid::new_v4(), Utc::now(), WindowSize::days(7), 200)
            .await
            .unwrap();
        assert!(window.window_extended);
        assert_eq!(window.actual, Duration::days(28));
        assert!(!window.low_confidence);
    }

    #[tokio::test]
    async fn test_never_extends_past_cap() {
        let data = ScriptedCounts::new(vec![0]);
        let resolver = WindowResolver::new(&data, WindowPolicy::default());
        let window = resolver
            .resolve(Uuid::new_v4(), Utc::now(), WindowSize::days(7), 200)
            .await
            .unwrap();
        // 4x cap on a 7 day window
        assert_eq!(window.actual, Duration::days(28));
        assert!(window.window_extended);
        assert!(window.low_confidence);
        assert_eq!(window.sample_count, 0);
    }

    #[tokio::test]
    async fn test_extended_iff_actual_exceeds_configured() {
        for counts in [vec![300u64], vec![10, 300]] {
            let data = ScriptedCounts::new(counts);
            let resolver = WindowResolver::new(&data, WindowPolicy::default());
            let window = resolver
                .resolve(Uuid::new_v4(), Utc::now(), WindowSize::days(7), 200)
                .await
                .unwrap();
            assert_eq!(window.window_extended, window.actual > window.configured);
        }
    }

    #[tokio::test]
    async fn test_diagnostics_shape() {
        let data = ScriptedCounts::new(vec![10, 250]);
        let resolver = WindowResolver::new(&data, WindowPolicy::default());
        let window = resolver
            .resolve(Uuid::new_v4(), Utc::now(), WindowSize::days(7), 200)
            .await
            .unwrap();
        let diag = window.diagnostics();
        assert_eq!(diag["configured_window_days"], 7.0);
        assert_eq!(diag["actual_window_days"], 14.0);
        assert_eq!(diag["window_extended"], true);
        assert_eq!(diag["sample_count"], 250);
        assert_eq!(diag["low_confidence"], false);
    }

    #[tokio::test]
    async fn test_preceding_window_abuts_current() {
        let data = ScriptedCounts::new(vec![300]);
        let resolver = WindowResolver::new(&data, WindowPolicy::default());
        let end = Utc::now();
        let window = resolver
            .resolve(Uuid::new_v4(), end, WindowSize::days(7), 200)
            .await
            .unwrap();
        let (prev_from, prev_to) = window.preceding();
        assert_eq!(prev_to, window.from);
        assert_eq!(prev_from, window.from - window.actual);
    }
}
