//! Metric computation error types.

/// Kinds of metric computation errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum MetricErrorKind {
    /// Metric math produced a non-finite value
    #[display("Non-finite {} score for field {}", metric, field)]
    NonFiniteScore {
        /// The metric that produced the value
        metric: String,
        /// The field being scored
        field: String,
    },
    /// Per-field evaluation exceeded its deadline
    #[display("Evaluation of field {} timed out after {}s", field, seconds)]
    Timeout {
        /// The field being evaluated
        field: String,
        /// The configured deadline in seconds
        seconds: u64,
    },
}

/// Metric error with location tracking.
///
/// # Examples
///
/// ```
/// use driftwatch_error::{MetricError, MetricErrorKind};
///
/// let err = MetricError::new(MetricErrorKind::Timeout {
///     field: "age".to_string(),
///     seconds: 30,
/// });
/// assert!(format!("{}", err).contains("age"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Metric Error: {} at line {} in {}", kind, line, file)]
pub struct MetricError {
    /// The kind of error that occurred
    pub kind: MetricErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl MetricError {
    /// Create a new metric error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: MetricErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
