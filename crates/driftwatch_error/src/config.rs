//! Job configuration error types.

/// Kinds of configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ConfigErrorKind {
    /// Cron expression failed to parse
    #[display("Invalid cron expression: {}", _0)]
    InvalidCron(String),
    /// Window size string failed to parse
    #[display("Invalid window size: {}", _0)]
    InvalidWindowSize(String),
    /// Minimum sample count must be positive
    #[display("min_samples must be positive, got {}", _0)]
    NonPositiveMinSamples(i64),
    /// Configured metric is not valid for the field's data type
    #[display("Metric {} is not applicable to {} fields", metric, data_type)]
    MetricMismatch {
        /// The configured metric name
        metric: String,
        /// The field's data type
        data_type: String,
    },
}

/// Configuration error with location tracking.
///
/// # Examples
///
/// ```
/// use driftwatch_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::InvalidCron("* *".to_string()));
/// assert!(format!("{}", err).contains("cron"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Config Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new configuration error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
