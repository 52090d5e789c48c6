//! Job scheduler error types.

/// Kinds of scheduler errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum SchedulerErrorKind {
    /// No job config registered under the given id
    #[display("Unknown job: {}", _0)]
    UnknownJob(String),
    /// A run for the same job config is already in flight
    #[display("Job {} already has a running job run", _0)]
    AlreadyRunning(String),
}

/// Scheduler error with location tracking.
///
/// # Examples
///
/// ```
/// use driftwatch_error::{SchedulerError, SchedulerErrorKind};
///
/// let err = SchedulerError::new(SchedulerErrorKind::AlreadyRunning("job-1".to_string()));
/// assert!(format!("{}", err).contains("already"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Scheduler Error: {} at line {} in {}", kind, line, file)]
pub struct SchedulerError {
    /// The kind of error that occurred
    pub kind: SchedulerErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SchedulerError {
    /// Create a new scheduler error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SchedulerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
