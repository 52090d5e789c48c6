//! Collaborator store error types.

/// Kinds of store errors raised by external collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoreErrorKind {
    /// Schema fields could not be loaded for a model version
    #[display("Failed to load schema fields: {}", _0)]
    SchemaUnavailable(String),
    /// Record fetch from the data store failed
    #[display("Failed to fetch records: {}", _0)]
    FetchFailed(String),
    /// No reference data exists for the model version
    #[display("No reference data available for model version {}", _0)]
    ReferenceMissing(String),
    /// Persisting a job run or drift result failed
    #[display("Failed to persist {}: {}", entity, reason)]
    PersistFailed {
        /// The entity being persisted (job run, drift result)
        entity: String,
        /// The underlying failure description
        reason: String,
    },
    /// Notification sink rejected a notification
    #[display("Failed to create notification: {}", _0)]
    NotificationFailed(String),
}

/// Store error with location tracking.
///
/// # Examples
///
/// ```
/// use driftwatch_error::{StoreError, StoreErrorKind};
///
/// let err = StoreError::new(StoreErrorKind::FetchFailed("connection refused".to_string()));
/// assert!(format!("{}", err).contains("fetch"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
