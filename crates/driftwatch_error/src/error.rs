//! Top-level error wrapper types.

use crate::{ConfigError, MetricError, SchedulerError, StoreError};

/// The foundation error enum aggregating every Driftwatch concern.
///
/// # Examples
///
/// ```
/// use driftwatch_error::{DriftwatchError, StoreError, StoreErrorKind};
///
/// let store_err = StoreError::new(StoreErrorKind::FetchFailed("timeout".to_string()));
/// let err: DriftwatchError = store_err.into();
/// assert!(format!("{}", err).contains("Store Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum DriftwatchErrorKind {
    /// Job configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Collaborator store error
    #[from(StoreError)]
    Store(StoreError),
    /// Metric computation error
    #[from(MetricError)]
    Metric(MetricError),
    /// Scheduler error
    #[from(SchedulerError)]
    Scheduler(SchedulerError),
}

/// Driftwatch error with kind discrimination.
///
/// # Examples
///
/// ```
/// use driftwatch_error::{DriftwatchResult, ConfigError, ConfigErrorKind};
///
/// fn might_fail() -> DriftwatchResult<()> {
///     Err(ConfigError::new(ConfigErrorKind::NonPositiveMinSamples(0)))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Driftwatch Error: {}", _0)]
pub struct DriftwatchError(Box<DriftwatchErrorKind>);

impl DriftwatchError {
    /// Create a new error from a kind.
    pub fn new(kind: DriftwatchErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &DriftwatchErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to DriftwatchErrorKind
impl<T> From<T> for DriftwatchError
where
    T: Into<DriftwatchErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Driftwatch operations.
///
/// # Examples
///
/// ```
/// use driftwatch_error::{DriftwatchResult, SchedulerError, SchedulerErrorKind};
///
/// fn trigger() -> DriftwatchResult<()> {
///     Err(SchedulerError::new(SchedulerErrorKind::UnknownJob("missing".to_string())))?
/// }
/// ```
pub type DriftwatchResult<T> = std::result::Result<T, DriftwatchError>;
