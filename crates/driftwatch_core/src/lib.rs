//! Domain model for the Driftwatch drift detection engine.
//!
//! This crate defines the persisted entities (job configs, job runs, drift
//! results), the schema field descriptions the evaluator iterates over, and
//! the window-size parsing shared by the scheduler and window resolver.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod field;
mod job;
mod notification;
mod result;
mod run;
mod window_size;

pub use field::{DataType, FieldDirection, MetricName, SchemaField};
pub use job::{ComparisonType, JobConfig, JobConfigUpdate, normalize_cron};
pub use notification::{Notification, NotificationSeverity};
pub use result::DriftResult;
pub use run::{JobRun, JobRunSummary, JobStatus};
pub use window_size::WindowSize;
