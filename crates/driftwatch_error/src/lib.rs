//! Error types for the Driftwatch drift detection engine.
//!
//! This crate provides the foundation error types used throughout the
//! Driftwatch workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use driftwatch_error::{ConfigError, ConfigErrorKind, DriftwatchResult};
//!
//! fn parse_schedule(expr: &str) -> DriftwatchResult<()> {
//!     Err(ConfigError::new(ConfigErrorKind::InvalidCron(expr.to_string())))?
//! }
//!
//! match parse_schedule("not a cron") {
//!     Ok(_) => println!("Parsed"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod metric;
mod scheduler;
mod store;

pub use config::{ConfigError, ConfigErrorKind};
pub use error::{DriftwatchError, DriftwatchErrorKind, DriftwatchResult};
pub use metric::{MetricError, MetricErrorKind};
pub use scheduler::{SchedulerError, SchedulerErrorKind};
pub use store::{StoreError, StoreErrorKind};
