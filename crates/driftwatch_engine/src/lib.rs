//! Drift evaluation, window resolution, and job scheduling.
//!
//! This crate orchestrates one drift detection run end to end: the scheduler
//! decides a run is due (or is told to trigger or backfill), the evaluator
//! iterates schema fields, the window resolver picks the comparison range,
//! and the metric calculators from `driftwatch_metrics` score each field.
//! Persistence, ingestion, and notification delivery live behind the
//! collaborator traits in [`interface`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod interface;

mod evaluator;
mod scheduler;
mod window;

pub use evaluator::{DriftEvaluator, EvaluatorConfig, RunKind};
pub use scheduler::{BackfillReport, CancellationFlag, JobScheduler};
pub use window::{ResolvedWindow, WindowPolicy, WindowResolver};
