//! Distribution summaries and drift metric calculators.
//!
//! This crate turns raw field samples into per-field distribution summaries
//! and scores pairs of summaries with one of four metrics: PSI and the
//! two-sample KS test for numerical fields, Chi-Squared and Jensen-Shannon
//! divergence for categorical fields.
//!
//! All metrics follow the same orientation: higher score means more drift,
//! and a field is drifted when `score > threshold`. The Chi-Squared and KS
//! p-values are retained in the details bag for interpretation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chi_squared;
mod js_divergence;
mod ks;
mod output;
mod psi;
mod registry;
mod summary;

pub use chi_squared::chi_squared;
pub use js_divergence::js_divergence;
pub use ks::ks_test;
pub use output::MetricOutput;
pub use psi::psi;
pub use registry::{compute_drift, default_threshold, select_metric};
pub use summary::{
    BucketPartition, CategoricalSummary, NumericalSummary, categorical_values, numerical_values,
};

/// Floor probability substituted for empty buckets so log ratios stay finite.
pub const EPSILON: f64 = 1e-4;

/// Fixed histogram bucket count for numerical summaries.
pub const BUCKET_COUNT: usize = 10;

/// Number of categories retained in the display truncation of a
/// categorical summary. Metric computation always sees the full set.
pub const TOP_CATEGORIES: usize = 10;
