//! Population Stability Index for numerical feature drift.

use crate::{BucketPartition, EPSILON, MetricOutput, NumericalSummary};
use driftwatch_core::MetricName;
use serde_json::json;

/// Compute PSI between two numerical summaries built over the same
/// partition.
///
/// For each bucket, `contribution = (cur% - ref%) * ln(cur% / ref%)`; empty
/// buckets on either side take a floor probability so the log ratio stays
/// finite. Each contribution is non-negative, so PSI >= 0.
///
/// # Examples
///
/// ```
/// use driftwatch_metrics::{BucketPartition, NumericalSummary, psi};
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let partition = BucketPartition::from_reference(&values, 10).unwrap();
/// let summary = NumericalSummary::build(&values, 0, &partition);
/// let output = psi(&summary, &summary, &partition, 0.2);
/// assert_eq!(output.score, Some(0.0));
/// assert!(!output.is_drifted);
/// ```
pub fn psi(
    reference: &NumericalSummary,
    current: &NumericalSummary,
    partition: &BucketPartition,
    threshold: f64,
) -> MetricOutput {
    if reference.count == 0 || current.count == 0 {
        return MetricOutput::insufficient(
            MetricName::Psi,
            "empty sample",
            reference.count as usize,
            current.count as usize,
        );
    }

    let ref_pcts: Vec<f64> = reference
        .proportions()
        .into_iter()
        .map(|p| if p == 0.0 { EPSILON } else { p })
        .collect();
    let cur_pcts: Vec<f64> = current
        .proportions()
        .into_iter()
        .map(|p| if p == 0.0 { EPSILON } else { p })
        .collect();

    let contributions: Vec<f64> = ref_pcts
        .iter()
        .zip(&cur_pcts)
        .map(|(&r, &c)| (c - r) * (c / r).ln())
        .collect();
    let total: f64 = contributions.iter().sum();

    let buckets: Vec<_> = partition
        .ranges()
        .iter()
        .enumerate()
        .map(|(i, (lo, hi))| {
            json!({
                "range": format!("{lo:.2}-{hi:.2}"),
                "reference_pct": ref_pcts[i] * 100.0,
                "current_pct": cur_pcts[i] * 100.0,
                "psi_contribution": contributions[i],
            })
        })
        .collect();

    MetricOutput::scored(
        MetricName::Psi,
        total,
        threshold,
        json!({
            "total_psi": total,
            "buckets": buckets,
            "reference_count": reference.count,
            "current_count": current.count,
        }),
    )
}
