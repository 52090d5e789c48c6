//! Chi-squared test for categorical feature drift.

use crate::{CategoricalSummary, MetricOutput};
use driftwatch_core::MetricName;
use serde_json::json;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::collections::BTreeSet;

/// Pseudocount applied to categories absent from the reference side, so an
/// unseen category never produces a zero expected count.
const UNSEEN_PSEUDOCOUNT: f64 = 0.5;

/// Compute the chi-squared test between two categorical summaries.
///
/// Category sets are aligned on their union with missing categories treated
/// as zero counts; expected counts come from the reference proportions
/// scaled to the current total. The reported score is `1 - p_value` so that
/// `score > threshold` means more drift, matching the other metrics; the raw
/// statistic and p-value stay in the details.
///
/// # Examples
///
/// ```
/// use driftwatch_metrics::{CategoricalSummary, chi_squared};
///
/// let sample: Vec<String> = ["a", "a", "b"].iter().map(|s| s.to_string()).collect();
/// let summary = CategoricalSummary::build(&sample, 0);
/// let output = chi_squared(&summary, &summary, 0.95);
/// assert!(!output.is_drifted);
/// ```
pub fn chi_squared(
    reference: &CategoricalSummary,
    current: &CategoricalSummary,
    threshold: f64,
) -> MetricOutput {
    if reference.total_count == 0 || current.total_count == 0 {
        return MetricOutput::insufficient(
            MetricName::ChiSquared,
            "empty sample",
            reference.total_count as usize,
            current.total_count as usize,
        );
    }

    let union: BTreeSet<&String> = reference.counts.keys().chain(current.counts.keys()).collect();
    if union.len() < 2 {
        return MetricOutput::insufficient(
            MetricName::ChiSquared,
            "fewer than 2 categories",
            reference.total_count as usize,
            current.total_count as usize,
        );
    }

    // Reference cells, with a pseudocount for categories the reference has
    // never seen so expected counts stay positive.
    let ref_cells: Vec<f64> = union
        .iter()
        .map(|cat| {
            let count = reference.counts.get(*cat).copied().unwrap_or(0);
            if count == 0 {
                UNSEEN_PSEUDOCOUNT
            } else {
                count as f64
            }
        })
        .collect();
    let ref_total: f64 = ref_cells.iter().sum();
    let cur_total = current.total_count as f64;

    let mut statistic = 0.0f64;
    let mut categories = Vec::with_capacity(union.len());
    for (cat, &ref_cell) in union.iter().zip(&ref_cells) {
        let observed = current.counts.get(*cat).copied().unwrap_or(0) as f64;
        let expected = ref_cell / ref_total * cur_total;
        statistic += (observed - expected).powi(2) / expected;
        categories.push(json!({
            "value": cat,
            "expected_pct": expected / cur_total * 100.0,
            "actual_pct": observed / cur_total * 100.0,
        }));
    }

    let df = (union.len() - 1) as f64;
    let Ok(distribution) = ChiSquared::new(df) else {
        return MetricOutput::insufficient(
            MetricName::ChiSquared,
            "degenerate degrees of freedom",
            reference.total_count as usize,
            current.total_count as usize,
        );
    };
    let p_value = (1.0 - distribution.cdf(statistic)).clamp(0.0, 1.0);
    let score = 1.0 - p_value;

    MetricOutput::scored(
        MetricName::ChiSquared,
        score,
        threshold,
        json!({
            "statistic": statistic,
            "p_value": p_value,
            "degrees_of_freedom": df,
            "categories": categories,
            "reference_count": reference.total_count,
            "current_count": current.total_count,
        }),
    )
}
