//! Jensen-Shannon divergence for categorical feature drift.

use crate::{CategoricalSummary, MetricOutput};
use driftwatch_core::MetricName;
use serde_json::json;
use std::collections::BTreeSet;

/// Compute the Jensen-Shannon divergence between two categorical summaries.
///
/// Probability vectors are built over the union of categories with zero fill
/// for absent ones; with the midpoint M = (A + B) / 2 the divergence is
/// `(KL(A||M) + KL(B||M)) / 2` in log base 2, bounded in [0, 1]. Symmetric
/// in its arguments.
///
/// # Examples
///
/// ```
/// use driftwatch_metrics::{CategoricalSummary, js_divergence};
///
/// let sample: Vec<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
/// let summary = CategoricalSummary::build(&sample, 0);
/// let output = js_divergence(&summary, &summary, 0.1);
/// assert_eq!(output.score, Some(0.0));
/// ```
pub fn js_divergence(
    reference: &CategoricalSummary,
    current: &CategoricalSummary,
    threshold: f64,
) -> MetricOutput {
    if reference.total_count == 0 || current.total_count == 0 {
        return MetricOutput::insufficient(
            MetricName::JsDivergence,
            "empty sample",
            reference.total_count as usize,
            current.total_count as usize,
        );
    }

    let union: BTreeSet<&String> = reference.counts.keys().chain(current.counts.keys()).collect();
    if union.is_empty() {
        return MetricOutput::insufficient(
            MetricName::JsDivergence,
            "empty category union",
            reference.total_count as usize,
            current.total_count as usize,
        );
    }

    let ref_prob: Vec<f64> = union
        .iter()
        .map(|cat| {
            reference.counts.get(*cat).copied().unwrap_or(0) as f64 / reference.total_count as f64
        })
        .collect();
    let cur_prob: Vec<f64> = union
        .iter()
        .map(|cat| {
            current.counts.get(*cat).copied().unwrap_or(0) as f64 / current.total_count as f64
        })
        .collect();

    let midpoint: Vec<f64> = ref_prob
        .iter()
        .zip(&cur_prob)
        .map(|(&a, &b)| (a + b) / 2.0)
        .collect();
    let divergence =
        (kl_divergence_base2(&ref_prob, &midpoint) + kl_divergence_base2(&cur_prob, &midpoint))
            / 2.0;
    // Floating point can nudge the sum a hair past the bound
    let divergence = divergence.clamp(0.0, 1.0);

    let categories: Vec<_> = union
        .iter()
        .enumerate()
        .map(|(i, cat)| {
            json!({
                "value": cat,
                "reference_pct": ref_prob[i] * 100.0,
                "current_pct": cur_prob[i] * 100.0,
            })
        })
        .collect();

    MetricOutput::scored(
        MetricName::JsDivergence,
        divergence,
        threshold,
        json!({
            "jsd_value": divergence,
            "categories": categories,
            "reference_count": reference.total_count,
            "current_count": current.total_count,
        }),
    )
}

/// KL(P||Q) in log base 2; zero-probability P terms contribute nothing.
fn kl_divergence_base2(p: &[f64], q: &[f64]) -> f64 {
    p.iter()
        .zip(q)
        .filter(|&(&pi, _)| pi > 0.0)
        .map(|(&pi, &qi)| pi * (pi / qi).log2())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn summary(pairs: &[(&str, u64)]) -> CategoricalSummary {
        let mut values = Vec::new();
        for (cat, count) in pairs {
            for _ in 0..*count {
                values.push(cat.to_string());
            }
        }
        CategoricalSummary::build(&values, 0)
    }

    #[test]
    fn test_identical_distributions_score_zero() {
        let s = summary(&[("a", 30), ("b", 45), ("c", 25)]);
        let output = js_divergence(&s, &s, 0.1);
        assert_relative_eq!(output.score.unwrap(), 0.0, epsilon = 1e-12);
        assert!(!output.is_drifted);
    }

    #[test]
    fn test_disjoint_distributions_score_one() {
        let reference = summary(&[("a", 50)]);
        let current = summary(&[("b", 50)]);
        let output = js_divergence(&reference, &current, 0.1);
        assert_relative_eq!(output.score.unwrap(), 1.0, epsilon = 1e-12);
        assert!(output.is_drifted);
    }

    #[test]
    fn test_symmetry() {
        let a = summary(&[("x", 70), ("y", 20), ("z", 10)]);
        let b = summary(&[("x", 30), ("y", 30), ("z", 40)]);
        let forward = js_divergence(&a, &b, 0.1);
        let backward = js_divergence(&b, &a, 0.1);
        assert_relative_eq!(
            forward.score.unwrap(),
            backward.score.unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_absent_category_zero_filled() {
        let reference = summary(&[("a", 60), ("b", 40)]);
        let current = summary(&[("a", 50), ("c", 50)]);
        let output = js_divergence(&reference, &current, 0.1);
        let score = output.score.unwrap();
        assert!(score.is_finite());
        assert!(score > 0.0);
    }

    #[test]
    fn test_empty_side_is_insufficient() {
        let reference = summary(&[("a", 10)]);
        let empty = CategoricalSummary::build(&[], 0);
        let output = js_divergence(&reference, &empty, 0.1);
        assert!(output.score.is_none());
    }

    proptest! {
        #[test]
        fn prop_jsd_symmetric_and_bounded(
            a_counts in proptest::collection::vec(1u64..200, 2..6),
            b_counts in proptest::collection::vec(1u64..200, 2..6),
        ) {
            let a_pairs: Vec<(String, u64)> = a_counts
                .iter()
                .enumerate()
                .map(|(i, &c)| (format!("cat{i}"), c))
                .collect();
            let b_pairs: Vec<(String, u64)> = b_counts
                .iter()
                .enumerate()
                .map(|(i, &c)| (format!("cat{i}"), c))
                .collect();
            let a_refs: Vec<(&str, u64)> =
                a_pairs.iter().map(|(s, c)| (s.as_str(), *c)).collect();
            let b_refs: Vec<(&str, u64)> =
                b_pairs.iter().map(|(s, c)| (s.as_str(), *c)).collect();

            let a = summary(&a_refs);
            let b = summary(&b_refs);
            let forward = js_divergence(&a, &b, 0.1).score.unwrap();
            let backward = js_divergence(&b, &a, 0.1).score.unwrap();

            prop_assert!((forward - backward).abs() < 1e-10);
            prop_assert!((0.0..=1.0).contains(&forward));
        }
    }
}
