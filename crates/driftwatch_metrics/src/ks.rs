//! Two-sample Kolmogorov-Smirnov test for numerical feature drift.

use crate::MetricOutput;
use driftwatch_core::MetricName;
use serde_json::json;

/// Compute the two-sample KS test over raw values.
///
/// The reported score is the KS statistic (max vertical distance between the
/// two empirical CDFs), so higher means more drift like every other metric;
/// the asymptotic p-value is retained in the details for interpretation.
/// Requires at least two values per side.
///
/// # Examples
///
/// ```
/// use driftwatch_metrics::ks_test;
///
/// let sample = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let output = ks_test(&sample, &sample, 0.1);
/// assert_eq!(output.score, Some(0.0));
/// assert!(!output.is_drifted);
/// ```
pub fn ks_test(reference: &[f64], current: &[f64], threshold: f64) -> MetricOutput {
    if reference.len() < 2 || current.len() < 2 {
        return MetricOutput::insufficient(
            MetricName::KsTest,
            "need at least 2 samples per side",
            reference.len(),
            current.len(),
        );
    }

    let mut ref_sorted = reference.to_vec();
    let mut cur_sorted = current.to_vec();
    ref_sorted.sort_by(|a, b| a.total_cmp(b));
    cur_sorted.sort_by(|a, b| a.total_cmp(b));

    let statistic = ks_statistic(&ref_sorted, &cur_sorted);
    let p_value = ks_p_value(statistic, ref_sorted.len(), cur_sorted.len());

    MetricOutput::scored(
        MetricName::KsTest,
        statistic,
        threshold,
        json!({
            "statistic": statistic,
            "p_value": p_value,
            "reference_count": reference.len(),
            "current_count": current.len(),
        }),
    )
}

/// Max absolute distance between the empirical CDFs of two sorted samples,
/// walking the pooled support.
fn ks_statistic(ref_sorted: &[f64], cur_sorted: &[f64]) -> f64 {
    let n1 = ref_sorted.len() as f64;
    let n2 = cur_sorted.len() as f64;
    let mut i = 0usize;
    let mut j = 0usize;
    let mut max_distance = 0.0f64;

    while i < ref_sorted.len() && j < cur_sorted.len() {
        let value = ref_sorted[i].min(cur_sorted[j]);
        while i < ref_sorted.len() && ref_sorted[i] <= value {
            i += 1;
        }
        while j < cur_sorted.len() && cur_sorted[j] <= value {
            j += 1;
        }
        let distance = (i as f64 / n1 - j as f64 / n2).abs();
        if distance > max_distance {
            max_distance = distance;
        }
    }
    max_distance
}

/// Asymptotic two-sample KS p-value (Numerical Recipes form).
fn ks_p_value(statistic: f64, n1: usize, n2: usize) -> f64 {
    let en = ((n1 * n2) as f64 / (n1 + n2) as f64).sqrt();
    let lambda = (en + 0.12 + 0.11 / en) * statistic;
    kolmogorov_survival(lambda)
}

/// Q_KS(lambda) = 2 * sum_{k=1..} (-1)^{k-1} exp(-2 k^2 lambda^2), clamped
/// to [0, 1].
fn kolmogorov_survival(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let mut sum = 0.0f64;
    let mut sign = 1.0f64;
    for k in 1..=100 {
        let term = (-2.0 * (k as f64).powi(2) * lambda.powi(2)).exp();
        sum += sign * term;
        if term <= 1e-12 {
            break;
        }
        sign = -sign;
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identical_samples_score_zero() {
        let sample = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let output = ks_test(&sample, &sample, 0.1);
        assert_relative_eq!(output.score.unwrap(), 0.0);
        assert!(!output.is_drifted);
        assert_relative_eq!(output.details["p_value"].as_f64().unwrap(), 1.0);
    }

    #[test]
    fn test_disjoint_samples_score_one() {
        let reference = [1.0, 2.0, 3.0, 4.0];
        let current = [10.0, 11.0, 12.0, 13.0];
        let output = ks_test(&reference, &current, 0.1);
        assert_relative_eq!(output.score.unwrap(), 1.0);
        assert!(output.is_drifted);
        assert!(output.details["p_value"].as_f64().unwrap() < 0.1);
    }

    #[test]
    fn test_statistic_on_interleaved_samples() {
        // CDFs diverge by one step of 1/4 at each interleave point
        let reference = [1.0, 3.0, 5.0, 7.0];
        let current = [2.0, 4.0, 6.0, 8.0];
        let output = ks_test(&reference, &current, 0.1);
        assert_relative_eq!(output.score.unwrap(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_statistic_bounded_in_unit_interval() {
        let reference = [0.0, 0.5, 1.0, 2.0, 5.0];
        let current = [0.2, 0.3, 4.0, 4.5, 9.0];
        let output = ks_test(&reference, &current, 0.1);
        let score = output.score.unwrap();
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_too_few_samples_is_insufficient() {
        let output = ks_test(&[1.0], &[1.0, 2.0], 0.1);
        assert!(output.score.is_none());
        assert_eq!(output.details["status"], "insufficient_data");
    }

    #[test]
    fn test_survival_function_bounds() {
        assert_relative_eq!(kolmogorov_survival(0.0), 1.0);
        assert!(kolmogorov_survival(3.0) < 1e-6);
        for lambda in [0.1, 0.5, 1.0, 2.0] {
            let q = kolmogorov_survival(lambda);
            assert!((0.0..=1.0).contains(&q));
        }
    }
}
