//! Metric selection and the shared computation entry point.

use crate::{
    BUCKET_COUNT, BucketPartition, CategoricalSummary, MetricOutput, NumericalSummary,
    categorical_values, chi_squared, js_divergence, ks_test, numerical_values, psi,
};
use driftwatch_core::{DataType, MetricName};
use driftwatch_error::{ConfigError, ConfigErrorKind};
use serde_json::Value as JsonValue;

/// Resolve the metric for a field: the configured override when present,
/// otherwise the data-type default (PSI for numerical, Chi-Squared for
/// categorical).
///
/// # Errors
///
/// Rejects an override whose data type does not match the field's.
///
/// # Examples
///
/// ```
/// use driftwatch_core::{DataType, MetricName};
/// use driftwatch_metrics::select_metric;
///
/// assert_eq!(select_metric(DataType::Numerical, None).unwrap(), MetricName::Psi);
/// assert!(select_metric(DataType::Numerical, Some(MetricName::ChiSquared)).is_err());
/// ```
pub fn select_metric(
    data_type: DataType,
    configured: Option<MetricName>,
) -> Result<MetricName, ConfigError> {
    match (data_type, configured) {
        (DataType::Numerical, None) => Ok(MetricName::Psi),
        (DataType::Categorical, None) => Ok(MetricName::ChiSquared),
        (data_type, Some(metric)) if metric.data_type() == data_type => Ok(metric),
        (data_type, Some(metric)) => Err(ConfigError::new(ConfigErrorKind::MetricMismatch {
            metric: metric.to_string(),
            data_type: data_type.to_string(),
        })),
    }
}

/// The default alert threshold for a metric, used when the schema field has
/// no override.
///
/// PSI and JSD are distance metrics with low thresholds; Chi-Squared scores
/// on the `1 - p` convention with a 0.95 significance threshold; the KS
/// statistic alerts at 0.1.
pub fn default_threshold(metric: MetricName) -> f64 {
    match metric {
        MetricName::Psi => 0.2,
        MetricName::KsTest => 0.1,
        MetricName::ChiSquared => 0.95,
        MetricName::JsDivergence => 0.1,
    }
}

/// Score a pair of raw samples with the given metric.
///
/// Handles aggregation with a shared partition (buckets computed from the
/// reference sample), null exclusion, and the common edge cases: either side
/// empty of usable values yields an insufficient-data output rather than an
/// error.
pub fn compute_drift(
    metric: MetricName,
    reference: &[JsonValue],
    current: &[JsonValue],
    threshold: f64,
) -> MetricOutput {
    match metric {
        MetricName::Psi | MetricName::KsTest => {
            let (ref_values, ref_nulls, _) = numerical_values(reference);
            let (cur_values, cur_nulls, _) = numerical_values(current);
            if ref_values.is_empty() || cur_values.is_empty() {
                return MetricOutput::insufficient(
                    metric,
                    "no usable numeric values",
                    ref_values.len(),
                    cur_values.len(),
                );
            }
            match metric {
                MetricName::Psi => {
                    // Partition from the reference side so indices align.
                    let Some(partition) = BucketPartition::from_reference(&ref_values, BUCKET_COUNT)
                    else {
                        return MetricOutput::insufficient(
                            metric,
                            "no usable numeric values",
                            ref_values.len(),
                            cur_values.len(),
                        );
                    };
                    let ref_summary = NumericalSummary::build(&ref_values, ref_nulls, &partition);
                    let cur_summary = NumericalSummary::build(&cur_values, cur_nulls, &partition);
                    psi(&ref_summary, &cur_summary, &partition, threshold)
                }
                _ => ks_test(&ref_values, &cur_values, threshold),
            }
        }
        MetricName::ChiSquared | MetricName::JsDivergence => {
            let (ref_labels, ref_nulls) = categorical_values(reference);
            let (cur_labels, cur_nulls) = categorical_values(current);
            let ref_summary = CategoricalSummary::build(&ref_labels, ref_nulls);
            let cur_summary = CategoricalSummary::build(&cur_labels, cur_nulls);
            match metric {
                MetricName::ChiSquared => chi_squared(&ref_summary, &cur_summary, threshold),
                _ => js_divergence(&ref_summary, &cur_summary, threshold),
            }
        }
    }
}
