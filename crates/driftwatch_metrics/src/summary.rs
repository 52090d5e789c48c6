//! Statistics aggregation: raw samples into distribution summaries.

use crate::{BUCKET_COUNT, TOP_CATEGORIES};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Split a raw sample into usable numeric values, counting nulls and
/// non-numeric values separately.
///
/// Nulls are tallied in the summary's `null_count`; non-numeric values in a
/// numerical field are skipped rather than failing the field.
pub fn numerical_values(raw: &[JsonValue]) -> (Vec<f64>, u64, u64) {
    let mut values = Vec::with_capacity(raw.len());
    let mut null_count = 0u64;
    let mut skipped = 0u64;
    for value in raw {
        match value {
            JsonValue::Null => null_count += 1,
            other => match other.as_f64() {
                Some(v) if v.is_finite() => values.push(v),
                _ => skipped += 1,
            },
        }
    }
    (values, null_count, skipped)
}

/// Split a raw sample into category labels, counting nulls separately.
///
/// Non-string scalars are rendered with their JSON text form so numeric
/// category codes still aggregate.
pub fn categorical_values(raw: &[JsonValue]) -> (Vec<String>, u64) {
    let mut values = Vec::with_capacity(raw.len());
    let mut null_count = 0u64;
    for value in raw {
        match value {
            JsonValue::Null => null_count += 1,
            JsonValue::String(s) => values.push(s.clone()),
            other => values.push(other.to_string()),
        }
    }
    (values, null_count)
}

/// A shared histogram partition computed from the reference sample.
///
/// Both sides of a comparison are bucketed against the same partition so
/// bucket indices align. The degenerate case where every reference value is
/// identical collapses to a single zero-width bucket.
///
/// # Examples
///
/// ```
/// use driftwatch_metrics::BucketPartition;
///
/// let partition = BucketPartition::from_reference(&[0.0, 1.0, 2.0, 10.0], 10).unwrap();
/// assert_eq!(partition.bucket_count(), 10);
/// assert_eq!(partition.index_of(-5.0), 0); // out-of-range clamps
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketPartition {
    min: f64,
    max: f64,
    buckets: usize,
}

impl BucketPartition {
    /// Build a partition over `[min, max]` of the reference sample.
    ///
    /// Returns `None` for an empty sample.
    pub fn from_reference(values: &[f64], buckets: usize) -> Option<Self> {
        if values.is_empty() || buckets == 0 {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if min == max {
            // Zero-width range: a single bucket holds everything.
            return Some(Self {
                min,
                max,
                buckets: 1,
            });
        }
        Some(Self { min, max, buckets })
    }

    /// Number of buckets in the partition.
    pub fn bucket_count(&self) -> usize {
        self.buckets
    }

    /// The bucket index for a value; out-of-range values clamp into the
    /// first or last bucket.
    pub fn index_of(&self, value: f64) -> usize {
        if self.buckets == 1 || value <= self.min {
            return 0;
        }
        if value >= self.max {
            return self.buckets - 1;
        }
        let width = (self.max - self.min) / self.buckets as f64;
        let idx = ((value - self.min) / width) as usize;
        idx.min(self.buckets - 1)
    }

    /// The `[low, high)` range of each bucket, for diagnostics.
    pub fn ranges(&self) -> Vec<(f64, f64)> {
        if self.buckets == 1 {
            return vec![(self.min, self.max)];
        }
        let width = (self.max - self.min) / self.buckets as f64;
        (0..self.buckets)
            .map(|i| (self.min + width * i as f64, self.min + width * (i + 1) as f64))
            .collect()
    }
}

/// Aggregated shape of a numerical sample over a shared partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericalSummary {
    /// Per-bucket counts aligned with the partition
    pub bucket_counts: Vec<u64>,
    /// Sample mean (0 when empty)
    pub mean: f64,
    /// Sample median (0 when empty)
    pub median: f64,
    /// Population standard deviation (0 when empty)
    pub std: f64,
    /// Minimum value (0 when empty)
    pub min: f64,
    /// Maximum value (0 when empty)
    pub max: f64,
    /// Number of usable values
    pub count: u64,
    /// Number of nulls excluded from the statistics
    pub null_count: u64,
}

impl NumericalSummary {
    /// Aggregate usable values against a shared partition.
    ///
    /// An empty sample yields zeroed statistics and never divides by zero.
    pub fn build(values: &[f64], null_count: u64, partition: &BucketPartition) -> Self {
        let mut bucket_counts = vec![0u64; partition.bucket_count()];
        for &v in values {
            bucket_counts[partition.index_of(v)] += 1;
        }

        if values.is_empty() {
            return Self {
                bucket_counts,
                mean: 0.0,
                median: 0.0,
                std: 0.0,
                min: 0.0,
                max: 0.0,
                count: 0,
                null_count,
            };
        }

        let count = values.len() as u64;
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Self {
            bucket_counts,
            mean,
            median,
            std: variance.sqrt(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            count,
            null_count,
        }
    }

    /// Per-bucket proportions; an empty summary yields all zeros.
    pub fn proportions(&self) -> Vec<f64> {
        if self.count == 0 {
            return vec![0.0; self.bucket_counts.len()];
        }
        self.bucket_counts
            .iter()
            .map(|&c| c as f64 / self.count as f64)
            .collect()
    }
}

/// Aggregated shape of a categorical sample.
///
/// The full category map is retained for metric computation; `top_display`
/// provides the truncated view used for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    /// Full category to count map
    pub counts: BTreeMap<String, u64>,
    /// Number of distinct categories
    pub unique_count: u64,
    /// Number of usable values
    pub total_count: u64,
    /// Number of nulls excluded from the counts
    pub null_count: u64,
}

impl CategoricalSummary {
    /// Aggregate category labels.
    pub fn build(values: &[String], null_count: u64) -> Self {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for v in values {
            *counts.entry(v.clone()).or_insert(0) += 1;
        }
        Self {
            unique_count: counts.len() as u64,
            total_count: values.len() as u64,
            null_count,
            counts,
        }
    }

    /// The percentage of the sample in a category (0 when empty).
    pub fn percentage(&self, category: &str) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        let count = self.counts.get(category).copied().unwrap_or(0);
        count as f64 / self.total_count as f64 * 100.0
    }

    /// Top categories by descending count, truncated for display.
    pub fn top_display(&self) -> Vec<(String, u64, f64)> {
        let mut entries: Vec<_> = self
            .counts
            .iter()
            .map(|(cat, &count)| (cat.clone(), count, self.percentage(cat)))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(TOP_CATEGORIES);
        entries
    }
}

/// Convenience wrapper building a numerical summary with the default bucket
/// count, partitioned by the reference side.
pub fn summarize_numerical_pair(
    reference: &[f64],
    current: &[f64],
    reference_nulls: u64,
    current_nulls: u64,
) -> Option<(NumericalSummary, NumericalSummary, BucketPartition)> {
    let partition = BucketPartition::from_reference(reference, BUCKET_COUNT)?;
    let ref_summary = NumericalSummary::build(reference, reference_nulls, &partition);
    let cur_summary = NumericalSummary::build(current, current_nulls, &partition);
    Some((ref_summary, cur_summary, partition))
}
