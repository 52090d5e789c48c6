//! Schema field descriptions for monitored model inputs and outputs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a field is a model input or output.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldDirection {
    /// A feature fed into the model
    Input,
    /// A prediction produced by the model
    Output,
}

/// The declared data type of a schema field.
///
/// Drives both aggregation (histogram vs category counts) and the default
/// metric selection (PSI for numerical, Chi-Squared for categorical).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DataType {
    /// Continuous numeric values
    Numerical,
    /// Discrete string-valued categories
    Categorical,
}

/// The four supported drift metrics.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MetricName {
    /// Population Stability Index (numerical)
    Psi,
    /// Two-sample Kolmogorov-Smirnov test (numerical)
    KsTest,
    /// Chi-squared frequency test (categorical)
    ChiSquared,
    /// Jensen-Shannon divergence (categorical)
    JsDivergence,
}

impl MetricName {
    /// The data type this metric applies to.
    pub fn data_type(&self) -> DataType {
        match self {
            MetricName::Psi | MetricName::KsTest => DataType::Numerical,
            MetricName::ChiSquared | MetricName::JsDivergence => DataType::Categorical,
        }
    }
}

/// One monitored input/output feature of a model version.
///
/// The evaluator treats a `SchemaField` as an immutable snapshot for the
/// duration of one job run: the alert threshold is captured when field
/// evaluation starts, so a concurrent edit cannot change an in-flight
/// comparison's outcome.
///
/// # Examples
///
/// ```
/// use driftwatch_core::{DataType, FieldDirection, SchemaField};
///
/// let field = SchemaField::new("age", FieldDirection::Input, DataType::Numerical);
/// assert!(field.drift_metric.is_none());
/// assert!(field.alert_threshold.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Unique field id
    pub id: Uuid,
    /// Field name as it appears in inference records
    pub field_name: String,
    /// Input or output
    pub direction: FieldDirection,
    /// Numerical or categorical
    pub data_type: DataType,
    /// Optional metric override; the data-type default applies when None
    pub drift_metric: Option<MetricName>,
    /// Optional alert threshold override; the metric default applies when None
    pub alert_threshold: Option<f64>,
}

impl SchemaField {
    /// Create a schema field with no metric or threshold overrides.
    pub fn new(
        field_name: impl Into<String>,
        direction: FieldDirection,
        data_type: DataType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            field_name: field_name.into(),
            direction,
            data_type,
            drift_metric: None,
            alert_threshold: None,
        }
    }

    /// Set a metric override.
    pub fn with_metric(mut self, metric: MetricName) -> Self {
        self.drift_metric = Some(metric);
        self
    }

    /// Set an alert threshold override.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.alert_threshold = Some(threshold);
        self
    }
}
