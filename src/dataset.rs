//! Training dataset used to bound and sample feature domains.

use serde::{Deserialize, Serialize};
use std::path::Path;
use treecov_common::{Result, TreecovError};

/// Observed range of one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureDomain {
    /// Smallest observed value
    pub min: f64,
    /// Largest observed value
    pub max: f64,
}

impl FeatureDomain {
    /// Width of the observed range.
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Whether `value` lies in the closed range.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// On-disk JSON layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DatasetFile {
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    features: Vec<Vec<f64>>,
    #[serde(default)]
    labels: Vec<usize>,
}

/// Row-major feature matrix with optional labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    feature_names: Vec<String>,
    rows: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

impl Dataset {
    /// Build a dataset, checking it is non-empty, rectangular and finite.
    pub fn new(rows: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Self> {
        let n_features = rows.first().map_or(0, Vec::len);
        let names = (0..n_features).map(|i| format!("f{i}")).collect();
        Self::with_names(rows, labels, names)
    }

    /// Build a dataset with explicit column names.
    pub fn with_names(
        rows: Vec<Vec<f64>>,
        labels: Vec<usize>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(dataset_error("feature matrix has no rows"));
        };
        let n_features = first.len();
        if n_features == 0 {
            return Err(dataset_error("feature matrix has no columns"));
        }
        if let Some(i) = rows.iter().position(|r| r.len() != n_features) {
            return Err(dataset_error(format!(
                "row {i} has {} values, expected {n_features}",
                rows[i].len()
            )));
        }
        if let Some(i) = rows.iter().position(|r| r.iter().any(|v| !v.is_finite())) {
            return Err(dataset_error(format!("row {i} contains a non-finite value")));
        }
        if !labels.is_empty() && labels.len() != rows.len() {
            return Err(dataset_error(format!(
                "{} labels for {} rows",
                labels.len(),
                rows.len()
            )));
        }
        if feature_names.len() != n_features {
            return Err(dataset_error(format!(
                "{} feature names for {n_features} columns",
                feature_names.len()
            )));
        }
        Ok(Self { feature_names, rows, labels })
    }

    /// Load a dataset from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TreecovError::io(format!("reading dataset file: {}", path.display()), e)
        })?;
        Self::from_json(&content)
    }

    /// Parse a dataset from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        let file: DatasetFile = serde_json::from_str(content)
            .map_err(|e| TreecovError::Serialization { message: format!("dataset JSON: {e}") })?;
        match file.feature_names {
            Some(names) => Self::with_names(file.features, file.labels, names),
            None => Self::new(file.features, file.labels),
        }
    }

    /// Number of feature columns.
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Number of rows.
    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }

    /// Column names in model input order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Feature rows.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Labels (empty when the dataset was loaded without them).
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Values of one column in row order.
    pub fn column(&self, feature: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(move |r| r[feature])
    }

    /// Observed min/max of one column.
    pub fn domain(&self, feature: usize) -> FeatureDomain {
        self.column(feature).fold(
            FeatureDomain { min: f64::INFINITY, max: f64::NEG_INFINITY },
            |d, v| FeatureDomain { min: d.min.min(v), max: d.max.max(v) },
        )
    }

    /// Observed min/max of every column.
    pub fn domains(&self) -> Vec<FeatureDomain> {
        (0..self.n_features()).map(|f| self.domain(f)).collect()
    }

    /// Sorted distinct values of one column.
    pub fn distinct_sorted(&self, feature: usize) -> Vec<f64> {
        let mut values: Vec<f64> = self.column(feature).collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        values
    }
}

fn dataset_error(message: impl Into<String>) -> TreecovError {
    TreecovError::Dataset { message: message.into() }
}
