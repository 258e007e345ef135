//! Configuration schema types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use treecov_common::{Result, TreecovError};

/// Test derivation criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Criterion {
    /// Decision-tree coverage: the full interval of every leaf
    #[serde(rename = "DTC", alias = "dtc")]
    Dtc,
    /// Boundary-value analysis: thin bands around active thresholds
    #[serde(rename = "BVA", alias = "bva")]
    Bva,
}

impl Criterion {
    /// Canonical upper-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dtc => "DTC",
            Self::Bva => "BVA",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DTC" => Ok(Self::Dtc),
            "BVA" => Ok(Self::Bva),
            other => Err(format!("Unknown criterion: {other}. Use: DTC, BVA")),
        }
    }
}

/// Parse a comma-separated criteria list such as `"DTC,BVA"`.
pub fn parse_criteria(s: &str) -> std::result::Result<Vec<Criterion>, String> {
    s.split(',').filter(|part| !part.trim().is_empty()).map(str::parse).collect()
}

/// Reference width that BVA band widths are a percentage of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthBasis {
    /// Width of the interval on the side of the threshold being probed
    #[default]
    Path,
    /// Width of the feature's whole observed domain
    Domain,
}

impl FromStr for WidthBasis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "path" => Ok(Self::Path),
            "domain" => Ok(Self::Domain),
            _ => Err(format!("Unknown width basis: {s}. Use: path, domain")),
        }
    }
}

/// How emitted property tests draw inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    /// One feature vector per generated case
    #[default]
    Single,
    /// One case holding a tuple of `n_samples_per_test` feature vectors
    Tuple,
}

impl FromStr for DrawMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "tuple" => Ok(Self::Tuple),
            _ => Err(format!("Unknown draw mode: {s}. Use: single, tuple")),
        }
    }
}

/// Complete derivation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeriveConfig {
    /// Criteria to derive, in output order
    #[serde(default = "default_criteria")]
    pub criteria: Vec<Criterion>,
    /// BVA band width as a percentage of the basis width, in (1, 100]
    #[serde(default = "default_boundary_value_rate")]
    pub boundary_value_rate: f64,
    /// Samples drawn per derived test
    #[serde(default = "default_n_samples_per_test")]
    pub n_samples_per_test: usize,
    /// Generate fixed-decimal values with harmonized precision
    #[serde(default)]
    pub float_as_decimal: bool,
    /// Use the smaller neighbour precision instead of the larger
    #[serde(default)]
    pub update_precision: bool,
    /// Seed of the single sampling stream
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Maximum pool size for unconstrained features
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// Reference width for BVA bands
    #[serde(default)]
    pub width_basis: WidthBasis,
    /// Draw mode of emitted tests
    #[serde(default)]
    pub draw_mode: DrawMode,
    /// Path of the target model's predict function in emitted source
    #[serde(default = "default_predict_fn")]
    pub predict_fn: String,
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self {
            criteria: default_criteria(),
            boundary_value_rate: default_boundary_value_rate(),
            n_samples_per_test: default_n_samples_per_test(),
            float_as_decimal: false,
            update_precision: false,
            seed: default_seed(),
            pool_size: default_pool_size(),
            width_basis: WidthBasis::default(),
            draw_mode: DrawMode::default(),
            predict_fn: default_predict_fn(),
        }
    }
}

impl DeriveConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TreecovError::ConfigNotFound { path: path.to_path_buf() });
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            TreecovError::io(format!("reading config file: {}", path.display()), e)
        })?;
        Self::from_yaml(&content, path)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| TreecovError::ConfigParsing {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Whether a criterion was requested.
    pub fn wants(&self, criterion: Criterion) -> bool {
        self.criteria.contains(&criterion)
    }
}

fn default_criteria() -> Vec<Criterion> {
    vec![Criterion::Dtc]
}

fn default_boundary_value_rate() -> f64 {
    10.0
}

fn default_n_samples_per_test() -> usize {
    100
}

fn default_seed() -> u64 {
    42
}

fn default_pool_size() -> usize {
    10
}

fn default_predict_fn() -> String {
    "crate::model::predict".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criterion_parsing_is_case_insensitive() {
        assert_eq!("dtc".parse::<Criterion>().unwrap(), Criterion::Dtc);
        assert_eq!(" BVA ".parse::<Criterion>().unwrap(), Criterion::Bva);
        assert!("mcdc".parse::<Criterion>().is_err());
    }

    #[test]
    fn test_parse_criteria_list() {
        assert_eq!(parse_criteria("DTC,BVA").unwrap(), vec![Criterion::Dtc, Criterion::Bva]);
        assert_eq!(parse_criteria("bva").unwrap(), vec![Criterion::Bva]);
        assert!(parse_criteria("DTC,XYZ").is_err());
    }

    #[test]
    fn test_yaml_defaults() {
        let config = DeriveConfig::from_yaml("{}", Path::new("derive.yaml")).unwrap();
        assert_eq!(config, DeriveConfig::default());
        assert_eq!(config.pool_size, 10);
        assert!(config.wants(Criterion::Dtc));
        assert!(!config.wants(Criterion::Bva));
    }

    #[test]
    fn test_yaml_full() {
        let yaml = r#"
criteria: [DTC, bva]
boundary_value_rate: 20
n_samples_per_test: 5
float_as_decimal: true
update_precision: true
seed: 7
pool_size: 4
width_basis: domain
draw_mode: tuple
predict_fn: my_model::classify
"#;
        let config = DeriveConfig::from_yaml(yaml, Path::new("derive.yaml")).unwrap();
        assert_eq!(config.criteria, vec![Criterion::Dtc, Criterion::Bva]);
        assert_eq!(config.boundary_value_rate, 20.0);
        assert_eq!(config.n_samples_per_test, 5);
        assert!(config.float_as_decimal && config.update_precision);
        assert_eq!(config.seed, 7);
        assert_eq!(config.width_basis, WidthBasis::Domain);
        assert_eq!(config.draw_mode, DrawMode::Tuple);
        assert_eq!(config.predict_fn, "my_model::classify");
    }

    #[test]
    fn test_yaml_syntax_error() {
        let err = DeriveConfig::from_yaml("criteria: [DTC", Path::new("bad.yaml")).unwrap_err();
        assert!(matches!(err, TreecovError::ConfigParsing { .. }));
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_missing_file() {
        let err = DeriveConfig::from_file("/nonexistent/derive.yaml").unwrap_err();
        assert!(matches!(err, TreecovError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("derive.yaml");
        std::fs::write(&path, "criteria: [BVA]\nboundary_value_rate: 15.5\n").unwrap();
        let config = DeriveConfig::from_file(&path).unwrap();
        assert_eq!(config.criteria, vec![Criterion::Bva]);
        assert_eq!(config.boundary_value_rate, 15.5);
    }
}
