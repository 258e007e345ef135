//! Configuration validation (Jidoka - built-in quality).
//!
//! Validates configuration before derivation to catch errors early
//! and provide actionable feedback.

use super::DeriveConfig;
use treecov_common::{Result, TreecovError};

/// Configuration validator implementing Jidoka principle.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a derivation configuration.
    ///
    /// Returns `Ok(())` if valid, or an error with actionable suggestions.
    pub fn validate(config: &DeriveConfig) -> Result<()> {
        Self::validate_criteria(config)?;
        Self::validate_rate(config.boundary_value_rate)?;
        Self::validate_sampling(config)?;
        Self::validate_predict_fn(&config.predict_fn)?;
        Ok(())
    }

    fn validate_criteria(config: &DeriveConfig) -> Result<()> {
        if config.criteria.is_empty() {
            return Err(TreecovError::config_value(
                "criteria",
                "At least one criterion is required",
                "Use DTC, BVA, or DTC,BVA",
            ));
        }

        for (i, criterion) in config.criteria.iter().enumerate() {
            if config.criteria[..i].contains(criterion) {
                return Err(TreecovError::config_value(
                    "criteria",
                    format!("{criterion} is listed more than once"),
                    "List each criterion once, e.g. DTC,BVA",
                ));
            }
        }

        Ok(())
    }

    fn validate_rate(rate: f64) -> Result<()> {
        if !rate.is_finite() || rate <= 1.0 || rate > 100.0 {
            return Err(TreecovError::config_value(
                "boundary_value_rate",
                format!("Rate must be in (1, 100], got {rate}"),
                "Use 5-20 for tight boundary bands (10 recommended)",
            ));
        }
        Ok(())
    }

    fn validate_sampling(config: &DeriveConfig) -> Result<()> {
        if config.n_samples_per_test == 0 {
            return Err(TreecovError::config_value(
                "n_samples_per_test",
                "Samples per test must be positive",
                "Use 100 for a quick suite, 1000 for a thorough one",
            ));
        }

        if config.pool_size == 0 {
            return Err(TreecovError::config_value(
                "pool_size",
                "Pool size must be positive",
                "Use 10 representative values per unconstrained feature",
            ));
        }

        Ok(())
    }

    fn validate_predict_fn(predict_fn: &str) -> Result<()> {
        let valid_segment = |s: &str| {
            let mut chars = s.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        };

        if predict_fn.is_empty() || !predict_fn.split("::").all(valid_segment) {
            return Err(TreecovError::config_value(
                "predict_fn",
                format!("Not a Rust path: '{predict_fn}'"),
                "Use a function path like crate::model::predict",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Criterion;

    fn field_of(err: TreecovError) -> String {
        match err {
            TreecovError::ConfigValue { field, .. } => field,
            other => panic!("expected ConfigValue, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::validate(&DeriveConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_criteria_rejected() {
        let config = DeriveConfig { criteria: vec![], ..Default::default() };
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(field_of(err), "criteria");
    }

    #[test]
    fn test_duplicate_criteria_rejected() {
        let config =
            DeriveConfig { criteria: vec![Criterion::Bva, Criterion::Bva], ..Default::default() };
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_rate_bounds() {
        for rate in [1.0, 0.5, 100.5, f64::NAN, -3.0] {
            let config = DeriveConfig { boundary_value_rate: rate, ..Default::default() };
            let err = ConfigValidator::validate(&config).unwrap_err();
            assert_eq!(field_of(err), "boundary_value_rate");
        }
        for rate in [1.01, 20.0, 100.0] {
            let config = DeriveConfig { boundary_value_rate: rate, ..Default::default() };
            assert!(ConfigValidator::validate(&config).is_ok());
        }
    }

    #[test]
    fn test_zero_samples_rejected() {
        let config = DeriveConfig { n_samples_per_test: 0, ..Default::default() };
        assert_eq!(field_of(ConfigValidator::validate(&config).unwrap_err()), "n_samples_per_test");
    }

    #[test]
    fn test_zero_pool_rejected() {
        let config = DeriveConfig { pool_size: 0, ..Default::default() };
        assert_eq!(field_of(ConfigValidator::validate(&config).unwrap_err()), "pool_size");
    }

    #[test]
    fn test_predict_fn_must_be_path() {
        for bad in ["", "model::", "1model", "model predict", "a::b-c"] {
            let config = DeriveConfig { predict_fn: bad.into(), ..Default::default() };
            assert!(ConfigValidator::validate(&config).is_err(), "{bad} accepted");
        }
        let config = DeriveConfig { predict_fn: "my_crate::predict".into(), ..Default::default() };
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_errors_are_user_errors() {
        let config = DeriveConfig { boundary_value_rate: 0.0, ..Default::default() };
        assert!(ConfigValidator::validate(&config).unwrap_err().is_user_error());
    }
}
