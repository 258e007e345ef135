//! Property-based tests for configuration validation

use super::*;
use proptest::prelude::*;

fn arb_valid_config() -> impl Strategy<Value = DeriveConfig> {
    (
        prop_oneof![
            Just(vec![Criterion::Dtc]),
            Just(vec![Criterion::Bva]),
            Just(vec![Criterion::Dtc, Criterion::Bva]),
            Just(vec![Criterion::Bva, Criterion::Dtc]),
        ],
        1.0001f64..=100.0,   // boundary_value_rate
        1usize..10_000,      // n_samples_per_test
        any::<bool>(),       // float_as_decimal
        any::<bool>(),       // update_precision
        any::<u64>(),        // seed
        1usize..64,          // pool_size
    )
        .prop_map(|(criteria, rate, samples, decimal, update, seed, pool)| DeriveConfig {
            criteria,
            boundary_value_rate: rate,
            n_samples_per_test: samples,
            float_as_decimal: decimal,
            update_precision: update,
            seed,
            pool_size: pool,
            ..Default::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_config_passes(config in arb_valid_config()) {
        prop_assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn prop_rate_at_or_below_one_fails(config in arb_valid_config(), rate in -100.0f64..=1.0) {
        let config = DeriveConfig { boundary_value_rate: rate, ..config };
        prop_assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn prop_rate_above_hundred_fails(config in arb_valid_config(), rate in 100.0001f64..1e6) {
        let config = DeriveConfig { boundary_value_rate: rate, ..config };
        prop_assert!(ConfigValidator::validate(&config).is_err());
    }
}
