//! Rust `proptest` source emitter.
//!
//! Renders a [`Derivation`] as a module with one `#[test]` per derived test.
//! Every test draws a full feature vector and asserts that the configured
//! predict function returns the expected class:
//!
//! ```text
//! fn dtc_leaf_1_input() -> impl Strategy<Value = Vec<f64>> {
//!     vec![
//!         prop::sample::select(vec![0.5_f64, 3.0_f64]).boxed(),
//!         (1.0_f64..=1.265_f64).boxed(),
//!     ]
//! }
//! ```
//!
//! The predict function must accept `&[f64]` and return `usize`.


use std::fmt;

use crate::config::{DeriveConfig, DrawMode};
use crate::derive::{Derivation, DerivedTest, GenerationSpec, IntervalSpec};

/// Float literal that round-trips.
fn lit(value: f64) -> String {
    format!("{value:?}_f64")
}

/// Strategy expression for one feature.
pub fn strategy_expr(spec: &GenerationSpec) -> String {
    match spec {
        GenerationSpec::Pool(pool) => {
            let values: Vec<_> = pool.values.iter().map(|&v| lit(v)).collect();
            format!("prop::sample::select(vec![{}])", values.join(", "))
        }
        GenerationSpec::Interval(interval) => interval_expr(interval),
    }
}

fn interval_expr(spec: &IntervalSpec) -> String {
    if let Some(places) = spec.decimals {
        if let Some((lo, hi)) = spec.grid_units(places) {
            let scale = lit(10f64.powi(places as i32));
            return format!("({lo}_i64..={hi}_i64).prop_map(|u| u as f64 / {scale})");
        }
    }

    if spec.min == spec.max {
        return format!("Just({})", lit(spec.min));
    }
    let range = if spec.max_inclusive {
        format!("({}..={})", lit(spec.min), lit(spec.max))
    } else {
        format!("({}..{})", lit(spec.min), lit(spec.max))
    };
    if spec.min_inclusive {
        range
    } else {
        let min = lit(spec.min);
        format!("{range}.prop_filter(\"excludes {min}\", |v| *v > {min})")
    }
}

/// A renderable `proptest` module.
pub struct ProptestSuite<'a> {
    derivation: &'a Derivation,
    config: &'a DeriveConfig,
    feature_names: Option<&'a [String]>,
}

impl<'a> ProptestSuite<'a> {
    /// Suite over every test of `derivation`.
    pub fn new(derivation: &'a Derivation, config: &'a DeriveConfig) -> Self {
        Self { derivation, config, feature_names: None }
    }

    /// Annotate strategies with column names.
    pub fn with_feature_names(mut self, names: &'a [String]) -> Self {
        self.feature_names = Some(names);
        self
    }

    fn cases(&self) -> usize {
        match self.config.draw_mode {
            DrawMode::Single => self.config.n_samples_per_test,
            DrawMode::Tuple => 1,
        }
    }

    fn write_input_fn(&self, f: &mut fmt::Formatter<'_>, test: &DerivedTest) -> fmt::Result {
        writeln!(f, "fn {}_input() -> impl Strategy<Value = Vec<f64>> {{", test.name())?;
        writeln!(f, "    vec![")?;
        for feature in &test.features {
            let name = self.feature_names.and_then(|names| names.get(feature.index));
            match name {
                Some(name) => writeln!(f, "        // {name}")?,
                None => writeln!(f, "        // f{}", feature.index)?,
            }
            writeln!(f, "        {}.boxed(),", strategy_expr(&feature.spec))?;
        }
        writeln!(f, "    ]")?;
        writeln!(f, "}}")
    }

    fn write_test_fn(&self, f: &mut fmt::Formatter<'_>, test: &DerivedTest) -> fmt::Result {
        let name = test.name();
        let predict = &self.config.predict_fn;
        let expected = test.expected_class;
        match test.boundary {
            Some(probe) => writeln!(
                f,
                "    /// leaf {}, {} band {} f{} threshold {}",
                test.leaf_id,
                if probe.inside { "inside" } else { "outside" },
                probe.side.as_str(),
                probe.feature,
                probe.threshold
            )?,
            None => writeln!(f, "    /// leaf {}, whole interval", test.leaf_id)?,
        }
        writeln!(f, "    #[test]")?;
        match self.config.draw_mode {
            DrawMode::Single => {
                writeln!(f, "    fn {name}(input in {name}_input()) {{")?;
                writeln!(f, "        prop_assert_eq!({predict}(&input), {expected});")?;
            }
            DrawMode::Tuple => {
                writeln!(
                    f,
                    "    fn {name}(inputs in prop::collection::vec({name}_input(), {})) {{",
                    self.config.n_samples_per_test
                )?;
                writeln!(f, "        for input in &inputs {{")?;
                writeln!(f, "            prop_assert_eq!({predict}(input), {expected});")?;
                writeln!(f, "        }}")?;
            }
        }
        writeln!(f, "    }}")
    }
}

impl fmt::Display for ProptestSuite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "//! Property tests derived from a surrogate decision tree.")?;
        writeln!(f, "//!")?;
        writeln!(f, "//! Generated by treecov; regenerate instead of editing.")?;
        for skipped in &self.derivation.skipped {
            writeln!(f, "//! leaf {} skipped: {}", skipped.leaf_id, skipped.reason)?;
        }
        for band in &self.derivation.dropped {
            writeln!(
                f,
                "//! leaf {} f{} {} {}: {}",
                band.leaf_id,
                band.boundary.feature,
                band.boundary.side.as_str(),
                band.boundary.threshold,
                band.reason
            )?;
        }
        writeln!(f)?;
        writeln!(f, "use proptest::prelude::*;")?;

        for test in &self.derivation.tests {
            writeln!(f)?;
            self.write_input_fn(f, test)?;
        }

        writeln!(f)?;
        writeln!(f, "proptest! {{")?;
        writeln!(f, "    #![proptest_config(ProptestConfig::with_cases({}))]", self.cases())?;
        for test in &self.derivation.tests {
            writeln!(f)?;
            self.write_test_fn(f, test)?;
        }
        writeln!(f, "}}")
    }
}

/// Render `derivation` as Rust source.
pub fn emit(derivation: &Derivation, config: &DeriveConfig) -> String {
    ProptestSuite::new(derivation, config).to_string()
}
