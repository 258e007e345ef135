//! Sample drawing and experiment replay.
//!
//! Draws concrete feature vectors from derived tests, classifies them with a
//! [`Classifier`] and records the outcome as an [`ExperimentLog`].

mod draw;

pub use draw::{next_down, next_up, SampleDrawer};

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};
use treecov_common::{Result, TreecovError};

use crate::config::{Criterion, DeriveConfig};
use crate::derive::Derivation;
use crate::tree::{NodeId, Tree};

/// A model that maps a feature vector to a class label.
pub trait Classifier {
    /// Predicted class of one sample.
    fn classify(&self, sample: &[f64]) -> usize;
}

impl Classifier for Tree {
    fn classify(&self, sample: &[f64]) -> usize {
        self.predict(sample)
    }
}

impl<F> Classifier for F
where
    F: Fn(&[f64]) -> usize,
{
    fn classify(&self, sample: &[f64]) -> usize {
        self(sample)
    }
}

/// Outcome of one derived test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    /// Derived test name
    pub name: String,
    /// Leaf the test came from
    pub leaf_id: NodeId,
    /// Derivation criterion
    pub criterion: Criterion,
    /// Number of drawn samples
    pub n_samples: usize,
    /// Drawn feature vectors
    pub samples: Vec<Vec<f64>>,
    /// Class the test expects
    pub y_expected: usize,
    /// Class returned for each sample
    pub y_predicted: Vec<usize>,
}

impl TestRecord {
    /// Samples classified differently from the expectation.
    pub fn n_mismatches(&self) -> usize {
        self.y_predicted.iter().filter(|&&y| y != self.y_expected).count()
    }

    /// Whether every sample met the expectation.
    pub fn passed(&self) -> bool {
        self.n_mismatches() == 0
    }
}

/// Replay results of a whole derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentLog {
    /// Number of replayed tests
    pub n_test: usize,
    /// Samples drawn per test
    pub n_samples_per_test: usize,
    /// Per-test records in derivation order
    pub tests: Vec<TestRecord>,
}

impl ExperimentLog {
    /// Tests with at least one mismatching sample.
    pub fn failed(&self) -> impl Iterator<Item = &TestRecord> {
        self.tests.iter().filter(|t| !t.passed())
    }

    /// Whether every test passed.
    pub fn passed(&self) -> bool {
        self.failed().next().is_none()
    }

    /// Pretty JSON rendering.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TreecovError::Serialization { message: e.to_string() })
    }

    /// Parse a log written by [`Self::save`].
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| TreecovError::Serialization { message: format!("experiment log: {e}") })
    }

    /// Write the log as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)
            .map_err(|e| TreecovError::io(format!("writing experiment log: {}", path.display()), e))
    }
}

/// Draw `n_samples_per_test` samples for every test and classify them.
pub fn replay<C>(derivation: &Derivation, classifier: &C, config: &DeriveConfig) -> ExperimentLog
where
    C: Classifier + ?Sized,
{
    let n = config.n_samples_per_test;
    let mut drawer = SampleDrawer::new(config.seed);
    let tests: Vec<TestRecord> = derivation
        .tests
        .iter()
        .map(|test| {
            let samples = drawer.draw_many(test, n);
            let y_predicted = samples.iter().map(|s| classifier.classify(s)).collect();
            let record = TestRecord {
                name: test.name(),
                leaf_id: test.leaf_id,
                criterion: test.criterion,
                n_samples: samples.len(),
                samples,
                y_expected: test.expected_class,
                y_predicted,
            };
            match record.n_mismatches() {
                0 => debug!(test = %record.name, "passed"),
                m => warn!(test = %record.name, mismatches = m, "expected class {}", record.y_expected),
            }
            record
        })
        .collect();

    let log = ExperimentLog { n_test: tests.len(), n_samples_per_test: n, tests };
    info!(tests = log.n_test, failed = log.failed().count(), "replay complete");
    log
}
