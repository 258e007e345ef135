//! Test derivation engine.
//!
//! Walks every root-to-leaf path of a surrogate [`Tree`], merges each path's
//! splits into per-feature constraints and turns them into property-test
//! specifications:
//!
//! - **DTC** (decision tree coverage) draws from the whole leaf interval.
//! - **BVA** (boundary value analysis) draws from thin bands on both sides of
//!   every threshold that bounds the leaf.
//!
//! Features a path never tests get a small pool of observed training values.
//!
//! # Example
//!
//! ```no_run
//! use treecov::config::DeriveConfig;
//! use treecov::dataset::Dataset;
//! use treecov::derive::derive;
//! use treecov::tree::TreeExport;
//!
//! let tree = TreeExport::from_file("tree.json")?.into_tree()?;
//! let dataset = Dataset::from_file("train.json")?;
//! let derivation = derive(&tree, &dataset, &DeriveConfig::default())?;
//! println!("{} tests", derivation.tests.len());
//! # Ok::<(), treecov_common::TreecovError>(())
//! ```

mod interval;
mod merge;
mod precision;
mod sampler;
mod synth;
mod walker;


pub use interval::{BoundaryBands, IntervalDeriver, IntervalSpec, NonGeneratable, Side};
pub use merge::{Bound, BoundOrigin, ConstraintMerger, FeatureConstraint};
pub use precision::{
    ceil_to, decimal_places, floor_to, step_above, unit, PrecisionHarmonizer, PrecisionMode,
    MAX_DECIMALS,
};
pub(crate) use precision::from_units;
pub use sampler::{DomainSampler, PoolSpec};
pub use synth::{
    BoundaryProbe, DerivedTest, DroppedBoundary, FeatureSpec, GenerationSpec, PathTests,
    TestSynthesizer,
};
pub use walker::{Direction, Path, Predicate, TreeWalker};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use treecov_common::{Result, TreecovError};

use crate::config::{ConfigValidator, Criterion, DeriveConfig};
use crate::dataset::{Dataset, FeatureDomain};
use crate::tree::{NodeId, Tree};

/// A leaf that produced no tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedLeaf {
    /// Arena id of the leaf
    pub leaf_id: NodeId,
    /// Why no value could be generated
    pub reason: String,
}

/// Output of one derivation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Derivation {
    /// Columns of the dataset
    pub n_features: usize,
    /// Root-to-leaf paths walked
    pub n_paths: usize,
    /// Derived tests, leaf by leaf in traversal order
    pub tests: Vec<DerivedTest>,
    /// Leaves without any test
    #[serde(default)]
    pub skipped: Vec<SkippedLeaf>,
    /// BVA outside bands without a test
    #[serde(default)]
    pub dropped: Vec<DroppedBoundary>,
}

impl Derivation {
    /// Number of tests derived under one criterion.
    pub fn count(&self, criterion: Criterion) -> usize {
        self.tests.iter().filter(|t| t.criterion == criterion).count()
    }

    /// Pretty JSON rendering.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TreecovError::Serialization { message: e.to_string() })
    }

    /// Parse a rendering produced by [`Self::to_json`].
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| TreecovError::Serialization { message: e.to_string() })
    }
}

/// Derivation over one tree and its training data.
pub struct Deriver<'a> {
    tree: &'a Tree,
    config: &'a DeriveConfig,
    domains: Vec<FeatureDomain>,
    observed: Vec<Vec<f64>>,
    thresholds: Vec<Vec<f64>>,
}

impl<'a> Deriver<'a> {
    /// Prepare a derivation.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid and a dataset
    /// error if the dataset's width differs from the tree's.
    pub fn new(tree: &'a Tree, dataset: &Dataset, config: &'a DeriveConfig) -> Result<Self> {
        ConfigValidator::validate(config)?;
        if dataset.n_features() != tree.n_features() {
            return Err(TreecovError::Dataset {
                message: format!(
                    "dataset has {} features but the tree was trained on {}",
                    dataset.n_features(),
                    tree.n_features()
                ),
            });
        }

        let observed = (0..dataset.n_features()).map(|f| dataset.distinct_sorted(f)).collect();
        Ok(Self {
            tree,
            config,
            domains: dataset.domains(),
            observed,
            thresholds: tree.thresholds_by_feature(),
        })
    }

    /// Every root-to-leaf path.
    pub fn paths(&self) -> Vec<Path> {
        TreeWalker::new(self.tree).paths()
    }

    /// Merged constraints of one path.
    pub fn constraints(&self, path: &Path) -> BTreeMap<usize, FeatureConstraint> {
        ConstraintMerger::new(&self.domains).merge(path)
    }

    /// Derive every test.
    pub fn run(&self) -> Derivation {
        let paths = self.paths();
        let synthesizer = TestSynthesizer::new(
            self.tree,
            ConstraintMerger::new(&self.domains),
            IntervalDeriver::new(&self.domains, &self.observed, &self.thresholds, self.config),
            &self.config.criteria,
        );
        let mut sampler =
            DomainSampler::new(&self.observed, self.config.pool_size, self.config.seed);

        let mut tests = Vec::new();
        let mut skipped = Vec::new();
        let mut dropped = Vec::new();
        for path in &paths {
            match synthesizer.synthesize(path, &mut sampler) {
                Ok(derived) => {
                    debug!(leaf = path.leaf_id, tests = derived.tests.len(), "derived {path}");
                    for band in &derived.dropped {
                        warn!(
                            leaf = path.leaf_id,
                            feature = band.boundary.feature,
                            "no outside test: {}",
                            band.reason
                        );
                    }
                    tests.extend(derived.tests);
                    dropped.extend(derived.dropped);
                }
                Err(e) => {
                    warn!(leaf = path.leaf_id, "skipping leaf: {e}");
                    skipped.push(SkippedLeaf { leaf_id: path.leaf_id, reason: e.to_string() });
                }
            }
        }

        info!(
            paths = paths.len(),
            tests = tests.len(),
            skipped = skipped.len(),
            dropped = dropped.len(),
            "derivation complete"
        );
        Derivation {
            n_features: self.tree.n_features(),
            n_paths: paths.len(),
            tests,
            skipped,
            dropped,
        }
    }
}

/// Validate, then derive every test for `tree`.
pub fn derive(tree: &Tree, dataset: &Dataset, config: &DeriveConfig) -> Result<Derivation> {
    Ok(Deriver::new(tree, dataset, config)?.run())
}
