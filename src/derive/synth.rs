//! Assembly of per-leaf derived tests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::interval::{BoundaryBands, IntervalDeriver, IntervalSpec, NonGeneratable, Side};
use super::merge::ConstraintMerger;
use super::sampler::{DomainSampler, PoolSpec};
use super::walker::Path;
use crate::config::Criterion;
use crate::tree::{Node, NodeId, Tree};

/// How one feature is generated in a derived test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GenerationSpec {
    /// Numeric range from the path's constraints
    Interval(IntervalSpec),
    /// Observed values for a feature the path ignores
    Pool(PoolSpec),
}

impl GenerationSpec {
    /// Whether some admitted value routes left (`<= t`) and some right.
    pub fn admits_split(&self, threshold: f64) -> (bool, bool) {
        match self {
            Self::Interval(spec) => spec.admits_split(threshold),
            Self::Pool(pool) => pool.admits_split(threshold),
        }
    }

    /// Whether `value` may be generated.
    pub fn contains(&self, value: f64) -> bool {
        match self {
            Self::Interval(spec) => spec.contains(value),
            Self::Pool(pool) => pool.values.contains(&value),
        }
    }

    /// The interval, if this is one.
    pub fn as_interval(&self) -> Option<&IntervalSpec> {
        match self {
            Self::Interval(spec) => Some(spec),
            Self::Pool(_) => None,
        }
    }

    /// The pool, if this is one.
    pub fn as_pool(&self) -> Option<&PoolSpec> {
        match self {
            Self::Pool(pool) => Some(pool),
            Self::Interval(_) => None,
        }
    }
}

/// Generation spec bound to a feature index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    /// Column index in model input order
    pub index: usize,
    /// How the column is generated
    #[serde(flatten)]
    pub spec: GenerationSpec,
}

/// The threshold a BVA test probes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryProbe {
    /// Feature index
    pub feature: usize,
    /// Probed threshold
    pub threshold: f64,
    /// Side of the threshold the band lies on
    pub side: Side,
    /// Whether the band lies inside the leaf's own interval
    pub inside: bool,
}

/// One property test: inputs from `features` must be classified as
/// `expected_class`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedTest {
    /// Leaf the test was derived from
    pub leaf_id: NodeId,
    /// Derivation criterion
    pub criterion: Criterion,
    /// Probed boundary (BVA only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<BoundaryProbe>,
    /// Class the target model must return
    pub expected_class: usize,
    /// One spec per dataset column, in column order
    pub features: Vec<FeatureSpec>,
}

impl DerivedTest {
    /// Stable identifier usable as a test function name.
    pub fn name(&self) -> String {
        let base = format!("{}_leaf_{}", self.criterion.as_str().to_lowercase(), self.leaf_id);
        match self.boundary {
            None => base,
            Some(probe) => format!(
                "{base}_f{}_{}_{}",
                probe.feature,
                probe.side.as_str(),
                if probe.inside { "inside" } else { "outside" }
            ),
        }
    }

    /// Spec of one feature.
    pub fn spec(&self, feature: usize) -> Option<&GenerationSpec> {
        self.features.get(feature).map(|f| &f.spec)
    }

    fn new(
        path: &Path,
        criterion: Criterion,
        boundary: Option<BoundaryProbe>,
        expected_class: usize,
        specs: Vec<GenerationSpec>,
    ) -> Self {
        let features =
            specs.into_iter().enumerate().map(|(index, spec)| FeatureSpec { index, spec }).collect();
        Self { leaf_id: path.leaf_id, criterion, boundary, expected_class, features }
    }
}

/// A BVA band that produced no test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedBoundary {
    /// Leaf the band belongs to
    pub leaf_id: NodeId,
    /// Threshold and side of the missing band
    #[serde(flatten)]
    pub boundary: BoundaryProbe,
    /// Why the band has no test
    pub reason: String,
}

/// Tests of one path plus the bands it could not cover.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathTests {
    /// Derived tests in criteria order
    pub tests: Vec<DerivedTest>,
    /// Outside bands without a test
    pub dropped: Vec<DroppedBoundary>,
}

/// Builds the derived tests of one path.
pub struct TestSynthesizer<'a> {
    tree: &'a Tree,
    merger: ConstraintMerger<'a>,
    deriver: IntervalDeriver<'a>,
    criteria: &'a [Criterion],
}

impl<'a> TestSynthesizer<'a> {
    /// Create a synthesizer emitting `criteria` in order.
    pub fn new(
        tree: &'a Tree,
        merger: ConstraintMerger<'a>,
        deriver: IntervalDeriver<'a>,
        criteria: &'a [Criterion],
    ) -> Self {
        Self { tree, merger, deriver, criteria }
    }

    /// Derive every test of one path.
    ///
    /// Pools are drawn once per unconstrained feature and shared by all of the
    /// path's tests. A path with an empty constraint draws nothing.
    pub fn synthesize(
        &self,
        path: &Path,
        sampler: &mut DomainSampler<'_>,
    ) -> Result<PathTests, NonGeneratable> {
        let constraints = self.merger.merge(path);
        let intervals = constraints
            .iter()
            .map(|(&feature, c)| Ok((feature, self.deriver.dtc(c)?)))
            .collect::<Result<BTreeMap<_, _>, NonGeneratable>>()?;

        let base: Vec<GenerationSpec> = (0..self.tree.n_features())
            .map(|feature| match intervals.get(&feature) {
                Some(spec) => GenerationSpec::Interval(*spec),
                None => GenerationSpec::Pool(sampler.pool(feature)),
            })
            .collect();

        let mut out = PathTests::default();
        for &criterion in self.criteria {
            match criterion {
                Criterion::Dtc => {
                    out.tests.push(DerivedTest::new(path, criterion, None, path.class, base.clone()));
                }
                Criterion::Bva => {
                    for constraint in constraints.values() {
                        for bands in self.deriver.bva(constraint) {
                            self.push_boundary_tests(path, &bands, &base, &mut out);
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    /// Inside and outside tests of one threshold.
    ///
    /// When the outside band reaches several classes, the pools of the
    /// features split on beyond the threshold are narrowed onto one leaf.
    fn push_boundary_tests(
        &self,
        path: &Path,
        bands: &BoundaryBands,
        base: &[GenerationSpec],
        out: &mut PathTests,
    ) {
        let probe = |side, inside| BoundaryProbe {
            feature: bands.feature,
            threshold: bands.threshold,
            side,
            inside,
        };

        let mut specs = base.to_vec();
        specs[bands.feature] = GenerationSpec::Interval(bands.inside);
        out.tests.push(DerivedTest::new(
            path,
            Criterion::Bva,
            Some(probe(bands.inside_side, true)),
            path.class,
            specs,
        ));

        let across = probe(bands.inside_side.opposite(), false);
        let missing =
            |reason: String| DroppedBoundary { leaf_id: path.leaf_id, boundary: across, reason };
        let Some(outside) = bands.outside else {
            out.dropped.push(missing(format!("no value fits across {}", bands.threshold)));
            return;
        };
        let mut specs = base.to_vec();
        specs[bands.feature] = GenerationSpec::Interval(outside);
        let class = self.expected_class(&specs).or_else(|| {
            let class = self.pin_to_leaf(&mut specs)?;
            debug!(
                leaf = path.leaf_id,
                feature = bands.feature,
                "pools narrowed across {}",
                bands.threshold
            );
            Some(class)
        });
        match class {
            Some(class) => {
                out.tests.push(DerivedTest::new(path, Criterion::Bva, Some(across), class, specs));
            }
            None => out.dropped.push(missing(format!(
                "band across {} reaches several classes through interval features",
                bands.threshold
            ))),
        }
    }

    /// Route `specs` down a single branch, narrowing a pool wherever it
    /// admits both sides of a split. The side keeping more values wins, ties
    /// go left. Returns the class of the leaf reached; fails when an
    /// interval straddles a split.
    fn pin_to_leaf(&self, specs: &mut [GenerationSpec]) -> Option<usize> {
        let mut id = self.tree.root();
        loop {
            let split = match *self.tree.node(id)? {
                Node::Leaf(leaf) => return Some(leaf.class),
                Node::Internal(split) => split,
            };
            let spec = &mut specs[split.feature];
            id = match spec.admits_split(split.threshold) {
                (true, false) => split.left,
                (false, true) => split.right,
                (true, true) => {
                    let GenerationSpec::Pool(pool) = spec else {
                        return None;
                    };
                    let left = pool.values.partition_point(|&v| v <= split.threshold);
                    if left >= pool.values.len() - left {
                        pool.values.truncate(left);
                        split.left
                    } else {
                        pool.values = pool.values.split_off(left);
                        split.right
                    }
                }
                (false, false) => return None,
            };
        }
    }

    /// The single class every input admitted by `specs` is routed to.
    pub fn expected_class(&self, specs: &[GenerationSpec]) -> Option<usize> {
        match self
            .tree
            .reachable_classes(|feature, threshold| specs[feature].admits_split(threshold))
            .as_slice()
        {
            [class] => Some(*class),
            _ => None,
        }
    }
}
