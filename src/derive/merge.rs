//! Per-feature interval merging of path predicates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::walker::{Direction, Path, Predicate};
use crate::dataset::FeatureDomain;

/// Where a bound comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundOrigin {
    /// Observed domain edge; no split on the path set it
    Domain,
    /// A split threshold on the path
    Split,
}

/// One end of a feature interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    /// Bound value
    pub value: f64,
    /// Whether `value` itself is admitted
    pub inclusive: bool,
    /// Source of the bound
    pub origin: BoundOrigin,
}

impl Bound {
    /// Inclusive bound at a domain edge.
    pub const fn domain(value: f64) -> Self {
        Self { value, inclusive: true, origin: BoundOrigin::Domain }
    }

    /// Whether a split on the path produced this bound.
    pub fn is_active(&self) -> bool {
        self.origin == BoundOrigin::Split
    }
}

/// Tightest interval a path implies for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureConstraint {
    /// Feature index
    pub feature: usize,
    /// Lower bound
    pub lower: Bound,
    /// Upper bound
    pub upper: Bound,
}

impl FeatureConstraint {
    /// Constraint spanning the whole observed domain.
    pub const fn unbounded(feature: usize, domain: FeatureDomain) -> Self {
        Self { feature, lower: Bound::domain(domain.min), upper: Bound::domain(domain.max) }
    }

    /// Tighten with one predicate on this feature.
    ///
    /// `<= t` lowers the upper bound to `t` (inclusive); `> t` raises the
    /// lower bound to `t` (exclusive). Looser predicates leave it unchanged.
    pub fn apply(&mut self, predicate: &Predicate) {
        let t = predicate.threshold;
        match predicate.direction {
            Direction::Le if t <= self.upper.value => {
                self.upper = Bound { value: t, inclusive: true, origin: BoundOrigin::Split };
            }
            Direction::Gt if t >= self.lower.value => {
                self.lower = Bound { value: t, inclusive: false, origin: BoundOrigin::Split };
            }
            _ => {}
        }
    }

    /// Whether no real value satisfies the constraint.
    pub fn is_empty(&self) -> bool {
        self.lower.value > self.upper.value
            || (self.lower.value == self.upper.value
                && !(self.lower.inclusive && self.upper.inclusive))
    }

    /// Whether `value` satisfies the constraint.
    pub fn contains(&self, value: f64) -> bool {
        let above = if self.lower.inclusive { value >= self.lower.value } else { value > self.lower.value };
        let below = if self.upper.inclusive { value <= self.upper.value } else { value < self.upper.value };
        above && below
    }

    /// Distance between the bounds.
    pub fn width(&self) -> f64 {
        self.upper.value - self.lower.value
    }

    /// Active bounds, lower first.
    pub fn active_bounds(&self) -> impl Iterator<Item = (Direction, Bound)> {
        [(Direction::Gt, self.lower), (Direction::Le, self.upper)]
            .into_iter()
            .filter(|(_, bound)| bound.is_active())
    }
}

impl fmt::Display for FeatureConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.lower.inclusive { '[' } else { '(' };
        let close = if self.upper.inclusive { ']' } else { ')' };
        write!(f, "f{} in {open}{}, {}{close}", self.feature, self.lower.value, self.upper.value)
    }
}

/// Reduces a path to one [`FeatureConstraint`] per referenced feature.
pub struct ConstraintMerger<'a> {
    domains: &'a [FeatureDomain],
}

impl<'a> ConstraintMerger<'a> {
    /// Create a merger over per-feature observed domains.
    pub fn new(domains: &'a [FeatureDomain]) -> Self {
        Self { domains }
    }

    /// Merge a path's predicates; features absent from the map are
    /// unconstrained on that path.
    pub fn merge(&self, path: &Path) -> BTreeMap<usize, FeatureConstraint> {
        let mut constraints = BTreeMap::new();
        for predicate in &path.predicates {
            let domain = self.domains[predicate.feature];
            constraints
                .entry(predicate.feature)
                .or_insert_with(|| FeatureConstraint::unbounded(predicate.feature, domain))
                .apply(predicate);
        }
        constraints
    }
}
