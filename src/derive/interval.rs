//! DTC intervals and BVA boundary bands.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::merge::{Bound, BoundOrigin, FeatureConstraint};
use super::precision::{
    ceil_to, ceil_units, decimal_places, fits_grid, floor_to, floor_units, step_above, unit,
    PrecisionHarmonizer, MAX_DECIMALS,
};
use super::walker::Direction;
use crate::config::{DeriveConfig, WidthBasis};
use crate::dataset::FeatureDomain;

/// Numeric range a generator draws one feature from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalSpec {
    /// Lower edge
    pub min: f64,
    /// Upper edge
    pub max: f64,
    /// Whether `min` may be drawn
    pub min_inclusive: bool,
    /// Whether `max` may be drawn
    pub max_inclusive: bool,
    /// Fixed-decimal precision of drawn values; `None` draws floats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
}

impl IntervalSpec {
    /// Closed float interval.
    pub const fn closed(min: f64, max: f64) -> Self {
        Self { min, max, min_inclusive: true, max_inclusive: true, decimals: None }
    }

    /// Whether `value` lies in the interval (ignoring `decimals`).
    pub fn contains(&self, value: f64) -> bool {
        let above = if self.min_inclusive { value >= self.min } else { value > self.min };
        let below = if self.max_inclusive { value <= self.max } else { value < self.max };
        above && below
    }

    /// Whether no real value lies in the interval.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
            || (self.min == self.max && !(self.min_inclusive && self.max_inclusive))
    }

    /// Distance between the edges.
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Whether every value of `self` lies in `other`.
    pub fn is_subset_of(&self, other: &IntervalSpec) -> bool {
        let lower_ok = self.min > other.min
            || (self.min == other.min && (other.min_inclusive || !self.min_inclusive));
        let upper_ok = self.max < other.max
            || (self.max == other.max && (other.max_inclusive || !self.max_inclusive));
        self.is_empty() || (lower_ok && upper_ok)
    }

    /// First and last grid index admitted at `places` decimals, if any.
    ///
    /// `None` also when an edge has no exact grid index at that precision.
    pub fn grid_units(&self, places: u32) -> Option<(i64, i64)> {
        let lo = if self.min_inclusive {
            ceil_units(self.min, places)?
        } else {
            floor_units(self.min, places)? + 1
        };
        let hi = if self.max_inclusive {
            floor_units(self.max, places)?
        } else {
            ceil_units(self.max, places)? - 1
        };
        (lo <= hi).then_some((lo, hi))
    }

    /// Whether both edges have exact grid indices at `places` decimals.
    pub fn fits_grid(&self, places: u32) -> bool {
        fits_grid(self.min, places) && fits_grid(self.max, places)
    }

    /// Whether some admitted value routes left (`<= t`) and some right (`> t`).
    pub fn admits_split(&self, threshold: f64) -> (bool, bool) {
        if self.is_empty() {
            return (false, false);
        }
        let left = self.min < threshold || (self.min == threshold && self.min_inclusive);
        let right = self.max > threshold;
        (left, right)
    }

    fn with_decimals(mut self, places: u32) -> Self {
        self.decimals = Some(places);
        self
    }
}

/// Side of a threshold a band lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// `x <= threshold`
    Below,
    /// `x > threshold`
    Above,
}

impl Side {
    /// The other side.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Below => Self::Above,
            Self::Above => Self::Below,
        }
    }

    /// Lower-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Below => "below",
            Self::Above => "above",
        }
    }
}

/// Bands on both sides of one active threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryBands {
    /// Feature index
    pub feature: usize,
    /// Threshold the bands touch
    pub threshold: f64,
    /// Side of the threshold the leaf lies on
    pub inside_side: Side,
    /// Band inside the leaf's interval
    pub inside: IntervalSpec,
    /// Band across the threshold, if any value fits there
    pub outside: Option<IntervalSpec>,
}

/// A constraint that cannot produce values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NonGeneratable {
    #[error("feature {feature} has an empty interval between {lower} and {upper}")]
    EmptyInterval { feature: usize, lower: f64, upper: f64 },

    #[error("feature {feature} interval [{lower}, {upper}] holds no fixed-decimal value")]
    NoGridValue { feature: usize, lower: f64, upper: f64 },
}

/// Far limit of a band: a neighbouring threshold, the domain edge or the
/// leaf's own opposite bound.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Edge {
    value: f64,
    inclusive: bool,
}

impl From<Bound> for Edge {
    fn from(bound: Bound) -> Self {
        Self { value: bound.value, inclusive: bound.inclusive }
    }
}

/// Turns merged constraints into concrete generation intervals.
pub struct IntervalDeriver<'a> {
    domains: &'a [FeatureDomain],
    observed: &'a [Vec<f64>],
    thresholds: &'a [Vec<f64>],
    rate: f64,
    basis: WidthBasis,
    precision: Option<PrecisionHarmonizer>,
}

impl<'a> IntervalDeriver<'a> {
    /// Create a deriver.
    ///
    /// `observed` holds sorted distinct training values per feature and
    /// `thresholds` the sorted distinct split thresholds per feature.
    pub fn new(
        domains: &'a [FeatureDomain],
        observed: &'a [Vec<f64>],
        thresholds: &'a [Vec<f64>],
        config: &DeriveConfig,
    ) -> Self {
        Self {
            domains,
            observed,
            thresholds,
            rate: config.boundary_value_rate,
            basis: config.width_basis,
            precision: config
                .float_as_decimal
                .then(|| PrecisionHarmonizer::new(config.update_precision)),
        }
    }

    /// Widest interval valid for the leaf.
    pub fn dtc(&self, constraint: &FeatureConstraint) -> Result<IntervalSpec, NonGeneratable> {
        let feature = constraint.feature;
        let (lower, upper) = (constraint.lower.value, constraint.upper.value);
        if constraint.is_empty() {
            return Err(NonGeneratable::EmptyInterval { feature, lower, upper });
        }

        let spec = IntervalSpec {
            min: lower,
            max: upper,
            min_inclusive: constraint.lower.inclusive,
            max_inclusive: constraint.upper.inclusive,
            decimals: None,
        };
        let Some(harmonizer) = self.precision else {
            return Ok(spec);
        };

        let places = harmonizer.combine(
            self.bound_precision(feature, constraint.lower),
            self.bound_precision(feature, constraint.upper),
        );
        for p in places..=MAX_DECIMALS {
            if !spec.fits_grid(p) {
                // No exact grid this far out; draw floats
                return Ok(spec);
            }
            if spec.grid_units(p).is_some() {
                return Ok(spec.with_decimals(p));
            }
        }
        Err(NonGeneratable::NoGridValue { feature, lower, upper })
    }

    /// Bands around every active boundary of the constraint, lower first.
    pub fn bva(&self, constraint: &FeatureConstraint) -> Vec<BoundaryBands> {
        if constraint.is_empty() {
            return Vec::new();
        }
        constraint
            .active_bounds()
            .filter_map(|(direction, bound)| self.boundary(constraint, direction, bound.value))
            .collect()
    }

    fn boundary(
        &self,
        constraint: &FeatureConstraint,
        direction: Direction,
        threshold: f64,
    ) -> Option<BoundaryBands> {
        let feature = constraint.feature;
        let domain = self.domains[feature];
        let (below, above) = self.slab_limits(feature, threshold);

        let (inside_side, inside_limit, outside_limit) = match direction {
            // Leaf lies below an upper bound `<= t`
            Direction::Le => (Side::Below, tighter_low(below, constraint.lower.into()), above),
            // Leaf lies above a lower bound `> t`
            Direction::Gt => (Side::Above, tighter_high(above, constraint.upper.into()), below),
        };

        let (inside_basis, outside_basis) = match self.basis {
            WidthBasis::Path => (constraint.width(), (threshold - outside_limit.value).abs()),
            WidthBasis::Domain => (domain.width(), domain.width()),
        };
        let places = self
            .precision
            .map(|h| h.threshold_precision(threshold, &self.observed[feature]));

        let inside = self.band(threshold, inside_side, inside_limit, inside_basis, places)?;
        let outside =
            self.band(threshold, inside_side.opposite(), outside_limit, outside_basis, places);

        Some(BoundaryBands { feature, threshold, inside_side, inside, outside })
    }

    /// Nearest limits below and above `threshold` among the other thresholds
    /// of the feature and its domain edges.
    fn slab_limits(&self, feature: usize, threshold: f64) -> (Edge, Edge) {
        let domain = self.domains[feature];
        let thresholds = &self.thresholds[feature];

        let lower_idx = thresholds.partition_point(|&v| v < threshold);
        let below = match lower_idx.checked_sub(1).map(|i| thresholds[i]) {
            // `x == t'` routes left of `t'`, away from this slab
            Some(v) if v >= domain.min => Edge { value: v, inclusive: false },
            _ => Edge { value: domain.min, inclusive: true },
        };

        let upper_idx = thresholds.partition_point(|&v| v <= threshold);
        let above = match thresholds.get(upper_idx) {
            Some(&v) if v <= domain.max => Edge { value: v, inclusive: true },
            _ => Edge { value: domain.max, inclusive: true },
        };

        (below, above)
    }

    fn band(
        &self,
        threshold: f64,
        side: Side,
        limit: Edge,
        basis: f64,
        places: Option<u32>,
    ) -> Option<IntervalSpec> {
        let mut width = basis * self.rate / 100.0;
        if !(width > 0.0 && width.is_finite()) {
            width = places.map_or_else(|| min_float_width(threshold), unit);
        }
        let raw_far = match side {
            Side::Below => threshold - width,
            Side::Above => threshold + width,
        };

        let float = edge_spec(threshold, side, raw_far, limit);
        let Some(start) = places else {
            return (!float.is_empty()).then_some(float);
        };

        let snap = |p: u32| -> Option<IntervalSpec> {
            // Round the far edge toward the threshold so the band never grows;
            // a far edge without an exact grid index lies past `limit`
            let far = match side {
                Side::Below => ceil_to(raw_far, p).unwrap_or(limit.value),
                Side::Above => floor_to(raw_far, p).unwrap_or(limit.value),
            };
            let spec = edge_spec(threshold, side, far, limit).with_decimals(p);
            if spec.grid_units(p).is_some() {
                return Some(spec);
            }
            // Too narrow for the grid: reach the first grid value past the threshold
            let nearest = match side {
                Side::Below => floor_to(threshold, p)?,
                Side::Above => step_above(threshold, p)?,
            };
            let spec = edge_spec(threshold, side, nearest, limit).with_decimals(p);
            spec.grid_units(p).map(|_| spec)
        };
        for p in start..=MAX_DECIMALS {
            if !float.fits_grid(p) {
                return (!float.is_empty()).then_some(float);
            }
            if let Some(spec) = snap(p) {
                return Some(spec);
            }
        }
        None
    }

    fn bound_precision(&self, feature: usize, bound: Bound) -> u32 {
        match (bound.origin, self.precision) {
            (BoundOrigin::Split, Some(h)) => {
                h.threshold_precision(bound.value, &self.observed[feature])
            }
            _ => decimal_places(bound.value).min(MAX_DECIMALS),
        }
    }
}

/// Band from the threshold to `far`, clamped at `limit`.
fn edge_spec(threshold: f64, side: Side, far: f64, limit: Edge) -> IntervalSpec {
    match side {
        Side::Below => {
            let (min, min_inclusive) =
                if far <= limit.value { (limit.value, limit.inclusive) } else { (far, true) };
            IntervalSpec { min, max: threshold, min_inclusive, max_inclusive: true, decimals: None }
        }
        Side::Above => {
            let (max, max_inclusive) =
                if far >= limit.value { (limit.value, limit.inclusive) } else { (far, true) };
            IntervalSpec { min: threshold, max, min_inclusive: false, max_inclusive, decimals: None }
        }
    }
}

/// The higher of two lower limits; exclusive wins a tie.
fn tighter_low(a: Edge, b: Edge) -> Edge {
    if a.value > b.value || (a.value == b.value && !a.inclusive) {
        a
    } else {
        b
    }
}

/// The lower of two upper limits; exclusive wins a tie.
fn tighter_high(a: Edge, b: Edge) -> Edge {
    if a.value < b.value || (a.value == b.value && !a.inclusive) {
        a
    } else {
        b
    }
}

fn min_float_width(threshold: f64) -> f64 {
    threshold.abs().max(1.0) * f64::EPSILON * 16.0
}
