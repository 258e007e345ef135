//! Decimal precision for fixed-decimal generation.
//!
//! A threshold learned between two observed values `a <= t < b` is generated
//! with as many decimals as those neighbours carry, so boundary values look
//! like training data instead of carrying the split midpoint's extra digit.

/// Highest precision generated values carry.
pub const MAX_DECIMALS: u32 = 15;

/// Number of fractional digits in the shortest round-trip rendering.
///
/// Whole numbers have zero decimal places.
pub fn decimal_places(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let rendered = value.abs().to_string();
    rendered
        .split_once('.')
        .map_or(0, |(_, frac)| frac.trim_end_matches('0').len() as u32)
}

/// How two neighbour precisions are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrecisionMode {
    /// Keep the more precise neighbour
    #[default]
    Max,
    /// Keep the less precise neighbour
    Min,
}

/// Chooses decimal places for generated boundary values.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecisionHarmonizer {
    mode: PrecisionMode,
}

impl PrecisionHarmonizer {
    /// `update_precision` selects [`PrecisionMode::Min`].
    pub fn new(update_precision: bool) -> Self {
        let mode = if update_precision { PrecisionMode::Min } else { PrecisionMode::Max };
        Self { mode }
    }

    /// Active combination mode.
    pub fn mode(&self) -> PrecisionMode {
        self.mode
    }

    /// Decimal places for a value bounded by `a` and `b`.
    pub fn harmonize(&self, a: f64, b: f64) -> u32 {
        self.combine(decimal_places(a), decimal_places(b))
    }

    /// Combine two precisions under the active mode.
    pub fn combine(&self, p: u32, q: u32) -> u32 {
        let places = match self.mode {
            PrecisionMode::Max => p.max(q),
            PrecisionMode::Min => p.min(q),
        };
        places.min(MAX_DECIMALS)
    }

    /// Decimal places for a threshold, from the observed values around it.
    ///
    /// `observed` must be sorted ascending. The bounding values are the
    /// greatest observed value `<= threshold` and the least one above it.
    pub fn threshold_precision(&self, threshold: f64, observed: &[f64]) -> u32 {
        let split = observed.partition_point(|&v| v <= threshold);
        let below = split.checked_sub(1).map(|i| observed[i]);
        let above = observed.get(split).copied();
        match (below, above) {
            (Some(a), Some(b)) => self.harmonize(a, b),
            (Some(v), None) | (None, Some(v)) => decimal_places(v).min(MAX_DECIMALS),
            (None, None) => decimal_places(threshold).min(MAX_DECIMALS),
        }
    }
}

/// Largest grid index magnitude an f64 holds exactly (2^53).
const MAX_GRID_UNITS: f64 = 9_007_199_254_740_992.0;

fn scale(places: u32) -> f64 {
    10f64.powi(places as i32)
}

/// Whether `value` has an exact integer grid index at `places` decimals.
pub fn fits_grid(value: f64, places: u32) -> bool {
    (value * scale(places)).abs() < MAX_GRID_UNITS
}

/// Integer grid index of the largest grid value `<= value`.
pub(crate) fn floor_units(value: f64, places: u32) -> Option<i64> {
    if !fits_grid(value, places) {
        return None;
    }
    let s = scale(places);
    let mut units = (value * s).floor() as i64;
    while units as f64 / s > value {
        units -= 1;
    }
    while (units + 1) as f64 / s <= value {
        units += 1;
    }
    Some(units)
}

/// Integer grid index of the smallest grid value `>= value`.
pub(crate) fn ceil_units(value: f64, places: u32) -> Option<i64> {
    if !fits_grid(value, places) {
        return None;
    }
    let s = scale(places);
    let mut units = (value * s).ceil() as i64;
    while (units as f64 / s) < value {
        units += 1;
    }
    while (units - 1) as f64 / s >= value {
        units -= 1;
    }
    Some(units)
}

/// Grid value for an integer index.
pub(crate) fn from_units(units: i64, places: u32) -> f64 {
    units as f64 / scale(places)
}

/// Largest grid value `<= value`.
pub fn floor_to(value: f64, places: u32) -> Option<f64> {
    floor_units(value, places).map(|u| from_units(u, places))
}

/// Smallest grid value `>= value`.
pub fn ceil_to(value: f64, places: u32) -> Option<f64> {
    ceil_units(value, places).map(|u| from_units(u, places))
}

/// Smallest grid value strictly above `value`.
pub fn step_above(value: f64, places: u32) -> Option<f64> {
    floor_units(value, places).map(|u| from_units(u + 1, places))
}

/// Smallest positive grid step.
pub fn unit(places: u32) -> f64 {
    1.0 / scale(places)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places(3.0), 0);
        assert_eq!(decimal_places(-42.0), 0);
        assert_eq!(decimal_places(1.5), 1);
        assert_eq!(decimal_places(1.265), 3);
        assert_eq!(decimal_places(-0.0001), 4);
        assert_eq!(decimal_places(1e-7), 7);
        assert_eq!(decimal_places(1e20), 0);
    }

    #[test]
    fn test_harmonize_max_mode() {
        let h = PrecisionHarmonizer::new(false);
        assert_eq!(h.mode(), PrecisionMode::Max);
        assert_eq!(h.harmonize(1.26, 1.271), 3);
        assert_eq!(h.harmonize(2.0, 3.0), 0);
        assert!(h.harmonize(1.2, 1.2345) >= decimal_places(1.2).max(decimal_places(1.2345)));
    }

    #[test]
    fn test_harmonize_min_mode() {
        let h = PrecisionHarmonizer::new(true);
        assert_eq!(h.mode(), PrecisionMode::Min);
        assert_eq!(h.harmonize(1.26, 1.271), 2);
        assert_eq!(h.harmonize(7.0, 1.271), 0);
        assert!(!(h.harmonize(1.2, 1.2345) >= decimal_places(1.2).max(decimal_places(1.2345))));
    }

    #[test]
    fn test_threshold_precision_uses_neighbours() {
        let observed = [1.0, 1.26, 1.27, 2.5];
        let h = PrecisionHarmonizer::new(false);
        assert_eq!(h.threshold_precision(1.265, &observed), 2);
        assert_eq!(h.threshold_precision(1.885, &observed), 2);
        assert_eq!(h.threshold_precision(1.13, &observed), 2);
        assert_eq!(PrecisionHarmonizer::new(true).threshold_precision(1.13, &observed), 0);
    }

    #[test]
    fn test_threshold_precision_outside_observed() {
        let h = PrecisionHarmonizer::default();
        assert_eq!(h.threshold_precision(0.5, &[1.25, 2.0]), 2);
        assert_eq!(h.threshold_precision(9.5, &[1.25, 2.0]), 0);
        assert_eq!(h.threshold_precision(0.125, &[]), 3);
    }

    #[test]
    fn test_grid_rounding() {
        assert_eq!(floor_to(1.265, 2), Some(1.26));
        assert_eq!(ceil_to(1.265, 2), Some(1.27));
        assert_eq!(step_above(1.265, 2), Some(1.27));
        assert_eq!(step_above(1.27, 2), Some(1.28));
        assert_eq!(floor_to(1.27, 2), Some(1.27));
        assert_eq!(ceil_to(-0.35, 1), Some(-0.3));
        assert_eq!(floor_to(-0.35, 1), Some(-0.4));
        assert_eq!(unit(3), 0.001);
    }

    #[test]
    fn test_grid_values_never_cross() {
        for &t in &[0.1 + 0.2, 1.005, 2.675, -3.335, 1e-3] {
            for places in 0..8 {
                assert!(floor_to(t, places).unwrap() <= t);
                assert!(ceil_to(t, places).unwrap() >= t);
                assert!(step_above(t, places).unwrap() > t);
            }
        }
    }

    #[test]
    fn test_grid_rejects_inexact_indices() {
        assert!(fits_grid(1e15, 0));
        assert!(!fits_grid(1e15, 2));
        assert!(!fits_grid(f64::INFINITY, 0));
        assert!(!fits_grid(f64::NAN, 0));

        assert_eq!(floor_units(1e19, 0), None);
        assert_eq!(ceil_units(-1e19, 0), None);
        assert_eq!(step_above(9.3e18, 0), None);
        assert_eq!(ceil_to(1.5e19, 3), None);
        assert_eq!(floor_units(4.5e15, 0), Some(4_500_000_000_000_000));
    }
}
