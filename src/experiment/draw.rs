//! Seeded sampling from generation specs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::derive::{from_units, DerivedTest, GenerationSpec, IntervalSpec};

/// Smallest float greater than `x`.
pub fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    f64::from_bits(if x > 0.0 { bits + 1 } else { bits - 1 })
}

/// Largest float smaller than `x`.
pub fn next_down(x: f64) -> f64 {
    -next_up(-x)
}

/// Draws feature vectors from derived tests with one seeded stream.
pub struct SampleDrawer {
    rng: StdRng,
}

impl SampleDrawer {
    /// Create a drawer.
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// One value admitted by `spec`.
    pub fn value(&mut self, spec: &GenerationSpec) -> f64 {
        match spec {
            GenerationSpec::Pool(pool) => match pool.values.len() {
                0 => 0.0,
                n => pool.values[self.rng.random_range(0..n)],
            },
            GenerationSpec::Interval(interval) => self.interval_value(interval),
        }
    }

    fn interval_value(&mut self, spec: &IntervalSpec) -> f64 {
        if let Some(places) = spec.decimals {
            if let Some((lo, hi)) = spec.grid_units(places) {
                return from_units(self.rng.random_range(lo..=hi), places);
            }
        }

        let lo = if spec.min_inclusive { spec.min } else { next_up(spec.min) };
        let hi = if spec.max_inclusive { spec.max } else { next_down(spec.max) };
        if lo >= hi {
            return lo;
        }
        if !(hi - lo).is_finite() {
            // Width overflows; interpolate without forming it
            let t: f64 = self.rng.random();
            return (lo * (1.0 - t) + hi * t).clamp(lo, hi);
        }
        self.rng.random_range(lo..=hi)
    }

    /// One feature vector for `test`, in column order.
    pub fn draw(&mut self, test: &DerivedTest) -> Vec<f64> {
        test.features.iter().map(|f| self.value(&f.spec)).collect()
    }

    /// `n` feature vectors for `test`.
    pub fn draw_many(&mut self, test: &DerivedTest, n: usize) -> Vec<Vec<f64>> {
        (0..n).map(|_| self.draw(test)).collect()
    }
}
