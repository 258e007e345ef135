//! Representative value pools for unconstrained features.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Small set of observed values a generator picks from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSpec {
    /// Sorted, distinct observed values
    pub values: Vec<f64>,
}

impl PoolSpec {
    /// Whether some value routes left (`<= t`) and some right (`> t`).
    pub fn admits_split(&self, threshold: f64) -> (bool, bool) {
        let left = self.values.iter().any(|&v| v <= threshold);
        let right = self.values.iter().any(|&v| v > threshold);
        (left, right)
    }
}

/// Seeded sampler of observed feature values.
///
/// Distinct values are split into `pool_size` equal-count strata over the
/// sorted order and one value is drawn from each, so pools span the observed
/// range. All pools come from one RNG stream; the order of [`Self::pool`]
/// calls therefore determines the output.
pub struct DomainSampler<'a> {
    observed: &'a [Vec<f64>],
    pool_size: usize,
    rng: StdRng,
}

impl<'a> DomainSampler<'a> {
    /// Create a sampler over sorted distinct values per feature.
    pub fn new(observed: &'a [Vec<f64>], pool_size: usize, seed: u64) -> Self {
        Self { observed, pool_size, rng: StdRng::seed_from_u64(seed) }
    }

    /// Draw the pool for one feature.
    pub fn pool(&mut self, feature: usize) -> PoolSpec {
        let observed: &'a [Vec<f64>] = self.observed;
        let distinct = &observed[feature];
        let n = distinct.len();
        let k = self.pool_size;
        if n <= k {
            return PoolSpec { values: distinct.clone() };
        }

        let values = (0..k)
            .map(|i| {
                let start = i * n / k;
                let end = (i + 1) * n / k;
                distinct[self.rng.random_range(start..end)]
            })
            .collect();
        PoolSpec { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed(n: usize) -> Vec<Vec<f64>> {
        vec![(0..n).map(|i| i as f64 * 0.5).collect(), vec![1.0, 2.0, 3.0]]
    }

    #[test]
    fn test_small_domain_returns_everything() {
        let obs = observed(100);
        let mut sampler = DomainSampler::new(&obs, 10, 42);
        assert_eq!(sampler.pool(1).values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_pool_is_bounded_sorted_distinct() {
        let obs = observed(1000);
        let mut sampler = DomainSampler::new(&obs, 10, 42);
        let pool = sampler.pool(0);
        assert_eq!(pool.values.len(), 10);
        assert!(pool.values.windows(2).all(|w| w[0] < w[1]));
        assert!(pool.values.iter().all(|v| obs[0].contains(v)));
    }

    #[test]
    fn test_pool_spans_range() {
        let obs = observed(1000);
        let mut sampler = DomainSampler::new(&obs, 10, 7);
        let pool = sampler.pool(0);
        // First stratum covers the lowest tenth, last stratum the highest
        assert!(pool.values[0] < 50.0);
        assert!(pool.values[9] >= 450.0);
    }

    #[test]
    fn test_same_seed_same_pools() {
        let obs = observed(500);
        let mut a = DomainSampler::new(&obs, 10, 1234);
        let mut b = DomainSampler::new(&obs, 10, 1234);
        for _ in 0..3 {
            assert_eq!(a.pool(0), b.pool(0));
        }
    }

    #[test]
    fn test_stream_advances_between_calls() {
        let obs = observed(500);
        let mut sampler = DomainSampler::new(&obs, 10, 99);
        let pools: Vec<_> = (0..5).map(|_| sampler.pool(0)).collect();
        assert!(pools.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_admits_split() {
        let pool = PoolSpec { values: vec![1.0, 2.0, 3.0] };
        assert_eq!(pool.admits_split(0.5), (false, true));
        assert_eq!(pool.admits_split(2.0), (true, true));
        assert_eq!(pool.admits_split(3.0), (true, false));
    }
}
