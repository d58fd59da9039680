//! L0-sampler: a multi-level geometric sub-sampling over s-sparse
//! recoverers, plus a tag hash used for the level filter and for the
//! (documented, non-default) min-tag selection strategy.
//!
//! `g-raph`'s `l_zero_sampling` is a one-shot trait method consuming an
//! iterator of tokens and building a fresh data structure for each call,
//! with no `add`/`subtract` and no way to regenerate identical parameters
//! from a seed. This is re-architected into a stateful sketch, following
//! `original_source/fast/L0Sampler.py`'s level bookkeeping (`levels`, `k =
//! 4`, the geometric `max_l` filter) and `original_source/L0Sampler.py`'s
//! `add`, which neither Python variant nor the `g-raph` port combine into
//! one structure.

use std::collections::HashMap;

use num_bigint::BigInt;
use rand::seq::IteratorRandom;

use crate::error::{check_in_range, SketchError};
use crate::hash::{pick_k_independent, KIndependentHash};
use crate::primes::PrimeOracle;
use crate::rng::{fresh_seed, from_seed};
use crate::sparse_recovery::s_sparse::{SSparseOutcome, SparseRecoverer};

/// Fixed independence degree for the per-level s-sparse recoverers and the
/// tag hash.
const K: u32 = 4;
/// Sparsity each level's recoverer targets: `s = 2k`.
const SPARSE_DEGREE: u64 = 2 * K as u64;

/// Draws a coordinate approximately uniformly from the support of a
/// streamed integer vector.
pub struct L0Sampler {
    n: u64,
    delta: f64,
    seed: u64,
    levels: u64,
    tag_hash: KIndependentHash,
    recoverers: Vec<SparseRecoverer>,
}

impl L0Sampler {
    /// Builds a sampler for a vector of length `n`.
    ///
    /// `delta` defaults to `1/log2(n)` (matching
    /// `original_source/fast/L0Sampler.py`) when omitted. `seed` defaults to
    /// 32 fresh random bits when omitted; two samplers built from the same
    /// seed observe identical construction-time draws, in this fixed order:
    /// the tag hash, then each level's s-sparse recoverer in order. That
    /// order is the precondition for `add`/`subtract` to be meaningful.
    pub fn new(n: u64, delta: Option<f64>, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| fresh_seed() as u32 as u64);
        let delta = delta.unwrap_or_else(|| 1.0 / (n.max(2) as f64).log2());
        let levels = (n.max(1) as f64).log2().ceil().max(1.0) as u64;

        let oracle = PrimeOracle::new();
        let mut rng = from_seed(seed);

        let tag_hash = pick_k_independent(n, n.max(1), K, &oracle, &mut rng);
        let recoverers = (0..levels)
            .map(|_| SparseRecoverer::new(n, SPARSE_DEGREE, delta, &oracle, &mut rng))
            .collect();

        Self {
            n,
            delta,
            seed,
            levels,
            tag_hash,
            recoverers,
        }
    }

    /// The seed this sampler was built from (or drew for itself).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Applies `a[i] += delta`, updating every level `i` is active at.
    pub fn update(&mut self, i: u64, delta: i64) -> Result<(), SketchError> {
        check_in_range(i, self.n)?;
        let tag = self.tag_hash.eval(i);
        let active_levels = max_active_level(tag, self.n, self.levels);
        for level in self.recoverers.iter_mut().take(active_levels as usize) {
            level.update(i, delta)?;
        }
        Ok(())
    }

    /// Recovers one representative coordinate from each level that
    /// successfully recovers, then returns one of those representatives
    /// chosen uniformly at random.
    ///
    /// See [`Self::get_sample_min_tag`] for an alternative selection rule.
    pub fn get_sample(&self) -> Option<(u64, BigInt)> {
        let mut rng = rand::thread_rng();
        let mut representatives: HashMap<u64, BigInt> = HashMap::new();
        for level in &self.recoverers {
            if let SSparseOutcome::Recovered(map) = level.recover() {
                if let Some((idx, value)) = map.into_iter().choose(&mut rng) {
                    representatives.insert(idx, value);
                }
            }
        }
        representatives.into_iter().choose(&mut rng)
    }

    /// Alternative sample selection: the coordinate with the smallest tag
    /// among all coordinates recovered on the first level that succeeds.
    ///
    /// Not the default; kept so callers who want the original paper's
    /// min-tag rule have it available.
    pub fn get_sample_min_tag(&self) -> Option<(u64, BigInt)> {
        for level in &self.recoverers {
            if let SSparseOutcome::Recovered(map) = level.recover() {
                return map
                    .into_iter()
                    .min_by_key(|(idx, _)| self.tag_hash.eval(*idx));
            }
        }
        None
    }

    /// Aggregates every coordinate recovered by any successful cell across
    /// every level into one mapping.
    pub fn get_samples(&self) -> HashMap<u64, BigInt> {
        let mut result = HashMap::new();
        for level in &self.recoverers {
            if let SSparseOutcome::Recovered(map) = level.recover() {
                result.extend(map);
            }
        }
        result
    }

    /// Adds `other` into `self`, level by level.
    pub fn add(&mut self, other: &Self) -> Result<(), SketchError> {
        self.check_compatible(other)?;
        for (level, other_level) in self.recoverers.iter_mut().zip(other.recoverers.iter()) {
            level.add(other_level)?;
        }
        Ok(())
    }

    /// Subtracts `other` from `self`, level by level.
    pub fn subtract(&mut self, other: &Self) -> Result<(), SketchError> {
        self.check_compatible(other)?;
        for (level, other_level) in self.recoverers.iter_mut().zip(other.recoverers.iter()) {
            level.subtract(other_level)?;
        }
        Ok(())
    }

    fn check_compatible(&self, other: &Self) -> Result<(), SketchError> {
        if self.n != other.n || self.seed != other.seed {
            return Err(SketchError::Incompatible(
                "L0 samplers must share n and be built from the same seed",
            ));
        }
        Ok(())
    }
}

/// Largest `L` such that `(n >> L) > tag`, capped at `levels`. Coordinate
/// `i` (with `tag = H(i)`) is active at levels `0..L`.
fn max_active_level(tag: u64, n: u64, levels: u64) -> u64 {
    let mut shifted = n.saturating_sub(1);
    let mut count = 0u64;
    while shifted >= tag && count < levels {
        count += 1;
        shifted >>= 1;
    }
    count
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn add_recovers_sample_from_combined_sketch() {
        // E4: n=100, seed=0; update (0,10) on B; A.add(B) then A.get_sample() -> (0,10).
        let mut a = L0Sampler::new(100, None, Some(0));
        let mut b = L0Sampler::new(100, None, Some(0));
        b.update(0, 10).unwrap();

        a.add(&b).unwrap();
        assert_eq!(a.get_sample(), Some((0, BigInt::from(10))));
    }

    #[test]
    fn get_samples_returns_subset_of_inserted_coordinates() {
        // E5: n=1000, seed=7; insert 50 distinct coordinates with value 1.
        let mut sampler = L0Sampler::new(1_000, None, Some(7));
        let coordinates: Vec<u64> = (0..50).map(|i| i * 17 % 1_000).collect();
        for &i in &coordinates {
            sampler.update(i, 1).unwrap();
        }

        let samples = sampler.get_samples();
        assert!(!samples.is_empty());
        for (idx, value) in &samples {
            assert!(coordinates.contains(idx));
            assert_eq!(value, &BigInt::from(1));
        }
    }

    #[test]
    fn delete_then_resample_always_fails() {
        // E6: insert then delete the same stream; every get_sample is Fail.
        let mut sampler = L0Sampler::new(1_000, None, Some(3));
        let stream = [(5u64, 3i64), (100, -7), (999, 42)];
        for &(i, d) in &stream {
            sampler.update(i, d).unwrap();
        }
        for &(i, d) in &stream {
            sampler.update(i, -d).unwrap();
        }

        assert_eq!(sampler.get_sample(), None);
        assert!(sampler.get_samples().is_empty());
    }

    #[test]
    fn update_rejects_out_of_range_index() {
        let mut sampler = L0Sampler::new(10, None, Some(1));
        assert!(sampler.update(10, 1).is_err());
    }

    #[test]
    fn add_rejects_samplers_from_different_seeds() {
        let mut a = L0Sampler::new(100, None, Some(1));
        let b = L0Sampler::new(100, None, Some(2));
        assert!(matches!(a.add(&b), Err(SketchError::Incompatible(_))));
    }

    #[test]
    fn max_active_level_is_monotone_and_capped() {
        assert_eq!(max_active_level(0, 1_000, 10), 10);
        assert_eq!(max_active_level(999, 1_000, 10), 0);
    }

    #[test]
    fn sample_containment_holds_across_many_runs() {
        // Property 6: any successful get_sample returns a nonzero value for
        // a coordinate that was actually inserted.
        for seed in 0..20u64 {
            let mut sampler = L0Sampler::new(500, None, Some(seed));
            let coordinates = [3u64, 77, 200, 450];
            for &i in &coordinates {
                sampler.update(i, 5).unwrap();
            }
            if let Some((idx, value)) = sampler.get_sample() {
                assert!(coordinates.contains(&idx));
                assert_ne!(value, BigInt::from(0));
            }
        }
    }
}
