//! `s`-sparse recovery: a grid of 1-sparse recoverers, one per
//! `(row, hashed column)` cell.
//!
//! Grounded on `g-raph`'s `SparseRecovery<F: HashFunction>` (same
//! `rows x columns` grid of 1-sparse recoverers, same row-wise hashing) and
//! `original_source/sparse_recovery/SparseRecoverer.py`'s `add`/`subtract`,
//! which the `g-raph` version never implemented. Row count uses `ln`
//! (natural log), diverging from `g-raph`'s own `log2`-based row count; see
//! DESIGN.md.

use std::collections::HashMap;

use num_bigint::BigInt;
use rand::Rng;

use crate::error::{check_in_range, SketchError};
use crate::hash::{pick_k_independent, KIndependentHash};
use crate::primes::PrimeOracle;
use crate::sparse_recovery::one_sparse::{OneSparseOutcome, OneSparseRecovery};

/// The outcome of an s-sparse recovery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SSparseOutcome {
    /// No cell in the grid recovered a coordinate.
    Fail,
    /// The merged support recovered from every successful cell. Returned
    /// regardless of whether its size exceeds `s`; a stricter filter on top
    /// is a policy callers can apply themselves.
    Recovered(HashMap<u64, BigInt>),
}

/// A `rows x columns` table of 1-sparse recoverers that recovers any vector
/// with at most `s` non-zero coordinates, with high probability.
#[derive(Clone)]
pub struct SparseRecoverer {
    n: u64,
    s: u64,
    delta: f64,
    columns: u64,
    p: u64,
    hash_functions: Vec<KIndependentHash>,
    grid: Vec<Vec<OneSparseRecovery>>,
}

impl SparseRecoverer {
    /// Builds a new recoverer for vectors of length `n` with sparsity up to
    /// `s` and failure probability `delta`.
    pub fn new(n: u64, s: u64, delta: f64, oracle: &PrimeOracle, rng: &mut impl Rng) -> Self {
        let s = s.max(1);
        let columns = 2 * s;
        let rows = ((s as f64 / delta).ln().ceil() as usize).max(1);
        let p = oracle.next_prime(100 * n.max(1), rng);

        let hash_functions: Vec<KIndependentHash> = (0..rows)
            .map(|_| pick_k_independent(n, columns, 2, oracle, rng))
            .collect();

        let grid: Vec<Vec<OneSparseRecovery>> = (0..rows)
            .map(|_| {
                (0..columns)
                    .map(|_| OneSparseRecovery::with_prime(n, p, rng))
                    .collect()
            })
            .collect();

        Self {
            n,
            s,
            delta,
            columns,
            p,
            hash_functions,
            grid,
        }
    }

    /// Applies `a[i] += delta` by updating the cell each row hashes `i` to.
    pub fn update(&mut self, i: u64, delta: i64) -> Result<(), SketchError> {
        check_in_range(i, self.n)?;
        for (row, hasher) in self.grid.iter_mut().zip(self.hash_functions.iter()) {
            let column = hasher.eval(i) as usize;
            row[column].update(i, delta)?;
        }
        Ok(())
    }

    /// Attempts to recover the full support of the vector.
    ///
    /// Iterates every cell, merges every 1-sparse success into a map keyed
    /// by coordinate (duplicates from multiple rows agree since they
    /// describe the same true coordinate; spurious 1-sparse-looking
    /// collisions are filtered by the fingerprint check inside each cell
    /// with high probability).
    pub fn recover(&self) -> SSparseOutcome {
        let mut result = HashMap::new();
        for row in &self.grid {
            for cell in row {
                if let OneSparseOutcome::Recovered { index, value } = cell.recover() {
                    result.insert(index, value);
                }
            }
        }
        if result.is_empty() {
            SSparseOutcome::Fail
        } else {
            SSparseOutcome::Recovered(result)
        }
    }

    /// Adds `other` into `self`, cell by cell.
    pub fn add(&mut self, other: &Self) -> Result<(), SketchError> {
        self.check_compatible(other)?;
        for (row, other_row) in self.grid.iter_mut().zip(other.grid.iter()) {
            for (cell, other_cell) in row.iter_mut().zip(other_row.iter()) {
                cell.add(other_cell)?;
            }
        }
        Ok(())
    }

    /// Subtracts `other` from `self`, cell by cell.
    pub fn subtract(&mut self, other: &Self) -> Result<(), SketchError> {
        self.check_compatible(other)?;
        for (row, other_row) in self.grid.iter_mut().zip(other.grid.iter()) {
            for (cell, other_cell) in row.iter_mut().zip(other_row.iter()) {
                cell.subtract(other_cell)?;
            }
        }
        Ok(())
    }

    fn check_compatible(&self, other: &Self) -> Result<(), SketchError> {
        if self.n != other.n
            || self.s != other.s
            || self.columns != other.columns
            || self.p != other.p
            || (self.delta - other.delta).abs() > f64::EPSILON
            || self.hash_functions != other.hash_functions
        {
            return Err(SketchError::Incompatible(
                "s-sparse recoverers must share n, s, delta, p, and hash functions",
            ));
        }
        Ok(())
    }

    pub(crate) fn prime(&self) -> u64 {
        self.p
    }
}
