//! Exact 1-sparse recovery.
//!
//! Grounded on `g-raph`'s `OneSparseRecovery` (same fingerprint idea: a
//! random witness `z`, three running counters, and a divisibility check) and
//! `original_source/sparse_recovery/OneSparseRecoverer.py`'s `iota`/`fi`/`tau`
//! naming. `iota`/`phi` accumulate as [`BigInt`] rather than `i32`/`f32`
//! since a long-running stream can overflow a machine word, and `recover`
//! takes `&self` rather than consuming the recoverer so repeated calls agree.

use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};
use rand::Rng;

use crate::error::{check_in_range, SketchError};
use crate::field::mod_pow;
use crate::primes::PrimeOracle;

/// The outcome of a 1-sparse recovery attempt.
///
/// A tagged union rather than the source's `dict | bool | None`, so success,
/// failure, and emptiness are distinguished by type rather than truthiness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneSparseOutcome {
    /// The vector is the zero vector: every counter is zero.
    Empty,
    /// The vector has more than one non-zero coordinate (or the fingerprint
    /// check failed, which happens with probability at most `n/p`).
    NotOneSparse,
    /// The vector is 1-sparse: coordinate `index` holds value `value`.
    Recovered { index: u64, value: BigInt },
}

/// Maintains the three fingerprint counters for exact 1-sparse recovery over
/// a vector of length `n`.
#[derive(Debug, Clone)]
pub struct OneSparseRecovery {
    n: u64,
    p: u64,
    z: u64,
    iota: BigInt,
    phi: BigInt,
    tau: u64,
}

impl OneSparseRecovery {
    /// Builds a fresh, all-zero recoverer for a vector of length `n`.
    ///
    /// Draws the random witness `z` from `Z_p`, `p = next_prime(100*n)`,
    /// using `oracle` and `rng`.
    pub fn new(n: u64, oracle: &PrimeOracle, rng: &mut impl Rng) -> Self {
        let p = oracle.next_prime(100 * n.max(1), rng);
        Self::with_prime(n, p, rng)
    }

    /// Builds a recoverer reusing an already-computed prime `p`, so that a
    /// grid of recoverers sharing one field only pays for `next_prime` once.
    pub(crate) fn with_prime(n: u64, p: u64, rng: &mut impl Rng) -> Self {
        let z = rng.gen_range(1..p);
        Self {
            n,
            p,
            z,
            iota: BigInt::zero(),
            phi: BigInt::zero(),
            tau: 0,
        }
    }

    /// Applies `a[i] += delta`.
    pub fn update(&mut self, i: u64, delta: i64) -> Result<(), SketchError> {
        check_in_range(i, self.n)?;

        let delta_big = BigInt::from(delta);
        self.iota += BigInt::from(i + 1) * &delta_big;
        self.phi += delta_big;

        let power = mod_pow(self.z, i + 1, self.p);
        let contribution = signed_mod_mul(delta, power, self.p);
        self.tau = ((self.tau as i64 + contribution).rem_euclid(self.p as i64)) as u64;

        Ok(())
    }

    /// Attempts to recover the single non-zero coordinate.
    ///
    /// Non-mutating: calling this repeatedly returns the same answer.
    pub fn recover(&self) -> OneSparseOutcome {
        if self.phi.is_zero() {
            return if self.iota.is_zero() && self.tau == 0 {
                OneSparseOutcome::Empty
            } else {
                OneSparseOutcome::NotOneSparse
            };
        }

        let (quotient, remainder) = num_integer_div_rem(&self.iota, &self.phi);
        if !remainder.is_zero() || quotient <= BigInt::zero() {
            return OneSparseOutcome::NotOneSparse;
        }

        let q = match quotient.to_u64() {
            Some(q) => q,
            None => return OneSparseOutcome::NotOneSparse,
        };

        let phi_mod = bigint_mod_u64(&self.phi, self.p);
        let expected = crate::field::mod_mul(phi_mod, mod_pow(self.z, q, self.p), self.p);
        if self.tau != expected {
            return OneSparseOutcome::NotOneSparse;
        }

        OneSparseOutcome::Recovered {
            index: q - 1,
            value: self.phi.clone(),
        }
    }

    /// Adds `other` into `self` in place (`a += b`).
    pub fn add(&mut self, other: &Self) -> Result<(), SketchError> {
        self.check_compatible(other)?;
        self.iota += &other.iota;
        self.phi += &other.phi;
        self.tau = (self.tau + other.tau) % self.p;
        Ok(())
    }

    /// Subtracts `other` from `self` in place (`a -= b`).
    pub fn subtract(&mut self, other: &Self) -> Result<(), SketchError> {
        self.check_compatible(other)?;
        self.iota -= &other.iota;
        self.phi -= &other.phi;
        self.tau = (self.tau as i64 - other.tau as i64).rem_euclid(self.p as i64) as u64;
        Ok(())
    }

    fn check_compatible(&self, other: &Self) -> Result<(), SketchError> {
        if self.n != other.n || self.p != other.p || self.z != other.z {
            return Err(SketchError::Incompatible(
                "1-sparse recoverers must share n, p, and z",
            ));
        }
        Ok(())
    }

    pub(crate) fn prime(&self) -> u64 {
        self.p
    }

    pub(crate) fn witness(&self) -> u64 {
        self.z
    }
}

/// `(delta * power) mod p`, carried out with the sign of `delta` preserved.
fn signed_mod_mul(delta: i64, power: u64, p: u64) -> i64 {
    let magnitude = crate::field::mod_mul(delta.unsigned_abs(), power, p) as i64;
    if delta < 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Euclidean quotient/remainder for `BigInt`: `num-bigint`'s `Div`/`Rem`
/// truncate toward zero, and the recovery check wants exact division.
fn num_integer_div_rem(a: &BigInt, b: &BigInt) -> (BigInt, BigInt) {
    let quotient = a / b;
    let remainder = a - &quotient * b;
    (quotient, remainder)
}

/// Reduces a `BigInt` mod a `u64`, returning the representative in `[0, m)`.
fn bigint_mod_u64(value: &BigInt, m: u64) -> u64 {
    let (sign, digits) = value.to_u32_digits();
    let modulus = m as u128;
    let mut acc: u128 = 0;
    for &digit in digits.iter().rev() {
        acc = (acc * (1u128 << 32) + digit as u128) % modulus;
    }
    let acc = acc as u64;
    if sign == Sign::Minus && acc != 0 {
        m - acc
    } else {
        acc
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rng::from_seed;

    fn recoverer(n: u64, seed: u64) -> OneSparseRecovery {
        let oracle = PrimeOracle::new();
        let mut rng = from_seed(seed);
        OneSparseRecovery::new(n, &oracle, &mut rng)
    }

    #[test]
    fn fresh_recoverer_is_empty() {
        let r = recoverer(100, 1);
        assert_eq!(r.recover(), OneSparseOutcome::Empty);
    }

    #[test]
    fn single_coordinate_is_recovered_exactly() {
        // E1: n = 100, updates [(42, 7), (42, -3)] -> (42, 4).
        let mut r = recoverer(100, 2);
        r.update(42, 7).unwrap();
        r.update(42, -3).unwrap();
        assert_eq!(
            r.recover(),
            OneSparseOutcome::Recovered {
                index: 42,
                value: BigInt::from(4)
            }
        );
    }

    #[test]
    fn zero_vector_after_cancelling_updates_is_empty() {
        let mut r = recoverer(50, 3);
        r.update(5, 10).unwrap();
        r.update(5, -10).unwrap();
        assert_eq!(r.recover(), OneSparseOutcome::Empty);
    }

    #[test]
    fn phi_and_iota_cancelling_but_tau_nonzero_is_not_reported_empty() {
        // a[0]=1, a[1]=-2, a[2]=1: phi = 0, iota = 1 - 4 + 3 = 0, but
        // tau = z - 2z^2 + z^3 = z(1-z)^2, nonzero for z != 1.
        let mut failures = 0;
        for seed in 0..50u64 {
            let mut r = recoverer(100, seed);
            r.update(0, 1).unwrap();
            r.update(1, -2).unwrap();
            r.update(2, 1).unwrap();
            if r.recover() == OneSparseOutcome::Empty {
                failures += 1;
            }
        }
        assert!(failures <= 1, "failures={failures}");
    }

    #[test]
    fn two_nonzero_coordinates_are_detected_as_not_one_sparse() {
        // E2: with overwhelming probability over the random witness.
        let mut failures = 0;
        for seed in 0..50u64 {
            let mut r = recoverer(100, seed);
            r.update(10, 5).unwrap();
            r.update(20, 5).unwrap();
            if r.recover() != OneSparseOutcome::NotOneSparse {
                failures += 1;
            }
        }
        assert!(failures <= 1, "failures={failures}");
    }

    #[test]
    fn recover_is_idempotent() {
        let mut r = recoverer(100, 4);
        r.update(7, 3).unwrap();
        let first = r.recover();
        let second = r.recover();
        assert_eq!(first, second);
    }

    #[test]
    fn update_rejects_out_of_range_index() {
        let mut r = recoverer(10, 5);
        assert_eq!(
            r.update(10, 1),
            Err(SketchError::OutOfRange { index: 10, n: 10 })
        );
    }

    #[test]
    fn linearity_add_recovers_sum() {
        let oracle = PrimeOracle::new();
        let mut rng_a = from_seed(77);
        let mut rng_b = from_seed(77);
        let mut s1 = OneSparseRecovery::new(100, &oracle, &mut rng_a);
        let mut s2 = OneSparseRecovery::new(100, &oracle, &mut rng_b);

        s1.update(3, 5).unwrap();
        s2.update(3, 2).unwrap();

        s1.add(&s2).unwrap();
        assert_eq!(
            s1.recover(),
            OneSparseOutcome::Recovered {
                index: 3,
                value: BigInt::from(7)
            }
        );
    }

    #[test]
    fn linearity_subtract_recovers_difference() {
        let oracle = PrimeOracle::new();
        let mut rng_a = from_seed(88);
        let mut rng_b = from_seed(88);
        let mut s1 = OneSparseRecovery::new(100, &oracle, &mut rng_a);
        let mut s2 = OneSparseRecovery::new(100, &oracle, &mut rng_b);

        s1.update(9, 10).unwrap();
        s2.update(9, 4).unwrap();

        s1.subtract(&s2).unwrap();
        assert_eq!(
            s1.recover(),
            OneSparseOutcome::Recovered {
                index: 9,
                value: BigInt::from(6)
            }
        );
    }

    #[test]
    fn add_rejects_incompatible_recoverers() {
        let mut s1 = recoverer(100, 1);
        let s2 = recoverer(100, 2);
        assert!(matches!(
            s1.add(&s2),
            Err(SketchError::Incompatible(_))
        ));
    }
}
