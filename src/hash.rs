//! `k`-independent polynomial hash functions over a prime field.
//!
//! Re-architects `g-raph`'s `HashFunction` trait (`FieldHasher`/
//! `MatrixHasher`, which hash into bit-vectors over `Z_{2^n}`) and
//! `original_source/tools/hash_function.py`'s `pick_k_ind_hash_function`
//! into a single value type with an `eval` method: a hash function is data
//! (its coefficients), not an escaping closure.

use rand::Rng;

use crate::field::{mod_add, mod_mul};
use crate::primes::PrimeOracle;

/// A hash function drawn from a `k`-independent family,
/// `h(x) = (sum_j a_j x^j mod p) mod w`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KIndependentHash {
    coefficients: Vec<u64>,
    p: u64,
    w: u64,
}

impl KIndependentHash {
    /// Evaluates `h(x)` for an arbitrary non-negative integer `x`.
    ///
    /// Horner's method, reducing mod `p` after every multiply-add so
    /// intermediate values never grow past the prime.
    pub fn eval(&self, x: u64) -> u64 {
        let mut result = 0u64;
        for &a in self.coefficients.iter().rev() {
            result = mod_add(mod_mul(result, x, self.p), a, self.p);
        }
        result % self.w
    }

    /// The prime modulus the polynomial is evaluated over.
    pub fn prime(&self) -> u64 {
        self.p
    }

    /// The coefficients, highest-degree last-drawn (degree 0 first).
    pub(crate) fn coefficients(&self) -> &[u64] {
        &self.coefficients
    }
}

/// Draws a hash function `h : {0..n-1} -> {0..w-1}` uniformly at random from
/// the family of degree-`(k-1)` polynomials over `Z_p`, `p = next_prime(max(n,
/// w))`.
///
/// The leading coefficient is constrained to `[1, p-1]` so the polynomial
/// never silently drops to a lower degree.
pub fn pick_k_independent(
    n: u64,
    w: u64,
    k: u32,
    oracle: &PrimeOracle,
    rng: &mut impl Rng,
) -> KIndependentHash {
    assert!(k >= 1, "k-independent hash family requires k >= 1");
    assert!(w >= 1, "hash codomain must be non-empty");

    let p = oracle.next_prime(n.max(w), rng);

    let mut coefficients: Vec<u64> = (0..k - 1).map(|_| rng.gen_range(0..p)).collect();
    coefficients.push(rng.gen_range(1..p));

    KIndependentHash { coefficients, p, w }
}
