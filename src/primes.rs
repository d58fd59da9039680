//! Probabilistic prime oracle.
//!
//! Ported from `original_source/tools/primality_test.py`'s `PrimeGetter`
//! into an explicit value type rather than a process-wide module-level
//! singleton: the cache is still grow-only and init-once, but ownership is
//! explicit rather than global. `g-raph` itself reaches for the external
//! `num_primes::Generator` for this; this crate implements Miller-Rabin from
//! scratch instead.

use std::cell::RefCell;
use std::collections::HashMap;

use rand::Rng;

use crate::field::mod_pow;

/// A memoizing Miller-Rabin primality oracle.
///
/// `next_prime` results are cached by argument. The cache is grow-only and
/// never invalidated, safe to share across many sketch constructions, but
/// not `Sync` (wrap in a `Mutex` to share across threads).
#[derive(Debug, Default)]
pub struct PrimeOracle {
    cache: RefCell<HashMap<u64, u64>>,
}

impl PrimeOracle {
    /// Creates an oracle with an empty cache.
    pub fn new() -> Self {
        Self {
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the smallest odd prime `p >= n + 1`, memoized by `n`.
    pub fn next_prime(&self, n: u64, rng: &mut impl Rng) -> u64 {
        if let Some(&p) = self.cache.borrow().get(&n) {
            return p;
        }

        let mut candidate = n + 1;
        if candidate > 2 && candidate % 2 == 0 {
            candidate += 1;
        }
        while !is_probable_prime(candidate, rng) {
            candidate += if candidate == 2 { 1 } else { 2 };
        }

        self.cache.borrow_mut().insert(n, candidate);
        candidate
    }
}

/// Miller-Rabin probabilistic primality test.
///
/// Monte Carlo: false positives occur with probability at most `1/n^2`
/// given at least `ceil(log2(n))` witnesses, which this function always
/// draws.
pub(crate) fn is_probable_prime(n: u64, rng: &mut impl Rng) -> bool {
    if n == 2 || n == 3 {
        return true;
    }
    if n < 2 || n % 2 == 0 {
        return false;
    }

    let mut d = n - 1;
    let mut r = 0u32;
    while d % 2 == 0 {
        d /= 2;
        r += 1;
    }

    let witnesses = (64 - n.leading_zeros()).max(1); // >= ceil(log2(n))
    for _ in 0..witnesses {
        let a = rng.gen_range(2..=n - 2);
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }

        let mut composite = true;
        for _ in 0..r.saturating_sub(1) {
            x = crate::field::mod_mul(x, x, n);
            if x == n - 1 {
                composite = false;
                break;
            }
        }
        if composite {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn next_prime_is_strictly_greater_and_odd() {
        let oracle = PrimeOracle::new();
        let mut r = rng();
        for n in [2u64, 3, 4, 10, 97, 1_000, 1_000_000] {
            let p = oracle.next_prime(n, &mut r);
            assert!(p > n, "next_prime({n}) = {p} should be > {n}");
            if n >= 2 {
                assert_eq!(p % 2, 1, "next_prime({n}) = {p} should be odd");
            }
        }
    }

    #[test]
    fn next_prime_is_memoized() {
        let oracle = PrimeOracle::new();
        let mut r = rng();
        let first = oracle.next_prime(12_345, &mut r);
        let second = oracle.next_prime(12_345, &mut r);
        assert_eq!(first, second);
    }

    #[test]
    fn known_small_primes_are_detected() {
        let mut r = rng();
        for p in [2u64, 3, 5, 7, 11, 13, 97, 7919] {
            assert!(is_probable_prime(p, &mut r), "{p} should be prime");
        }
    }

    #[test]
    fn known_composites_are_rejected() {
        let mut r = rng();
        for c in [1u64, 4, 6, 9, 15, 100, 7921] {
            assert!(!is_probable_prime(c, &mut r), "{c} should be composite");
        }
    }
}
