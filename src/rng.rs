//! Explicit, seeded randomness.
//!
//! `g-raph`'s sketches reach for `rand::thread_rng()` at every call site,
//! which makes two independently-constructed sketches unable to agree on
//! coefficients. This crate threads one explicit [`StdRng`] through an
//! entire construction instead: callers that want two compatible sketches
//! build both from the same seed, and the fixed order in which each
//! constructor draws from the RNG is what makes the draws line up.

pub use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Builds a deterministic RNG from a 64-bit seed.
pub(crate) fn from_seed(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Draws a fresh 64-bit seed from the ambient thread RNG, for callers that
/// do not care about reproducibility and omit an explicit seed.
pub(crate) fn fresh_seed() -> u64 {
    rand::thread_rng().gen()
}
