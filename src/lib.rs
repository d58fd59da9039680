//! Linear streaming sketches for integer-valued vectors.
//!
//! A conceptual vector `a` of length `n`, implicitly all-zero, is updated by
//! a stream of `a[i] += delta` operations. This crate provides three
//! sketches over that stream, all supporting linear combination
//! (`add`/`subtract`) across sketches built from the same random seed:
//!
//! - [`sparse_recovery::one_sparse::OneSparseRecovery`] exactly recovers the
//!   single non-zero coordinate of a 1-sparse vector.
//! - [`sparse_recovery::s_sparse::SparseRecoverer`] exactly recovers the
//!   support of an at-most-`s`-sparse vector.
//! - [`sampling::l0_sampler::L0Sampler`] draws a coordinate approximately
//!   uniformly from the vector's support.
//!
//! The crate is synchronous and single-threaded: no operation blocks on I/O
//! or suspends, and `update` is not atomic under concurrent access. Callers
//! sharing a sketch across threads are responsible for their own
//! synchronization.
//!
//! # Example
//! ```rust
//! use sparse_sketch::sampling::l0_sampler::L0Sampler;
//!
//! let mut a = L0Sampler::new(1_000, None, Some(42));
//! let mut b = L0Sampler::new(1_000, None, Some(42));
//!
//! a.update(10, 1).unwrap();
//! b.update(20, 1).unwrap();
//! a.add(&b).unwrap();
//!
//! let samples = a.get_samples();
//! assert!(samples.contains_key(&10) || samples.contains_key(&20));
//! ```

pub mod error;
pub mod hash;
pub mod primes;
pub mod rng;
pub mod sampling;
pub mod sparse_recovery;

pub(crate) mod field;

pub use error::SketchError;
