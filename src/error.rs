//! Crate-wide error type for programmer errors.
//!
//! Recovery failure is never represented here: it is an expected outcome,
//! returned as a dedicated enum from each recoverer (see
//! [`crate::sparse_recovery::one_sparse::OneSparseOutcome`] and
//! [`crate::sparse_recovery::s_sparse::SSparseOutcome`]). `SketchError` is
//! reserved for calls that are simply wrong: an out-of-range index, or a
//! linear combination attempted between incompatible sketches.

use std::fmt;

/// Errors raised by sketch constructors, updates, and linear combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SketchError {
    /// An index was not in `[0, n)`.
    OutOfRange {
        /// The offending index.
        index: u64,
        /// The universe size the index was checked against.
        n: u64,
    },
    /// An argument could not be interpreted as the type the call site
    /// expects (e.g. a parameter that does not fit the numeric domain a
    /// constructor requires).
    TypeError(&'static str),
    /// Two sketches were combined (`add`/`subtract`) despite not being
    /// structurally compatible: mismatched `n`, derived dimensions, prime,
    /// hash coefficients, or 1-sparse witnesses.
    Incompatible(&'static str),
}

impl fmt::Display for SketchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { index, n } => {
                write!(f, "index {index} is out of range for n = {n}")
            }
            Self::TypeError(message) => write!(f, "type error: {message}"),
            Self::Incompatible(message) => write!(f, "incompatible sketches: {message}"),
        }
    }
}

impl std::error::Error for SketchError {}

/// Checks that `index` lies in `[0, n)`, the convention every `update` in
/// this crate uses before touching any counters.
pub(crate) fn check_in_range(index: u64, n: u64) -> Result<(), SketchError> {
    if index < n {
        Ok(())
    } else {
        Err(SketchError::OutOfRange { index, n })
    }
}
