//! Exact sparse recovery: 1-sparse and s-sparse.

pub mod one_sparse;
pub mod s_sparse;
