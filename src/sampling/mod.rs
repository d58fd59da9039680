//! L0-sampling: drawing an approximately uniform coordinate from a vector's
//! support.

pub mod l0_sampler;
