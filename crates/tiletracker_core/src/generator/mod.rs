//! Goal partitioning.
//!
//! # Responsibility
//! - Turn a positive goal amount into a randomized tile layout.
//! - Keep the random source injectable so layouts are reproducible in tests.

pub mod partition;
