//! # numplan testkit
//!
//! Test utilities for numplan.
//!
//! This crate provides:
//! - Reference-table fixtures, in memory and on disk
//! - Property-based test generators using proptest
//! - Brute-force oracles for exactness and lookup checks

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod oracle;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::oracle::*;
}

pub use fixtures::*;
pub use generators::*;
pub use oracle::*;
