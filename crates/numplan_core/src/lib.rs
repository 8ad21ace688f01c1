//! # numplan core
//!
//! Range lookup and decimal prefix compaction for numbering-plan tables.
//!
//! This crate provides:
//! - Fixed-width digit handling ([`NumberLayout`])
//! - A sorted range index resolving full numbers to their allocation row
//! - The prefix compactor, turning `[low, high]` ranges into prefix sets
//! - The routing planner, merging per-row prefixes into one routing table
//!
//! Everything here is pure, in-memory computation. Reading the reference
//! table and publishing the result live in `numplan_io`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod compaction;
mod config;
mod digits;
mod error;
mod index;
mod row;
pub mod routing;

pub use compaction::{Compaction, CoverageDefect, PrefixBlock, PrefixCompactor};
pub use config::{Config, MismatchPolicy};
pub use digits::{pow10, render, validate_digits, zero_pad, NumberLayout, MAX_NUMBER_WIDTH};
pub use error::{CoreError, CoreResult};
pub use index::{LocateBatch, RangeIndex};
pub use row::{AllocationRow, RegionId, RoutingEntry};
pub use routing::{
    BuildReport, CollisionFinding, MismatchFinding, RegionResolver, RoutingPlan, RoutingPlanner,
    RowFinding,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
