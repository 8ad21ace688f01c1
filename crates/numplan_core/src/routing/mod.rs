//! Routing table construction.
//!
//! Turns reference rows into deduplicated [`crate::RoutingEntry`] values:
//! each row is compacted, paired with its resolved region, and merged into
//! one prefix-keyed set.

mod planner;
mod report;

pub use planner::{RoutingPlan, RoutingPlanner};
pub use report::{BuildReport, CollisionFinding, MismatchFinding, RowFinding};

use crate::row::RegionId;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Resolves region names carried by reference rows to region ids.
///
/// Implementations must be shareable across worker threads.
pub trait RegionResolver: Send + Sync {
    /// Returns the id for `name`, or `None` if the region is unknown.
    fn resolve(&self, name: &str) -> Option<RegionId>;
}

impl<S: BuildHasher + Send + Sync> RegionResolver for HashMap<String, RegionId, S> {
    fn resolve(&self, name: &str) -> Option<RegionId> {
        self.get(name).copied()
    }
}

impl RegionResolver for BTreeMap<String, RegionId> {
    fn resolve(&self, name: &str) -> Option<RegionId> {
        self.get(name).copied()
    }
}

impl<R: RegionResolver + ?Sized> RegionResolver for &R {
    fn resolve(&self, name: &str) -> Option<RegionId> {
        (**self).resolve(name)
    }
}
