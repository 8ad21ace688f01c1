//! End-to-end routing build: load, plan, publish.

use crate::error::IoResult;
use crate::sink::RoutingSink;
use crate::source::RowSource;
use numplan_core::{RegionResolver, RoutingPlan, RoutingPlanner};
use tracing::info;

/// Which rows a build covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildScope {
    /// Every row of the table.
    Full,
    /// Only rows owning at least one of these full numbers.
    Numbers(Vec<String>),
}

/// Loads rows from `source`, plans them, and publishes the entries to
/// `sink`.
///
/// Lines the source could not parse are reported as malformed rows. An
/// untrusted source aborts before anything is planned or published.
///
/// # Errors
///
/// Returns source, planning, and sink errors unchanged.
pub fn run_build<S, R, K>(
    source: &mut S,
    planner: &RoutingPlanner,
    resolver: &R,
    scope: BuildScope,
    sink: &mut K,
) -> IoResult<RoutingPlan>
where
    S: RowSource + ?Sized,
    R: RegionResolver + ?Sized,
    K: RoutingSink + ?Sized,
{
    let loaded = source.load()?;
    let rejected_lines = loaded.rejected.len();

    let mut plan = match scope {
        BuildScope::Full => planner.plan_all(loaded.rows, resolver)?,
        BuildScope::Numbers(numbers) => planner.plan_for_numbers(loaded.rows, numbers, resolver)?,
    };
    plan.report.rows_total += rejected_lines;
    plan.report.malformed_rows.extend(loaded.rejected);
    plan.report.malformed_rows.sort();

    let written = sink.publish(&plan.entries)?;
    info!(
        "Build finished: {} entries planned, {} published",
        plan.entries.len(),
        written
    );
    Ok(plan)
}
