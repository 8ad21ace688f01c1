//! Routing planner.
//!
//! ## Invariants
//!
//! - A prefix appears at most once in a plan
//! - On a collision the row earliest in index order `(prefix, low)` wins,
//!   so the result does not depend on the order rows were supplied in
//! - Sequential and parallel builds produce identical plans

use super::report::{BuildReport, CollisionFinding, MismatchFinding, RowFinding};
use super::RegionResolver;
use crate::compaction::PrefixCompactor;
use crate::config::{Config, MismatchPolicy};
use crate::error::{CoreError, CoreResult};
use crate::index::RangeIndex;
use crate::row::{AllocationRow, RegionId, RoutingEntry};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Output of a routing build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingPlan {
    /// Deduplicated entries, sorted by prefix.
    pub entries: Vec<RoutingEntry>,
    /// Advisory findings.
    pub report: BuildReport,
}

/// Per-row result, computed independently of every other row.
enum RowOutcome {
    Emitted {
        position: usize,
        region_id: RegionId,
        prefixes: Vec<String>,
        mismatch: Option<MismatchFinding>,
    },
    Skipped {
        unresolved: bool,
        finding: RowFinding,
    },
}

/// Dedup set plus findings; the single writer all row outcomes go through.
#[derive(Default)]
struct MergeState {
    claims: BTreeMap<String, (usize, RegionId)>,
    dropped: Vec<(String, RegionId)>,
    report: BuildReport,
}

impl MergeState {
    fn apply(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Emitted {
                position,
                region_id,
                prefixes,
                mismatch,
            } => {
                self.report.rows_compacted += 1;
                if let Some(m) = mismatch {
                    self.report.mismatches.push(m);
                }
                for prefix in prefixes {
                    self.claim(prefix, position, region_id);
                }
            }
            RowOutcome::Skipped { unresolved, finding } => {
                if unresolved {
                    self.report.unresolved_regions.push(finding);
                } else {
                    self.report.malformed_rows.push(finding);
                }
            }
        }
    }

    /// Idempotent insert: the lowest row position keeps the prefix.
    fn claim(&mut self, prefix: String, position: usize, region_id: RegionId) {
        let Some(&(held_by, held_region)) = self.claims.get(&prefix) else {
            self.claims.insert(prefix, (position, region_id));
            return;
        };
        if held_by == position {
            return;
        }
        self.report.duplicates_dropped += 1;
        if position < held_by {
            self.claims.insert(prefix.clone(), (position, region_id));
            self.dropped.push((prefix, held_region));
        } else {
            self.dropped.push((prefix, region_id));
        }
    }

    fn finish(mut self) -> RoutingPlan {
        // Losers are compared with the final winner only, so findings do not
        // depend on the order claims arrived in.
        for (prefix, dropped) in std::mem::take(&mut self.dropped) {
            let Some(&(_, kept)) = self.claims.get(&prefix) else {
                continue;
            };
            if kept != dropped {
                self.report.collisions.push(CollisionFinding {
                    prefix,
                    kept_region: kept.as_u64(),
                    dropped_region: dropped.as_u64(),
                });
            }
        }
        let entries: Vec<RoutingEntry> = self
            .claims
            .into_iter()
            .map(|(prefix, (_, region_id))| RoutingEntry::new(prefix, region_id))
            .collect();
        self.report.prefixes_emitted = entries.len();
        self.report.normalize();
        RoutingPlan {
            entries,
            report: self.report,
        }
    }
}

/// Builds routing plans from reference rows.
///
/// ## Example
///
/// ```
/// use numplan_core::{AllocationRow, Config, RegionId, RoutingPlanner};
/// use std::collections::HashMap;
///
/// let rows = vec![AllocationRow::new("901", "5000000", "5000009", "Tver", 10)];
/// let regions = HashMap::from([("Tver".to_string(), RegionId(69))]);
///
/// let plan = RoutingPlanner::new(Config::default())
///     .plan_all(rows, &regions)
///     .unwrap();
/// assert_eq!(plan.entries.len(), 1);
/// assert_eq!(plan.entries[0].prefix, "901500000");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RoutingPlanner {
    config: Config,
    compactor: PrefixCompactor,
}

impl RoutingPlanner {
    /// Creates a planner with the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            compactor: PrefixCompactor::new(),
        }
    }

    /// Returns the planner configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validates rows and builds the range index over the valid ones.
    ///
    /// Malformed rows are recorded in `report` and left out.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::OverlappingRanges`] if valid rows intersect.
    pub fn index(
        &self,
        rows: Vec<AllocationRow>,
        report: &mut BuildReport,
    ) -> CoreResult<RangeIndex> {
        report.rows_total += rows.len();
        let layout = self.config.layout;
        let mut valid = Vec::with_capacity(rows.len());
        for row in rows {
            match row.validate(&layout) {
                Ok(()) => valid.push(row),
                Err(e) => {
                    warn!("Skipping malformed row {}: {}", row, e);
                    report.malformed_rows.push(RowFinding {
                        row: row.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        RangeIndex::build(layout, valid)
    }

    /// Full rebuild: compacts every row.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::OverlappingRanges`] for an inconsistent table and
    /// [`CoreError::CompactionMismatch`] under [`MismatchPolicy::Fail`].
    pub fn plan_all<R>(&self, rows: Vec<AllocationRow>, resolver: &R) -> CoreResult<RoutingPlan>
    where
        R: RegionResolver + ?Sized,
    {
        let mut report = BuildReport::new();
        let index = self.index(rows, &mut report)?;
        let positions: Vec<usize> = (0..index.len()).collect();
        self.plan_positions(&index, &positions, resolver, report)
    }

    /// Targeted rebuild: compacts only rows owning at least one of `numbers`.
    ///
    /// Numbers that no row owns, or that are malformed, are listed in the
    /// report.
    ///
    /// # Errors
    ///
    /// Same as [`RoutingPlanner::plan_all`].
    pub fn plan_for_numbers<R, I, S>(
        &self,
        rows: Vec<AllocationRow>,
        numbers: I,
        resolver: &R,
    ) -> CoreResult<RoutingPlan>
    where
        R: RegionResolver + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = BuildReport::new();
        let index = self.index(rows, &mut report)?;
        let batch = index.locate_many(numbers);
        if !batch.not_found.is_empty() {
            info!("{} queried numbers have no owning row", batch.not_found.len());
        }
        report.not_found = batch.not_found;
        report.malformed_numbers = batch
            .malformed
            .into_iter()
            .map(|(row, reason)| RowFinding { row, reason })
            .collect();
        let positions: Vec<usize> = batch.rows.into_iter().collect();
        self.plan_positions(&index, &positions, resolver, report)
    }

    /// Compacts the rows at `positions` of `index` and merges the results.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CompactionMismatch`] under
    /// [`MismatchPolicy::Fail`] and [`CoreError::WorkerFailed`] if a worker
    /// thread panics.
    pub fn plan_positions<R>(
        &self,
        index: &RangeIndex,
        positions: &[usize],
        resolver: &R,
        report: BuildReport,
    ) -> CoreResult<RoutingPlan>
    where
        R: RegionResolver + ?Sized,
    {
        let state = Mutex::new(MergeState {
            report,
            ..MergeState::default()
        });

        let workers = self.config.workers.max(1).min(positions.len().max(1));
        if workers == 1 {
            for &position in positions {
                let outcome = self.compact_row(position, &index.rows()[position], resolver)?;
                state.lock().apply(outcome);
            }
        } else {
            debug!("Compacting {} rows on {} workers", positions.len(), workers);
            let chunk = positions.len().div_ceil(workers);
            std::thread::scope(|scope| -> CoreResult<()> {
                let handles: Vec<_> = positions
                    .chunks(chunk)
                    .map(|shard| {
                        let state = &state;
                        scope.spawn(move || -> CoreResult<()> {
                            for &position in shard {
                                let outcome =
                                    self.compact_row(position, &index.rows()[position], resolver)?;
                                state.lock().apply(outcome);
                            }
                            Ok(())
                        })
                    })
                    .collect();
                for handle in handles {
                    handle
                        .join()
                        .map_err(|_| CoreError::worker_failed("compaction worker panicked"))??;
                }
                Ok(())
            })?;
        }

        let plan = state.into_inner().finish();
        info!(
            "Planned {} routing entries from {} rows ({} findings)",
            plan.entries.len(),
            plan.report.rows_compacted,
            plan.report.finding_count()
        );
        Ok(plan)
    }

    fn compact_row<R>(
        &self,
        position: usize,
        row: &AllocationRow,
        resolver: &R,
    ) -> CoreResult<RowOutcome>
    where
        R: RegionResolver + ?Sized,
    {
        let Some(region_id) = resolver.resolve(&row.region) else {
            warn!("Region {:?} of row {} is unknown, skipping", row.region, row);
            return Ok(RowOutcome::Skipped {
                unresolved: true,
                finding: RowFinding {
                    row: row.to_string(),
                    reason: format!("unknown region {:?}", row.region),
                },
            });
        };

        let compaction = match self.compactor.compact_row(row) {
            Ok(c) => c,
            Err(e) if e.is_row_local() => {
                warn!("Skipping row {}: {}", row, e);
                return Ok(RowOutcome::Skipped {
                    unresolved: false,
                    finding: RowFinding {
                        row: row.to_string(),
                        reason: e.to_string(),
                    },
                });
            }
            Err(e) => return Err(e),
        };

        let mismatch = if compaction.valid {
            None
        } else {
            if self.config.mismatch_policy == MismatchPolicy::Fail {
                return Err(CoreError::CompactionMismatch {
                    prefix: row.prefix.clone(),
                    low: row.low.clone(),
                    high: row.high.clone(),
                    capacity: row.capacity,
                    implied: compaction.implied,
                });
            }
            Some(MismatchFinding {
                prefix: row.prefix.clone(),
                low: row.low.clone(),
                high: row.high.clone(),
                capacity: row.capacity,
                implied: compaction.implied,
            })
        };

        debug!(
            "Row {} -> {} prefixes for region {}",
            row,
            compaction.prefixes.len(),
            region_id
        );
        Ok(RowOutcome::Emitted {
            position,
            region_id,
            prefixes: compaction.prefixes,
            mismatch,
        })
    }
}
