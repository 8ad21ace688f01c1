//! CLI command implementations.

pub mod build;
pub mod compact;
pub mod lookup;
pub mod scan;
pub mod verify;

use numplan_core::{BuildReport, Config, NumberLayout, RangeIndex, RoutingPlanner, RowFinding};
use numplan_io::{ContentScanner, DelimitedRowSource, LoadedRows, RowSource};
use serde::Serialize;
use std::path::Path;

/// Settings shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Globals {
    /// Number layout of the reference table.
    pub layout: NumberLayout,
    /// Print JSON instead of text.
    pub json: bool,
}

/// Opens `path` as a reference table and loads it after the content scan.
pub fn load_table(path: &Path, layout: NumberLayout) -> Result<LoadedRows, Box<dyn std::error::Error>> {
    let mut source = DelimitedRowSource::open(path, layout)?.with_scanner(ContentScanner::new()?);
    Ok(source.load()?)
}

/// A loaded table indexed for lookup, with the rows left out of the index.
#[derive(Debug)]
pub struct IndexedTable {
    /// Index over every well-formed row.
    pub index: RangeIndex,
    /// Lines the parser rejected and rows that failed validation.
    pub skipped: Vec<RowFinding>,
}

/// Indexes the well-formed rows of `loaded`.
///
/// A malformed row is skipped and reported instead of failing the whole
/// table. Overlapping ranges still fail, since no answer is trustworthy then.
pub fn index_rows(
    loaded: LoadedRows,
    layout: NumberLayout,
) -> Result<IndexedTable, Box<dyn std::error::Error>> {
    let planner = RoutingPlanner::new(Config::new().layout(layout));
    let mut report = BuildReport::new();
    let index = planner.index(loaded.rows, &mut report)?;

    let mut skipped = loaded.rejected;
    skipped.extend(report.malformed_rows);
    Ok(IndexedTable { index, skipped })
}

/// Prints `value` as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Failures reported by the commands themselves.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The table matched the injection blocklist.
    #[error("reference table failed the content scan ({0} findings)")]
    UntrustedTable(usize),

    /// `verify` found defects.
    #[error("verification failed with {0} defect(s)")]
    VerificationFailed(usize),
}
