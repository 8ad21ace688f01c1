//! Verify command implementation.

use super::{index_rows, load_table, print_json, CommandError, Globals};
use numplan_core::compaction::verify_exact;
use numplan_core::{AllocationRow, NumberLayout, PrefixCompactor, RangeIndex, RowFinding};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Verification result.
#[derive(Debug, Default, Serialize)]
pub struct VerifyResult {
    /// Number of rows checked.
    pub rows_checked: usize,
    /// Prefixes produced over all rows.
    pub prefixes: usize,
    /// Rows whose prefixes denote exactly their range.
    pub exact_rows: usize,
    /// Rows whose implied capacity differs from the declared one.
    pub mismatched_rows: usize,
    /// Table rows left out because they could not be parsed or validated.
    pub skipped_rows: Vec<RowFinding>,
    /// Every defect found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.errors.is_empty() && self.skipped_rows.is_empty()
    }

    fn defects(&self) -> usize {
        self.errors.len() + self.skipped_rows.len()
    }
}

/// Compacts every row and checks exactness, capacity, and that no prefix
/// is produced by two rows.
pub fn verify_rows(index: &RangeIndex) -> VerifyResult {
    let layout: NumberLayout = *index.layout();
    let compactor = PrefixCompactor::new();
    let mut result = VerifyResult::default();
    let mut owners: HashMap<String, &AllocationRow> = HashMap::new();

    for row in index.rows() {
        result.rows_checked += 1;
        let compaction = match compactor.compact_row(row) {
            Ok(c) => c,
            Err(e) => {
                result.errors.push(format!("{row}: {e}"));
                continue;
            }
        };
        result.prefixes += compaction.prefixes.len();

        if !compaction.valid {
            result.mismatched_rows += 1;
            result.errors.push(format!(
                "{row}: implied capacity {} differs from {}",
                compaction.implied, compaction.capacity
            ));
        }

        let bounds = row
            .first_number()
            .parse::<u64>()
            .and_then(|first| row.last_number().parse::<u64>().map(|last| first..=last));
        match bounds {
            Ok(range) => match verify_exact(&compaction.prefixes, range, layout.number_width()) {
                Ok(()) => result.exact_rows += 1,
                Err(defect) => result.errors.push(format!("{row}: {defect}")),
            },
            Err(e) => result.errors.push(format!("{row}: {e}")),
        }

        for prefix in compaction.prefixes {
            if let Some(other) = owners.get(&prefix) {
                result
                    .errors
                    .push(format!("prefix {prefix} produced by {other} and {row}"));
            } else {
                owners.insert(prefix, row);
            }
        }
    }
    result
}

fn print_result(result: &VerifyResult) {
    println!("  Rows checked:    {}", result.rows_checked);
    println!("  Prefixes:        {}", result.prefixes);
    println!("  Exact rows:      {}", result.exact_rows);
    println!("  Mismatched rows: {}", result.mismatched_rows);
    println!("  Skipped rows:    {}", result.skipped_rows.len());
    if !result.skipped_rows.is_empty() {
        println!("  Skipped:");
        for finding in &result.skipped_rows {
            println!("    - {}: {}", finding.row, finding.reason);
        }
    }
    if !result.errors.is_empty() {
        println!("  Errors:");
        for error in &result.errors {
            println!("    - {}", error);
        }
    }
}

/// Runs the verify command.
pub fn run(globals: &Globals, table: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_table(table, globals.layout)?;
    let indexed = index_rows(loaded, globals.layout)?;
    let mut result = verify_rows(&indexed.index);
    result.skipped_rows = indexed.skipped;

    if globals.json {
        print_json(&result)?;
    } else {
        println!("Verifying {:?}", table);
        println!();
        print_result(&result);
        println!();
        if result.is_ok() {
            println!("✓ Compaction verification passed");
        } else {
            println!("✗ Compaction verification failed");
        }
    }

    if result.is_ok() {
        Ok(())
    } else {
        Err(CommandError::VerificationFailed(result.defects()).into())
    }
}
