//! Compact command implementation.

use super::{print_json, Globals};
use numplan_core::{zero_pad, AllocationRow, Compaction, PrefixCompactor};
use serde::Serialize;

/// Compaction of a single range, as printed.
#[derive(Debug, Serialize)]
pub struct CompactResult {
    /// The range, after zero padding.
    pub row: AllocationRow,
    /// Compactor output.
    #[serde(flatten)]
    pub compaction: Compaction,
}

/// Runs the compact command.
pub fn run(
    globals: &Globals,
    prefix: &str,
    low: &str,
    high: &str,
    capacity: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let layout = globals.layout;
    let mut row = AllocationRow::new(
        zero_pad(prefix, layout.prefix_width()),
        zero_pad(low, layout.tail_width()),
        zero_pad(high, layout.tail_width()),
        "",
        0,
    );
    row.validate(&layout)?;
    row.capacity = match capacity {
        Some(capacity) => capacity,
        None => row.span()?,
    };

    let compaction = PrefixCompactor::new().compact_row(&row)?;
    let result = CompactResult { row, compaction };

    if globals.json {
        return print_json(&result);
    }

    let c = &result.compaction;
    println!(
        "Range {}..{} ({} prefixes)",
        result.row.first_number(),
        result.row.last_number(),
        c.prefixes.len()
    );
    for prefix in &c.prefixes {
        println!("  {prefix}");
    }
    println!();
    println!("  Capacity:         {}", c.capacity);
    println!("  Implied capacity: {}", c.implied);
    if c.valid {
        println!("✓ Compaction matches the declared capacity");
    } else {
        println!("✗ Compaction does not match the declared capacity");
    }
    Ok(())
}
