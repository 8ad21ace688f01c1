//! Benchmark utilities.

use numplan_core::{pow10, render, AllocationRow, NumberLayout, RegionId};
use rand::Rng;
use std::collections::HashMap;

/// Number of regions used by [`random_table`].
pub const REGIONS: u64 = 85;

/// Cut points drawn per prefix by [`random_table`]; each pair becomes a row.
pub const PER_PREFIX: usize = 128;

/// First prefix used by [`random_table`]; later prefixes count up from it.
pub const FIRST_PREFIX: u64 = 100;

/// Generates a non-overlapping table of at most `rows` rows under `layout`
/// with a 3-digit prefix. Up to 57 600 rows fit below prefix 999.
///
/// Rows are cut at random points of each prefix's tail space, so most of
/// them are unaligned.
pub fn random_table(layout: NumberLayout, rows: usize) -> Vec<AllocationRow> {
    let mut rng = rand::thread_rng();
    let tail = layout.tail_width();
    let space = pow10(tail);
    let per_prefix = PER_PREFIX;
    let prefixes = rows.div_ceil(per_prefix / 2).max(1);

    let mut table = Vec::with_capacity(rows);
    for p in 0..prefixes {
        let prefix = render(FIRST_PREFIX + p as u64, layout.prefix_width());
        let mut cuts: Vec<u64> = (0..per_prefix).map(|_| rng.gen_range(0..space)).collect();
        cuts.sort_unstable();
        cuts.dedup();
        for pair in cuts.chunks_exact(2) {
            let mut row = AllocationRow::new(
                prefix.clone(),
                render(pair[0], tail),
                render(pair[1], tail),
                format!("region-{}", rng.gen_range(0..REGIONS)),
                0,
            );
            row.capacity = pair[1] - pair[0] + 1;
            table.push(row);
        }
    }
    table.truncate(rows);
    table
}

/// Region directory matching [`random_table`].
pub fn regions() -> HashMap<String, RegionId> {
    (0..REGIONS)
        .map(|i| (format!("region-{i}"), RegionId(i)))
        .collect()
}

/// Random full numbers under `layout`, drawn from the prefixes of
/// [`random_table`].
pub fn random_numbers(layout: NumberLayout, count: usize, prefixes: u64) -> Vec<String> {
    let mut rng = rand::thread_rng();
    let space = pow10(layout.tail_width());
    (0..count)
        .map(|_| {
            let value = (FIRST_PREFIX + rng.gen_range(0..prefixes.max(1))) * space + rng.gen_range(0..space);
            render(value, layout.number_width())
        })
        .collect()
}
