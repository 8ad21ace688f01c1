//! Brute-force oracles.
//!
//! Slow but obviously correct reference answers, usable for layouts with a
//! small number width.

use numplan_core::compaction::expand;
use numplan_core::AllocationRow;
use std::collections::BTreeSet;

/// Every full number of `row`.
pub fn row_numbers(row: &AllocationRow) -> BTreeSet<u64> {
    let first: u64 = row.first_number().parse().expect("row bounds are digits");
    let last: u64 = row.last_number().parse().expect("row bounds are digits");
    (first..=last).collect()
}

/// Union of the full numbers denoted by `prefixes`, and whether any number
/// was denoted twice.
pub fn expand_all<S: AsRef<str>>(prefixes: &[S], number_width: usize) -> (BTreeSet<u64>, bool) {
    let mut numbers = BTreeSet::new();
    let mut duplicated = false;
    for prefix in prefixes {
        let span = expand(prefix.as_ref(), number_width).expect("prefix is well formed");
        for n in span {
            duplicated |= !numbers.insert(n);
        }
    }
    (numbers, duplicated)
}

/// Linear-scan owner of `number`.
pub fn owner_of<'a>(rows: &'a [AllocationRow], number: &str) -> Option<&'a AllocationRow> {
    rows.iter().find(|row| row.contains(number))
}
