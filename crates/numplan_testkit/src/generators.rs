//! Property-based test generators using proptest.
//!
//! Strategies work on small layouts (a few digits) so brute-force oracles
//! stay cheap.

use numplan_core::{pow10, render, AllocationRow, NumberLayout};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Layout used by the property tests: 2-digit prefix, 6-digit numbers.
pub fn small_layout() -> NumberLayout {
    NumberLayout::new(2, 6).expect("valid layout")
}

/// Strategy for `(low, high)` tail bounds of `width` digits.
///
/// Mixes arbitrary short spans with ranges aligned to powers of ten so
/// folding and interval reduction both get exercised.
pub fn bounds_strategy(width: usize) -> impl Strategy<Value = (String, String)> {
    let space = pow10(width);
    let arbitrary = (0..space, 0..space.min(2500)).prop_map(move |(low, span)| {
        let high = (low + span).min(space - 1);
        (low, high)
    });
    let aligned = (0..=width, 0..space, 1u64..30).prop_map(move |(k, base, blocks)| {
        let unit = pow10(k);
        let low = (base / unit) * unit;
        let high = (low + blocks * unit - 1).min(space - 1);
        (low, high)
    });
    prop_oneof![arbitrary, aligned]
        .prop_map(move |(low, high)| (render(low, width), render(high, width)))
}

/// Strategy for a prefix of `width` digits.
pub fn prefix_strategy(width: usize) -> impl Strategy<Value = String> {
    (0..pow10(width)).prop_map(move |v| render(v, width))
}

/// Strategy for a valid row under `layout` whose capacity matches its span.
pub fn row_strategy(layout: NumberLayout) -> impl Strategy<Value = AllocationRow> {
    (
        prefix_strategy(layout.prefix_width()),
        bounds_strategy(layout.tail_width()),
        0usize..4,
    )
        .prop_map(|(prefix, (low, high), region)| {
            let mut row = AllocationRow::new(prefix, low, high, format!("R{region}"), 0);
            row.capacity = row.span().expect("generated bounds are digits");
            row
        })
}

/// Strategy for a non-overlapping table under `layout`.
///
/// Rows are returned in arbitrary (shuffled) order.
pub fn table_strategy(layout: NumberLayout) -> impl Strategy<Value = Vec<AllocationRow>> {
    let tail = layout.tail_width();
    let space = pow10(tail);
    let per_prefix = (
        prefix_strategy(layout.prefix_width()),
        prop::collection::btree_set(0..space, 2..10),
        prop::collection::vec(0usize..3, 5),
    );
    prop::collection::vec(per_prefix, 1..4)
        .prop_map(move |groups| {
            let mut seen = BTreeSet::new();
            let mut rows = Vec::new();
            for (prefix, cuts, regions) in groups {
                if !seen.insert(prefix.clone()) {
                    continue;
                }
                let cuts: Vec<u64> = cuts.into_iter().collect();
                for (i, pair) in cuts.chunks_exact(2).enumerate() {
                    let mut row = AllocationRow::new(
                        prefix.clone(),
                        render(pair[0], tail),
                        render(pair[1], tail),
                        format!("R{}", regions[i % regions.len()]),
                        0,
                    );
                    row.capacity = row.span().expect("generated bounds are digits");
                    rows.push(row);
                }
            }
            rows
        })
        .prop_shuffle()
}

/// Strategy for a full number under `layout`.
pub fn number_strategy(layout: NumberLayout) -> impl Strategy<Value = String> {
    let width = layout.number_width();
    (0..pow10(width)).prop_map(move |v| render(v, width))
}

/// Property test configuration.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl PropTestConfig {
    /// Quick configuration for CI.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 64,
            max_shrink_iters: 1000,
        }
    }

    /// Thorough configuration for nightly builds.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn generated_rows_are_valid(row in row_strategy(small_layout())) {
            prop_assert!(row.validate(&small_layout()).is_ok());
            prop_assert_eq!(row.capacity, row.span().unwrap());
        }

        #[test]
        fn generated_tables_do_not_overlap(rows in table_strategy(small_layout())) {
            prop_assert!(numplan_core::RangeIndex::build(small_layout(), rows).is_ok());
        }

        #[test]
        fn generated_numbers_have_full_width(n in number_strategy(small_layout())) {
            prop_assert_eq!(n.len(), 6);
        }
    }
}
