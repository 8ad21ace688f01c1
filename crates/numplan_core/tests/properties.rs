//! Property tests for lookup, compaction, and planning.

use numplan_core::compaction::{fold_pass, verify_exact, PrefixBlock};
use numplan_core::{
    AllocationRow, Config, PrefixCompactor, RangeIndex, RegionId, RoutingPlanner,
};
use numplan_testkit::prelude::*;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

fn regions() -> HashMap<String, RegionId> {
    (0..4).map(|i| (format!("R{i}"), RegionId(i))).collect()
}

fn blocks_of(prefixes: &[String]) -> Vec<PrefixBlock> {
    prefixes
        .iter()
        .map(|p| PrefixBlock::new(p.parse().unwrap(), p.len()))
        .collect()
}

proptest! {
    #![proptest_config(PropTestConfig::quick().to_proptest_config())]

    #[test]
    fn compaction_is_exact(row in row_strategy(small_layout())) {
        let result = PrefixCompactor::new().compact_row(&row).unwrap();
        let (numbers, duplicated) = expand_all(&result.prefixes, 6);
        prop_assert!(!duplicated);
        prop_assert_eq!(numbers, row_numbers(&row));

        let first: u64 = row.first_number().parse().unwrap();
        let last: u64 = row.last_number().parse().unwrap();
        prop_assert!(verify_exact(&result.prefixes, first..=last, 6).is_ok());
    }

    #[test]
    fn folding_reaches_fixed_point(row in row_strategy(small_layout())) {
        let result = PrefixCompactor::new().compact_row(&row).unwrap();
        let blocks = blocks_of(&result.prefixes);
        let (again, changed) = fold_pass(&blocks);
        prop_assert!(!changed);
        prop_assert_eq!(again, blocks);
    }

    #[test]
    fn self_check_matches_span(row in row_strategy(small_layout())) {
        let compactor = PrefixCompactor::new();
        let result = compactor.compact_row(&row).unwrap();
        prop_assert!(result.valid);
        prop_assert_eq!(result.implied, row.capacity);

        let mut wrong = row.clone();
        wrong.capacity += 1;
        prop_assert!(!compactor.compact_row(&wrong).unwrap().valid);
    }

    #[test]
    fn locate_agrees_with_linear_scan(
        rows in table_strategy(small_layout()),
        numbers in prop::collection::vec(number_strategy(small_layout()), 1..20),
    ) {
        let index = RangeIndex::build(small_layout(), rows.clone()).unwrap();
        for number in &numbers {
            let found = index.locate(number).unwrap();
            prop_assert_eq!(found, owner_of(&rows, number));
        }
        for row in &rows {
            prop_assert_eq!(index.locate(&row.first_number()).unwrap(), Some(row));
            prop_assert_eq!(index.locate(&row.last_number()).unwrap(), Some(row));
        }
    }

    #[test]
    fn planning_is_order_independent(rows in table_strategy(small_layout())) {
        let planner = RoutingPlanner::new(Config::new().layout(small_layout()));
        let forward = planner.plan_all(rows.clone(), &regions()).unwrap();

        let mut reversed = rows;
        reversed.reverse();
        let backward = planner.plan_all(reversed, &regions()).unwrap();

        let unique: BTreeSet<&str> = forward.entries.iter().map(|e| e.prefix.as_str()).collect();
        prop_assert_eq!(unique.len(), forward.entries.len());
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn parallel_plan_matches_sequential(rows in table_strategy(small_layout())) {
        let config = Config::new().layout(small_layout());
        let sequential = RoutingPlanner::new(config.clone()).plan_all(rows.clone(), &regions()).unwrap();
        let parallel = RoutingPlanner::new(config.workers(4)).plan_all(rows, &regions()).unwrap();
        prop_assert_eq!(sequential, parallel);
    }
}

#[test]
fn worked_examples() {
    let compactor = PrefixCompactor::new();

    let whole = compactor.compact("950", "0000000", "9999999", 10_000_000).unwrap();
    assert_eq!(whole.prefixes, vec!["950"]);
    assert!(whole.valid);

    let decade = compactor.compact("901", "5000000", "5000009", 10).unwrap();
    assert_eq!(decade.prefixes, vec!["901500000"]);
    assert!(decade.valid);

    let unaligned = compactor.compact("901", "5000001", "5000008", 8).unwrap();
    assert_eq!(unaligned.prefixes.len(), 8);
    assert!(unaligned.prefixes.iter().all(|p| p.len() == 10));
    assert!(unaligned.valid);
}

#[test]
fn adversarial_carry_range_is_exact() {
    let row = AllocationRow::new("901", "0999999", "1000008", "R0", 10);
    let result = PrefixCompactor::new().compact_row(&row).unwrap();
    assert!(result.valid);
    assert!(verify_exact(&result.prefixes, 9_010_999_999..=9_011_000_008, 10).is_ok());
}

#[test]
fn sample_table_plans_cleanly() {
    let plan = RoutingPlanner::default()
        .plan_all(sample_rows(), &sample_regions())
        .unwrap();
    assert!(plan.report.is_clean(), "{}", plan.report);
    assert_eq!(plan.report.rows_compacted, sample_rows().len());
}
