//! The individual compaction stages.
//!
//! Each stage is a pure function so it can be exercised on its own; the
//! [`super::PrefixCompactor`] chains them.

use crate::digits::{parse_digits, pow10, render};
use crate::error::CoreResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A prefix value together with its digit width.
///
/// Widths differ inside one compaction once folding starts, so the value
/// alone does not identify a prefix (`"0901"` and `"901"` are distinct).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrefixBlock {
    /// Numeric value of the digits.
    pub value: u64,
    /// Number of digits.
    pub width: usize,
}

impl PrefixBlock {
    /// Creates a block.
    #[must_use]
    pub const fn new(value: u64, width: usize) -> Self {
        Self { value, width }
    }

    /// Last digit of the block.
    #[must_use]
    pub const fn last_digit(&self) -> u64 {
        self.value % 10
    }

    /// The block one digit shorter (drops the last digit).
    #[must_use]
    pub const fn parent(&self) -> Self {
        Self {
            value: self.value / 10,
            width: self.width.saturating_sub(1),
        }
    }

    /// Smallest full number the block denotes at `number_width`.
    #[must_use]
    pub const fn first_at(&self, number_width: usize) -> u64 {
        self.value * pow10(number_width - self.width)
    }

    /// Digit string of the block.
    #[must_use]
    pub fn digits(&self) -> String {
        render(self.value, self.width)
    }
}

impl fmt::Display for PrefixBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits())
    }
}

/// Stage A: strips trailing digit positions that span the whole `0..=9`
/// domain.
///
/// Works from the least significant digit; stops at the first position
/// where `high - low != 9` or when no digits remain. Inputs must be
/// equal-width digit strings.
#[must_use]
pub fn reduce_interval<'a>(low: &'a str, high: &'a str) -> (&'a str, &'a str) {
    let (lb, hb) = (low.as_bytes(), high.as_bytes());
    let mut len = lb.len().min(hb.len());
    while len > 0 && hb[len - 1].wrapping_sub(lb[len - 1]) == 9 {
        len -= 1;
    }
    (&low[..len], &high[..len])
}

/// Stage B: materializes `[prefix‖low, prefix‖high]` in ascending order.
///
/// Every block has width `prefix.len() + low.len()`.
///
/// # Errors
///
/// Returns [`crate::CoreError::MalformedInput`] if a bound is not a digit
/// string.
pub fn enumerate(prefix: &str, low: &str, high: &str) -> CoreResult<Vec<PrefixBlock>> {
    let width = prefix.len() + low.len();
    let first = parse_digits("low", &format!("{prefix}{low}"))?;
    let last = parse_digits("high", &format!("{prefix}{high}"))?;
    Ok((first..=last).map(|v| PrefixBlock::new(v, width)).collect())
}

fn is_aligned_decade(run: &[PrefixBlock]) -> bool {
    let head = run[0];
    head.width > 0
        && head.last_digit() == 0
        && run
            .iter()
            .enumerate()
            .all(|(j, b)| b.width == head.width && b.value == head.value + j as u64)
}

/// Stage C, one pass: replaces every aligned run of ten consecutive blocks
/// `v0, v0+1, ..., v0+9` by their parent block.
///
/// Returns the new list and whether anything folded.
#[must_use]
pub fn fold_pass(blocks: &[PrefixBlock]) -> (Vec<PrefixBlock>, bool) {
    let mut out = Vec::with_capacity(blocks.len());
    let mut changed = false;
    let mut i = 0;
    while i < blocks.len() {
        if i + 10 <= blocks.len() && is_aligned_decade(&blocks[i..i + 10]) {
            out.push(blocks[i].parent());
            changed = true;
            i += 10;
        } else {
            out.push(blocks[i]);
            i += 1;
        }
    }
    (out, changed)
}

/// Stage C: repeats [`fold_pass`] up to `max_passes` times or until a pass
/// changes nothing.
#[must_use]
pub fn fold(blocks: Vec<PrefixBlock>, max_passes: usize) -> Vec<PrefixBlock> {
    let mut current = blocks;
    for _ in 0..max_passes {
        let (next, changed) = fold_pass(&current);
        if !changed {
            break;
        }
        current = next;
    }
    current
}

/// Stage D: the cardinality the compacted prefixes imply.
///
/// Prefixes are zero-padded to `number_width` and sorted; each one spans
/// the gap to the next, and the last spans up to `prefix‖high` (the
/// original, unreduced bound). The result is the sum of the spans plus one.
#[must_use]
pub fn implied_cardinality(blocks: &[PrefixBlock], last_number: u64, number_width: usize) -> u64 {
    let mut starts: Vec<u64> = blocks.iter().map(|b| b.first_at(number_width)).collect();
    starts.sort_unstable();

    let Some((&tail, _)) = starts.split_last() else {
        return 0;
    };
    let inner: u64 = starts.windows(2).map(|w| w[1] - w[0]).sum();
    inner + last_number.saturating_sub(tail) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn values(blocks: &[PrefixBlock]) -> Vec<String> {
        blocks.iter().map(PrefixBlock::digits).collect()
    }

    #[test]
    fn reduce_strips_saturated_positions() {
        assert_eq!(reduce_interval("0000000", "9999999"), ("", ""));
        assert_eq!(reduce_interval("5000000", "5000009"), ("500000", "500000"));
        assert_eq!(reduce_interval("5000000", "5009999"), ("500", "500"));
        assert_eq!(reduce_interval("1200", "3499"), ("12", "34"));
    }

    #[test]
    fn reduce_stops_at_first_unsaturated_position() {
        assert_eq!(reduce_interval("5000001", "5000008"), ("5000001", "5000008"));
        assert_eq!(reduce_interval("0999999", "1000008"), ("0999999", "1000008"));
        // A later saturated position is not reached past an unsaturated one.
        assert_eq!(reduce_interval("0001", "9998"), ("0001", "9998"));
    }

    #[test]
    fn reduce_ignores_wrapping_differences() {
        // 0 - 9 wraps in u8 arithmetic and must not read as 9.
        assert_eq!(reduce_interval("19", "20"), ("19", "20"));
    }

    #[test]
    fn enumerate_is_inclusive_and_ordered() {
        let blocks = enumerate("901", "5000001", "5000003").unwrap();
        assert_eq!(values(&blocks), vec!["9015000001", "9015000002", "9015000003"]);
        assert!(blocks.iter().all(|b| b.width == 10));
    }

    #[test]
    fn enumerate_keeps_leading_zeros() {
        let blocks = enumerate("012", "09", "10").unwrap();
        assert_eq!(values(&blocks), vec!["01209", "01210"]);
    }

    #[test]
    fn enumerate_empty_bounds_yields_prefix() {
        let blocks = enumerate("950", "", "").unwrap();
        assert_eq!(values(&blocks), vec!["950"]);
    }

    #[test]
    fn fold_pass_folds_aligned_decade() {
        let blocks = enumerate("901", "5000000", "5000009").unwrap();
        let (folded, changed) = fold_pass(&blocks);
        assert!(changed);
        assert_eq!(values(&folded), vec!["901500000"]);
    }

    #[test]
    fn fold_pass_leaves_unaligned_runs() {
        let blocks = enumerate("901", "5000005", "5000014").unwrap();
        assert_eq!(blocks.len(), 10);
        let (folded, changed) = fold_pass(&blocks);
        assert!(!changed);
        assert_eq!(folded, blocks);
    }

    #[test]
    fn fold_pass_requires_same_width() {
        let mut blocks = vec![PrefixBlock::new(90, 2)];
        blocks.extend((901..=909).map(|v| PrefixBlock::new(v, 3)));
        let (_, changed) = fold_pass(&blocks);
        assert!(!changed);
    }

    #[test]
    fn fold_reaches_fixed_point() {
        let blocks = enumerate("90", "0", "9").unwrap();
        // Already handled by Stage A in practice; folding must agree.
        let folded = fold(blocks, 10);
        assert_eq!(values(&folded), vec!["90"]);

        let blocks = enumerate("9", "000", "199").unwrap();
        let folded = fold(blocks, 10);
        assert_eq!(values(&folded), vec!["90", "91"]);
        assert_eq!(fold(folded.clone(), 10), folded);
    }

    #[test]
    fn fold_mixed_widths() {
        let blocks = enumerate("9", "05", "21").unwrap();
        let folded = fold(blocks, 10);
        assert_eq!(
            values(&folded),
            vec!["905", "906", "907", "908", "909", "91", "920", "921"]
        );
    }

    #[test]
    fn implied_cardinality_telescopes() {
        let blocks = vec![PrefixBlock::new(901500000, 9)];
        assert_eq!(implied_cardinality(&blocks, 9015000009, 10), 10);

        let blocks: Vec<_> = (9015000001..=9015000008)
            .map(|v| PrefixBlock::new(v, 10))
            .collect();
        assert_eq!(implied_cardinality(&blocks, 9015000008, 10), 8);

        assert_eq!(implied_cardinality(&[], 9015000008, 10), 0);
    }

    proptest! {
        #[test]
        fn folding_is_idempotent(low in 0u64..100_000, span in 0u64..3_000) {
            let high = (low + span).min(99_999);
            let blocks = enumerate("7", &render(low, 5), &render(high, 5)).unwrap();
            let folded = fold(blocks, 6);
            let (again, changed) = fold_pass(&folded);
            prop_assert!(!changed);
            prop_assert_eq!(again, folded);
        }

        #[test]
        fn reduce_keeps_equal_widths(low in 0u64..10_000, span in 0u64..10_000) {
            let high = (low + span).min(9_999);
            let (l, h) = (render(low, 4), render(high, 4));
            let (rl, rh) = reduce_interval(&l, &h);
            prop_assert_eq!(rl.len(), rh.len());
            prop_assert!(rl <= rh);
        }
    }
}
