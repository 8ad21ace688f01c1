//! Decimal prefix compaction.
//!
//! Re-expresses a row's `[prefix‖low, prefix‖high]` range as a short set of
//! prefixes denoting exactly the same full numbers, the base-10 analogue of
//! summarizing an address range into CIDR blocks.
//!
//! The pipeline has four stages:
//!
//! 1. [`reduce_interval`] strips trailing digit positions spanning `0..=9`
//! 2. [`enumerate`] materializes the residual interval
//! 3. [`fold`] collapses aligned decades bottom-up until a fixed point
//! 4. [`implied_cardinality`] cross-checks the result against the row's
//!    declared capacity
//!
//! Folding only merges aligned decades left to right. The output is exact
//! but not guaranteed to be the fewest possible prefixes.

mod stages;
mod verify;

pub use stages::{enumerate, fold, fold_pass, implied_cardinality, reduce_interval, PrefixBlock};
pub use verify::{expand, verify_exact, CoverageDefect};

use crate::digits::{parse_digits, validate_digits, MAX_NUMBER_WIDTH};
use crate::error::{CoreError, CoreResult};
use crate::row::AllocationRow;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Result of compacting one range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compaction {
    /// Compacted prefixes, in enumeration order.
    pub prefixes: Vec<String>,
    /// Cardinality implied by the prefixes (Stage D).
    pub implied: u64,
    /// Declared capacity the result was checked against.
    pub capacity: u64,
    /// Whether `implied == capacity`.
    pub valid: bool,
}

/// Compacts allocation ranges into prefix sets.
///
/// ## Example
///
/// ```
/// use numplan_core::PrefixCompactor;
///
/// let result = PrefixCompactor::new()
///     .compact("901", "5000000", "5000009", 10)
///     .unwrap();
/// assert_eq!(result.prefixes, vec!["901500000".to_string()]);
/// assert!(result.valid);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrefixCompactor {
    _private: (),
}

impl PrefixCompactor {
    /// Creates a compactor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compacts `[prefix‖low, prefix‖high]` and checks it against
    /// `capacity`.
    ///
    /// A capacity mismatch is reported through [`Compaction::valid`]; the
    /// caller decides whether it is fatal.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedInput`] if the prefix is empty, a field
    /// is not a digit string, `low` and `high` differ in width, the total
    /// width exceeds [`MAX_NUMBER_WIDTH`], or `low > high`.
    pub fn compact(
        &self,
        prefix: &str,
        low: &str,
        high: &str,
        capacity: u64,
    ) -> CoreResult<Compaction> {
        if prefix.is_empty() {
            return Err(CoreError::malformed("prefix", prefix, "empty prefix"));
        }
        validate_digits("prefix", prefix, prefix.len())?;
        validate_digits("low", low, low.len())?;
        validate_digits("high", high, low.len())?;
        let number_width = prefix.len() + low.len();
        if number_width > MAX_NUMBER_WIDTH {
            return Err(CoreError::malformed(
                "low",
                low,
                format!("number width {number_width} exceeds {MAX_NUMBER_WIDTH}"),
            ));
        }
        if low > high {
            return Err(CoreError::malformed(
                "high",
                high,
                format!("below low bound {low}"),
            ));
        }

        let (reduced_low, reduced_high) = reduce_interval(low, high);
        let atoms = enumerate(prefix, reduced_low, reduced_high)?;
        debug!(
            "Compacting {}[{}..{}]: reduced to [{:?}..{:?}], {} atoms",
            prefix,
            low,
            high,
            reduced_low,
            reduced_high,
            atoms.len()
        );

        let blocks = fold(atoms, number_width);
        let last_number = parse_digits("high", &format!("{prefix}{high}"))?;
        let implied = implied_cardinality(&blocks, last_number, number_width);
        let valid = implied == capacity;
        if !valid {
            warn!(
                "Cardinality mismatch for {}[{}..{}]: capacity {}, implied {}",
                prefix, low, high, capacity, implied
            );
        }

        Ok(Compaction {
            prefixes: blocks.iter().map(PrefixBlock::digits).collect(),
            implied,
            capacity,
            valid,
        })
    }

    /// Compacts a reference row.
    ///
    /// # Errors
    ///
    /// Same as [`PrefixCompactor::compact`].
    pub fn compact_row(&self, row: &AllocationRow) -> CoreResult<Compaction> {
        self.compact(&row.prefix, &row.low, &row.high, row.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(prefix: &str, low: &str, high: &str, capacity: u64) -> Compaction {
        PrefixCompactor::new()
            .compact(prefix, low, high, capacity)
            .unwrap()
    }

    fn range_of(prefix: &str, low: &str, high: &str) -> std::ops::RangeInclusive<u64> {
        let first: u64 = format!("{prefix}{low}").parse().unwrap();
        let last: u64 = format!("{prefix}{high}").parse().unwrap();
        first..=last
    }

    #[test]
    fn whole_prefix_compacts_to_itself() {
        let result = compact("950", "0000000", "9999999", 10_000_000);
        assert_eq!(result.prefixes, vec!["950"]);
        assert!(result.valid);
    }

    #[test]
    fn single_decade_folds() {
        let result = compact("901", "5000000", "5000009", 10);
        assert_eq!(result.prefixes, vec!["901500000"]);
        assert_eq!(result.implied, 10);
        assert!(result.valid);
    }

    #[test]
    fn unaligned_range_stays_enumerated() {
        let result = compact("901", "5000001", "5000008", 8);
        let expected: Vec<String> = (9015000001u64..=9015000008).map(|v| v.to_string()).collect();
        assert_eq!(result.prefixes, expected);
        assert!(result.valid);
    }

    #[test]
    fn wrong_capacity_is_flagged() {
        let result = compact("901", "5000001", "5000008", 9);
        assert!(!result.valid);
        assert_eq!(result.implied, 8);
        assert_eq!(result.capacity, 9);
    }

    #[test]
    fn carry_across_digit_boundary() {
        let result = compact("901", "0999999", "1000008", 10);
        assert_eq!(result.prefixes.len(), 10);
        assert_eq!(result.prefixes[0], "9010999999");
        assert!(result.valid);
        assert!(verify_exact(&result.prefixes, range_of("901", "0999999", "1000008"), 10).is_ok());
    }

    #[test]
    fn mixed_levels_are_exact() {
        let result = compact("950", "5998000", "5999999", 2000);
        assert_eq!(result.prefixes, vec!["9505998", "9505999"]);
        assert!(result.valid);

        let result = compact("901", "1230005", "1230123", 119);
        assert!(result.valid);
        assert!(result.prefixes.contains(&"901123001".to_string()));
        assert!(result.prefixes.contains(&"9011230005".to_string()));
        assert!(verify_exact(&result.prefixes, range_of("901", "1230005", "1230123"), 10).is_ok());
    }

    #[test]
    fn leading_zero_prefix_survives() {
        let result = compact("012", "0000000", "0000009", 10);
        assert_eq!(result.prefixes, vec!["012000000"]);
    }

    #[test]
    fn rejects_malformed_input() {
        let c = PrefixCompactor::new();
        assert!(c.compact("", "1", "2", 2).is_err());
        assert!(c.compact("901", "10", "2", 2).is_err());
        assert!(c.compact("901", "20", "10", 2).is_err());
        assert!(c.compact("9o1", "10", "20", 11).is_err());
        assert!(c.compact("901", "1234567890123456", "1234567890123457", 2).is_err());
    }

    #[test]
    fn compact_row_uses_row_fields() {
        let row = AllocationRow::new("901", "5000000", "5000009", "Tver", 10);
        let result = PrefixCompactor::new().compact_row(&row).unwrap();
        assert_eq!(result.prefixes, vec!["901500000"]);
    }
}
