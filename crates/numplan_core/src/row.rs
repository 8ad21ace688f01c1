//! Reference-table rows and routing entries.

use crate::digits::{parse_digits, validate_digits, NumberLayout};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a routing region, resolved from the region name carried by
/// a reference row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub u64);

impl RegionId {
    /// Returns the raw identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One allocation range of the reference table.
///
/// `low` and `high` are kept as digit strings; the table relies on leading
/// zeros and all comparisons are equal-width string comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRow {
    /// Leading digits shared by all numbers of the row.
    pub prefix: String,
    /// Inclusive lower bound of the trailing digits.
    pub low: String,
    /// Inclusive upper bound of the trailing digits.
    pub high: String,
    /// Region name, resolved externally to a [`RegionId`].
    pub region: String,
    /// Declared number of full numbers in the row. Only used to validate
    /// compaction.
    pub capacity: u64,
    /// Operator holding the allocation. Informational.
    pub operator: String,
}

impl AllocationRow {
    /// Creates a row with an empty operator.
    pub fn new(
        prefix: impl Into<String>,
        low: impl Into<String>,
        high: impl Into<String>,
        region: impl Into<String>,
        capacity: u64,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            low: low.into(),
            high: high.into(),
            region: region.into(),
            capacity,
            operator: String::new(),
        }
    }

    /// Sets the operator.
    #[must_use]
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }

    /// Checks widths, digit content and `low <= high`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedInput`] describing the first problem.
    pub fn validate(&self, layout: &NumberLayout) -> CoreResult<()> {
        validate_digits("prefix", &self.prefix, layout.prefix_width())?;
        validate_digits("low", &self.low, layout.tail_width())?;
        validate_digits("high", &self.high, layout.tail_width())?;
        if self.low > self.high {
            return Err(CoreError::malformed(
                "high",
                self.high.clone(),
                format!("below low bound {}", self.low),
            ));
        }
        Ok(())
    }

    /// Returns true if the trailing digits `tail` fall within `[low, high]`.
    ///
    /// `tail` must have the same width as `low`.
    #[must_use]
    pub fn contains_tail(&self, tail: &str) -> bool {
        self.low.as_str() <= tail && tail <= self.high.as_str()
    }

    /// Returns true if the full number belongs to this row.
    #[must_use]
    pub fn contains(&self, number: &str) -> bool {
        number.len() == self.prefix.len() + self.low.len()
            && number.starts_with(self.prefix.as_str())
            && self.contains_tail(&number[self.prefix.len()..])
    }

    /// Number of full numbers in `[low, high]`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedInput`] if the bounds are not digits.
    pub fn span(&self) -> CoreResult<u64> {
        let low = parse_digits("low", &self.low)?;
        let high = parse_digits("high", &self.high)?;
        Ok(high.saturating_sub(low) + 1)
    }

    /// First full number of the row.
    #[must_use]
    pub fn first_number(&self) -> String {
        format!("{}{}", self.prefix, self.low)
    }

    /// Last full number of the row.
    #[must_use]
    pub fn last_number(&self) -> String {
        format!("{}{}", self.prefix, self.high)
    }
}

impl fmt::Display for AllocationRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}..{}] region={:?} capacity={}",
            self.prefix, self.low, self.high, self.region, self.capacity
        )
    }
}

/// A compacted prefix paired with the region it routes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoutingEntry {
    /// Compacted prefix; all full numbers starting with it route here.
    pub prefix: String,
    /// Target region.
    pub region_id: RegionId,
}

impl RoutingEntry {
    /// Creates a routing entry.
    pub fn new(prefix: impl Into<String>, region_id: RegionId) -> Self {
        Self {
            prefix: prefix.into(),
            region_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(low: &str, high: &str) -> AllocationRow {
        AllocationRow::new("901", low, high, "Moscow", 0)
    }

    #[test]
    fn validate_accepts_well_formed_row() {
        let layout = NumberLayout::default();
        assert!(row("5000000", "5000009").validate(&layout).is_ok());
        assert!(row("5000000", "5000000").validate(&layout).is_ok());
    }

    #[test]
    fn validate_rejects_bad_rows() {
        let layout = NumberLayout::default();
        assert!(row("500000", "5000009").validate(&layout).is_err());
        assert!(row("5000000", "50000o9").validate(&layout).is_err());
        assert!(row("5000009", "5000000").validate(&layout).is_err());

        let mut bad_prefix = row("5000000", "5000009");
        bad_prefix.prefix = "9O1".into();
        assert!(bad_prefix.validate(&layout).is_err());
    }

    #[test]
    fn contains_uses_string_order() {
        let r = row("0999999", "1000008");
        assert!(r.contains("9010999999"));
        assert!(r.contains("9011000008"));
        assert!(!r.contains("9011000009"));
        assert!(!r.contains("9020999999"));
        assert!(!r.contains("901099999"));
    }

    #[test]
    fn span_counts_inclusive() {
        assert_eq!(row("5000001", "5000008").span().unwrap(), 8);
        assert_eq!(row("0000000", "9999999").span().unwrap(), 10_000_000);
    }

    #[test]
    fn display_row() {
        let r = row("5000000", "5000009").with_operator("MTS");
        assert_eq!(r.operator, "MTS");
        assert!(r.to_string().starts_with("901[5000000..5000009]"));
        assert_eq!(r.first_number(), "9015000000");
        assert_eq!(r.last_number(), "9015000009");
    }
}
