//! Sorted range index over reference rows.
//!
//! Rows are ordered by `(prefix, low)`. A full number is resolved with a
//! binary search that first compares the leading prefix digits and, on a
//! prefix match, narrows by the trailing digits against `[low, high]`.
//!
//! ## Invariants
//!
//! - Every indexed row passed [`AllocationRow::validate`]
//! - Rows sharing a prefix never overlap
//! - Lookups are pure reads

use crate::digits::NumberLayout;
use crate::error::{CoreError, CoreResult};
use crate::row::AllocationRow;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Outcome of resolving a batch of numbers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LocateBatch {
    /// Positions (in index order) of rows owning at least one number.
    pub rows: BTreeSet<usize>,
    /// Well-formed numbers that no row owns.
    pub not_found: Vec<String>,
    /// Numbers rejected as malformed, with the reason.
    pub malformed: Vec<(String, String)>,
}

/// Point-lookup index over allocation rows.
#[derive(Debug, Clone)]
pub struct RangeIndex {
    layout: NumberLayout,
    rows: Vec<AllocationRow>,
}

impl RangeIndex {
    /// Builds an index from rows in any order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedInput`] for the first invalid row and
    /// [`CoreError::OverlappingRanges`] if two rows with the same prefix
    /// intersect.
    pub fn build(layout: NumberLayout, mut rows: Vec<AllocationRow>) -> CoreResult<Self> {
        for row in &rows {
            row.validate(&layout)?;
        }

        let sorted = rows
            .windows(2)
            .all(|w| (&w[0].prefix, &w[0].low) <= (&w[1].prefix, &w[1].low));
        if !sorted {
            debug!("Sorting {} reference rows by prefix", rows.len());
            rows.sort_by(|a, b| (&a.prefix, &a.low).cmp(&(&b.prefix, &b.low)));
        }

        for pair in rows.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.prefix == b.prefix && b.low <= a.high {
                return Err(CoreError::OverlappingRanges {
                    prefix: a.prefix.clone(),
                    first_low: a.low.clone(),
                    first_high: a.high.clone(),
                    second_low: b.low.clone(),
                    second_high: b.high.clone(),
                });
            }
        }

        Ok(Self { layout, rows })
    }

    /// Returns the layout rows were validated against.
    #[must_use]
    pub fn layout(&self) -> &NumberLayout {
        &self.layout
    }

    /// Returns the rows in index order.
    #[must_use]
    pub fn rows(&self) -> &[AllocationRow] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the index holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the row owning `number`.
    ///
    /// Returns `Ok(None)` when no row covers the number; sparse coverage is
    /// expected and not logged.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedInput`] if `number` is not a full-width
    /// digit string.
    pub fn locate(&self, number: &str) -> CoreResult<Option<&AllocationRow>> {
        Ok(self.position(number)?.map(|pos| &self.rows[pos]))
    }

    /// Like [`RangeIndex::locate`] but returns the row position.
    ///
    /// # Errors
    ///
    /// Same as [`RangeIndex::locate`].
    pub fn position(&self, number: &str) -> CoreResult<Option<usize>> {
        let (prefix, tail) = self.layout.split(number)?;

        let mut lo = 0usize;
        let mut hi = self.rows.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let row = &self.rows[mid];
            match row.prefix.as_str().cmp(prefix) {
                Ordering::Equal => {
                    if row.contains_tail(tail) {
                        return Ok(Some(mid));
                    }
                    if tail < row.low.as_str() {
                        hi = mid;
                    } else {
                        lo = mid + 1;
                    }
                }
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
            }
        }
        Ok(None)
    }

    /// Resolves a batch of numbers to the set of owning rows.
    ///
    /// Unknown and malformed numbers are collected rather than failing the
    /// batch.
    pub fn locate_many<I, S>(&self, numbers: I) -> LocateBatch
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut batch = LocateBatch::default();
        for number in numbers {
            let number = number.as_ref();
            match self.position(number) {
                Ok(Some(pos)) => {
                    batch.rows.insert(pos);
                }
                Ok(None) => batch.not_found.push(number.to_string()),
                Err(e) => {
                    warn!("Rejected lookup input {:?}: {}", number, e);
                    batch.malformed.push((number.to_string(), e.to_string()));
                }
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<AllocationRow> {
        vec![
            AllocationRow::new("950", "0000000", "4999999", "Moscow", 5_000_000),
            AllocationRow::new("901", "5000000", "5000009", "Tver", 10),
            AllocationRow::new("901", "0000000", "0999999", "Tula", 1_000_000),
            AllocationRow::new("950", "5998000", "5999999", "Kazan", 2000),
            AllocationRow::new("900", "1000000", "1999999", "Omsk", 1_000_000),
        ]
    }

    fn index() -> RangeIndex {
        RangeIndex::build(NumberLayout::default(), rows()).unwrap()
    }

    #[test]
    fn build_sorts_by_prefix_then_low() {
        let idx = index();
        let keys: Vec<_> = idx
            .rows()
            .iter()
            .map(|r| format!("{}{}", r.prefix, r.low))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(idx.len(), 5);
        assert!(!idx.is_empty());
    }

    #[test]
    fn locate_finds_owner() {
        let idx = index();
        assert_eq!(idx.locate("9505998693").unwrap().unwrap().region, "Kazan");
        assert_eq!(idx.locate("9500000000").unwrap().unwrap().region, "Moscow");
        assert_eq!(idx.locate("9015000009").unwrap().unwrap().region, "Tver");
        assert_eq!(idx.locate("9010999999").unwrap().unwrap().region, "Tula");
        assert_eq!(idx.locate("9001500000").unwrap().unwrap().region, "Omsk");
    }

    #[test]
    fn locate_reports_gaps() {
        let idx = index();
        assert!(idx.locate("9015000010").unwrap().is_none());
        assert!(idx.locate("9505000000").unwrap().is_none());
        assert!(idx.locate("9990000000").unwrap().is_none());
        assert!(idx.locate("8000000000").unwrap().is_none());
    }

    #[test]
    fn locate_rejects_malformed() {
        let idx = index();
        assert!(matches!(
            idx.locate("950599869"),
            Err(CoreError::MalformedInput { .. })
        ));
        assert!(idx.locate("95059986x3").is_err());
    }

    #[test]
    fn empty_index_finds_nothing() {
        let idx = RangeIndex::build(NumberLayout::default(), Vec::new()).unwrap();
        assert!(idx.is_empty());
        assert!(idx.locate("9505998693").unwrap().is_none());
    }

    #[test]
    fn build_rejects_overlap() {
        let mut rs = rows();
        rs.push(AllocationRow::new("901", "5000005", "5000020", "Tver", 16));
        let err = RangeIndex::build(NumberLayout::default(), rs).unwrap_err();
        assert!(matches!(err, CoreError::OverlappingRanges { .. }));
    }

    #[test]
    fn build_rejects_malformed_row() {
        let mut rs = rows();
        rs.push(AllocationRow::new("91", "5000005", "5000020", "Tver", 16));
        assert!(RangeIndex::build(NumberLayout::default(), rs).is_err());
    }

    #[test]
    fn locate_many_collects_outcomes() {
        let idx = index();
        let batch = idx.locate_many(["9505998693", "9505998694", "9990000000", "12"]);
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.not_found, vec!["9990000000".to_string()]);
        assert_eq!(batch.malformed.len(), 1);
        assert_eq!(batch.malformed[0].0, "12");
    }
}
