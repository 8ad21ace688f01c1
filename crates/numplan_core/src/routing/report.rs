//! Advisory findings collected during a routing build.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A row that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowFinding {
    /// Row in `prefix[low..high]` form.
    pub row: String,
    /// Why the row was skipped.
    pub reason: String,
}

/// A row whose compaction failed the cardinality self-check.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MismatchFinding {
    /// Row prefix.
    pub prefix: String,
    /// Row low bound.
    pub low: String,
    /// Row high bound.
    pub high: String,
    /// Declared capacity.
    pub capacity: u64,
    /// Cardinality implied by the compacted prefixes.
    pub implied: u64,
}

/// Two rows emitted the same prefix for different regions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollisionFinding {
    /// The contested prefix.
    pub prefix: String,
    /// Region kept (earliest row in index order).
    pub kept_region: u64,
    /// Region dropped.
    pub dropped_region: u64,
}

/// Summary of a routing build.
///
/// Nothing in here stopped the build; it is meant for a human to review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Rows supplied by the source.
    pub rows_total: usize,
    /// Rows compacted into routing entries.
    pub rows_compacted: usize,
    /// Distinct prefixes emitted after deduplication.
    pub prefixes_emitted: usize,
    /// Duplicate prefixes dropped during deduplication.
    pub duplicates_dropped: usize,
    /// Queried numbers owned by no row.
    pub not_found: Vec<String>,
    /// Queried numbers rejected as malformed.
    pub malformed_numbers: Vec<RowFinding>,
    /// Rows rejected as malformed.
    pub malformed_rows: Vec<RowFinding>,
    /// Rows whose region name did not resolve.
    pub unresolved_regions: Vec<RowFinding>,
    /// Rows that failed the cardinality self-check.
    pub mismatches: Vec<MismatchFinding>,
    /// Prefixes claimed by rows with different regions.
    pub collisions: Vec<CollisionFinding>,
}

impl BuildReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no advisory findings were recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.not_found.is_empty()
            && self.malformed_numbers.is_empty()
            && self.malformed_rows.is_empty()
            && self.unresolved_regions.is_empty()
            && self.mismatches.is_empty()
            && self.collisions.is_empty()
    }

    /// Total number of findings.
    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.not_found.len()
            + self.malformed_numbers.len()
            + self.malformed_rows.len()
            + self.unresolved_regions.len()
            + self.mismatches.len()
            + self.collisions.len()
    }

    /// Sorts findings so reports do not depend on processing order.
    pub(crate) fn normalize(&mut self) {
        self.not_found.sort();
        self.malformed_numbers.sort();
        self.malformed_rows.sort();
        self.unresolved_regions.sort();
        self.mismatches.sort();
        self.collisions.sort();
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rows:               {}", self.rows_total)?;
        writeln!(f, "Rows compacted:     {}", self.rows_compacted)?;
        writeln!(f, "Prefixes emitted:   {}", self.prefixes_emitted)?;
        writeln!(f, "Duplicates dropped: {}", self.duplicates_dropped)?;
        if !self.not_found.is_empty() {
            writeln!(f, "Numbers not found:  {}", self.not_found.len())?;
            for number in &self.not_found {
                writeln!(f, "  {number}")?;
            }
        }
        for (title, findings) in [
            ("Malformed numbers", &self.malformed_numbers),
            ("Malformed rows", &self.malformed_rows),
            ("Unresolved regions", &self.unresolved_regions),
        ] {
            if !findings.is_empty() {
                writeln!(f, "{}: {}", title, findings.len())?;
                for finding in findings {
                    writeln!(f, "  {}: {}", finding.row, finding.reason)?;
                }
            }
        }
        if !self.mismatches.is_empty() {
            writeln!(f, "Capacity mismatches: {}", self.mismatches.len())?;
            for m in &self.mismatches {
                writeln!(
                    f,
                    "  {}[{}..{}]: capacity {}, implied {}",
                    m.prefix, m.low, m.high, m.capacity, m.implied
                )?;
            }
        }
        if !self.collisions.is_empty() {
            writeln!(f, "Prefix collisions: {}", self.collisions.len())?;
            for c in &self.collisions {
                writeln!(
                    f,
                    "  {}: kept region {}, dropped region {}",
                    c.prefix, c.kept_region, c.dropped_region
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_clean() {
        let report = BuildReport::new();
        assert!(report.is_clean());
        assert_eq!(report.finding_count(), 0);
    }

    #[test]
    fn findings_make_report_dirty() {
        let mut report = BuildReport::new();
        report.not_found.push("9990000000".into());
        report.collisions.push(CollisionFinding {
            prefix: "901".into(),
            kept_region: 1,
            dropped_region: 2,
        });
        assert!(!report.is_clean());
        assert_eq!(report.finding_count(), 2);

        let text = report.to_string();
        assert!(text.contains("9990000000"));
        assert!(text.contains("kept region 1"));
    }

    #[test]
    fn normalize_sorts_findings() {
        let mut report = BuildReport::new();
        report.not_found = vec!["3".into(), "1".into(), "2".into()];
        report.normalize();
        assert_eq!(report.not_found, vec!["1", "2", "3"]);
    }
}
