//! Reference-table fixtures.

use numplan_core::{AllocationRow, RegionId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A small reference table in the published semicolon layout.
///
/// Rows are deliberately out of order and share prefixes.
pub const SAMPLE_TABLE: &str = "\
ABC/DEF;From;To;Capacity;Operator;Region;Territory;TaxId
950;5998000;5999999;2000;Kazan Telecom;Tatarstan;;1655000000
901;5000000;5000009;10;MTS;Tver;;7740000076
950;0000000;4999999;5000000;MegaFon;Moscow;;7812014560
901;5000010;5000018;9;MTS;Tver;;7740000076
900;0000000;0061999;62000;Tele2;Krasnodar;;7743895280
901;0999999;1000008;10;Beeline;Omsk;;7713076301
";

/// Region directory matching [`SAMPLE_TABLE`], in `name;id` layout.
pub const SAMPLE_REGIONS: &str = "\
region;id
Tatarstan;16
Tver;69
Moscow;77
Krasnodar;23
Omsk;55
";

/// Region ids for [`SAMPLE_TABLE`].
#[must_use]
pub fn sample_regions() -> HashMap<String, RegionId> {
    [
        ("Tatarstan", 16),
        ("Tver", 69),
        ("Moscow", 77),
        ("Krasnodar", 23),
        ("Omsk", 55),
    ]
    .into_iter()
    .map(|(name, id)| (name.to_string(), RegionId(id)))
    .collect()
}

/// The rows of [`SAMPLE_TABLE`], parsed by hand.
#[must_use]
pub fn sample_rows() -> Vec<AllocationRow> {
    vec![
        AllocationRow::new("950", "5998000", "5999999", "Tatarstan", 2000)
            .with_operator("Kazan Telecom"),
        AllocationRow::new("901", "5000000", "5000009", "Tver", 10).with_operator("MTS"),
        AllocationRow::new("950", "0000000", "4999999", "Moscow", 5_000_000)
            .with_operator("MegaFon"),
        AllocationRow::new("901", "5000010", "5000018", "Tver", 9).with_operator("MTS"),
        AllocationRow::new("900", "0000000", "0061999", "Krasnodar", 62_000)
            .with_operator("Tele2"),
        AllocationRow::new("901", "0999999", "1000008", "Omsk", 10).with_operator("Beeline"),
    ]
}

/// Files written to a temporary directory, removed on drop.
pub struct TempWorkspace {
    dir: TempDir,
}

impl TempWorkspace {
    /// Creates an empty workspace.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Creates a workspace holding `table.csv` and `regions.csv` from the
    /// sample fixtures.
    pub fn with_sample() -> Self {
        let ws = Self::new();
        ws.write("table.csv", SAMPLE_TABLE);
        ws.write("regions.csv", SAMPLE_REGIONS);
        ws
    }

    /// Root directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `name` inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Writes `contents` to `name` and returns its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.file(name);
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path
    }

    /// Reads `name` back as text.
    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.file(name)).expect("Failed to read fixture")
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rows_resolve() {
        let regions = sample_regions();
        for row in sample_rows() {
            assert!(regions.contains_key(&row.region), "{}", row.region);
        }
    }

    #[test]
    fn sample_table_line_count_matches_rows() {
        assert_eq!(SAMPLE_TABLE.lines().count(), sample_rows().len() + 1);
        assert_eq!(SAMPLE_REGIONS.lines().count(), sample_regions().len() + 1);
    }

    #[test]
    fn workspace_round_trips_files() {
        let ws = TempWorkspace::with_sample();
        assert!(ws.file("table.csv").exists());
        assert_eq!(ws.read("regions.csv"), SAMPLE_REGIONS);
    }
}
