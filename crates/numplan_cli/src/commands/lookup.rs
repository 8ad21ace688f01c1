//! Lookup command implementation.

use super::{index_rows, load_table, print_json, Globals};
use numplan_core::{AllocationRow, RangeIndex, RowFinding};
use serde::Serialize;
use std::path::Path;
use tracing::warn;

/// Outcome for one queried number.
#[derive(Debug, Serialize)]
pub struct LookupResult {
    /// The queried number.
    pub number: String,
    /// Owning row, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<AllocationRow>,
    /// Why the number could not be looked up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything the lookup command prints.
#[derive(Debug, Serialize)]
pub struct LookupReport {
    /// One result per queried number, in query order.
    pub results: Vec<LookupResult>,
    /// Table rows left out of the index.
    pub skipped_rows: Vec<RowFinding>,
}

/// Looks up every number in `index`.
pub fn resolve(index: &RangeIndex, numbers: &[String]) -> Vec<LookupResult> {
    numbers
        .iter()
        .map(|number| match index.locate(number) {
            Ok(row) => LookupResult {
                number: number.clone(),
                row: row.cloned(),
                error: None,
            },
            Err(e) => LookupResult {
                number: number.clone(),
                row: None,
                error: Some(e.to_string()),
            },
        })
        .collect()
}

/// Runs the lookup command.
pub fn run(
    globals: &Globals,
    table: &Path,
    numbers: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_table(table, globals.layout)?;
    let indexed = index_rows(loaded, globals.layout)?;
    for finding in &indexed.skipped {
        warn!("Skipped {}: {}", finding.row, finding.reason);
    }

    let report = LookupReport {
        results: resolve(&indexed.index, numbers),
        skipped_rows: indexed.skipped,
    };

    if globals.json {
        return print_json(&report);
    }
    for result in &report.results {
        match (&result.row, &result.error) {
            (Some(row), _) => println!(
                "{}  {}  operator={}",
                result.number,
                row,
                if row.operator.is_empty() { "-" } else { row.operator.as_str() }
            ),
            (None, Some(error)) => println!("{}  malformed: {}", result.number, error),
            (None, None) => println!("{}  not found", result.number),
        }
    }
    if !report.skipped_rows.is_empty() {
        println!();
        println!("Skipped {} table row(s):", report.skipped_rows.len());
        for finding in &report.skipped_rows {
            println!("  - {}: {}", finding.row, finding.reason);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use numplan_core::NumberLayout;
    use numplan_io::LoadedRows;

    fn table_with_one_bad_row() -> LoadedRows {
        LoadedRows {
            rows: vec![
                AllocationRow::new("950", "5998000", "5999999", "Sochi", 2000),
                AllocationRow::new("950", "6000000", "5000000", "Sochi", 1),
            ],
            rejected: Vec::new(),
        }
    }

    #[test]
    fn malformed_row_does_not_block_lookup() {
        let indexed = index_rows(table_with_one_bad_row(), NumberLayout::default()).unwrap();
        assert_eq!(indexed.skipped.len(), 1);
        assert!(indexed.skipped[0].row.starts_with("950[6000000..5000000]"));

        let results = resolve(&indexed.index, &["9505998693".to_string()]);
        let row = results[0].row.as_ref().expect("number should resolve");
        assert_eq!(row.low, "5998000");
        assert!(results[0].error.is_none());
    }

    #[test]
    fn parser_rejections_are_listed_with_row_findings() {
        let mut loaded = table_with_one_bad_row();
        loaded.rejected.push(RowFinding {
            row: "line 7".into(),
            reason: "expected at least 6 columns".into(),
        });
        let indexed = index_rows(loaded, NumberLayout::default()).unwrap();
        assert_eq!(indexed.skipped.len(), 2);
        assert_eq!(indexed.skipped[0].row, "line 7");
    }

    #[test]
    fn bad_query_is_reported_per_number() {
        let indexed = index_rows(table_with_one_bad_row(), NumberLayout::default()).unwrap();
        let results = resolve(
            &indexed.index,
            &["95059".to_string(), "9509999999".to_string()],
        );
        assert!(results[0].error.is_some());
        assert!(results[1].row.is_none());
        assert!(results[1].error.is_none());
    }
}
