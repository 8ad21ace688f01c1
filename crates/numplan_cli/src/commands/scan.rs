//! Scan command implementation.

use super::{print_json, CommandError, Globals};
use numplan_io::{ContentScanner, DelimitedRowSource, IoError, RowSource, ScanFinding};
use serde::Serialize;
use std::path::Path;

/// Scan outcome.
#[derive(Debug, Default, Serialize)]
pub struct ScanResult {
    /// Rows that parsed, when the table passed.
    pub rows: usize,
    /// Lines that did not parse.
    pub rejected: usize,
    /// Blocklist hits.
    pub findings: Vec<ScanFinding>,
}

/// Runs the scan command.
pub fn run(globals: &Globals, table: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut source =
        DelimitedRowSource::open(table, globals.layout)?.with_scanner(ContentScanner::new()?);
    let result = match source.load() {
        Ok(loaded) => ScanResult {
            rows: loaded.rows.len(),
            rejected: loaded.rejected.len(),
            findings: Vec::new(),
        },
        Err(IoError::UntrustedInput { findings }) => ScanResult {
            findings,
            ..ScanResult::default()
        },
        Err(e) => return Err(e.into()),
    };

    if globals.json {
        print_json(&result)?;
    } else if result.findings.is_empty() {
        println!("Scanned {:?}", table);
        println!("  Rows:     {}", result.rows);
        println!("  Rejected: {}", result.rejected);
        println!("✓ No suspicious content found");
    } else {
        println!("Scanned {:?}", table);
        for finding in &result.findings {
            println!(
                "  line {} [{}] matches {}: {:?}",
                finding.line, finding.field, finding.pattern, finding.value
            );
        }
        println!("✗ Table rejected");
    }

    if result.findings.is_empty() {
        Ok(())
    } else {
        Err(CommandError::UntrustedTable(result.findings.len()).into())
    }
}
