//! Reference-table sources.

use crate::delimited::split_record;
use crate::error::{IoError, IoResult};
use crate::scan::ContentScanner;
use numplan_core::{zero_pad, AllocationRow, NumberLayout, RowFinding};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Minimum number of columns a reference row must carry.
pub const MIN_COLUMNS: usize = 6;

/// Rows loaded from a source, plus the lines that could not be parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedRows {
    /// Parsed rows, in source order.
    pub rows: Vec<AllocationRow>,
    /// Lines skipped, with the reason.
    pub rejected: Vec<RowFinding>,
}

/// Supplier of reference rows.
pub trait RowSource {
    /// Loads every row.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UntrustedInput`] if the source fails its content
    /// scan, or an I/O error.
    fn load(&mut self) -> IoResult<LoadedRows>;
}

/// Rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    rows: Vec<AllocationRow>,
}

impl MemoryRowSource {
    /// Creates a source over `rows`.
    #[must_use]
    pub fn new(rows: Vec<AllocationRow>) -> Self {
        Self { rows }
    }
}

impl RowSource for MemoryRowSource {
    fn load(&mut self) -> IoResult<LoadedRows> {
        Ok(LoadedRows {
            rows: self.rows.clone(),
            rejected: Vec::new(),
        })
    }
}

/// Delimited reference table.
///
/// The first line is a header. Columns are, in order: prefix, low, high,
/// capacity, operator, region, and optionally territory and tax id. Short
/// numeric fields are zero-padded to the layout widths.
pub struct DelimitedRowSource<R> {
    reader: R,
    layout: NumberLayout,
    delimiter: char,
    scanner: Option<ContentScanner>,
}

impl DelimitedRowSource<BufReader<File>> {
    /// Opens a `.csv` reference table.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidSource`] if the path does not name a `.csv`
    /// file, or an I/O error if it cannot be opened.
    pub fn open(path: &Path, layout: NumberLayout) -> IoResult<Self> {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Err(IoError::invalid_source(path, "not a .csv file"));
        }
        if !path.is_file() {
            return Err(IoError::invalid_source(path, "file does not exist"));
        }
        info!("Opening reference table {:?}", path);
        Ok(Self::from_reader(BufReader::new(File::open(path)?), layout))
    }
}

impl<R: BufRead> DelimitedRowSource<R> {
    /// Wraps a reader. Defaults to `;` and no content scan.
    pub fn from_reader(reader: R, layout: NumberLayout) -> Self {
        Self {
            reader,
            layout,
            delimiter: ';',
            scanner: None,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Requires the table to pass `scanner` before any row is returned.
    #[must_use]
    pub fn with_scanner(mut self, scanner: ContentScanner) -> Self {
        self.scanner = Some(scanner);
        self
    }

    fn read_records(&mut self) -> IoResult<(Vec<String>, Vec<(usize, Vec<String>)>)> {
        let mut header = Vec::new();
        let mut records = Vec::new();
        let mut buf = String::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                break;
            }
            line_no += 1;
            let line = buf.trim_end_matches(['\r', '\n']);
            let line = if line_no == 1 {
                line.trim_start_matches('\u{feff}')
            } else {
                line
            };
            if line_no == 1 {
                header = split_record(line, self.delimiter)
                    .into_iter()
                    .map(|h| h.trim().to_string())
                    .collect();
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            records.push((line_no, split_record(line, self.delimiter)));
        }
        Ok((header, records))
    }

    fn parse_row(&self, fields: &[String]) -> Result<AllocationRow, String> {
        if fields.len() < MIN_COLUMNS {
            return Err(format!(
                "expected at least {} columns, got {}",
                MIN_COLUMNS,
                fields.len()
            ));
        }
        let capacity = fields[3]
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("capacity {:?}: {}", fields[3], e))?;
        Ok(AllocationRow {
            prefix: zero_pad(fields[0].trim(), self.layout.prefix_width()),
            low: zero_pad(fields[1].trim(), self.layout.tail_width()),
            high: zero_pad(fields[2].trim(), self.layout.tail_width()),
            region: fields[5].trim().to_string(),
            capacity,
            operator: fields[4].trim().to_string(),
        })
    }
}

impl<R: BufRead> RowSource for DelimitedRowSource<R> {
    fn load(&mut self) -> IoResult<LoadedRows> {
        let (header, records) = self.read_records()?;

        if let Some(scanner) = &self.scanner {
            let findings = scanner.scan_records(&header, &records);
            if !findings.is_empty() {
                warn!("Reference table rejected: {} suspicious fields", findings.len());
                return Err(IoError::UntrustedInput { findings });
            }
            debug!("Reference table passed content scan");
        }

        let mut loaded = LoadedRows::default();
        for (line, fields) in &records {
            match self.parse_row(fields) {
                Ok(row) => loaded.rows.push(row),
                Err(reason) => {
                    warn!("Skipping line {}: {}", line, reason);
                    loaded.rejected.push(RowFinding {
                        row: format!("line {line}"),
                        reason,
                    });
                }
            }
        }
        info!(
            "Loaded {} reference rows ({} rejected)",
            loaded.rows.len(),
            loaded.rejected.len()
        );
        Ok(loaded)
    }
}
