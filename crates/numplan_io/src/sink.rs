//! Routing-table sinks.
//!
//! A sink receives the final, prefix-sorted routing entries of a build.
//! File sinks write to a temporary sibling and rename it into place, so a
//! failed publication never leaves a truncated file behind.

use crate::changelog::{ChangeLogTemplate, CHANGELOG_COLUMNS};
use crate::delimited::join_record;
use crate::error::IoResult;
use numplan_core::RoutingEntry;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Column names of a snapshot file.
pub const SNAPSHOT_COLUMNS: [&str; 2] = ["prefix", "region_id"];

/// Receiver of a finished routing table.
pub trait RoutingSink {
    /// Publishes `entries` and returns how many records were written.
    ///
    /// # Errors
    ///
    /// Returns an error if the entries cannot be stored.
    fn publish(&mut self, entries: &[RoutingEntry]) -> IoResult<usize>;
}

/// Sink keeping published entries in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Vec<RoutingEntry>,
    publications: usize,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries of the last publication.
    #[must_use]
    pub fn entries(&self) -> &[RoutingEntry] {
        &self.entries
    }

    /// Number of publications received.
    #[must_use]
    pub fn publications(&self) -> usize {
        self.publications
    }
}

impl RoutingSink for MemorySink {
    fn publish(&mut self, entries: &[RoutingEntry]) -> IoResult<usize> {
        self.entries = entries.to_vec();
        self.publications += 1;
        Ok(entries.len())
    }
}

/// Writes a `prefix,region_id` snapshot.
///
/// # Errors
///
/// Returns an I/O error if writing fails.
pub fn write_snapshot<W: Write>(
    out: &mut W,
    entries: &[RoutingEntry],
    delimiter: char,
) -> IoResult<usize> {
    writeln!(out, "{}", join_record(&SNAPSHOT_COLUMNS, delimiter))?;
    for entry in entries {
        let fields = [entry.prefix.clone(), entry.region_id.to_string()];
        writeln!(out, "{}", join_record(&fields, delimiter))?;
    }
    Ok(entries.len())
}

/// Writes change-log records, skipping prefixes in `skip`.
///
/// Sequence ids are consecutive over the written records.
///
/// # Errors
///
/// Returns [`crate::IoError::InvalidTemplate`] for a bad template or an I/O
/// error if writing fails.
pub fn write_changelog<W: Write>(
    out: &mut W,
    entries: &[RoutingEntry],
    template: &ChangeLogTemplate,
    skip: &HashSet<String>,
) -> IoResult<usize> {
    template.validate()?;
    writeln!(out, "{}", join_record(&CHANGELOG_COLUMNS, ','))?;
    let mut written = 0u64;
    for entry in entries.iter().filter(|e| !skip.contains(&e.prefix)) {
        writeln!(out, "{}", join_record(&template.record(written, entry), ','))?;
        written += 1;
    }
    Ok(written as usize)
}

fn replace_atomically<F>(path: &Path, write: F) -> IoResult<usize>
where
    F: FnOnce(&mut BufWriter<File>) -> IoResult<usize>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("partial");
    let written = {
        let mut out = BufWriter::new(File::create(&temp_path)?);
        let result = write(&mut out).and_then(|n| {
            out.flush()?;
            out.get_ref().sync_all()?;
            Ok(n)
        });
        match result {
            Ok(n) => n,
            Err(e) => {
                drop(out);
                let _ = fs::remove_file(&temp_path);
                return Err(e);
            }
        }
    };
    fs::rename(&temp_path, path)?;
    info!("Published {} records to {:?}", written, path);
    Ok(written)
}

/// Sink writing a snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotFileSink {
    path: PathBuf,
    delimiter: char,
}

impl SnapshotFileSink {
    /// Creates a sink writing comma-separated output to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: ',',
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Output path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RoutingSink for SnapshotFileSink {
    fn publish(&mut self, entries: &[RoutingEntry]) -> IoResult<usize> {
        let delimiter = self.delimiter;
        replace_atomically(&self.path, |out| write_snapshot(out, entries, delimiter))
    }
}

/// Sink writing a change-log file.
#[derive(Debug, Clone)]
pub struct ChangeLogFileSink {
    path: PathBuf,
    template: ChangeLogTemplate,
    skip: HashSet<String>,
}

impl ChangeLogFileSink {
    /// Creates a sink writing to `path` with `template`.
    pub fn new(path: impl Into<PathBuf>, template: ChangeLogTemplate) -> Self {
        Self {
            path: path.into(),
            template,
            skip: HashSet::new(),
        }
    }

    /// Prefixes already known downstream; they are left out of the log.
    #[must_use]
    pub fn skip_existing<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// Output path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RoutingSink for ChangeLogFileSink {
    fn publish(&mut self, entries: &[RoutingEntry]) -> IoResult<usize> {
        let (template, skip) = (&self.template, &self.skip);
        replace_atomically(&self.path, |out| write_changelog(out, entries, template, skip))
    }
}
