//! Error types for ingest and publishing.

use crate::scan::ScanFinding;
use numplan_core::CoreError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for ingest and publishing operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors raised at the edges of a routing build.
#[derive(Debug, Error)]
pub enum IoError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A core operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A blocklist pattern failed to compile.
    #[error("invalid scan pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The reference table failed the content scan and was not loaded.
    #[error("untrusted input: {} suspicious field(s)", findings.len())]
    UntrustedInput {
        /// Every suspicious field found.
        findings: Vec<ScanFinding>,
    },

    /// The source file cannot be used as a reference table.
    #[error("invalid source {path:?}: {reason}")]
    InvalidSource {
        /// Offending path.
        path: PathBuf,
        /// Why it was refused.
        reason: String,
    },

    /// A line of an auxiliary file could not be parsed.
    #[error("parse error at line {line}: {reason}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// What went wrong.
        reason: String,
    },

    /// A change-log template field is invalid.
    #[error("invalid change-log field {field}: {value:?} ({reason})")]
    InvalidTemplate {
        /// Field name.
        field: &'static str,
        /// Supplied value.
        value: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl IoError {
    /// Creates an invalid source error.
    pub fn invalid_source(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidSource {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }
}
