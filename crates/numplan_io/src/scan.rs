//! Content scan for externally supplied tables.
//!
//! Reference tables come from outside and end up next to SQL; any field that
//! looks like a data-manipulation command makes the whole table untrusted.

use crate::error::IoResult;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Blocklist applied by [`ContentScanner::new`].
pub const DEFAULT_BLOCKLIST: &[(&str, &str)] = &[
    ("SELECT", r"(?i)\bSELECT\b"),
    ("INSERT", r"(?i)\bINSERT\b"),
    ("UPDATE", r"(?i)\bUPDATE\b"),
    ("DELETE", r"(?i)\bDELETE\b"),
    ("DROP", r"(?i)\bDROP\b"),
    ("CREATE", r"(?i)\bCREATE\b"),
    ("ALTER", r"(?i)\bALTER\b"),
    ("EXEC", r"(?i)\bEXEC\b"),
    ("EVAL", r"(?i)\bEVAL\b"),
    ("os.", r"(?i)\bos\."),
    ("sys.", r"(?i)\bsys\."),
    ("INTO OUTFILE", r"(?i)\bINTO OUTFILE\b"),
    ("UNION", r"(?i)\bUNION\b"),
    ("JOIN", r"(?i)\bJOIN\b"),
    ("WHERE", r"(?i)\bWHERE\b"),
    ("EXECUTE IMMEDIATE", r"(?i)\bEXECUTE IMMEDIATE\b"),
];

/// A field that matched the blocklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFinding {
    /// One-based line number in the source.
    pub line: usize,
    /// Column name from the header, or its position.
    pub field: String,
    /// Name of the matching pattern.
    pub pattern: String,
    /// The field value.
    pub value: String,
}

/// Case-insensitive blocklist matcher.
#[derive(Debug, Clone)]
pub struct ContentScanner {
    patterns: Vec<(String, Regex)>,
}

impl ContentScanner {
    /// Creates a scanner with [`DEFAULT_BLOCKLIST`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::IoError::Pattern`] if a pattern fails to compile.
    pub fn new() -> IoResult<Self> {
        let mut patterns = Vec::with_capacity(DEFAULT_BLOCKLIST.len());
        for (name, pattern) in DEFAULT_BLOCKLIST {
            patterns.push(((*name).to_string(), Regex::new(pattern)?));
        }
        Ok(Self { patterns })
    }

    /// Creates a scanner with no patterns.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Adds a pattern to the blocklist.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IoError::Pattern`] if `pattern` fails to compile.
    pub fn with_pattern(mut self, name: impl Into<String>, pattern: &str) -> IoResult<Self> {
        self.patterns.push((name.into(), Regex::new(pattern)?));
        Ok(self)
    }

    /// Number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if the blocklist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Names of the patterns matching `text`.
    pub fn matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.patterns
            .iter()
            .filter(move |(_, re)| re.is_match(text))
            .map(|(name, _)| name.as_str())
    }

    /// Scans every field of `records`.
    ///
    /// `records` holds `(line_number, fields)`; `header` names the columns.
    #[must_use]
    pub fn scan_records(&self, header: &[String], records: &[(usize, Vec<String>)]) -> Vec<ScanFinding> {
        let mut findings = Vec::new();
        for (line, fields) in records {
            for (column, value) in fields.iter().enumerate() {
                for pattern in self.matches(value) {
                    let field = header
                        .get(column)
                        .cloned()
                        .unwrap_or_else(|| format!("#{}", column + 1));
                    warn!(
                        "Suspicious pattern {} at line {} in field {:?}: {:?}",
                        pattern, line, field, value
                    );
                    findings.push(ScanFinding {
                        line: *line,
                        field,
                        pattern: pattern.to_string(),
                        value: value.clone(),
                    });
                }
            }
        }
        findings
    }
}
