//! Region name directory.

use crate::delimited::split_record;
use crate::error::{IoError, IoResult};
use numplan_core::{RegionId, RegionResolver};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Region name to id mapping.
///
/// Loaded from a two-column delimited file (`name;id`). A first line whose
/// id column is not numeric is treated as a header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionDirectory {
    ids: HashMap<String, RegionId>,
}

impl RegionDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory from `(name, id)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            ids: pairs
                .into_iter()
                .map(|(name, id)| (name.into(), RegionId(id)))
                .collect(),
        }
    }

    /// Loads a directory file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error or [`IoError::Parse`] for malformed lines.
    pub fn load(path: &Path) -> IoResult<Self> {
        let text = fs::read_to_string(path)?;
        let directory = Self::parse(&text, ';')?;
        info!("Loaded {} regions from {:?}", directory.len(), path);
        Ok(directory)
    }

    /// Parses directory text.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Parse`] for lines without two fields or with a
    /// non-numeric id (other than a header on the first line).
    pub fn parse(text: &str, delimiter: char) -> IoResult<Self> {
        let mut ids = HashMap::new();
        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = line.trim_start_matches('\u{feff}');
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_record(line, delimiter);
            if fields.len() < 2 {
                return Err(IoError::parse(line_no, "expected name and id"));
            }
            let name = fields[0].trim();
            match fields[1].trim().parse::<u64>() {
                Ok(id) => {
                    ids.insert(name.to_string(), RegionId(id));
                }
                Err(_) if line_no == 1 => continue,
                Err(e) => {
                    return Err(IoError::parse(
                        line_no,
                        format!("region id {:?}: {}", fields[1], e),
                    ))
                }
            }
        }
        Ok(Self { ids })
    }

    /// Adds or replaces a region.
    pub fn insert(&mut self, name: impl Into<String>, id: RegionId) {
        self.ids.insert(name.into(), id);
    }

    /// Number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no regions are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl RegionResolver for RegionDirectory {
    fn resolve(&self, name: &str) -> Option<RegionId> {
        self.ids.get(name).or_else(|| self.ids.get(name.trim())).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_header() {
        let dir = RegionDirectory::parse("name;id\nMoscow;77\n\nTver;69\n", ';').unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.resolve("Tver"), Some(RegionId(69)));
        assert_eq!(dir.resolve("Omsk"), None);
    }

    #[test]
    fn parse_without_header() {
        let dir = RegionDirectory::parse("Moscow;77", ';').unwrap();
        assert_eq!(dir.resolve("Moscow"), Some(RegionId(77)));
    }

    #[test]
    fn parse_rejects_bad_ids() {
        let err = RegionDirectory::parse("name;id\nMoscow;x77\n", ';').unwrap_err();
        assert!(matches!(err, IoError::Parse { line: 2, .. }));
        assert!(RegionDirectory::parse("name;id\nMoscow\n", ';').is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.csv");
        std::fs::write(&path, "region;id\n\"Republic of Tatarstan\";16\n").unwrap();
        let regions = RegionDirectory::load(&path).unwrap();
        assert_eq!(regions.resolve("Republic of Tatarstan"), Some(RegionId(16)));
    }

    #[test]
    fn from_pairs_and_insert() {
        let mut dir = RegionDirectory::from_pairs([("Moscow", 77)]);
        dir.insert("Tver", RegionId(69));
        assert_eq!(dir.resolve(" Tver "), Some(RegionId(69)));
        assert!(!dir.is_empty());
        assert!(RegionDirectory::new().is_empty());
    }
}
