//! # numplan io
//!
//! The collaborators around a routing build: where reference rows come
//! from, how region names resolve, and where the routing table goes.
//!
//! ## Design Principles
//!
//! - Sources are untrusted until they pass the [`ContentScanner`]
//! - Sinks receive the finished, prefix-sorted table in one call
//! - Files are replaced atomically
//!
//! ## Example
//!
//! ```rust
//! use numplan_core::{NumberLayout, RoutingPlanner};
//! use numplan_io::{run_build, BuildScope, DelimitedRowSource, MemorySink, RegionDirectory};
//! use std::io::Cursor;
//!
//! let table = "def;from;to;capacity;operator;region\n901;5000000;5000009;10;MTS;Tver\n";
//! let mut source = DelimitedRowSource::from_reader(Cursor::new(table), NumberLayout::default());
//! let regions = RegionDirectory::from_pairs([("Tver", 69)]);
//! let mut sink = MemorySink::new();
//!
//! let plan = run_build(&mut source, &RoutingPlanner::default(), &regions, BuildScope::Full, &mut sink)
//!     .unwrap();
//! assert_eq!(sink.entries()[0].prefix, "901500000");
//! assert!(plan.report.is_clean());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod changelog;
mod delimited;
mod error;
mod pipeline;
mod regions;
mod scan;
mod sink;
mod source;

pub use changelog::{ChangeLogTemplate, CHANGELOG_COLUMNS};
pub use delimited::{escape_field, join_record, split_record};
pub use error::{IoError, IoResult};
pub use pipeline::{run_build, BuildScope};
pub use regions::RegionDirectory;
pub use scan::{ContentScanner, ScanFinding, DEFAULT_BLOCKLIST};
pub use sink::{
    write_changelog, write_snapshot, ChangeLogFileSink, MemorySink, RoutingSink, SnapshotFileSink,
    SNAPSHOT_COLUMNS,
};
pub use source::{DelimitedRowSource, LoadedRows, MemoryRowSource, RowSource, MIN_COLUMNS};
