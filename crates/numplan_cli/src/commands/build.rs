//! Build command implementation.

use super::{print_json, Globals};
use clap::ValueEnum;
use numplan_core::{Config, RoutingPlanner};
use numplan_io::{
    run_build, BuildScope, ChangeLogFileSink, ChangeLogTemplate, ContentScanner,
    DelimitedRowSource, RegionDirectory, RoutingSink, SnapshotFileSink,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What the build publishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum EmitKind {
    /// Full routing snapshot, one `prefix,region_id` line per entry.
    #[default]
    Snapshot,
    /// Change-log records for downstream import.
    Changelog,
}

/// Options of the build command beyond its paths.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Output kind.
    pub emit: EmitKind,
    /// Abort on the first capacity mismatch.
    pub strict: bool,
    /// Compaction worker threads.
    pub workers: usize,
    /// Restrict the build to rows owning these numbers.
    pub numbers: Vec<String>,
    /// First change-log sequence id.
    pub first_id: u64,
    /// File of prefixes already published downstream.
    pub existing: Option<PathBuf>,
}

fn read_existing(path: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect())
}

fn open_sink(
    output: &Path,
    options: &BuildOptions,
) -> Result<Box<dyn RoutingSink>, Box<dyn std::error::Error>> {
    match options.emit {
        EmitKind::Snapshot => Ok(Box::new(SnapshotFileSink::new(output))),
        EmitKind::Changelog => {
            let template = ChangeLogTemplate {
                first_sequence_id: options.first_id,
                ..ChangeLogTemplate::default()
            };
            template.validate()?;
            let mut sink = ChangeLogFileSink::new(output, template);
            if let Some(existing) = &options.existing {
                let prefixes = read_existing(existing)?;
                info!("Skipping {} prefixes already published", prefixes.len());
                sink = sink.skip_existing(prefixes);
            }
            Ok(Box::new(sink))
        }
    }
}

/// Runs the build command.
pub fn run(
    globals: &Globals,
    table: &Path,
    regions: &Path,
    output: &Path,
    options: BuildOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sink = open_sink(output, &options)?;
    let directory = RegionDirectory::load(regions)?;
    let mut source =
        DelimitedRowSource::open(table, globals.layout)?.with_scanner(ContentScanner::new()?);

    let config = Config::new()
        .layout(globals.layout)
        .strict(options.strict)
        .workers(options.workers);
    let planner = RoutingPlanner::new(config);
    let scope = if options.numbers.is_empty() {
        BuildScope::Full
    } else {
        BuildScope::Numbers(options.numbers)
    };

    let plan = run_build(&mut source, &planner, &directory, scope, sink.as_mut())?;
    if !plan.report.is_clean() {
        warn!("Build finished with {} findings", plan.report.finding_count());
    }

    if globals.json {
        return print_json(&plan.report);
    }
    println!("Built {:?} from {:?}", output, table);
    println!();
    print!("{}", plan.report);
    println!();
    if plan.report.is_clean() {
        println!("✓ Routing table published");
    } else {
        println!("! Routing table published with findings");
    }
    Ok(())
}
