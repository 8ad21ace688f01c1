//! numplan CLI
//!
//! Command-line tools over a numbering-plan reference table.
//!
//! # Commands
//!
//! - `lookup` - Find the rows owning full numbers
//! - `compact` - Compact one range into routing prefixes
//! - `scan` - Check a reference table against the injection blocklist
//! - `build` - Build and publish a routing table
//! - `verify` - Check every row's compaction for exactness and uniqueness

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use commands::build::EmitKind;
use commands::Globals;
use numplan_core::NumberLayout;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

/// How results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Numbering-plan lookup and routing-table tools.
#[derive(Parser)]
#[command(name = "numplan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Digits in the prefix column
    #[arg(global = true, long, default_value = "3")]
    prefix_width: usize,

    /// Digits in a full number
    #[arg(global = true, long, default_value = "10")]
    number_width: usize,

    /// Output format
    #[arg(global = true, short, long, default_value = "text", value_enum)]
    format: OutputFormat,

    /// Also append logs to a dated `prfDDMMYYYY.log` file in this directory
    #[arg(global = true, long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the rows owning full numbers
    Lookup {
        /// Reference table (.csv)
        table: PathBuf,

        /// Full numbers to look up
        #[arg(required = true)]
        numbers: Vec<String>,
    },

    /// Compact one range into routing prefixes
    Compact {
        /// Prefix column value
        #[arg(long)]
        prefix: String,

        /// Lower tail bound
        #[arg(long)]
        low: String,

        /// Upper tail bound
        #[arg(long)]
        high: String,

        /// Declared capacity (defaults to the size of the range)
        #[arg(long)]
        capacity: Option<u64>,
    },

    /// Check a reference table against the injection blocklist
    Scan {
        /// Reference table (.csv)
        table: PathBuf,
    },

    /// Build and publish a routing table
    Build {
        /// Reference table (.csv)
        table: PathBuf,

        /// Region directory (`name;id` per line)
        #[arg(short, long)]
        regions: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Output kind
        #[arg(short, long, default_value = "snapshot", value_enum)]
        emit: EmitKind,

        /// Fail on the first capacity mismatch
        #[arg(long)]
        strict: bool,

        /// Worker threads for compaction
        #[arg(short, long, default_value = "1")]
        workers: usize,

        /// Only rebuild rows owning these full numbers
        #[arg(long, value_delimiter = ',')]
        numbers: Vec<String>,

        /// First change-log sequence id
        #[arg(long, default_value = "1")]
        first_id: u64,

        /// File of prefixes already published downstream, one per line
        #[arg(long)]
        existing: Option<PathBuf>,
    },

    /// Check every row's compaction for exactness and uniqueness
    Verify {
        /// Reference table (.csv)
        table: PathBuf,
    },

    /// Show version information
    Version,
}

/// Civil `(year, month, day)` of a day count since 1970-01-01.
fn civil_date(days: u64) -> (u64, u64, u64) {
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z % 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}

/// Name of the log file for a day count since 1970-01-01.
fn log_file_name(days: u64) -> String {
    let (year, month, day) = civil_date(days);
    format!("prf{day:02}{month:02}{year:04}.log")
}

fn init_logging(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    // --verbose wins; otherwise RUST_LOG, falling back to info.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    match &cli.log_dir {
        Some(dir) => {
            let log_file = open_log_file(dir)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(log_file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn open_log_file(dir: &Path) -> std::io::Result<fs::File> {
    fs::create_dir_all(dir)?;
    let days = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() / 86_400)
        .unwrap_or(0);
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(log_file_name(days)))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let globals = Globals {
        layout: NumberLayout::new(cli.prefix_width, cli.number_width)?,
        json: cli.format == OutputFormat::Json,
    };

    match cli.command {
        Commands::Lookup { table, numbers } => {
            commands::lookup::run(&globals, &table, &numbers)?;
        }
        Commands::Compact {
            prefix,
            low,
            high,
            capacity,
        } => {
            commands::compact::run(&globals, &prefix, &low, &high, capacity)?;
        }
        Commands::Scan { table } => {
            commands::scan::run(&globals, &table)?;
        }
        Commands::Build {
            table,
            regions,
            output,
            emit,
            strict,
            workers,
            numbers,
            first_id,
            existing,
        } => {
            let options = commands::build::BuildOptions {
                emit,
                strict,
                workers,
                numbers,
                first_id,
                existing,
            };
            commands::build::run(&globals, &table, &regions, &output, options)?;
        }
        Commands::Verify { table } => {
            commands::verify::run(&globals, &table)?;
        }
        Commands::Version => {
            println!("numplan CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("numplan core v{}", numplan_core::VERSION);
        }
    }

    Ok(())
}
