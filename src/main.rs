//! filescope - directory inventory and file interest scoring.
//!
//! Usage:
//!   filescope inventory [PATH]            Inventory and score a directory
//!   filescope summary [PATH]              Per-owner and top-file summary
//!   filescope copy SRC DST                Copy one file
//!   filescope fresh DIR FILE -g G -t N    Check a file's modification date
//!   filescope --help                      Show help

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use serde_json::json;

use filescope::{
    CompositeMode, CopyOptions, CopyOutcome, DegeneratePolicy, DirectoryOverview, FileRecord,
    FileWalker, Inventory, InventoryConfig, NegativeAgePolicy, ScoreWeights, SortColumn,
    WalkProgress, copy_file, is_fresh, owner_summaries, top_n,
};

#[derive(Parser)]
#[command(
    name = "filescope",
    version,
    about = "Directory inventory with per-file ages and a composite interest score",
    long_about = "filescope lists every regular file below a directory with its size, \
                  owner and timestamps, and scores each file against the rest of the \
                  directory so large, long-untouched files rise to the top."
)]
struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Append log output to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inventory a directory and score every file
    Inventory {
        #[command(flatten)]
        run: RunArgs,

        /// Write the table as CSV to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of rows to show in text output
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Summarize a directory by owner and largest files
    Summary {
        #[command(flatten)]
        run: RunArgs,

        /// Number of files per top list
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Copy a single file, creating destination directories
    Copy {
        /// Source file
        source: PathBuf,

        /// Destination file
        destination: PathBuf,

        /// Check that the source is listed in its directory first
        #[arg(long)]
        validate: bool,
    },

    /// Check whether a file was modified at or after a date threshold
    Fresh {
        /// Directory holding the file
        dir: PathBuf,

        /// File name
        file: String,

        /// year, yearmonth or yearmonthday
        #[arg(short, long, default_value = "yearmonthday")]
        granularity: String,

        /// Threshold as YYYY, YYYYMM or YYYYMMDD
        #[arg(short, long)]
        threshold: u64,
    },
}

/// Options shared by the commands that run an inventory.
#[derive(Args)]
struct RunArgs {
    /// Directory to inventory (defaults to the config file's root, then ".")
    path: Option<PathBuf>,

    /// Load settings from a TOML file; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Column to sort by
    #[arg(short, long)]
    sort: Option<String>,

    /// Sort ascending (default is descending)
    #[arg(short, long)]
    ascending: bool,

    /// Weight of the size metric
    #[arg(long)]
    size_weight: Option<f64>,

    /// Weight of days since created
    #[arg(long)]
    created_weight: Option<f64>,

    /// Weight of days since accessed
    #[arg(long)]
    accessed_weight: Option<f64>,

    /// Weight of days since modified
    #[arg(long)]
    modified_weight: Option<f64>,

    /// pass-through or clamp-to-zero
    #[arg(long)]
    negative_ages: Option<NegativeAgePolicy>,

    /// zero or neutral
    #[arg(long)]
    degenerate: Option<DegeneratePolicy>,

    /// product or weighted-sum
    #[arg(long)]
    composite: Option<CompositeMode>,

    /// Follow symbolic links
    #[arg(long)]
    follow_symlinks: bool,

    /// Skip hidden files and directories
    #[arg(long)]
    no_hidden: bool,

    /// Maximum depth to descend
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Skip entries whose name matches this glob (repeatable)
    #[arg(short, long = "ignore")]
    ignore: Vec<String>,
}

impl RunArgs {
    /// Build the run configuration: config file first, then flags.
    fn into_config(self, output: Option<PathBuf>) -> Result<InventoryConfig> {
        let mut config = match &self.config {
            Some(path) => InventoryConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => InventoryConfig::default(),
        };

        if let Some(path) = self.path {
            config.root = path;
        }
        if let Some(name) = &self.sort {
            config.sort_column = SortColumn::parse(name)?;
        }
        if self.ascending {
            config.ascending = true;
        }

        let w = config.weights;
        config.weights = ScoreWeights::new(
            self.size_weight.unwrap_or(w.size),
            self.created_weight.unwrap_or(w.created),
            self.accessed_weight.unwrap_or(w.accessed),
            self.modified_weight.unwrap_or(w.modified),
        )?;

        if let Some(policy) = self.negative_ages {
            config.negative_ages = policy;
        }
        if let Some(policy) = self.degenerate {
            config.degenerate = policy;
        }
        if let Some(mode) = self.composite {
            config.composite = mode;
        }
        if self.follow_symlinks {
            config.follow_symlinks = true;
        }
        if self.no_hidden {
            config.include_hidden = false;
        }
        if self.max_depth.is_some() {
            config.max_depth = self.max_depth;
        }
        config.ignore_patterns.extend(self.ignore);
        if output.is_some() {
            config.output_path = output;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    filescope::logging::init(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Command::Inventory {
            run,
            output,
            top,
            format,
        } => {
            let config = run.into_config(output)?;
            run_inventory(&config, top, format)?;
        }
        Command::Summary { run, top, format } => {
            let mut config = run.into_config(None)?;
            // Summaries never write the table, even if the config file asks for it.
            config.output_path = None;
            run_summary(&config, top, format)?;
        }
        Command::Copy {
            source,
            destination,
            validate,
        } => {
            let options = CopyOptions {
                validate_presence: validate,
            };
            return Ok(match copy_file(&source, &destination, options) {
                CopyOutcome::Copied { bytes } => {
                    println!("Copied {} ({})", destination.display(), format_kb(bytes as f64 / 1000.0));
                    ExitCode::SUCCESS
                }
                CopyOutcome::Skipped(err) => {
                    eprintln!("Copy skipped: {err}");
                    ExitCode::FAILURE
                }
            });
        }
        Command::Fresh {
            dir,
            file,
            granularity,
            threshold,
        } => {
            let fresh = is_fresh(&dir, &file, &granularity, threshold);
            println!("{}", if fresh { "fresh" } else { "not fresh" });
            return Ok(if fresh {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Run the inventory, showing walk progress on an interactive stderr.
fn run_with_progress(config: &InventoryConfig) -> Result<Inventory> {
    eprintln!("Scanning {}...", config.root.display());

    let walker = FileWalker::new();
    let progress = std::io::stderr()
        .is_terminal()
        .then(|| spawn_progress(walker.subscribe()));

    let result = filescope::inventory_with(&walker, config);
    // Closing the channel ends the progress thread if the walk never started.
    drop(walker);
    if let Some(handle) = progress {
        let _ = handle.join();
    }

    result.context("Inventory failed")
}

fn spawn_progress(
    mut rx: tokio::sync::broadcast::Receiver<WalkProgress>,
) -> thread::JoinHandle<()> {
    use tokio::sync::broadcast::error::RecvError;

    thread::spawn(move || {
        loop {
            match rx.blocking_recv() {
                Ok(progress) => {
                    eprint!(
                        "\r {} files, {} ({:.0} files/s)   ",
                        progress.files_scanned,
                        format_bytes(progress.bytes_scanned),
                        progress.files_per_second()
                    );
                    if progress.finished {
                        eprintln!();
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Run an inventory and print the top rows.
fn run_inventory(config: &InventoryConfig, top: usize, format: OutputFormat) -> Result<()> {
    let inventory = run_with_progress(config)?;

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(90));
            println!(
                " {} - {} files, {}",
                inventory.root.display(),
                inventory.len(),
                format_bytes(inventory.stats.total_bytes)
            );
            println!(
                " Report instant {}, sorted by {} ({})",
                inventory.report_instant.format("%Y-%m-%d %H:%M:%S"),
                config.sort_column,
                if config.ascending { "ascending" } else { "descending" }
            );
            println!(" Scanned in {:.2}s", inventory.duration.as_secs_f64());
            println!("{}", "─".repeat(90));
            println!();

            if inventory.is_empty() {
                println!(" No files found.");
            } else {
                println!(
                    " {:>6} {:>10} {:>8} {:>8} {:<12} {}",
                    "SCORE", "SIZE", "MODIFIED", "ACCESSED", "OWNER", "PATH"
                );
                for record in inventory.records.iter().take(top) {
                    print_record(record);
                }
                let remaining = inventory.len().saturating_sub(top);
                if remaining > 0 {
                    println!("   ... and {} more", remaining);
                }
            }

            print_footer(&inventory);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&inventory)?);
        }
    }

    Ok(())
}

/// Run an inventory and print aggregates.
fn run_summary(config: &InventoryConfig, top: usize, format: OutputFormat) -> Result<()> {
    let inventory = run_with_progress(config)?;

    let overview = DirectoryOverview::from_records(&inventory.records);
    let owners = owner_summaries(&inventory.records);
    let largest = top_n(&inventory.records, SortColumn::SizeKb, top);
    let highest = top_n(&inventory.records, SortColumn::Score, top);

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(70));
            println!(" Directory Summary - {}", inventory.root.display());
            println!("{}", "─".repeat(70));
            println!();
            println!(
                " {} files, {} total, {} mean",
                overview.file_count,
                format_kb(overview.total_size_kb),
                format_kb(overview.mean_size_kb)
            );
            println!();

            if !owners.is_empty() {
                println!(" By owner:");
                for owner in &owners {
                    println!(
                        "   {:<16} {:>10} {:>7} files  created {:>7.1}d ago  accessed {:>7.1}d ago",
                        owner.owner,
                        format_kb(owner.total_size_kb),
                        owner.file_count,
                        owner.mean_days_since_created,
                        owner.mean_days_since_accessed
                    );
                }
                println!();

                println!(" Largest files:");
                for record in &largest {
                    println!("   {:>10}  {}", format_kb(record.size_kb), record.path().display());
                }
                println!();

                println!(" Highest scores:");
                for record in &highest {
                    println!(
                        "   {:>6.2}  {}",
                        record.score.unwrap_or(0.0),
                        record.path().display()
                    );
                }
            }

            print_footer(&inventory);
        }
        OutputFormat::Json => {
            let report = json!({
                "root": inventory.root,
                "report_instant": inventory.report_instant.format("%Y-%m-%d %H:%M:%S").to_string(),
                "overview": overview,
                "owners": owners,
                "largest": largest,
                "highest_scores": highest,
                "warnings": inventory.warnings.len(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn print_record(record: &FileRecord) {
    println!(
        " {:>6.2} {:>10} {:>7}d {:>7}d {:<12} {}",
        record.score.unwrap_or(0.0),
        format_kb(record.size_kb),
        record.days_since_modified,
        record.days_since_accessed,
        truncate(&record.owner, 12),
        record.path().display()
    );
}

fn print_footer(inventory: &Inventory) {
    if let Some(path) = &inventory.output_path {
        println!();
        println!(" Table written to {}", path.display());
    }
    if inventory.has_warnings() {
        println!();
        println!("{} warning(s) during inventory", inventory.warnings.len());
        if inventory.persistence_failed() {
            println!(" The table could not be written; see the log for details.");
        }
    }
}

/// Format a size in bytes.
fn format_bytes(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::DECIMAL)
}

/// Format a size given in kilobytes (1 KB = 1000 bytes).
fn format_kb(kb: f64) -> String {
    format_bytes((kb * 1000.0).round() as u64)
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{head}…")
    }
}
