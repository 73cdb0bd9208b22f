//! Loupe CLI: inspect and edit combinational coverage snapshots.
//!
//! Provides `loupe report` for per-scope summaries and missing-point detail,
//! and `loupe exclude` for toggling exclusions in a saved snapshot.

#![warn(missing_docs)]

mod exclude;
mod report;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use loupe_config::LoupeConfig;

/// Loupe: combinational logic coverage inspection.
#[derive(Parser, Debug)]
#[command(name = "loupe", version, about = "Loupe coverage inspector")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (info-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `loupe.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a snapshot and print per-scope coverage.
    Report(ReportArgs),
    /// Exclude or include an expression and save the snapshot.
    Exclude(ExcludeArgs),
}

/// Arguments for the `loupe report` subcommand.
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Snapshot file written by the coverage database.
    pub snapshot: PathBuf,

    /// List the missing coverage points of every uncovered expression.
    #[arg(long)]
    pub detail: bool,

    /// Only report the named scope.
    #[arg(long)]
    pub scope: Option<String>,
}

/// Arguments for the `loupe exclude` subcommand.
#[derive(Parser, Debug)]
pub struct ExcludeArgs {
    /// Snapshot file to edit in place.
    pub snapshot: PathBuf,

    /// Scope containing the expression.
    #[arg(long)]
    pub scope: String,

    /// Expression id, with or without its `e` prefix.
    #[arg(long, value_parser = exclude::parse_expr_id)]
    pub expr: u32,

    /// Target the sub-expression carrying this underline id instead.
    #[arg(long, conflicts_with = "line")]
    pub underline: Option<u32>,

    /// Remove the exclusion instead of setting it.
    #[arg(long)]
    pub include: bool,

    /// Also exclude the statement's line when `--expr` is a statement root.
    #[arg(long)]
    pub line: bool,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Loads the configuration: `--config` if given, else `./loupe.toml`
    /// if present, else defaults.
    pub fn load_config(&self) -> Result<LoupeConfig, loupe_config::ConfigError> {
        match &self.config {
            Some(path) => loupe_config::load_config(path),
            None => {
                let local = Path::new(loupe_config::CONFIG_FILE_NAME);
                if local.is_file() {
                    loupe_config::load_config(local)
                } else {
                    Ok(LoupeConfig::default())
                }
            }
        }
    }
}

fn init_logging(global: &GlobalArgs) {
    let level = if global.quiet {
        simplelog::LevelFilter::Off
    } else if global.verbose {
        simplelog::LevelFilter::Info
    } else {
        simplelog::LevelFilter::Warn
    };
    // A logger may already be installed when embedded; keep the existing one.
    let _ = simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Report(ref args) => report::run(args, &global),
        Command::Exclude(ref args) => exclude::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
