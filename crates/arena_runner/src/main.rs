//! Robot arena console runner.
//!
//! # Usage
//!
//! ```bash
//! # Default match: 5x8 arena, built-in roster, random seed
//! cargo run -p arena_runner
//!
//! # Reproducible match on a bigger arena
//! cargo run -p arena_runner -- --seed 42 --rows 10 --cols 12
//!
//! # Pick the roster and only print the result as JSON
//! cargo run -p arena_runner -- --robot Robot_FireBoi --robot Robot_Ratboy --json
//!
//! # Load settings from a RON file
//! cargo run -p arena_runner -- --config match.ron
//! ```
//!
//! The board goes to stdout, logs go to stderr.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use arena_core::config::ArenaConfig;
use arena_runner::{report_json, run_match, Verbosity};

#[derive(Parser)]
#[command(name = "arena")]
#[command(about = "Turn-based robot arena combat")]
#[command(version)]
struct Cli {
    /// RON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed (drawn from entropy when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Arena rows
    #[arg(long)]
    rows: Option<i32>,

    /// Arena columns
    #[arg(long)]
    cols: Option<i32>,

    /// Strategy module to load, in turn order (repeatable)
    #[arg(short, long = "robot")]
    robots: Vec<String>,

    /// Only print the result
    #[arg(short, long)]
    quiet: bool,

    /// Print the final match report as JSON instead of the board
    #[arg(long)]
    json: bool,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn arena_config(&self) -> arena_core::error::Result<ArenaConfig> {
        let mut config = match &self.config {
            Some(path) => ArenaConfig::load(path)?,
            None => ArenaConfig::default(),
        };
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if self.rows.is_some() || self.cols.is_some() {
            let (rows, cols) = (config.rows, config.cols);
            config = config.with_size(self.rows.unwrap_or(rows), self.cols.unwrap_or(cols));
        }
        if !self.robots.is_empty() {
            config = config.with_roster(self.robots.iter().cloned());
        } else if config.roster.is_empty() {
            config = config.with_roster(arena_bots::DEFAULT_ROSTER);
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs to stderr, the board owns stdout
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    ExitCode::from(run(&cli))
}

/// Run one match and return the process exit status: 0 on success, 1 on any
/// config or match error.
fn run(cli: &Cli) -> u8 {
    let config = match cli.arena_config() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Invalid configuration");
            return 1;
        }
    };

    let registry = arena_bots::builtin_registry();
    let verbosity = if cli.quiet || cli.json {
        Verbosity::Quiet
    } else {
        Verbosity::EveryRound
    };

    let mut stdout = std::io::stdout().lock();
    let result = if cli.json {
        run_match(&config, &registry, verbosity, &mut std::io::sink())
            .and_then(|report| report_json(&report))
            .and_then(|json| Ok(writeln!(stdout, "{json}")?))
    } else {
        run_match(&config, &registry, verbosity, &mut stdout).map(|_| ())
    };

    match result {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!(error = %err, "Match failed");
            1
        }
    }
}
