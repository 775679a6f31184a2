//! # Arena Runner
//!
//! Loads a roster into an arena, plays the match and writes what happened.
//!
//! The `arena` binary is a thin clap wrapper around [`run_match`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod render;

use std::io::Write;

use arena_core::battle::{Battle, MatchReport};
use arena_core::config::ArenaConfig;
use arena_core::error::ArenaError;
use arena_core::registry::StrategyRegistry;
use thiserror::Error;

/// Errors that stop a match from being run.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The arena could not be built from the config.
    #[error(transparent)]
    Arena(#[from] ArenaError),
    /// Writing match output failed.
    #[error("Failed to write match output: {0}")]
    Output(#[from] std::io::Error),
    /// Report serialization failed.
    #[error("Failed to serialize match report: {0}")]
    Report(#[from] serde_json::Error),
}

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;

/// How much to write while the match runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Board before the first round, every round, and the result.
    #[default]
    EveryRound,
    /// Only the result.
    Quiet,
}

/// Build the arena, load `config.roster` from `registry` and play to the end.
///
/// Robots that fail to load are skipped; the match goes ahead with the rest.
pub fn run_match<W: Write>(
    config: &ArenaConfig,
    registry: &StrategyRegistry,
    verbosity: Verbosity,
    out: &mut W,
) -> Result<MatchReport> {
    let mut battle = Battle::new(config.clone())?;
    let obstacles = battle.place_obstacles();
    tracing::info!(
        rows = config.rows,
        cols = config.cols,
        obstacles,
        seed = battle.seed(),
        "Arena ready"
    );

    let loaded = battle.load_roster(registry, &config.roster);
    if !loaded.failures.is_empty() {
        tracing::warn!(
            skipped = loaded.failures.len(),
            loaded = loaded.loaded.len(),
            "Some robots were not loaded"
        );
    }

    let mut write_error = None;
    if verbosity == Verbosity::EveryRound {
        write!(out, "{}", render::render_board(&battle))?;
    }

    let report = battle.run_with(|battle, summary| {
        if verbosity == Verbosity::Quiet || write_error.is_some() {
            return;
        }
        if let Err(err) = write!(out, "{}", render::render_round(battle, summary)) {
            write_error = Some(err);
        }
    });
    if let Some(err) = write_error {
        return Err(err.into());
    }

    write!(out, "{}", render::render_outcome(report.outcome.as_ref()))?;
    Ok(report)
}

/// Serialize a report as pretty JSON.
pub fn report_json(report: &MatchReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
