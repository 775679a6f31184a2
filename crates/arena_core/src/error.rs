//! Error types for the arena simulation.

use thiserror::Error;

/// Result type alias using [`ArenaError`].
pub type Result<T> = std::result::Result<T, ArenaError>;

/// Top-level error type for arena setup and configuration.
///
/// Nothing that happens during a match is an error: illegal shots, blocked
/// moves and bad radar directions simply have no effect for that turn.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// Arena dimensions must both be positive and fit under the cell cap.
    #[error("Invalid arena dimensions: {rows}x{cols}")]
    InvalidDimensions {
        /// Requested row count.
        rows: i32,
        /// Requested column count.
        cols: i32,
    },

    /// No empty cell left to place a robot on.
    #[error("Arena is full: no empty cell left")]
    ArenaFull,

    /// Failed to read a configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead {
        /// Path to the file that failed to read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Configuration values are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Reasons a strategy module could not be turned into a robot.
///
/// Load failures are never fatal to a match; the robot is skipped and the
/// failure is reported through logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// No factory is registered under this name.
    #[error("Strategy module not found: {0}")]
    ModuleNotFound(String),

    /// The factory ran but produced no instance.
    #[error("Factory for '{0}' returned no strategy instance")]
    FactoryReturnedNothing(String),

    /// Every glyph in the palette is already taken.
    #[error("Cannot load '{name}': glyph palette exhausted ({capacity} robots max)")]
    PaletteExhausted {
        /// Module that was rejected.
        name: String,
        /// Palette size.
        capacity: usize,
    },

    /// The arena had no empty cell left for this robot.
    #[error("No room in the arena for '{0}'")]
    NoRoom(String),
}
