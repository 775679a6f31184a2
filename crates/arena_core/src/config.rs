//! Match configuration.
//!
//! Configs are plain data and can be loaded from RON files:
//!
//! ```ron
//! ArenaConfig(
//!     rows: 10,
//!     cols: 12,
//!     seed: Some(42),
//!     roster: ["Robot_FireBoi", "Robot_Ratboy"],
//! )
//! ```
//!
//! Every field has a default, so a file only needs the ones it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, Result};
use crate::grid::checked_area;
use crate::radar::RadarMode;

/// Consecutive rounds without progress before a stagnation draw.
pub const DEFAULT_STAGNATION_LIMIT: u32 = 100;

/// Hard cap on rounds per match.
pub const DEFAULT_MAX_ROUNDS: u32 = 10_000;

/// Settings for one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Arena height in cells.
    pub rows: i32,
    /// Arena width in cells.
    pub cols: i32,
    /// Seed for obstacle placement, spawn points and damage rolls.
    /// `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Share of cells to try to fill with obstacles, in percent.
    pub obstacle_percent: u32,
    /// Rounds without progress before the match is drawn.
    pub stagnation_limit: u32,
    /// Rounds before the match is force-drawn.
    pub max_rounds: u32,
    /// Whether radar rays wrap around the arena edges.
    pub radar_mode: RadarMode,
    /// Strategy modules to load, in turn order.
    pub roster: Vec<String>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 8,
            seed: None,
            obstacle_percent: 10,
            stagnation_limit: DEFAULT_STAGNATION_LIMIT,
            max_rounds: DEFAULT_MAX_ROUNDS,
            radar_mode: RadarMode::Toroidal,
            roster: Vec::new(),
        }
    }
}

impl ArenaConfig {
    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ArenaError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }

    /// Parse a config from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: ArenaConfig = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the arena size.
    #[must_use]
    pub fn with_size(mut self, rows: i32, cols: i32) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set obstacle density in percent (capped at 100).
    #[must_use]
    pub fn with_obstacle_percent(mut self, percent: u32) -> Self {
        self.obstacle_percent = percent.min(100);
        self
    }

    /// Set the stagnation limit.
    #[must_use]
    pub const fn with_stagnation_limit(mut self, rounds: u32) -> Self {
        self.stagnation_limit = rounds;
        self
    }

    /// Set the round cap.
    #[must_use]
    pub const fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Set the radar edge behavior.
    #[must_use]
    pub const fn with_radar_mode(mut self, mode: RadarMode) -> Self {
        self.radar_mode = mode;
        self
    }

    /// Set the strategy modules to load.
    #[must_use]
    pub fn with_roster<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roster = names.into_iter().map(Into::into).collect();
        self
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if checked_area(self.rows, self.cols).is_none() {
            return Err(ArenaError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.obstacle_percent > 100 {
            return Err(ArenaError::InvalidConfig(format!(
                "obstacle_percent must be at most 100, got {}",
                self.obstacle_percent
            )));
        }
        if self.stagnation_limit == 0 {
            return Err(ArenaError::InvalidConfig(
                "stagnation_limit must be positive".to_string(),
            ));
        }
        if self.max_rounds == 0 {
            return Err(ArenaError::InvalidConfig(
                "max_rounds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
