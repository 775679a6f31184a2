//! Self-knowledge shared by the built-in bots.
//!
//! Strategies never see the grid. Everything a bot knows about where it is
//! comes from engine notifications, collected here.

use arena_core::grid::{Direction, GridPos};

/// Arena size and own position, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Senses {
    /// Arena height.
    pub rows: i32,
    /// Arena width.
    pub cols: i32,
    /// Last reported position.
    pub pos: GridPos,
}

impl Default for Senses {
    fn default() -> Self {
        Self {
            rows: 0,
            cols: 0,
            pos: GridPos::new(0, 0),
        }
    }
}

impl Senses {
    /// Highest row index.
    #[must_use]
    pub const fn last_row(&self) -> i32 {
        self.rows - 1
    }

    /// Highest column index.
    #[must_use]
    pub const fn last_col(&self) -> i32 {
        self.cols - 1
    }

    /// Check if a cell is inside the arena.
    #[must_use]
    pub const fn in_bounds(&self, pos: GridPos) -> bool {
        pos.row >= 0 && pos.row < self.rows && pos.col >= 0 && pos.col < self.cols
    }

    /// Compass direction of the first step from here toward `target`.
    #[must_use]
    pub fn direction_toward(&self, target: GridPos) -> Option<Direction> {
        let step = (
            (target.row - self.pos.row).signum(),
            (target.col - self.pos.col).signum(),
        );
        Direction::ALL.into_iter().find(|dir| dir.delta() == step)
    }

    /// Compass direction of the first step from here away from `threat`.
    #[must_use]
    pub fn direction_away(&self, threat: GridPos) -> Option<Direction> {
        let step = (
            (self.pos.row - threat.row).signum(),
            (self.pos.col - threat.col).signum(),
        );
        Direction::ALL.into_iter().find(|dir| dir.delta() == step)
    }
}
