//! Directional radar ray-casting.
//!
//! A cast walks cell-by-cell from the caster along one compass vector and
//! reports every cell it crosses. Robots, wrecks and mounds stop the ray
//! after being reported; empty cells, flamethrowers and pits let it through.
//!
//! In [`RadarMode::Toroidal`] (the default) a ray that leaves one edge
//! re-enters from the opposite edge, so only a blocking cell can end it.
//! Two guards keep every cast finite: the ray stops when it wraps back onto
//! its own origin (a robot never detects itself), and it never takes more
//! than `rows * cols` steps.
//!
//! The caster's own cell is never part of a cast. A ray that wraps all the
//! way around ends silently on the step before the origin instead of
//! reporting the caster as a robot.

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use crate::grid::{Direction, GridPos, GridWorld};
use crate::robot::RadarObj;

/// What happens when a ray reaches the arena edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RadarMode {
    /// Wrap around to the opposite edge.
    #[default]
    Toroidal,
    /// Stop at the edge.
    Bounded,
}

/// A lazy radar sweep. Cheap to clone; a clone restarts from where the
/// original was when cloned.
#[derive(Debug, Clone)]
pub struct RadarCast<'a> {
    grid: &'a GridWorld,
    origin: GridPos,
    current: GridPos,
    direction: Option<Direction>,
    wrap: bool,
    steps_left: usize,
}

impl<'a> RadarCast<'a> {
    /// Start a cast from `origin` using a raw 1-8 direction code.
    ///
    /// An invalid code produces an empty cast.
    #[must_use]
    pub fn new(grid: &'a GridWorld, origin: GridPos, direction: i32, mode: RadarMode) -> Self {
        Self {
            grid,
            origin,
            current: origin,
            direction: Direction::from_code(direction),
            wrap: mode == RadarMode::Toroidal,
            steps_left: grid.area(),
        }
    }

    fn finish(&mut self) {
        self.direction = None;
    }
}

impl Iterator for RadarCast<'_> {
    type Item = RadarObj;

    fn next(&mut self) -> Option<Self::Item> {
        let dir = self.direction?;
        if self.steps_left == 0 {
            self.finish();
            return None;
        }
        self.steps_left -= 1;

        let Some(next) = self.grid.neighbor(self.current, dir, self.wrap) else {
            self.finish();
            return None;
        };
        if next == self.origin {
            self.finish();
            return None;
        }
        let Some(cell) = self.grid.cell_at(next) else {
            self.finish();
            return None;
        };

        self.current = next;
        if cell.blocks_radar() {
            self.finish();
        }
        Some(RadarObj::new(cell.radar_glyph(), next.row, next.col))
    }
}

impl FusedIterator for RadarCast<'_> {}

/// Cast a radar ray. See the module docs for termination rules.
#[must_use]
pub fn cast(grid: &GridWorld, origin: GridPos, direction: i32, mode: RadarMode) -> RadarCast<'_> {
    RadarCast::new(grid, origin, direction, mode)
}
