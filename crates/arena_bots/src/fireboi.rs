//! Robot_FireBoi: a flamethrower that heads for the bottom-right corner and
//! burns whatever wanders close.

use std::collections::BTreeMap;

use arena_core::grid::{Direction, GridPos};
use arena_core::robot::{Loadout, MoveRequest, RadarObj, Strategy, Weapon};

use crate::senses::Senses;

/// Registry name.
pub const NAME: &str = "Robot_FireBoi";

/// Farthest target, in Manhattan distance, worth burning.
const MAX_RANGE: i32 = 4;

/// Walks down the left side, then along the bottom edge, and parks in the
/// corner sweeping its radar over the open field.
#[derive(Debug, Default)]
pub struct FireBoi {
    senses: Senses,
    facing: i32,
    target: Option<GridPos>,
    obstacles: BTreeMap<GridPos, char>,
}

impl FireBoi {
    /// Create a fresh FireBoi.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn in_corner(&self) -> bool {
        self.senses.pos.row == self.senses.last_row() && self.senses.pos.col == self.senses.last_col()
    }

    /// Next cell is a known pit or mound.
    fn avoid(&self, dir: Direction) -> bool {
        let (dr, dc) = dir.delta();
        let next = self.senses.pos.offset(dr, dc);
        matches!(self.obstacles.get(&next), Some('P' | 'M'))
    }
}

impl Strategy for FireBoi {
    fn name(&self) -> &str {
        NAME
    }

    fn loadout(&self) -> Loadout {
        Loadout::new(Weapon::Flamethrower, 5, 2)
    }

    fn radar_direction(&mut self) -> i32 {
        self.facing += 1;
        let swivel = self.facing % 3;
        if self.in_corner() {
            // West, northwest, north
            [7, 8, 1][swivel as usize]
        } else {
            // East, southeast, south
            swivel + 3
        }
    }

    fn process_radar(&mut self, results: &[RadarObj]) {
        self.target = None;
        let mut closest = i32::MAX;
        for obj in results {
            match obj.kind {
                'M' | 'P' | 'F' => {
                    self.obstacles.entry(obj.pos()).or_insert(obj.kind);
                }
                'R' => {
                    let distance = self.senses.pos.manhattan(obj.pos());
                    if distance <= MAX_RANGE && distance < closest {
                        closest = distance;
                        self.target = Some(obj.pos());
                    }
                }
                _ => {}
            }
        }
    }

    fn shot_location(&mut self) -> Option<GridPos> {
        self.target
    }

    fn move_request(&mut self) -> MoveRequest {
        let Senses { pos, .. } = self.senses;
        let speed = self.loadout().move_speed;

        if pos.row < self.senses.last_row() && !self.avoid(Direction::South) {
            MoveRequest::new(
                Direction::South.code(),
                speed.min(self.senses.last_row() - pos.row),
            )
        } else if pos.col < self.senses.last_col() && !self.avoid(Direction::East) {
            MoveRequest::new(
                Direction::East.code(),
                speed.min(self.senses.last_col() - pos.col),
            )
        } else {
            MoveRequest::stay()
        }
    }

    fn on_enter_arena(&mut self, rows: i32, cols: i32) {
        self.senses.rows = rows;
        self.senses.cols = cols;
    }

    fn on_relocated(&mut self, pos: GridPos) {
        self.senses.pos = pos;
    }
}
