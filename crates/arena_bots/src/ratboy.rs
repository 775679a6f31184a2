//! Robot_Ratboy: a railgun sniper that patrols a column.

use arena_core::grid::{Direction, GridPos};
use arena_core::robot::{Loadout, MoveRequest, RadarObj, Strategy, Weapon};

use crate::senses::Senses;

/// Registry name.
pub const NAME: &str = "Robot_Ratboy";

/// Railgun shots cover the whole target row, shooter included, so Ratboy
/// only fires at robots on other rows and slips out of any shared row.
#[derive(Debug)]
pub struct Ratboy {
    senses: Senses,
    sweep: i32,
    target: Option<GridPos>,
    dodge: bool,
    heading: Direction,
}

impl Default for Ratboy {
    fn default() -> Self {
        Self {
            senses: Senses::default(),
            sweep: 0,
            target: None,
            dodge: false,
            heading: Direction::North,
        }
    }
}

impl Ratboy {
    /// Create a fresh Ratboy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn at_edge(&self, heading: Direction) -> bool {
        match heading {
            Direction::North => self.senses.pos.row == 0,
            _ => self.senses.pos.row >= self.senses.last_row(),
        }
    }
}

impl Strategy for Ratboy {
    fn name(&self) -> &str {
        NAME
    }

    fn loadout(&self) -> Loadout {
        Loadout::new(Weapon::Railgun, 3, 3)
    }

    fn radar_direction(&mut self) -> i32 {
        self.sweep = self.sweep % 8 + 1;
        self.sweep
    }

    fn process_radar(&mut self, results: &[RadarObj]) {
        let me = self.senses.pos;
        let (same_row, other_rows): (Vec<GridPos>, Vec<GridPos>) = results
            .iter()
            .filter(|obj| obj.kind == 'R')
            .map(RadarObj::pos)
            .partition(|pos| pos.row == me.row);

        self.target = other_rows.into_iter().min_by_key(|pos| pos.manhattan(me));
        self.dodge = self.target.is_none() && !same_row.is_empty();
    }

    fn shot_location(&mut self) -> Option<GridPos> {
        self.target.take()
    }

    fn move_request(&mut self) -> MoveRequest {
        if self.senses.rows <= 1 {
            return MoveRequest::stay();
        }
        if self.at_edge(self.heading) {
            self.heading = match self.heading {
                Direction::North => Direction::South,
                _ => Direction::North,
            };
        }
        let distance = if self.dodge {
            self.dodge = false;
            1
        } else {
            self.loadout().move_speed
        };
        MoveRequest::new(self.heading.code(), distance)
    }

    fn on_enter_arena(&mut self, rows: i32, cols: i32) {
        self.senses.rows = rows;
        self.senses.cols = cols;
    }

    fn on_relocated(&mut self, pos: GridPos) {
        self.senses.pos = pos;
    }
}
