//! Robot_Flame_e_o: a flamethrower that stalks its prey and aims so the
//! blast never reaches itself.

use arena_core::combat::Footprint;
use arena_core::grid::{Direction, GridPos};
use arena_core::robot::{Loadout, MoveRequest, RadarObj, Strategy, Weapon};

use crate::senses::Senses;

/// Registry name.
pub const NAME: &str = "Robot_Flame_e_o";

const WANDER: [Direction; 4] = [
    Direction::East,
    Direction::South,
    Direction::West,
    Direction::North,
];

/// Sweeps the radar clockwise until it spots a robot, then keeps the radar
/// locked on that bearing. Fires at an offset cell when the prey is too
/// close for a centered blast.
#[derive(Debug, Default)]
pub struct FlameEO {
    senses: Senses,
    sweep: i32,
    locked: Option<i32>,
    prey: Option<GridPos>,
    wander_leg: usize,
}

impl FlameEO {
    /// Create a fresh Flame_e_o.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn blast_radius() -> i32 {
        match Weapon::Flamethrower.profile().footprint {
            Footprint::Square { radius } => radius,
            Footprint::Row | Footprint::Adjacent => 0,
        }
    }

    /// Closest cell to `prey` whose blast still covers it but not us.
    fn safe_aim(&self, prey: GridPos) -> Option<GridPos> {
        let radius = Self::blast_radius();
        let me = self.senses.pos;
        let (dr, dc) = (
            (prey.row - me.row).signum(),
            (prey.col - me.col).signum(),
        );
        (0..=radius)
            .map(|k| prey.offset(dr * k, dc * k))
            .find(|aim| self.senses.in_bounds(*aim) && aim.chebyshev(me) > radius)
    }
}

impl Strategy for FlameEO {
    fn name(&self) -> &str {
        NAME
    }

    fn loadout(&self) -> Loadout {
        Loadout::new(Weapon::Flamethrower, 4, 2)
    }

    fn radar_direction(&mut self) -> i32 {
        if let Some(bearing) = self.locked {
            return bearing;
        }
        self.sweep = self.sweep % 8 + 1;
        self.sweep
    }

    fn process_radar(&mut self, results: &[RadarObj]) {
        let me = self.senses.pos;
        self.prey = results
            .iter()
            .filter(|obj| obj.kind == 'R')
            .map(RadarObj::pos)
            .min_by_key(|pos| pos.chebyshev(me));

        let bearing = self.locked.unwrap_or(self.sweep);
        self.locked = self.prey.map(|_| bearing);
    }

    fn shot_location(&mut self) -> Option<GridPos> {
        self.prey.and_then(|prey| self.safe_aim(prey))
    }

    fn move_request(&mut self) -> MoveRequest {
        let speed = self.loadout().move_speed;
        if let Some(prey) = self.prey {
            // No safe aim: back off one cell and try again next turn
            return self
                .senses
                .direction_away(prey)
                .map_or_else(MoveRequest::stay, |dir| MoveRequest::new(dir.code(), 1));
        }

        let dir = WANDER[self.wander_leg % WANDER.len()];
        self.wander_leg += 1;
        MoveRequest::new(dir.code(), speed)
    }

    fn on_enter_arena(&mut self, rows: i32, cols: i32) {
        self.senses.rows = rows;
        self.senses.cols = cols;
    }

    fn on_relocated(&mut self, pos: GridPos) {
        self.senses.pos = pos;
    }
}
