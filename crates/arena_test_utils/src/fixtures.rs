//! Test fixtures and helpers.
//!
//! Strategies with predictable behavior and arena layouts drawn as ASCII,
//! for consistent scenario tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use arena_core::battle::Battle;
use arena_core::config::ArenaConfig;
use arena_core::grid::{Cell, GridPos, GridWorld, ObstacleKind};
use arena_core::robot::{Loadout, MoveRequest, RadarObj, Strategy, Weapon};

/// One planned turn for a [`ScriptedStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedTurn {
    /// Fire at a cell.
    Shoot(GridPos),
    /// Move.
    Move(MoveRequest),
    /// Neither shoot nor move.
    Hold,
}

/// Everything the engine told a strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyLog {
    /// Dimensions received on entering the arena.
    pub arena: Option<(i32, i32)>,
    /// Radar results, one entry per turn.
    pub radar: Vec<Vec<RadarObj>>,
    /// Damage notifications.
    pub damage: Vec<i32>,
    /// Armor loss notifications.
    pub armor_lost: Vec<i32>,
    /// Positions reported by placement and moves.
    pub positions: Vec<GridPos>,
}

/// Shared handle to a strategy's log. Stays readable after the strategy
/// has been boxed and handed to a battle.
pub type SharedLog = Rc<RefCell<StrategyLog>>;

/// Plays back a fixed list of turns.
#[derive(Debug)]
pub struct ScriptedStrategy {
    name: String,
    loadout: Loadout,
    radar_direction: i32,
    turns: VecDeque<ScriptedTurn>,
    repeat: bool,
    log: SharedLog,
}

impl ScriptedStrategy {
    /// Create a script that holds position every turn.
    #[must_use]
    pub fn new(name: impl Into<String>, loadout: Loadout) -> Self {
        Self {
            name: name.into(),
            loadout,
            radar_direction: 1,
            turns: VecDeque::new(),
            repeat: false,
            log: SharedLog::default(),
        }
    }

    /// Set the turns to play, in order.
    #[must_use]
    pub fn with_turns(mut self, turns: impl IntoIterator<Item = ScriptedTurn>) -> Self {
        self.turns = turns.into_iter().collect();
        self
    }

    /// Set the radar direction used every turn.
    #[must_use]
    pub const fn with_radar(mut self, direction: i32) -> Self {
        self.radar_direction = direction;
        self
    }

    /// Start over when the script runs out instead of holding.
    #[must_use]
    pub const fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Handle to the notification log.
    #[must_use]
    pub fn log(&self) -> SharedLog {
        Rc::clone(&self.log)
    }

    fn next_turn(&mut self) -> ScriptedTurn {
        let Some(turn) = self.turns.pop_front() else {
            return ScriptedTurn::Hold;
        };
        if self.repeat {
            self.turns.push_back(turn);
        }
        turn
    }
}

impl Strategy for ScriptedStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn loadout(&self) -> Loadout {
        self.loadout
    }

    fn radar_direction(&mut self) -> i32 {
        self.radar_direction
    }

    fn process_radar(&mut self, results: &[RadarObj]) {
        self.log.borrow_mut().radar.push(results.to_vec());
    }

    fn shot_location(&mut self) -> Option<GridPos> {
        match self.turns.front() {
            Some(ScriptedTurn::Shoot(_)) => match self.next_turn() {
                ScriptedTurn::Shoot(target) => Some(target),
                _ => None,
            },
            _ => None,
        }
    }

    fn move_request(&mut self) -> MoveRequest {
        match self.next_turn() {
            ScriptedTurn::Move(request) => request,
            _ => MoveRequest::stay(),
        }
    }

    fn on_enter_arena(&mut self, rows: i32, cols: i32) {
        self.log.borrow_mut().arena = Some((rows, cols));
    }

    fn on_damage(&mut self, amount: i32) {
        self.log.borrow_mut().damage.push(amount);
    }

    fn on_armor_reduced(&mut self, amount: i32) {
        self.log.borrow_mut().armor_lost.push(amount);
    }

    fn on_relocated(&mut self, pos: GridPos) {
        self.log.borrow_mut().positions.push(pos);
    }
}

/// Sweeps the radar clockwise, fires at the first robot it sees and
/// otherwise steps one cell in its current radar direction.
#[derive(Debug, Clone)]
pub struct Hunter {
    loadout: Loadout,
    direction: i32,
    target: Option<GridPos>,
}

impl Hunter {
    /// Create a hunter with the given loadout.
    #[must_use]
    pub const fn new(loadout: Loadout) -> Self {
        Self {
            loadout,
            direction: 0,
            target: None,
        }
    }

    /// A hunter carrying `weapon`, 2 armor and speed 1.
    #[must_use]
    pub const fn armed(weapon: Weapon) -> Self {
        Self::new(Loadout::new(weapon, 2, 1))
    }
}

impl Strategy for Hunter {
    fn name(&self) -> &str {
        "Hunter"
    }

    fn loadout(&self) -> Loadout {
        self.loadout
    }

    fn radar_direction(&mut self) -> i32 {
        self.direction = self.direction % 8 + 1;
        self.direction
    }

    fn process_radar(&mut self, results: &[RadarObj]) {
        self.target = results.iter().find(|obj| obj.kind == 'R').map(RadarObj::pos);
    }

    fn shot_location(&mut self) -> Option<GridPos> {
        self.target.take()
    }

    fn move_request(&mut self) -> MoveRequest {
        MoveRequest::new(self.direction, 1)
    }
}

/// Build a grid from ASCII rows.
///
/// `.` empty, `F` flamethrower, `P` pit, `M` mound, `X` wreck.
///
/// # Panics
///
/// Panics on ragged rows, an empty layout or an unknown character.
#[must_use]
pub fn grid_from_layout(layout: &[&str]) -> GridWorld {
    let rows = layout.len() as i32;
    let cols = layout.first().map_or(0, |row| row.chars().count()) as i32;
    let mut grid = GridWorld::new(rows, cols).expect("layout must not be empty");

    for (r, line) in layout.iter().enumerate() {
        assert_eq!(line.chars().count() as i32, cols, "ragged layout row {r}");
        for (c, ch) in line.chars().enumerate() {
            let cell = match ch {
                '.' => Cell::Empty,
                'F' => Cell::Obstacle(ObstacleKind::Flamethrower),
                'P' => Cell::Obstacle(ObstacleKind::Pit),
                'M' => Cell::Obstacle(ObstacleKind::Mound),
                'X' => Cell::Destroyed('?'),
                other => panic!("unknown layout character {other:?}"),
            };
            grid.set_cell(GridPos::new(r as i32, c as i32), cell);
        }
    }
    grid
}

/// A seeded battle on a hand-drawn arena, with no robots yet.
///
/// # Panics
///
/// Panics if the layout or config is invalid.
#[must_use]
pub fn battle_on_layout(layout: &[&str], config: ArenaConfig) -> Battle {
    let config = if config.seed.is_none() {
        config.with_seed(0)
    } else {
        config
    };
    Battle::with_grid(config, grid_from_layout(layout)).expect("valid layout battle")
}
