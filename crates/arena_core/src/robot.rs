//! Robots: the strategy capability contract and the host-side agent record.
//!
//! A strategy is an isolated trait object. It never sees the grid or another
//! robot; it only receives messages from the engine (radar feed, damage,
//! relocation) and answers with decisions (radar direction, shot, move).
//! The engine keeps the authoritative copy of every combat stat in
//! [`AgentHandle`].

use serde::{Deserialize, Serialize};

use crate::grid::GridPos;

/// Health every robot starts with.
pub const INITIAL_HEALTH: i32 = 100;

/// Display glyphs handed out in load order. One per robot.
pub const GLYPH_PALETTE: [char; 9] = ['^', '*', '#', '>', '&', '@', '%', '!', '+'];

/// Stable identifier of a robot for the lifetime of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Weapon a robot carries for the whole match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weapon {
    /// 5x5 area, 30-50 per cell.
    Flamethrower,
    /// Whole target row, 10-20 per cell.
    Railgun,
    /// Single adjacent cell, 50-60.
    Hammer,
    /// 3x3 area, 10-40 per cell.
    Grenade,
}

/// Stats a strategy picks for its robot at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    /// Weapon carried.
    pub weapon: Weapon,
    /// Starting armor. Only the first 4 points mitigate damage.
    pub armor: i32,
    /// Advertised cells per move.
    pub move_speed: i32,
}

impl Loadout {
    /// Create a loadout.
    #[must_use]
    pub const fn new(weapon: Weapon, armor: i32, move_speed: i32) -> Self {
        Self {
            weapon,
            armor,
            move_speed,
        }
    }
}

/// One radar detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RadarObj {
    /// `.` empty, `R` robot, `F` flamethrower, `P` pit, `M` mound, `X` wreck.
    pub kind: char,
    /// Row of the detected cell.
    pub row: i32,
    /// Column of the detected cell.
    pub col: i32,
}

impl RadarObj {
    /// Create a detection.
    #[must_use]
    pub const fn new(kind: char, row: i32, col: i32) -> Self {
        Self { kind, row, col }
    }

    /// Position of the detected cell.
    #[must_use]
    pub const fn pos(&self) -> GridPos {
        GridPos::new(self.row, self.col)
    }
}

/// A movement decision. Direction 0 means stay put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Raw direction code (1-8, or 0 to stay).
    pub direction: i32,
    /// Number of cells to try to move.
    pub distance: i32,
}

impl MoveRequest {
    /// Move `distance` cells in direction `direction`.
    #[must_use]
    pub const fn new(direction: i32, distance: i32) -> Self {
        Self {
            direction,
            distance,
        }
    }

    /// Do not move this turn.
    #[must_use]
    pub const fn stay() -> Self {
        Self::new(0, 0)
    }
}

/// Capability contract every robot brain implements.
///
/// Decision methods take no world input; a strategy decides from its own
/// state plus what it was told through the `on_*` notifications and
/// [`Strategy::process_radar`].
pub trait Strategy {
    /// Robot display name.
    fn name(&self) -> &str;

    /// Weapon, armor and speed. Queried once when the robot is loaded.
    fn loadout(&self) -> Loadout;

    /// Direction to sweep the radar this turn, 1-8 clockwise from north.
    fn radar_direction(&mut self) -> i32;

    /// Detections from this turn's cast, nearest first.
    fn process_radar(&mut self, results: &[RadarObj]);

    /// Cell to fire at, or `None` to skip shooting and move instead.
    fn shot_location(&mut self) -> Option<GridPos>;

    /// Where to move when not shooting.
    fn move_request(&mut self) -> MoveRequest;

    /// Arena dimensions, sent once before the first placement.
    fn on_enter_arena(&mut self, _rows: i32, _cols: i32) {}

    /// Damage just taken.
    fn on_damage(&mut self, _amount: i32) {}

    /// Armor just lost.
    fn on_armor_reduced(&mut self, _amount: i32) {}

    /// The engine moved this robot, by placement or by resolving its move.
    fn on_relocated(&mut self, _pos: GridPos) {}
}

/// Serializable snapshot of a robot's public stats.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentStatus {
    /// Roster identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Palette glyph.
    pub glyph: char,
    /// Current cell.
    pub position: GridPos,
    /// Remaining health, never below 0.
    pub health: i32,
    /// Remaining armor, never below 0.
    pub armor: i32,
    /// Weapon carried.
    pub weapon: Weapon,
    /// Advertised speed.
    pub move_speed: i32,
    /// Stuck in a pit.
    pub trapped: bool,
}

/// Host-side record of one robot. The engine's copy of every stat is
/// authoritative; the strategy only hears about changes.
pub struct AgentHandle {
    id: AgentId,
    name: String,
    glyph: char,
    position: GridPos,
    health: i32,
    armor: i32,
    weapon: Weapon,
    move_speed: i32,
    trapped: bool,
    strategy: Box<dyn Strategy>,
}

impl AgentHandle {
    /// Wrap a freshly created strategy. Position is set on placement.
    #[must_use]
    pub fn new(id: AgentId, glyph: char, strategy: Box<dyn Strategy>) -> Self {
        let loadout = strategy.loadout();
        Self {
            id,
            name: strategy.name().to_string(),
            glyph,
            position: GridPos::new(0, 0),
            health: INITIAL_HEALTH,
            armor: loadout.armor.max(0),
            weapon: loadout.weapon,
            move_speed: loadout.move_speed,
            trapped: false,
            strategy,
        }
    }

    /// Roster identifier.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Palette glyph.
    #[must_use]
    pub const fn glyph(&self) -> char {
        self.glyph
    }

    /// Current cell.
    #[must_use]
    pub const fn position(&self) -> GridPos {
        self.position
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Remaining armor.
    #[must_use]
    pub const fn armor(&self) -> i32 {
        self.armor
    }

    /// Weapon carried.
    #[must_use]
    pub const fn weapon(&self) -> Weapon {
        self.weapon
    }

    /// Advertised speed.
    #[must_use]
    pub const fn move_speed(&self) -> i32 {
        self.move_speed
    }

    /// Whether the robot is stuck in a pit.
    #[must_use]
    pub const fn is_trapped(&self) -> bool {
        self.trapped
    }

    /// Health above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Subtract health (floored at 0) and notify the strategy.
    pub fn take_damage(&mut self, amount: i32) {
        let amount = amount.max(0);
        self.health = (self.health - amount).max(0);
        self.strategy.on_damage(amount);
    }

    /// Subtract armor (floored at 0) and notify the strategy.
    pub fn reduce_armor(&mut self, amount: i32) {
        let amount = amount.max(0);
        self.armor = (self.armor - amount).max(0);
        self.strategy.on_armor_reduced(amount);
    }

    /// Record a new position and notify the strategy.
    pub fn relocate(&mut self, pos: GridPos) {
        self.position = pos;
        self.strategy.on_relocated(pos);
    }

    /// Mark the robot as stuck in a pit.
    pub fn trap(&mut self) {
        self.trapped = true;
    }

    /// Mutable access to the strategy for decision queries.
    pub fn strategy_mut(&mut self) -> &mut dyn Strategy {
        self.strategy.as_mut()
    }

    /// Public stats snapshot.
    #[must_use]
    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            id: self.id,
            name: self.name.clone(),
            glyph: self.glyph,
            position: self.position,
            health: self.health,
            armor: self.armor,
            weapon: self.weapon,
            move_speed: self.move_speed,
            trapped: self.trapped,
        }
    }
}

impl std::fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("glyph", &self.glyph)
            .field("position", &self.position)
            .field("health", &self.health)
            .field("armor", &self.armor)
            .field("weapon", &self.weapon)
            .field("trapped", &self.trapped)
            .finish_non_exhaustive()
    }
}
