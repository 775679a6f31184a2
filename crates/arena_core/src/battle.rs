//! The round scheduler and its termination policy.
//!
//! A [`Battle`] owns the grid, the roster and the match's random generator.
//! Each round every living robot takes one full turn in load order:
//!
//! 1. sweep the radar and hand the detections to the strategy,
//! 2. fire if the strategy asks for a shot, otherwise
//! 3. move (trapped robots stay where they are).
//!
//! After all turns the battle checks whether anything happened (health or
//! position changed, or two robots got closer), removes the destroyed and
//! decides whether the match is over.
//!
//! # Determinism
//!
//! Turn order is fixed at load time and never re-sorted. All randomness
//! comes from one seeded [`ChaCha8Rng`], so two battles built from the same
//! config and strategies play out identically.
//!
//! # Example
//!
//! ```
//! use arena_core::battle::{Battle, Outcome};
//! use arena_core::config::ArenaConfig;
//!
//! let mut battle = Battle::new(ArenaConfig::default().with_seed(7)).unwrap();
//! battle.place_obstacles();
//!
//! // No robots loaded: nothing to fight over
//! let report = battle.run();
//! assert_eq!(report.outcome, Some(Outcome::NoContest));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{self, ShotReport};
use crate::config::ArenaConfig;
use crate::error::{LoadError, Result};
use crate::grid::{Cell, Direction, GridPos, GridWorld};
use crate::movement::{self, MoveReport};
use crate::radar;
use crate::registry::StrategyRegistry;
use crate::robot::{AgentHandle, AgentId, AgentStatus, RadarObj, Strategy, GLYPH_PALETTE};

/// Where the battle is in its round cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    /// Robots are taking turns (or about to).
    RoundActive,
    /// All turns done; progress, deaths and termination being evaluated.
    RoundResolution,
    /// The match has ended.
    GameOver,
}

/// How a match ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Exactly one robot left standing.
    Winner {
        /// Winning robot.
        id: AgentId,
        /// Its name.
        name: String,
    },
    /// The last robots were destroyed in the same round.
    DrawByElimination,
    /// Too many rounds without progress.
    DrawByStagnation,
    /// Round cap reached.
    DrawByRoundLimit,
    /// The match started with no robots.
    NoContest,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner { name, .. } => write!(f, "Winner: {name}!"),
            Outcome::DrawByElimination => write!(f, "Draw: no robot survived."),
            Outcome::DrawByStagnation => write!(f, "Draw due to stagnation."),
            Outcome::DrawByRoundLimit => write!(f, "Draw: round limit reached."),
            Outcome::NoContest => write!(f, "No contest: no robots entered."),
        }
    }
}

/// What a robot did with its turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnAction {
    /// It fired.
    Shot(ShotReport),
    /// It moved (or tried to).
    Move(MoveReport),
}

/// One robot's turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    /// Acting robot.
    pub agent: AgentId,
    /// Raw radar direction it chose.
    pub radar_direction: i32,
    /// What the radar reported.
    pub detections: Vec<RadarObj>,
    /// Shot or move.
    pub action: TurnAction,
}

/// Everything that happened in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// Zero-based index of the round.
    pub round: u32,
    /// Turns in the order they were taken.
    pub turns: Vec<TurnReport>,
    /// Robots removed by the end-of-round sweep.
    pub deaths: Vec<AgentId>,
    /// Whether the round counted as progress.
    pub progress: bool,
    /// Stagnation counter after this round.
    pub stagnation: u32,
}

/// A robot that was destroyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Casualty {
    /// Roster identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Wreck glyph.
    pub glyph: char,
    /// Round it was removed in.
    pub round: u32,
    /// Where it died.
    pub position: GridPos,
}

/// Final result of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    /// How it ended. `None` only if the match is still running.
    pub outcome: Option<Outcome>,
    /// Rounds played.
    pub rounds: u32,
    /// Stagnation counter at the end.
    pub stagnation: u32,
    /// Seed that reproduces this match.
    pub seed: u64,
    /// Robots still standing.
    pub survivors: Vec<AgentStatus>,
    /// Destroyed robots in removal order.
    pub casualties: Vec<Casualty>,
}

/// Result of loading a roster of strategy modules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Robots that entered the arena, in turn order.
    pub loaded: Vec<AgentId>,
    /// Modules that were skipped.
    pub failures: Vec<LoadError>,
}

/// A single match.
pub struct Battle {
    config: ArenaConfig,
    seed: u64,
    grid: GridWorld,
    roster: Vec<AgentHandle>,
    rng: ChaCha8Rng,
    round: u32,
    stagnation: u32,
    phase: BattlePhase,
    outcome: Option<Outcome>,
    casualties: Vec<Casualty>,
    next_id: u32,
}

impl Battle {
    /// Create a battle with an empty arena of the configured size.
    pub fn new(config: ArenaConfig) -> Result<Self> {
        config.validate()?;
        let grid = GridWorld::new(config.rows, config.cols)?;
        Ok(Self::from_parts(config, grid))
    }

    /// Create a battle on a prepared grid. The grid's size wins over the
    /// config's.
    pub fn with_grid(config: ArenaConfig, grid: GridWorld) -> Result<Self> {
        let config = config.with_size(grid.rows(), grid.cols());
        config.validate()?;
        Ok(Self::from_parts(config, grid))
    }

    fn from_parts(config: ArenaConfig, grid: GridWorld) -> Self {
        let seed = config.seed.unwrap_or_else(|| {
            let seed = rand::random();
            tracing::info!(seed, "No seed configured, drew one from entropy");
            seed
        });
        Self {
            config,
            seed,
            grid,
            roster: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            round: 0,
            stagnation: 0,
            phase: BattlePhase::RoundActive,
            outcome: None,
            casualties: Vec::new(),
            next_id: 0,
        }
    }

    /// Scatter obstacles using the configured density.
    pub fn place_obstacles(&mut self) -> usize {
        self.grid
            .place_obstacles(&mut self.rng, self.config.obstacle_percent)
    }

    /// Instantiate and place every named module, in order.
    ///
    /// Modules that fail to load are skipped and logged; the rest of the
    /// roster is unaffected.
    pub fn load_roster<S: AsRef<str>>(
        &mut self,
        registry: &StrategyRegistry,
        names: &[S],
    ) -> LoadReport {
        let mut report = LoadReport::default();
        for name in names {
            let name = name.as_ref();
            match registry
                .create(name)
                .and_then(|strategy| self.add_strategy(strategy))
            {
                Ok(id) => report.loaded.push(id),
                Err(err) => {
                    tracing::warn!(module = %name, error = %err, "Failed to load robot");
                    report.failures.push(err);
                }
            }
        }
        report
    }

    /// Add a robot on a random empty cell.
    pub fn add_strategy(&mut self, strategy: Box<dyn Strategy>) -> std::result::Result<AgentId, LoadError> {
        let mut agent = self.admit(strategy)?;
        if self.grid.place_agent(&mut agent, &mut self.rng).is_err() {
            return Err(LoadError::NoRoom(agent.name().to_string()));
        }
        Ok(self.enlist(agent))
    }

    /// Add a robot on a specific cell, which must be empty.
    pub fn add_strategy_at(
        &mut self,
        strategy: Box<dyn Strategy>,
        pos: GridPos,
    ) -> std::result::Result<AgentId, LoadError> {
        let mut agent = self.admit(strategy)?;
        if self.grid.cell_at(pos) != Some(Cell::Empty) {
            return Err(LoadError::NoRoom(agent.name().to_string()));
        }
        self.grid.occupy(pos, agent.id());
        agent.relocate(pos);
        Ok(self.enlist(agent))
    }

    fn admit(&mut self, mut strategy: Box<dyn Strategy>) -> std::result::Result<AgentHandle, LoadError> {
        let Some(&glyph) = GLYPH_PALETTE.get(self.next_id as usize) else {
            return Err(LoadError::PaletteExhausted {
                name: strategy.name().to_string(),
                capacity: GLYPH_PALETTE.len(),
            });
        };
        strategy.on_enter_arena(self.grid.rows(), self.grid.cols());
        Ok(AgentHandle::new(AgentId(self.next_id), glyph, strategy))
    }

    fn enlist(&mut self, agent: AgentHandle) -> AgentId {
        let id = agent.id();
        tracing::info!(
            robot = %agent.name(),
            glyph = %agent.glyph(),
            position = %agent.position(),
            weapon = ?agent.weapon(),
            "Loaded robot"
        );
        self.next_id += 1;
        self.roster.push(agent);
        id
    }

    /// The arena.
    #[must_use]
    pub fn grid(&self) -> &GridWorld {
        &self.grid
    }

    /// Robots still on the roster, in turn order.
    #[must_use]
    pub fn roster(&self) -> &[AgentHandle] {
        &self.roster
    }

    /// Look up a robot by id.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&AgentHandle> {
        self.roster.iter().find(|agent| agent.id() == id)
    }

    /// Configuration in effect.
    #[must_use]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Seed driving this match.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Rounds completed so far.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Consecutive rounds without progress.
    #[must_use]
    pub const fn stagnation(&self) -> u32 {
        self.stagnation
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Final outcome once the match is over.
    #[must_use]
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Destroyed robots so far.
    #[must_use]
    pub fn casualties(&self) -> &[Casualty] {
        &self.casualties
    }

    /// Play the match to the end.
    pub fn run(&mut self) -> MatchReport {
        self.run_with(|_, _| {})
    }

    /// Play the match to the end, calling `observer` after every round.
    pub fn run_with<F>(&mut self, mut observer: F) -> MatchReport
    where
        F: FnMut(&Battle, &RoundSummary),
    {
        if self.phase != BattlePhase::GameOver {
            if let Some(outcome) = self.evaluate() {
                self.finish(outcome);
            }
        }
        while self.phase != BattlePhase::GameOver {
            let summary = self.run_round();
            observer(self, &summary);
        }
        self.report()
    }

    /// Play exactly one round. Does nothing once the match is over.
    pub fn run_round(&mut self) -> RoundSummary {
        let round = self.round;
        if self.phase == BattlePhase::GameOver {
            return RoundSummary {
                round,
                turns: Vec::new(),
                deaths: Vec::new(),
                progress: false,
                stagnation: self.stagnation,
            };
        }

        self.phase = BattlePhase::RoundActive;
        tracing::info!(round, robots = self.roster.len(), "Round start");

        let snapshot: Vec<(AgentId, i32, GridPos)> = self
            .roster
            .iter()
            .filter(|agent| agent.is_alive())
            .map(|agent| (agent.id(), agent.health(), agent.position()))
            .collect();

        let mut turns = Vec::with_capacity(self.roster.len());
        for idx in 0..self.roster.len() {
            // Robots destroyed earlier this round do not act
            if self.roster[idx].is_alive() {
                turns.push(self.take_turn(idx));
            }
        }

        self.phase = BattlePhase::RoundResolution;
        let progress = self.detect_progress(&snapshot);
        let deaths = self.sweep(round);

        self.stagnation = if progress { 0 } else { self.stagnation + 1 };
        self.round += 1;

        match self.evaluate() {
            Some(outcome) => self.finish(outcome),
            None => self.phase = BattlePhase::RoundActive,
        }

        RoundSummary {
            round,
            turns,
            deaths,
            progress,
            stagnation: self.stagnation,
        }
    }

    fn take_turn(&mut self, idx: usize) -> TurnReport {
        let mode = self.config.radar_mode;
        let agent = &mut self.roster[idx];
        let id = agent.id();

        let radar_direction = agent.strategy_mut().radar_direction();
        if Direction::from_code(radar_direction).is_none() {
            tracing::warn!(robot = %agent.name(), radar_direction, "Invalid radar direction");
        }
        let detections: Vec<RadarObj> =
            radar::cast(&self.grid, agent.position(), radar_direction, mode).collect();
        let contacts: Vec<&RadarObj> = detections.iter().filter(|obj| obj.kind != '.').collect();
        tracing::debug!(robot = %agent.name(), radar_direction, ?contacts, "Radar sweep");
        agent.strategy_mut().process_radar(&detections);

        let shot = agent.strategy_mut().shot_location();
        let action = match shot {
            Some(target) => TurnAction::Shot(combat::resolve_shot(
                &mut self.grid,
                &mut self.roster,
                idx,
                target,
                &mut self.rng,
            )),
            None => {
                let request = agent.strategy_mut().move_request();
                TurnAction::Move(movement::move_agent(
                    &mut self.grid,
                    &mut self.roster,
                    idx,
                    request,
                    &mut self.rng,
                ))
            }
        };

        TurnReport {
            agent: id,
            radar_direction,
            detections,
            action,
        }
    }

    /// Progress means a health or position changed, or some pair of robots
    /// got closer (Manhattan distance), relative to the start of the round.
    fn detect_progress(&self, snapshot: &[(AgentId, i32, GridPos)]) -> bool {
        let current: Vec<Option<&AgentHandle>> =
            snapshot.iter().map(|(id, _, _)| self.agent(*id)).collect();

        let changed = snapshot.iter().zip(&current).any(|((_, health, pos), now)| {
            now.map_or(true, |agent| agent.health() != *health || agent.position() != *pos)
        });
        if changed {
            return true;
        }

        for i in 0..snapshot.len() {
            for j in (i + 1)..snapshot.len() {
                let (Some(a), Some(b)) = (current[i], current[j]) else {
                    continue;
                };
                let before = snapshot[i].2.manhattan(snapshot[j].2);
                if a.position().manhattan(b.position()) < before {
                    return true;
                }
            }
        }
        false
    }

    /// Drop every robot at zero health, leaving a wreck and releasing its
    /// strategy.
    fn sweep(&mut self, round: u32) -> Vec<AgentId> {
        let (alive, dead): (Vec<_>, Vec<_>) = std::mem::take(&mut self.roster)
            .into_iter()
            .partition(AgentHandle::is_alive);
        self.roster = alive;

        let mut removed = Vec::with_capacity(dead.len());
        for agent in dead {
            let pos = agent.position();
            if self.grid.cell_at(pos) == Some(Cell::Occupied(agent.id())) {
                self.grid.mark_destroyed(pos, agent.glyph());
            }
            tracing::info!(robot = %agent.name(), round, "Robot got absolutely destroyed");
            self.casualties.push(Casualty {
                id: agent.id(),
                name: agent.name().to_string(),
                glyph: agent.glyph(),
                round,
                position: pos,
            });
            removed.push(agent.id());
        }
        removed
    }

    fn evaluate(&self) -> Option<Outcome> {
        match self.roster.as_slice() {
            [winner] => {
                return Some(Outcome::Winner {
                    id: winner.id(),
                    name: winner.name().to_string(),
                })
            }
            [] if self.casualties.is_empty() => return Some(Outcome::NoContest),
            [] => return Some(Outcome::DrawByElimination),
            _ => {}
        }
        if self.stagnation >= self.config.stagnation_limit {
            return Some(Outcome::DrawByStagnation);
        }
        if self.round >= self.config.max_rounds {
            return Some(Outcome::DrawByRoundLimit);
        }
        None
    }

    fn finish(&mut self, outcome: Outcome) {
        tracing::info!(round = self.round, %outcome, "Game over");
        self.phase = BattlePhase::GameOver;
        self.outcome = Some(outcome);
    }

    /// Snapshot of the match result so far.
    #[must_use]
    pub fn report(&self) -> MatchReport {
        MatchReport {
            outcome: self.outcome.clone(),
            rounds: self.round,
            stagnation: self.stagnation,
            seed: self.seed,
            survivors: self.roster.iter().map(AgentHandle::status).collect(),
            casualties: self.casualties.clone(),
        }
    }

    /// Deterministic hash of the grid, roster and counters.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.grid.hash(&mut hasher);
        self.round.hash(&mut hasher);
        self.stagnation.hash(&mut hasher);
        for agent in &self.roster {
            agent.status().hash(&mut hasher);
        }
        hasher.finish()
    }
}

impl std::fmt::Debug for Battle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Battle")
            .field("seed", &self.seed)
            .field("round", &self.round)
            .field("stagnation", &self.stagnation)
            .field("phase", &self.phase)
            .field("roster", &self.roster)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::{Loadout, MoveRequest, Weapon};
    use crate::test_support::{Idle, Scripted};

    fn battle(rows: i32, cols: i32) -> Battle {
        Battle::new(ArenaConfig::default().with_size(rows, cols).with_seed(1)).unwrap()
    }

    #[test]
    fn test_empty_roster_is_no_contest() {
        let mut battle = battle(4, 4);
        let report = battle.run();
        assert_eq!(report.outcome, Some(Outcome::NoContest));
        assert_eq!(report.rounds, 0);
        assert_eq!(battle.phase(), BattlePhase::GameOver);
    }

    #[test]
    fn test_single_robot_wins_immediately() {
        let mut battle = battle(4, 4);
        let id = battle.add_strategy(Box::new(Idle::default())).unwrap();
        let report = battle.run();
        assert_eq!(
            report.outcome,
            Some(Outcome::Winner {
                id,
                name: "Idle".to_string()
            })
        );
        assert_eq!(report.rounds, 0);
    }

    #[test]
    fn test_idle_robots_stagnate() {
        let mut battle = Battle::new(
            ArenaConfig::default()
                .with_size(6, 6)
                .with_seed(3)
                .with_stagnation_limit(5),
        )
        .unwrap();
        battle.add_strategy(Box::new(Idle::default())).unwrap();
        battle.add_strategy(Box::new(Idle::default())).unwrap();

        let report = battle.run();
        assert_eq!(report.outcome, Some(Outcome::DrawByStagnation));
        assert_eq!(report.rounds, 5);
        assert_eq!(report.survivors.len(), 2);
    }

    #[test]
    fn test_round_cap_forces_draw() {
        // Two robots pacing back and forth always count as progress
        let mut battle = Battle::new(
            ArenaConfig::default()
                .with_size(6, 6)
                .with_seed(3)
                .with_max_rounds(12),
        )
        .unwrap();
        for pos in [GridPos::new(0, 0), GridPos::new(5, 5)] {
            let pacer = Scripted::new(Loadout::new(Weapon::Hammer, 0, 1))
                .with_moves([MoveRequest::new(3, 1), MoveRequest::new(7, 1)])
                .looping();
            battle.add_strategy_at(Box::new(pacer), pos).unwrap();
        }

        let report = battle.run();
        assert_eq!(report.outcome, Some(Outcome::DrawByRoundLimit));
        assert_eq!(report.rounds, 12);
    }

    #[test]
    fn test_moving_apart_counts_as_progress() {
        let mut battle = battle(4, 4);
        // West and east: the robots separate, which still changes positions
        let left = Scripted::new(Loadout::new(Weapon::Hammer, 0, 1))
            .with_moves([MoveRequest::new(7, 1)]);
        let right = Scripted::new(Loadout::new(Weapon::Hammer, 0, 1))
            .with_moves([MoveRequest::new(3, 1)]);
        battle.add_strategy_at(Box::new(left), GridPos::new(1, 1)).unwrap();
        battle.add_strategy_at(Box::new(right), GridPos::new(1, 2)).unwrap();

        let first = battle.run_round();
        assert!(first.progress);
        assert_eq!(first.stagnation, 0);

        // Scripts exhausted: nobody moves any more
        let second = battle.run_round();
        assert!(!second.progress);
        assert_eq!(second.stagnation, 1);
    }

    #[test]
    fn test_dead_robot_is_swept_and_leaves_wreck() {
        let mut battle = battle(5, 5);
        let hammer = Scripted::new(Loadout::new(Weapon::Hammer, 0, 1))
            .with_shots([GridPos::new(2, 3)])
            .looping();
        let target = Idle::default();
        let hitter = battle.add_strategy_at(Box::new(hammer), GridPos::new(2, 2)).unwrap();
        let victim = battle.add_strategy_at(Box::new(target), GridPos::new(2, 3)).unwrap();

        let report = battle.run();

        assert_eq!(
            report.outcome,
            Some(Outcome::Winner {
                id: hitter,
                name: "Scripted".to_string()
            })
        );
        assert_eq!(report.casualties.len(), 1);
        assert_eq!(report.casualties[0].id, victim);
        assert_eq!(
            battle.grid().cell_at(GridPos::new(2, 3)),
            Some(Cell::Destroyed(GLYPH_PALETTE[1]))
        );
        assert!(battle.agent(victim).is_none());
    }

    #[test]
    fn test_palette_limit() {
        let mut battle = battle(5, 5);
        for _ in 0..GLYPH_PALETTE.len() {
            battle.add_strategy(Box::new(Idle::default())).unwrap();
        }
        let err = battle.add_strategy(Box::new(Idle::default())).unwrap_err();
        assert!(matches!(err, LoadError::PaletteExhausted { capacity: 9, .. }));
        assert_eq!(battle.roster().len(), 9);
    }

    #[test]
    fn test_add_at_occupied_cell_fails() {
        let mut battle = battle(3, 3);
        battle
            .add_strategy_at(Box::new(Idle::default()), GridPos::new(1, 1))
            .unwrap();
        let err = battle
            .add_strategy_at(Box::new(Idle::default()), GridPos::new(1, 1))
            .unwrap_err();
        assert_eq!(err, LoadError::NoRoom("Idle".to_string()));
    }

    #[test]
    fn test_run_round_after_game_over_is_inert() {
        let mut battle = battle(3, 3);
        battle.run();
        let summary = battle.run_round();
        assert!(summary.turns.is_empty());
        assert_eq!(battle.round(), 0);
    }
}
