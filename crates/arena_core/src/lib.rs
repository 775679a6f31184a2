//! # Arena Core
//!
//! Deterministic robot arena simulation.
//!
//! This crate contains the rules engine only:
//! - No rendering
//! - No CLI or terminal IO
//! - All randomness from one seeded generator per match
//!
//! Given the same config, seed and strategies, a match replays exactly.
//!
//! ## Crate Structure
//!
//! - [`grid`] - Arena cells, coordinates and compass directions
//! - [`robot`] - The `Strategy` contract and engine-side robot records
//! - [`radar`] - Directional ray-casting
//! - [`combat`] - Weapon footprints, damage rolls and armor mitigation
//! - [`movement`] - Step-wise movement and terrain effects
//! - [`registry`] - Named strategy factories
//! - [`battle`] - Round scheduler and win/draw detection
//! - [`config`] - Match settings, loadable from RON

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod battle;
pub mod combat;
pub mod config;
pub mod error;
pub mod grid;
pub mod movement;
pub mod radar;
pub mod registry;
pub mod robot;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle::{
        Battle, BattlePhase, Casualty, LoadReport, MatchReport, Outcome, RoundSummary,
        TurnAction, TurnReport,
    };
    pub use crate::combat::{ShotReport, ShotVerdict};
    pub use crate::config::ArenaConfig;
    pub use crate::error::{ArenaError, LoadError, Result};
    pub use crate::grid::{Cell, Direction, GridPos, GridWorld, ObstacleKind};
    pub use crate::movement::{MoveReport, StopReason};
    pub use crate::radar::RadarMode;
    pub use crate::registry::StrategyRegistry;
    pub use crate::robot::{
        AgentHandle, AgentId, AgentStatus, Loadout, MoveRequest, RadarObj, Strategy, Weapon,
    };
}

/// Minimal strategies for unit tests inside this crate.
#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;

    use crate::grid::GridPos;
    use crate::robot::{
        AgentHandle, AgentId, Loadout, MoveRequest, RadarObj, Strategy, Weapon, GLYPH_PALETTE,
    };

    /// Never shoots, never moves.
    pub struct Idle {
        loadout: Loadout,
    }

    impl Default for Idle {
        fn default() -> Self {
            Self {
                loadout: Loadout::new(Weapon::Hammer, 0, 1),
            }
        }
    }

    impl Strategy for Idle {
        fn name(&self) -> &str {
            "Idle"
        }

        fn loadout(&self) -> Loadout {
            self.loadout
        }

        fn radar_direction(&mut self) -> i32 {
            1
        }

        fn process_radar(&mut self, _results: &[RadarObj]) {}

        fn shot_location(&mut self) -> Option<GridPos> {
            None
        }

        fn move_request(&mut self) -> MoveRequest {
            MoveRequest::stay()
        }
    }

    /// Plays back fixed shots and moves, then idles (or starts over when
    /// looping).
    pub struct Scripted {
        loadout: Loadout,
        shots: VecDeque<GridPos>,
        moves: VecDeque<MoveRequest>,
        looping: bool,
    }

    impl Scripted {
        pub fn new(loadout: Loadout) -> Self {
            Self {
                loadout,
                shots: VecDeque::new(),
                moves: VecDeque::new(),
                looping: false,
            }
        }

        pub fn with_shots(mut self, shots: impl IntoIterator<Item = GridPos>) -> Self {
            self.shots = shots.into_iter().collect();
            self
        }

        pub fn with_moves(mut self, moves: impl IntoIterator<Item = MoveRequest>) -> Self {
            self.moves = moves.into_iter().collect();
            self
        }

        pub fn looping(mut self) -> Self {
            self.looping = true;
            self
        }
    }

    impl Strategy for Scripted {
        fn name(&self) -> &str {
            "Scripted"
        }

        fn loadout(&self) -> Loadout {
            self.loadout
        }

        fn radar_direction(&mut self) -> i32 {
            3
        }

        fn process_radar(&mut self, _results: &[RadarObj]) {}

        fn shot_location(&mut self) -> Option<GridPos> {
            let shot = self.shots.pop_front()?;
            if self.looping {
                self.shots.push_back(shot);
            }
            Some(shot)
        }

        fn move_request(&mut self) -> MoveRequest {
            let Some(request) = self.moves.pop_front() else {
                return MoveRequest::stay();
            };
            if self.looping {
                self.moves.push_back(request);
            }
            request
        }
    }

    pub fn idle_agent(id: u32) -> AgentHandle {
        idle_agent_with(id, Loadout::new(Weapon::Hammer, 0, 1))
    }

    pub fn idle_agent_with(id: u32, loadout: Loadout) -> AgentHandle {
        let glyph = GLYPH_PALETTE[id as usize % GLYPH_PALETTE.len()];
        AgentHandle::new(AgentId(id), glyph, Box::new(Idle { loadout }))
    }
}
