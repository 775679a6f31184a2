//! Plain-text rendering of the arena and match events.
//!
//! Everything renders to a `String` so the output can be tested and
//! written wherever the caller wants.

use std::fmt::Write;

use arena_core::battle::{Battle, Outcome, RoundSummary, TurnAction, TurnReport};
use arena_core::combat::ShotVerdict;
use arena_core::grid::{Cell, GridPos};
use arena_core::movement::StopReason;
use arena_core::robot::{AgentId, INITIAL_HEALTH};

/// Legend printed above every board.
pub const LEGEND: &str = "Legend:\n\
    .: Empty  F: Flamethrower  P: Pit  M: Mound  R: Robot  X: Destroyed Robot\n";

/// The bordered board with row and column headers.
#[must_use]
pub fn render_grid(battle: &Battle) -> String {
    let grid = battle.grid();
    let mut out = String::from("    ");
    for c in 0..grid.cols() {
        let _ = write!(out, "{c:<3}");
    }
    let border = format!("   +{}+\n", "-".repeat(grid.cols() as usize * 3 + 1));
    out.push('\n');
    out.push_str(&border);

    for r in 0..grid.rows() {
        let _ = write!(out, "{r:>2} | ");
        for c in 0..grid.cols() {
            let cell = grid.cell_at(GridPos::new(r, c)).unwrap_or_default();
            out.push_str(&cell_text(battle, cell));
        }
        out.push_str("|\n");
    }
    out.push_str(&border);
    out
}

fn cell_text(battle: &Battle, cell: Cell) -> String {
    match cell {
        Cell::Empty => ".  ".to_string(),
        Cell::Obstacle(kind) => format!("{}  ", kind.glyph()),
        Cell::Occupied(id) => match battle.agent(id) {
            Some(agent) => format!("R{} ", agent.glyph()),
            None => ".  ".to_string(),
        },
        Cell::Destroyed(glyph) => format!("X{glyph} "),
    }
}

/// One line per robot still standing.
#[must_use]
pub fn render_status(battle: &Battle) -> String {
    let mut out = String::new();
    for agent in battle.roster() {
        let _ = write!(
            out,
            "R{} {:<16} {:>3}/{INITIAL_HEALTH}  armor {}  at {}",
            agent.glyph(),
            agent.name(),
            agent.health(),
            agent.armor(),
            agent.position()
        );
        if agent.is_trapped() {
            out.push_str("  [trapped]");
        }
        out.push('\n');
    }
    out
}

/// Legend, board and status block.
#[must_use]
pub fn render_board(battle: &Battle) -> String {
    format!("{LEGEND}\n{}\n{}", render_grid(battle), render_status(battle))
}

fn agent_name(battle: &Battle, id: AgentId) -> String {
    battle
        .agent(id)
        .map(|agent| agent.name().to_string())
        .or_else(|| {
            battle
                .casualties()
                .iter()
                .find(|dead| dead.id == id)
                .map(|dead| dead.name.clone())
        })
        .unwrap_or_else(|| id.to_string())
}

/// Describe a single turn.
#[must_use]
pub fn render_turn(battle: &Battle, turn: &TurnReport) -> String {
    let name = agent_name(battle, turn.agent);
    let seen = turn.detections.iter().filter(|obj| obj.kind != '.').count();
    let mut out = format!("{name}'s turn: radar {} ({seen} contacts). ", turn.radar_direction);

    match &turn.action {
        TurnAction::Shot(shot) => match shot.verdict {
            ShotVerdict::Resolved => {
                let _ = write!(out, "Shoots at {} with {:?}", shot.target, shot.weapon);
                for hit in &shot.hits {
                    let _ = write!(
                        out,
                        "; hit {} for {}",
                        agent_name(battle, hit.victim),
                        hit.damage
                    );
                    if hit.killed {
                        out.push_str(" (destroyed)");
                    }
                }
            }
            ShotVerdict::OwnCell => out.push_str("Shot at its own cell, wasted"),
            ShotVerdict::OutOfBounds => {
                let _ = write!(out, "Shot at {} is outside the arena, wasted", shot.target);
            }
            ShotVerdict::OutOfReach => {
                let _ = write!(out, "Hammer cannot reach {}, wasted", shot.target);
            }
        },
        TurnAction::Move(step) => match step.reason {
            StopReason::Trapped => out.push_str("Trapped in a pit and cannot move"),
            StopReason::Stayed | StopReason::InvalidDirection => out.push_str("Stays put"),
            StopReason::FellInPit => {
                let _ = write!(out, "Moves to {} and falls into a pit", step.to);
            }
            StopReason::Destroyed => {
                let _ = write!(out, "Burns to death at {}", step.to);
            }
            _ => {
                let _ = write!(out, "Moves to {}", step.to);
                if step.burn_damage > 0 {
                    let _ = write!(out, " (burned for {})", step.burn_damage);
                }
            }
        },
    }
    out.push('\n');
    out
}

/// Round banner, every turn, deaths and the board afterwards.
#[must_use]
pub fn render_round(battle: &Battle, summary: &RoundSummary) -> String {
    let mut out = format!("\n=========== Round {} ===========\n", summary.round);
    for turn in &summary.turns {
        out.push_str(&render_turn(battle, turn));
    }
    for id in &summary.deaths {
        let _ = writeln!(out, "{} got absolutely destroyed!", agent_name(battle, *id));
    }
    out.push('\n');
    out.push_str(&render_board(battle));
    out
}

/// Game-over banner.
#[must_use]
pub fn render_outcome(outcome: Option<&Outcome>) -> String {
    let verdict = outcome.map_or_else(|| "Match unfinished.".to_string(), ToString::to_string);
    format!("\n=========== Game Over ===========\n{verdict}\n")
}
