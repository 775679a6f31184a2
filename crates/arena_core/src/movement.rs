//! Step-wise movement with terrain effects and collision stops.
//!
//! A move is a sequence of single-cell steps. Each step looks at the next
//! cell and either enters it or ends the move:
//!
//! | Next cell | Effect |
//! |---|---|
//! | off the grid | stop, stay put |
//! | pit | enter, become trapped, stop |
//! | flamethrower | enter, take 30-50 damage, keep going |
//! | mound, wreck, robot | stop, stay put |
//! | empty | enter, keep going |
//!
//! Entering a cell vacates the previous one, so terrain a robot walks
//! through is consumed. Movement never wraps around the edges.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::{Cell, Direction, GridPos, GridWorld, ObstacleKind};
use crate::robot::{AgentHandle, AgentId, MoveRequest};

/// Lowest damage from walking through a flamethrower.
pub const FLAMETHROWER_TERRAIN_MIN: i32 = 30;
/// Highest damage from walking through a flamethrower.
pub const FLAMETHROWER_TERRAIN_MAX: i32 = 50;

/// Why a move ended where it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Every requested step was taken.
    Completed,
    /// Direction 0 or a non-positive distance.
    Stayed,
    /// Direction code outside 0-8.
    InvalidDirection,
    /// Already stuck in a pit; no step attempted.
    Trapped,
    /// Next step would leave the arena.
    OutOfBounds,
    /// Next cell is a mound, wreck or robot.
    Blocked,
    /// Walked into a pit.
    FellInPit,
    /// Burned to death crossing a flamethrower.
    Destroyed,
}

/// Outcome of one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReport {
    /// Robot that moved.
    pub agent: AgentId,
    /// Starting cell.
    pub from: GridPos,
    /// Final cell.
    pub to: GridPos,
    /// Cells actually entered.
    pub steps: i32,
    /// Why the move ended.
    pub reason: StopReason,
    /// Damage taken from flamethrower terrain on the way.
    pub burn_damage: i32,
}

/// Move `roster[mover]` according to `request`.
pub fn move_agent<R: Rng + ?Sized>(
    grid: &mut GridWorld,
    roster: &mut [AgentHandle],
    mover: usize,
    request: MoveRequest,
    rng: &mut R,
) -> MoveReport {
    let agent = &mut roster[mover];
    let from = agent.position();
    let mut report = MoveReport {
        agent: agent.id(),
        from,
        to: from,
        steps: 0,
        reason: StopReason::Completed,
        burn_damage: 0,
    };

    if agent.is_trapped() {
        tracing::debug!(robot = %agent.name(), "Trapped in a pit and cannot move");
        report.reason = StopReason::Trapped;
        return report;
    }
    if request.direction == 0 || request.distance <= 0 {
        report.reason = StopReason::Stayed;
        return report;
    }
    let Some(dir) = Direction::from_code(request.direction) else {
        tracing::warn!(
            robot = %agent.name(),
            direction = request.direction,
            "Invalid move direction"
        );
        report.reason = StopReason::InvalidDirection;
        return report;
    };

    let mut pos = from;
    for _ in 0..request.distance {
        let Some(next) = grid.neighbor(pos, dir, false) else {
            tracing::debug!(robot = %agent.name(), "Attempted to move out of bounds");
            report.reason = StopReason::OutOfBounds;
            break;
        };

        match grid.cell_at(next) {
            Some(Cell::Obstacle(ObstacleKind::Pit)) => {
                step(grid, agent.id(), &mut pos, next);
                report.steps += 1;
                agent.trap();
                tracing::info!(robot = %agent.name(), cell = %next, "Fell into a pit and is stuck");
                report.reason = StopReason::FellInPit;
                break;
            }
            Some(Cell::Obstacle(ObstacleKind::Flamethrower)) => {
                step(grid, agent.id(), &mut pos, next);
                report.steps += 1;
                let burn = rng.gen_range(FLAMETHROWER_TERRAIN_MIN..=FLAMETHROWER_TERRAIN_MAX);
                agent.take_damage(burn);
                report.burn_damage += burn;
                tracing::info!(
                    robot = %agent.name(),
                    damage = burn,
                    health = agent.health(),
                    "Took flamethrower damage"
                );
                if !agent.is_alive() {
                    grid.mark_destroyed(pos, agent.glyph());
                    report.reason = StopReason::Destroyed;
                    break;
                }
            }
            Some(Cell::Empty) => {
                step(grid, agent.id(), &mut pos, next);
                report.steps += 1;
            }
            blocker => {
                tracing::debug!(robot = %agent.name(), cell = %next, ?blocker, "Movement blocked");
                report.reason = StopReason::Blocked;
                break;
            }
        }
    }

    if pos != from {
        agent.relocate(pos);
    }
    report.to = pos;
    tracing::debug!(
        robot = %agent.name(),
        from = %from,
        to = %pos,
        steps = report.steps,
        reason = ?report.reason,
        "Moved"
    );
    report
}

fn step(grid: &mut GridWorld, id: AgentId, pos: &mut GridPos, next: GridPos) {
    grid.clear_cell(*pos);
    grid.occupy(next, id);
    *pos = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::robot::{Loadout, Weapon};
    use crate::test_support::idle_agent_with;

    fn setup(rows: i32, cols: i32, start: GridPos) -> (GridWorld, Vec<AgentHandle>) {
        let mut grid = GridWorld::new(rows, cols).unwrap();
        let mut agent = idle_agent_with(0, Loadout::new(Weapon::Hammer, 0, 5));
        grid.occupy(start, agent.id());
        agent.relocate(start);
        (grid, vec![agent])
    }

    #[test]
    fn test_full_move_on_open_ground() {
        let (mut grid, mut roster) = setup(5, 5, GridPos::new(4, 0));
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let report = move_agent(&mut grid, &mut roster, 0, MoveRequest::new(2, 3), &mut rng);

        assert_eq!(report.reason, StopReason::Completed);
        assert_eq!(report.to, GridPos::new(1, 3));
        assert_eq!(roster[0].position(), GridPos::new(1, 3));
        assert_eq!(grid.cell_at(GridPos::new(4, 0)), Some(Cell::Empty));
        assert_eq!(grid.cell_at(GridPos::new(1, 3)), Some(Cell::Occupied(AgentId(0))));
        assert_eq!(grid.count(|c| c.occupant().is_some()), 1);
    }

    #[test]
    fn test_edge_stops_without_wrapping() {
        let (mut grid, mut roster) = setup(5, 5, GridPos::new(0, 3));
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let report = move_agent(&mut grid, &mut roster, 0, MoveRequest::new(3, 4), &mut rng);

        assert_eq!(report.reason, StopReason::OutOfBounds);
        assert_eq!(report.to, GridPos::new(0, 4));
        assert_eq!(report.steps, 1);
    }

    #[test]
    fn test_pit_traps_and_ends_move() {
        let (mut grid, mut roster) = setup(5, 5, GridPos::new(2, 1));
        grid.set_cell(GridPos::new(2, 2), Cell::Obstacle(ObstacleKind::Pit));
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let report = move_agent(&mut grid, &mut roster, 0, MoveRequest::new(3, 2), &mut rng);
        assert_eq!(report.reason, StopReason::FellInPit);
        assert_eq!(report.steps, 1);
        assert_eq!(roster[0].position(), GridPos::new(2, 2));
        assert!(roster[0].is_trapped());

        let again = move_agent(&mut grid, &mut roster, 0, MoveRequest::new(3, 2), &mut rng);
        assert_eq!(again.reason, StopReason::Trapped);
        assert_eq!(roster[0].position(), GridPos::new(2, 2));
    }

    #[test]
    fn test_flamethrower_burns_and_continues() {
        let (mut grid, mut roster) = setup(1, 5, GridPos::new(0, 0));
        grid.set_cell(GridPos::new(0, 1), Cell::Obstacle(ObstacleKind::Flamethrower));
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let report = move_agent(&mut grid, &mut roster, 0, MoveRequest::new(3, 3), &mut rng);

        assert_eq!(report.reason, StopReason::Completed);
        assert_eq!(report.to, GridPos::new(0, 3));
        assert!((30..=50).contains(&report.burn_damage));
        assert_eq!(roster[0].health(), 100 - report.burn_damage);
        // Crossing consumes the hazard
        assert_eq!(grid.cell_at(GridPos::new(0, 1)), Some(Cell::Empty));
    }

    #[test]
    fn test_flamethrower_can_kill() {
        let (mut grid, mut roster) = setup(1, 5, GridPos::new(0, 0));
        grid.set_cell(GridPos::new(0, 1), Cell::Obstacle(ObstacleKind::Flamethrower));
        roster[0].take_damage(95);
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let report = move_agent(&mut grid, &mut roster, 0, MoveRequest::new(3, 3), &mut rng);

        assert_eq!(report.reason, StopReason::Destroyed);
        assert_eq!(report.to, GridPos::new(0, 1));
        assert_eq!(
            grid.cell_at(GridPos::new(0, 1)),
            Some(Cell::Destroyed(roster[0].glyph()))
        );
        assert_eq!(grid.cell_at(GridPos::new(0, 0)), Some(Cell::Empty));
    }

    #[test]
    fn test_blockers_stop_before_entering() {
        for blocker in [
            Cell::Obstacle(ObstacleKind::Mound),
            Cell::Destroyed('%'),
            Cell::Occupied(AgentId(7)),
        ] {
            let (mut grid, mut roster) = setup(5, 5, GridPos::new(4, 2));
            grid.set_cell(GridPos::new(2, 2), blocker);
            let mut rng = ChaCha8Rng::seed_from_u64(0);

            let report = move_agent(&mut grid, &mut roster, 0, MoveRequest::new(1, 4), &mut rng);

            assert_eq!(report.reason, StopReason::Blocked);
            assert_eq!(report.to, GridPos::new(3, 2));
            assert_eq!(grid.cell_at(GridPos::new(2, 2)), Some(blocker));
        }
    }

    #[test]
    fn test_stay_and_invalid_direction() {
        let (mut grid, mut roster) = setup(3, 3, GridPos::new(1, 1));
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let stay = move_agent(&mut grid, &mut roster, 0, MoveRequest::stay(), &mut rng);
        assert_eq!(stay.reason, StopReason::Stayed);
        let zero = move_agent(&mut grid, &mut roster, 0, MoveRequest::new(4, 0), &mut rng);
        assert_eq!(zero.reason, StopReason::Stayed);
        let bad = move_agent(&mut grid, &mut roster, 0, MoveRequest::new(12, 2), &mut rng);
        assert_eq!(bad.reason, StopReason::InvalidDirection);
        assert_eq!(roster[0].position(), GridPos::new(1, 1));
    }
}
