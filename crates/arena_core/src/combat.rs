//! Weapon resolution with armor-based damage mitigation.
//!
//! Every weapon has an area-of-effect footprint centered on the target cell
//! and a base damage range. Each affected cell gets its own uniform roll.
//! Robots caught in the footprint lose `10%` of the rolled damage per point
//! of armor, capped at 4 points, then lose one point of armor.
//!
//! Mitigation is computed in integers so the result is exactly
//! `floor(base * (1 - 0.1 * min(armor, 4)))` on every platform.
//!
//! Shots never alter terrain: obstacles cannot be destroyed.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::{Cell, GridPos, GridWorld};
use crate::robot::{AgentHandle, AgentId, Weapon};

/// Armor points beyond this do not reduce damage.
pub const MAX_MITIGATING_ARMOR: i32 = 4;

/// Armor lost by a robot each time it is hit.
pub const ARMOR_LOSS_PER_HIT: i32 = 1;

/// Shape of the cells a weapon affects around its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Footprint {
    /// Square of side `2 * radius + 1` centered on the target.
    Square {
        /// Cells from center to edge.
        radius: i32,
    },
    /// Every column of the target row.
    Row,
    /// The target cell only, and only if adjacent to the shooter.
    Adjacent,
}

/// Footprint and damage range of a weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponProfile {
    /// Affected area.
    pub footprint: Footprint,
    /// Lowest base damage per cell (inclusive).
    pub min_damage: i32,
    /// Highest base damage per cell (inclusive).
    pub max_damage: i32,
}

impl Weapon {
    /// Balance table for this weapon.
    #[must_use]
    pub const fn profile(self) -> WeaponProfile {
        match self {
            Weapon::Flamethrower => WeaponProfile {
                footprint: Footprint::Square { radius: 2 },
                min_damage: 30,
                max_damage: 50,
            },
            Weapon::Railgun => WeaponProfile {
                footprint: Footprint::Row,
                min_damage: 10,
                max_damage: 20,
            },
            Weapon::Hammer => WeaponProfile {
                footprint: Footprint::Adjacent,
                min_damage: 50,
                max_damage: 60,
            },
            Weapon::Grenade => WeaponProfile {
                footprint: Footprint::Square { radius: 1 },
                min_damage: 10,
                max_damage: 40,
            },
        }
    }
}

/// Damage left after armor mitigation.
///
/// Armor below 0 counts as 0 and armor above [`MAX_MITIGATING_ARMOR`] counts
/// as the cap, so at least 60% of `base` always gets through.
#[must_use]
pub fn mitigated_damage(base: i32, armor: i32) -> i32 {
    let armor = armor.clamp(0, MAX_MITIGATING_ARMOR);
    base.max(0) * (10 - armor) / 10
}

/// In-bounds cells a weapon would affect, in row-major order.
///
/// Does not apply the hammer reach check.
#[must_use]
pub fn footprint_cells(grid: &GridWorld, weapon: Weapon, target: GridPos) -> Vec<GridPos> {
    let cells: Vec<GridPos> = match weapon.profile().footprint {
        Footprint::Square { radius } => (-radius..=radius)
            .flat_map(|dr| (-radius..=radius).map(move |dc| target.offset(dr, dc)))
            .collect(),
        Footprint::Row => (0..grid.cols())
            .map(|col| GridPos::new(target.row, col))
            .collect(),
        Footprint::Adjacent => vec![target],
    };
    cells.into_iter().filter(|pos| grid.in_bounds(*pos)).collect()
}

/// Why a shot did or did not take effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotVerdict {
    /// Damage was rolled over the footprint.
    Resolved,
    /// Target was the shooter's own cell.
    OwnCell,
    /// Target lies outside the arena.
    OutOfBounds,
    /// Hammer target farther than one cell away.
    OutOfReach,
}

/// One robot caught in a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    /// Robot that was hit.
    pub victim: AgentId,
    /// Cell it was standing on.
    pub pos: GridPos,
    /// Rolled base damage.
    pub base_damage: i32,
    /// Damage after mitigation.
    pub damage: i32,
    /// Whether this hit destroyed it.
    pub killed: bool,
}

/// Outcome of one shot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotReport {
    /// Who fired.
    pub shooter: AgentId,
    /// Requested target cell.
    pub target: GridPos,
    /// Weapon used.
    pub weapon: Weapon,
    /// Whether the shot took effect.
    pub verdict: ShotVerdict,
    /// In-bounds cells that received a damage roll.
    pub cells_affected: usize,
    /// Robots damaged, in footprint order.
    pub hits: Vec<Hit>,
}

impl ShotReport {
    fn new(shooter: AgentId, target: GridPos, weapon: Weapon, verdict: ShotVerdict) -> Self {
        Self {
            shooter,
            target,
            weapon,
            verdict,
            cells_affected: 0,
            hits: Vec::new(),
        }
    }
}

/// Fire the weapon of `roster[shooter]` at `target`.
///
/// Robots whose health reaches zero are turned into wrecks on the spot: their
/// cell becomes [`Cell::Destroyed`] and they stop acting. Removing them from
/// the roster is left to the battle loop's end-of-round sweep.
pub fn resolve_shot<R: Rng + ?Sized>(
    grid: &mut GridWorld,
    roster: &mut [AgentHandle],
    shooter: usize,
    target: GridPos,
    rng: &mut R,
) -> ShotReport {
    let shooter_id = roster[shooter].id();
    let shooter_pos = roster[shooter].position();
    let weapon = roster[shooter].weapon();
    let name = roster[shooter].name().to_string();

    if target == shooter_pos {
        tracing::debug!(robot = %name, "Shot at own cell ignored");
        return ShotReport::new(shooter_id, target, weapon, ShotVerdict::OwnCell);
    }
    if !grid.in_bounds(target) {
        tracing::warn!(robot = %name, target = %target, "Shot outside the arena ignored");
        return ShotReport::new(shooter_id, target, weapon, ShotVerdict::OutOfBounds);
    }
    if weapon == Weapon::Hammer && shooter_pos.chebyshev(target) > 1 {
        tracing::warn!(robot = %name, target = %target, "Hammer can only target adjacent cells");
        return ShotReport::new(shooter_id, target, weapon, ShotVerdict::OutOfReach);
    }

    tracing::debug!(robot = %name, ?weapon, target = %target, "Resolving shot");

    let profile = weapon.profile();
    let mut report = ShotReport::new(shooter_id, target, weapon, ShotVerdict::Resolved);

    for pos in footprint_cells(grid, weapon, target) {
        let base = rng.gen_range(profile.min_damage..=profile.max_damage);
        report.cells_affected += 1;

        match grid.cell_at(pos) {
            Some(Cell::Occupied(victim_id)) => {
                let Some(victim) = roster.iter_mut().find(|a| a.id() == victim_id) else {
                    tracing::warn!(cell = %pos, id = %victim_id, "Occupied cell has no robot");
                    continue;
                };
                let damage = mitigated_damage(base, victim.armor());
                victim.take_damage(damage);
                victim.reduce_armor(ARMOR_LOSS_PER_HIT);

                let killed = !victim.is_alive();
                tracing::info!(
                    robot = %victim.name(),
                    damage,
                    health = victim.health(),
                    "Hit robot"
                );
                if killed {
                    tracing::info!(robot = %victim.name(), "Robot destroyed");
                    grid.mark_destroyed(pos, victim.glyph());
                }
                report.hits.push(Hit {
                    victim: victim_id,
                    pos,
                    base_damage: base,
                    damage,
                    killed,
                });
            }
            Some(Cell::Obstacle(kind)) => {
                tracing::debug!(cell = %pos, ?kind, "Shot hit an obstacle");
            }
            _ => {}
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::grid::ObstacleKind;
    use crate::robot::Loadout;
    use crate::test_support::idle_agent_with;

    fn put(grid: &mut GridWorld, agent: &mut AgentHandle, pos: GridPos) {
        grid.occupy(pos, agent.id());
        agent.relocate(pos);
    }

    #[test]
    fn test_mitigation_table() {
        assert_eq!(mitigated_damage(50, 0), 50);
        assert_eq!(mitigated_damage(50, 1), 45);
        assert_eq!(mitigated_damage(50, 4), 30);
        assert_eq!(mitigated_damage(50, 9), 30);
        assert_eq!(mitigated_damage(50, -2), 50);
        // floor, not round
        assert_eq!(mitigated_damage(13, 3), 9);
        assert_eq!(mitigated_damage(10, 3), 7);
    }

    #[test]
    fn test_footprints_clip_to_grid() {
        let grid = GridWorld::new(8, 8).unwrap();
        assert_eq!(footprint_cells(&grid, Weapon::Flamethrower, GridPos::new(4, 4)).len(), 25);
        assert_eq!(footprint_cells(&grid, Weapon::Flamethrower, GridPos::new(0, 0)).len(), 9);
        assert_eq!(footprint_cells(&grid, Weapon::Grenade, GridPos::new(4, 4)).len(), 9);
        assert_eq!(footprint_cells(&grid, Weapon::Grenade, GridPos::new(7, 0)).len(), 4);
        assert_eq!(footprint_cells(&grid, Weapon::Railgun, GridPos::new(3, 5)).len(), 8);
        assert_eq!(footprint_cells(&grid, Weapon::Hammer, GridPos::new(3, 5)).len(), 1);
    }

    #[test]
    fn test_railgun_hits_whole_row_including_shooter() {
        let mut grid = GridWorld::new(8, 8).unwrap();
        let mut roster = vec![
            idle_agent_with(0, Loadout::new(Weapon::Railgun, 0, 1)),
            idle_agent_with(1, Loadout::new(Weapon::Hammer, 0, 1)),
            idle_agent_with(2, Loadout::new(Weapon::Hammer, 0, 1)),
        ];
        put(&mut grid, &mut roster[0], GridPos::new(0, 0));
        put(&mut grid, &mut roster[1], GridPos::new(0, 7));
        put(&mut grid, &mut roster[2], GridPos::new(1, 5));

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let report = resolve_shot(&mut grid, &mut roster, 0, GridPos::new(0, 5), &mut rng);

        assert_eq!(report.verdict, ShotVerdict::Resolved);
        assert_eq!(report.cells_affected, 8);
        assert_eq!(report.hits.len(), 2);
        for hit in &report.hits {
            assert!((10..=20).contains(&hit.damage));
        }
        assert!(roster[0].health() < 100);
        assert!(roster[1].health() < 100);
        assert_eq!(roster[2].health(), 100);
    }

    #[test]
    fn test_hammer_out_of_reach_has_no_effect() {
        let mut grid = GridWorld::new(5, 5).unwrap();
        let mut roster = vec![
            idle_agent_with(0, Loadout::new(Weapon::Hammer, 0, 1)),
            idle_agent_with(1, Loadout::new(Weapon::Hammer, 0, 1)),
        ];
        put(&mut grid, &mut roster[0], GridPos::new(0, 0));
        put(&mut grid, &mut roster[1], GridPos::new(2, 2));
        let before = grid.clone();

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let report = resolve_shot(&mut grid, &mut roster, 0, GridPos::new(2, 2), &mut rng);

        assert_eq!(report.verdict, ShotVerdict::OutOfReach);
        assert!(report.hits.is_empty());
        assert_eq!(grid, before);
        assert_eq!(roster[1].health(), 100);
    }

    #[test]
    fn test_hammer_adjacent_hits_with_mitigation() {
        let mut grid = GridWorld::new(5, 5).unwrap();
        let mut roster = vec![
            idle_agent_with(0, Loadout::new(Weapon::Hammer, 0, 1)),
            idle_agent_with(1, Loadout::new(Weapon::Hammer, 2, 1)),
        ];
        put(&mut grid, &mut roster[0], GridPos::new(2, 2));
        put(&mut grid, &mut roster[1], GridPos::new(3, 3));

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let report = resolve_shot(&mut grid, &mut roster, 0, GridPos::new(3, 3), &mut rng);

        let hit = report.hits[0];
        assert!((50..=60).contains(&hit.base_damage));
        assert_eq!(hit.damage, mitigated_damage(hit.base_damage, 2));
        assert_eq!(roster[1].health(), 100 - hit.damage);
        assert_eq!(roster[1].armor(), 1);
    }

    #[test]
    fn test_own_cell_and_off_grid_shots_are_ignored() {
        let mut grid = GridWorld::new(4, 4).unwrap();
        let mut roster = vec![idle_agent_with(0, Loadout::new(Weapon::Grenade, 0, 1))];
        put(&mut grid, &mut roster[0], GridPos::new(1, 1));
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let own = resolve_shot(&mut grid, &mut roster, 0, GridPos::new(1, 1), &mut rng);
        assert_eq!(own.verdict, ShotVerdict::OwnCell);
        let off = resolve_shot(&mut grid, &mut roster, 0, GridPos::new(-1, 2), &mut rng);
        assert_eq!(off.verdict, ShotVerdict::OutOfBounds);
        assert_eq!(roster[0].health(), 100);
    }

    #[test]
    fn test_lethal_hit_leaves_wreck() {
        let mut grid = GridWorld::new(5, 5).unwrap();
        let mut roster = vec![
            idle_agent_with(0, Loadout::new(Weapon::Flamethrower, 0, 1)),
            idle_agent_with(1, Loadout::new(Weapon::Hammer, 0, 1)),
        ];
        put(&mut grid, &mut roster[0], GridPos::new(0, 0));
        put(&mut grid, &mut roster[1], GridPos::new(4, 4));
        roster[1].take_damage(90);

        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let report = resolve_shot(&mut grid, &mut roster, 0, GridPos::new(4, 4), &mut rng);

        assert!(report.hits[0].killed);
        assert!(!roster[1].is_alive());
        assert_eq!(
            grid.cell_at(GridPos::new(4, 4)),
            Some(Cell::Destroyed(roster[1].glyph()))
        );
    }

    #[test]
    fn test_shots_never_remove_obstacles() {
        let mut grid = GridWorld::new(5, 5).unwrap();
        let mut roster = vec![idle_agent_with(0, Loadout::new(Weapon::Grenade, 0, 1))];
        put(&mut grid, &mut roster[0], GridPos::new(0, 0));
        grid.set_cell(GridPos::new(3, 3), Cell::Obstacle(ObstacleKind::Mound));
        grid.set_cell(GridPos::new(3, 2), Cell::Obstacle(ObstacleKind::Pit));

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        resolve_shot(&mut grid, &mut roster, 0, GridPos::new(3, 3), &mut rng);

        assert_eq!(
            grid.cell_at(GridPos::new(3, 3)),
            Some(Cell::Obstacle(ObstacleKind::Mound))
        );
        assert_eq!(
            grid.cell_at(GridPos::new(3, 2)),
            Some(Cell::Obstacle(ObstacleKind::Pit))
        );
    }
}
