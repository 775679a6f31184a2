//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match produces identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! A seeded match must replay exactly. Sources of non-determinism include:
//!
//! - **Unseeded randomness**: every roll must come from the battle's own
//!   generator, never from `thread_rng`.
//!
//! - **HashMap iteration order**: turn order is the roster `Vec`, and the
//!   strategy registry is a `BTreeMap`.
//!
//! - **Strategy state**: a strategy that reads the clock or a global
//!   breaks replay for the whole match.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: radar, combat and movement given a fixed generator
//! 2. **Property tests**: random configs must still replay identically
//! 3. **Integration tests**: full matches are reproducible round by round

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use arena_core::battle::Battle;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps simulated.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `steps` - Number of steps to simulate per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```ignore
/// use arena_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     100, // 100 rounds each
///     || seeded_battle(),
///     |battle| { battle.run_round(); },
///     |battle| battle.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Play the same battle twice, round by round, and compare state hashes.
///
/// Returns `true` if both runs matched after every round.
pub fn verify_battle_determinism<F>(setup_fn: F, rounds: u32) -> bool
where
    F: Fn() -> Battle,
{
    find_first_divergence(setup_fn, rounds).is_none()
}

/// Compare two battle runs round by round, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs match, `Some(round)` for the first round after which
/// they differ (`0` means the initial states already differ).
pub fn find_first_divergence<F>(setup_fn: F, rounds: u32) -> Option<u32>
where
    F: Fn() -> Battle,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for round in 1..=rounds {
        let a = first.run_round();
        let b = second.run_round();

        if a != b || first.state_hash() != second.state_hash() {
            tracing::debug!(round, "Battles diverged");
            return Some(round);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for arena inputs.
pub mod strategies {
    use arena_core::config::ArenaConfig;
    use arena_core::grid::GridPos;
    use arena_core::robot::{Loadout, MoveRequest, Weapon};
    use proptest::prelude::*;

    /// Any weapon.
    pub fn arb_weapon() -> impl Strategy<Value = Weapon> {
        prop_oneof![
            Just(Weapon::Flamethrower),
            Just(Weapon::Railgun),
            Just(Weapon::Hammer),
            Just(Weapon::Grenade),
        ]
    }

    /// Loadouts with armor 0-8 and speed 1-5.
    pub fn arb_loadout() -> impl Strategy<Value = Loadout> {
        (arb_weapon(), 0i32..=8, 1i32..=5)
            .prop_map(|(weapon, armor, speed)| Loadout::new(weapon, armor, speed))
    }

    /// Arena dimensions between 1x1 and 12x12.
    pub fn arb_dimensions() -> impl Strategy<Value = (i32, i32)> {
        (1i32..=12, 1i32..=12)
    }

    /// A cell inside a `rows` x `cols` arena.
    pub fn arb_grid_pos(rows: i32, cols: i32) -> impl Strategy<Value = GridPos> {
        (0..rows, 0..cols).prop_map(|(row, col)| GridPos::new(row, col))
    }

    /// Any move, including stay, invalid directions and odd distances.
    pub fn arb_move_request() -> impl Strategy<Value = MoveRequest> {
        (-1i32..=10, -2i32..=8).prop_map(|(direction, distance)| MoveRequest::new(direction, distance))
    }

    /// Seeded configs on small arenas with short round caps.
    pub fn arb_config() -> impl Strategy<Value = ArenaConfig> {
        (arb_dimensions(), any::<u64>(), 0u32..=40, 1u32..=30, 1u32..=200).prop_map(
            |((rows, cols), seed, obstacles, stagnation, max_rounds)| {
                ArenaConfig::default()
                    .with_size(rows, cols)
                    .with_seed(seed)
                    .with_obstacle_percent(obstacles)
                    .with_stagnation_limit(stagnation)
                    .with_max_rounds(max_rounds)
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::*;
    use super::*;
    use crate::fixtures::Hunter;
    use arena_core::config::ArenaConfig;
    use arena_core::robot::Weapon;
    use proptest::prelude::*;

    fn hunters_battle(seed: u64) -> Battle {
        let mut battle = Battle::new(ArenaConfig::default().with_size(8, 8).with_seed(seed))
            .expect("valid config");
        battle.place_obstacles();
        for weapon in [Weapon::Railgun, Weapon::Grenade, Weapon::Flamethrower] {
            battle
                .add_strategy(Box::new(Hunter::armed(weapon)))
                .expect("room for hunters");
        }
        battle
    }

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_hunters_replay_identically() {
        let result = verify_determinism(
            4,
            50,
            || hunters_battle(99),
            |battle| {
                battle.run_round();
            },
            Battle::state_hash,
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_no_divergence_round_by_round() {
        assert_eq!(find_first_divergence(|| hunters_battle(5), 80), None);
        assert!(verify_battle_determinism(|| hunters_battle(6), 40));
    }

    #[test]
    fn test_seeded_obstacle_layout_hashes_match() {
        let a = hunters_battle(11);
        let b = hunters_battle(11);
        assert_eq!(compute_hash(a.grid()), compute_hash(b.grid()));
        assert_ne!(compute_hash(a.grid()), compute_hash(hunters_battle(12).grid()));
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = hunters_battle(1).state_hash();
        let b = hunters_battle(2).state_hash();
        assert_ne!(a, b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_random_configs_replay(config in arb_config()) {
            let setup = || {
                let mut battle = Battle::new(config.clone()).expect("generated config is valid");
                battle.place_obstacles();
                let _ = battle.add_strategy(Box::new(Hunter::armed(Weapon::Grenade)));
                let _ = battle.add_strategy(Box::new(Hunter::armed(Weapon::Railgun)));
                battle
            };
            prop_assert_eq!(find_first_divergence(setup, 20), None);
        }
    }
}
