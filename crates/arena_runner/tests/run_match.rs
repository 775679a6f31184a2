//! End-to-end matches through the runner.

use arena_core::battle::Outcome;
use arena_core::config::ArenaConfig;
use arena_core::registry::StrategyRegistry;
use arena_core::robot::{Loadout, Strategy, Weapon};
use arena_runner::{report_json, run_match, Verbosity};
use arena_test_utils::fixtures::ScriptedStrategy;

fn default_config(seed: u64) -> ArenaConfig {
    ArenaConfig::default()
        .with_seed(seed)
        .with_roster(arena_bots::DEFAULT_ROSTER)
}

#[test]
fn test_default_match_renders_every_round() {
    let registry = arena_bots::builtin_registry();
    let mut out: Vec<u8> = Vec::new();

    let report = run_match(&default_config(7), &registry, Verbosity::EveryRound, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("Legend:"));
    assert!(text.contains("=========== Game Over ==========="));
    if report.rounds > 0 {
        assert!(text.contains("=========== Round 0 ==========="));
    }
    assert!(report.outcome.is_some());
}

#[test]
fn test_quiet_match_prints_only_result() {
    let registry = arena_bots::builtin_registry();
    let mut out: Vec<u8> = Vec::new();

    run_match(&default_config(7), &registry, Verbosity::Quiet, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(!text.contains("Legend:"));
    assert!(text.contains("Game Over"));
}

#[test]
fn test_same_seed_same_output() {
    let registry = arena_bots::builtin_registry();
    let mut first: Vec<u8> = Vec::new();
    let mut second: Vec<u8> = Vec::new();

    let a = run_match(&default_config(1234), &registry, Verbosity::EveryRound, &mut first).unwrap();
    let b = run_match(&default_config(1234), &registry, Verbosity::EveryRound, &mut second).unwrap();

    assert_eq!(a, b);
    assert_eq!(first, second);
}

#[test]
fn test_factory_failure_does_not_stop_match() {
    let mut registry = arena_bots::builtin_registry();
    registry.register("Robot_Broken", || None);
    let config = ArenaConfig::default()
        .with_seed(5)
        .with_roster(["Robot_Broken", "Robot_FireBoi"]);

    let report = run_match(&config, &registry, Verbosity::Quiet, &mut std::io::sink()).unwrap();

    // Only FireBoi made it in, so it wins before the first round
    assert_eq!(report.rounds, 0);
    assert!(matches!(
        report.outcome,
        Some(Outcome::Winner { ref name, .. }) if name == "Robot_FireBoi"
    ));
}

#[test]
fn test_empty_roster_is_no_contest() {
    let registry = StrategyRegistry::new();
    let config = ArenaConfig::default().with_seed(1);
    let report = run_match(&config, &registry, Verbosity::Quiet, &mut std::io::sink()).unwrap();
    assert_eq!(report.outcome, Some(Outcome::NoContest));
}

#[test]
fn test_idle_standoff_draws_by_stagnation() {
    let mut registry = StrategyRegistry::new();
    registry.register("Sitter", || {
        Some(Box::new(ScriptedStrategy::new("Sitter", Loadout::new(Weapon::Hammer, 0, 1)))
            as Box<dyn Strategy>)
    });
    let config = ArenaConfig::default()
        .with_seed(9)
        .with_obstacle_percent(0)
        .with_stagnation_limit(10)
        .with_roster(["Sitter", "Sitter"]);

    let report = run_match(&config, &registry, Verbosity::Quiet, &mut std::io::sink()).unwrap();

    assert_eq!(report.outcome, Some(Outcome::DrawByStagnation));
    assert_eq!(report.rounds, 10);
    assert_eq!(report.survivors.len(), 2);
}

#[test]
fn test_report_serializes_to_json() {
    let registry = arena_bots::builtin_registry();
    let report = run_match(&default_config(3), &registry, Verbosity::Quiet, &mut std::io::sink()).unwrap();
    let json = report_json(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["seed"], 3);
    assert!(value["survivors"].is_array());
}

#[test]
fn test_invalid_config_is_an_error() {
    let registry = arena_bots::builtin_registry();
    let config = ArenaConfig::default().with_size(0, 3);
    assert!(run_match(&config, &registry, Verbosity::Quiet, &mut std::io::sink()).is_err());
}
