//! # Arena Bots
//!
//! Built-in robot strategies. Each bot is registered under its display name
//! so configs and the CLI can refer to it.
//!
//! ```
//! use arena_core::registry::StrategyRegistry;
//!
//! let mut registry = StrategyRegistry::new();
//! arena_bots::register_builtin(&mut registry);
//! assert!(registry.contains("Robot_FireBoi"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod fireboi;
pub mod flame_e_o;
pub mod ratboy;
pub mod senses;

use arena_core::registry::StrategyRegistry;
use arena_core::robot::Strategy;

pub use fireboi::FireBoi;
pub use flame_e_o::FlameEO;
pub use ratboy::Ratboy;

/// Roster used when nothing else is configured.
pub const DEFAULT_ROSTER: [&str; 3] = [fireboi::NAME, flame_e_o::NAME, ratboy::NAME];

/// Add every built-in bot to `registry`.
pub fn register_builtin(registry: &mut StrategyRegistry) {
    registry
        .register(fireboi::NAME, || Some(Box::new(FireBoi::new()) as Box<dyn Strategy>))
        .register(flame_e_o::NAME, || Some(Box::new(FlameEO::new()) as Box<dyn Strategy>))
        .register(ratboy::NAME, || Some(Box::new(Ratboy::new()) as Box<dyn Strategy>));
    tracing::debug!(modules = registry.len(), "Registered built-in bots");
}

/// A registry holding only the built-in bots.
#[must_use]
pub fn builtin_registry() -> StrategyRegistry {
    let mut registry = StrategyRegistry::new();
    register_builtin(&mut registry);
    registry
}
