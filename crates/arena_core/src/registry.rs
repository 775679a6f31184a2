//! Strategy registry: the boundary between the engine and robot brains.
//!
//! Strategy modules are registered under a name with a factory. Loading a
//! robot asks the factory for one fresh instance, which the battle then owns
//! until the robot is destroyed or the match ends. A missing name or a
//! factory that produces nothing is reported as a [`LoadError`], never a
//! panic.

use std::collections::BTreeMap;

use crate::error::LoadError;
use crate::robot::Strategy;

/// Produces one new strategy instance per call, or `None` on failure.
pub type StrategyFactory = Box<dyn Fn() -> Option<Box<dyn Strategy>>>;

/// Name-to-factory map of available strategy modules.
#[derive(Default)]
pub struct StrategyRegistry {
    factories: BTreeMap<String, StrategyFactory>,
}

impl StrategyRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register a factory, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Option<Box<dyn Strategy>> + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Box::new(factory)).is_some() {
            tracing::debug!(module = %name, "Replaced strategy factory");
        }
        self
    }

    /// Check if a module is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered module names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiate a strategy module.
    pub fn create(&self, name: &str) -> Result<Box<dyn Strategy>, LoadError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| LoadError::ModuleNotFound(name.to_string()))?;
        factory().ok_or_else(|| LoadError::FactoryReturnedNothing(name.to_string()))
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("modules", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
