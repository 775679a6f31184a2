//! # Arena Test Utilities
//!
//! Shared testing utilities for the arena crates:
//! - Scripted and hunting strategies with observable notification logs
//! - Arena layouts from ASCII art
//! - Determinism test harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
