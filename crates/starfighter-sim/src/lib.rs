//! Combat simulation engine.
//!
//! Owns the hecs ECS world, the projectile pool, targeting and the combat
//! session, runs the per-step systems in a fixed order, and produces
//! `CombatSnapshot`s for the presentation layer.

pub mod engine;
pub mod guidance;
pub mod pool;
pub mod session;
pub mod systems;
pub mod targeting;
pub mod world_setup;

pub use engine::{CombatEngine, SimConfig};
pub use starfighter_core as core;

#[cfg(test)]
mod tests;
