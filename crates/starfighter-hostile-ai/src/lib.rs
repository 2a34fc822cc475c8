//! Hostile fighter AI.
//!
//! Implements the chase/attack/evade state machine and the archetype
//! stat presets hostiles spawn with.

pub mod fsm;
pub mod profiles;

pub use starfighter_core as core;
