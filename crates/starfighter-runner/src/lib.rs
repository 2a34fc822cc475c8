//! Headless starfighter runner.
//!
//! Drives a `CombatEngine` at a fixed step, either inline as fast as
//! possible or paced in real time on a worker thread fed by a command
//! channel. Input comes from a scripted autopilot.

pub mod autopilot;
pub mod game_loop;
pub mod state;

pub use starfighter_core as core;
