//! Core types and definitions for the starfighter combat simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, designs, wave plans, commands, state snapshots, events,
//! tuning and constants. It has no dependency on the ECS or any runtime.

pub mod assets;
pub mod combat;
pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod design;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod types;
pub mod wave;

pub use error::{CombatError, Result};
