//! ECS systems that operate on the combat world each step.
//!
//! Systems are free functions over `&mut World` (or `&World` for read-only
//! work). Structural changes they want, such as new projectiles or
//! destroyed ships, are returned to the engine and committed after the
//! system finishes iterating.

pub mod collision;
pub mod hostile_ai;
pub mod session;
pub mod snapshot;
pub mod squadron;
pub mod wave_spawner;
