//! Logical events emitted by the simulation for rendering and audio.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;

/// One thing that happened during a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent {
    /// A ship was removed. `scale` sizes the explosion.
    EntityDestroyed {
        id: u64,
        role: Role,
        position: DVec3,
        scale: f64,
    },
    /// A projectile hit something.
    Impact {
        position: DVec3,
        layer: HitLayer,
        /// 0.0 - 1.0, from the damage dealt.
        intensity: f64,
    },
    /// A wave spawned (1-based).
    WaveStart { number: u32, hostiles: u32 },
    /// The last hostile of a wave died (1-based).
    WaveCleared { number: u32 },
    /// Outcome decided.
    CombatEnd { outcome: Outcome },
    LockAcquired { target: u64 },
    LockLost,
    /// Control moved to another squadron ship.
    ControlTransferred { ship: u64 },
    /// Missile fire rejected for want of a lock. Rate-limited.
    MissileLockRequired,
}
