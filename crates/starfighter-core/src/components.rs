//! ECS components for hecs entities.
//!
//! Components are plain data. Every ship carries [`Ship`] (the role tag),
//! [`Integrity`], [`Flight`] and [`Armament`]; squadron ships add [`Pilot`],
//! hostiles add [`HostileBrain`]. Game logic lives in systems.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::assets::ModelHandle;
use crate::enums::*;

/// Role tag shared by every ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    pub role: Role,
}

/// Hull and shield state.
///
/// Invariant: `0 <= health <= max_health` and `0 <= shields <= max_shields`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Integrity {
    pub health: f64,
    pub max_health: f64,
    /// Zero `max_shields` means the ship has no shield layer.
    pub shields: f64,
    pub max_shields: f64,
    /// Points per second.
    pub shield_regen_rate: f64,
    /// Seconds without shield hits before regen resumes.
    pub shield_regen_delay: f64,
    /// Countdown until regen resumes.
    pub shield_regen_timer: f64,
}

/// Per-kind weapon damage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponDamage {
    pub laser: f64,
    pub missile: f64,
}

/// Weapons carried by a ship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Armament {
    pub damage: WeaponDamage,
    pub current_weapon: WeaponKind,
    /// Seconds until the next shot is allowed.
    pub cooldown: f64,
    /// Engagement range from the design, informational.
    pub range: Option<f64>,
}

/// Kinematic flight state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    /// Current forward speed.
    pub speed: f64,
    pub max_speed: f64,
    /// Pitch/yaw rate in radians per second.
    pub turn_rate: f64,
}

/// Squadron-only state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pilot {
    /// Display name from the design.
    pub name: String,
    pub hull: HullKind,
    /// 0..=100, spent on boost and weapons.
    pub energy: f64,
    /// Slot relative to the leader, in the leader's local frame.
    pub formation_offset: DVec3,
    /// Seconds until another missile-lock advisory may be raised.
    pub advisory_cooldown: f64,
}

/// Hostile-only AI state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostileBrain {
    pub archetype: Archetype,
    pub state: AiState,
    /// Seconds remaining in the current state.
    pub state_timer: f64,
}

/// Render-side representation resolved at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visual {
    /// Loaded model.
    Model(ModelHandle),
    /// Model unavailable; the renderer draws its built-in mesh.
    Fallback,
}

impl WeaponDamage {
    pub fn get(&self, kind: WeaponKind) -> f64 {
        match kind {
            WeaponKind::Laser => self.laser,
            WeaponKind::Missile => self.missile,
        }
    }
}

impl Default for WeaponDamage {
    fn default() -> Self {
        Self {
            laser: crate::constants::LASER_DEFAULT_DAMAGE,
            missile: crate::constants::MISSILE_DEFAULT_DAMAGE,
        }
    }
}

impl Default for Armament {
    fn default() -> Self {
        Self {
            damage: WeaponDamage::default(),
            current_weapon: WeaponKind::Laser,
            cooldown: 0.0,
            range: None,
        }
    }
}
