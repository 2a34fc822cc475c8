//! Damage absorption and shield regeneration shared by every ship.

use serde::{Deserialize, Serialize};

use crate::components::Integrity;
use crate::enums::HitLayer;
use crate::types::sanitize;

/// What a single damage application did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageReport {
    /// Points taken by the shield layer.
    pub absorbed: f64,
    /// Points taken by the hull.
    pub hull_damage: f64,
    /// Hull reached zero on this hit.
    pub destroyed: bool,
}

impl DamageReport {
    /// Layer to report for effects. `None` when nothing was taken.
    pub fn layer(&self) -> Option<HitLayer> {
        if self.hull_damage > 0.0 {
            Some(HitLayer::Hull)
        } else if self.absorbed > 0.0 {
            Some(HitLayer::Shield)
        } else {
            None
        }
    }
}

impl Integrity {
    pub fn new(max_health: f64, max_shields: f64, regen_rate: f64, regen_delay: f64) -> Self {
        let max_health = sanitize(max_health);
        let max_shields = sanitize(max_shields);
        Self {
            health: max_health,
            max_health,
            shields: max_shields,
            max_shields,
            shield_regen_rate: sanitize(regen_rate),
            shield_regen_delay: sanitize(regen_delay),
            shield_regen_timer: 0.0,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }

    pub fn health_fraction(&self) -> f64 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    pub fn shield_fraction(&self) -> f64 {
        if self.max_shields > 0.0 {
            self.shields / self.max_shields
        } else {
            0.0
        }
    }
}

/// Apply `amount` damage: shields first, the remainder to the hull.
///
/// Any shield absorption restarts the regen delay. Destruction is only
/// reported; removing the ship is the caller's job.
pub fn apply_damage(integrity: &mut Integrity, amount: f64) -> DamageReport {
    let amount = sanitize(amount);
    if amount <= 0.0 {
        return DamageReport::default();
    }

    let mut remaining = amount;
    let mut absorbed = 0.0;
    if integrity.shields > 0.0 {
        absorbed = integrity.shields.min(remaining);
        integrity.shields -= absorbed;
        remaining -= absorbed;
        if absorbed > 0.0 {
            integrity.shield_regen_timer = integrity.shield_regen_delay;
        }
    }

    let mut hull_damage = 0.0;
    if remaining > 0.0 {
        let before = integrity.health;
        integrity.health = (integrity.health - remaining).max(0.0);
        hull_damage = before - integrity.health;
    }

    DamageReport {
        absorbed,
        hull_damage,
        destroyed: hull_damage > 0.0 && integrity.health <= 0.0,
    }
}

/// Advance the regen delay, or regenerate shields once it has elapsed.
pub fn regen_shields(integrity: &mut Integrity, dt: f64) {
    let dt = sanitize(dt);
    if integrity.max_shields <= 0.0 {
        return;
    }
    if integrity.shield_regen_timer > 0.0 {
        integrity.shield_regen_timer = (integrity.shield_regen_timer - dt).max(0.0);
    } else if integrity.shields < integrity.max_shields && integrity.shield_regen_rate > 0.0 {
        integrity.shields =
            (integrity.shields + integrity.shield_regen_rate * dt).min(integrity.max_shields);
    }
}
