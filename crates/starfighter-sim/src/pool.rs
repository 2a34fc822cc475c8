//! Recycled projectile storage.
//!
//! An arena of slots indexed by position. A slot is type-homogeneous for
//! as long as it holds one allocation; handing it to a different weapon
//! kind counts as a fresh allocation and bumps its generation so the
//! renderer knows to rebuild the visual.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use starfighter_core::config::CombatTuning;
use starfighter_core::enums::{Role, WeaponKind};
use starfighter_core::types::sanitize;

/// One projectile slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSlot {
    pub position: DVec3,
    pub velocity: DVec3,
    pub owner: Role,
    pub kind: WeaponKind,
    pub damage: f64,
    pub life_remaining: f64,
    pub active: bool,
    /// Incremented every time the slot is (re)allocated for a kind.
    pub generation: u32,
    /// Step on which this projectile was fired.
    pub fired_on_step: u64,
}

/// A request to spawn a projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub origin: DVec3,
    pub direction: DVec3,
    pub owner: Role,
    pub kind: WeaponKind,
    /// `None` (or an invalid number) uses the kind's default damage.
    pub damage: Option<f64>,
}

/// The projectile pool.
#[derive(Debug, Clone, Default)]
pub struct ProjectilePool {
    slots: Vec<ProjectileSlot>,
}

impl ProjectilePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a projectile. Returns the slot index, or `None` for a shot
    /// with no usable direction.
    pub fn fire(&mut self, shot: Shot, tuning: &CombatTuning, step: u64) -> Option<usize> {
        let direction = shot.direction.normalize_or_zero();
        if direction == DVec3::ZERO || !shot.origin.is_finite() {
            return None;
        }

        let index = self.claim(shot.kind);
        let damage = shot
            .damage
            .filter(|d| d.is_finite() && *d >= 0.0)
            .unwrap_or_else(|| tuning.default_damage(shot.kind));

        let slot = &mut self.slots[index];
        slot.active = true;
        slot.owner = shot.owner;
        slot.damage = damage;
        slot.life_remaining = tuning.projectile_lifetime_secs;
        slot.position = shot.origin;
        slot.velocity = direction * tuning.projectile_speed(shot.kind);
        slot.fired_on_step = step;
        Some(index)
    }

    /// Find a slot for `kind`: an idle slot of the same kind, else any idle
    /// slot reallocated for the new kind, else a new slot.
    fn claim(&mut self, kind: WeaponKind) -> usize {
        if let Some(i) = self.slots.iter().position(|s| !s.active && s.kind == kind) {
            return i;
        }
        if let Some(i) = self.slots.iter().position(|s| !s.active) {
            let slot = &mut self.slots[i];
            slot.kind = kind;
            slot.generation = slot.generation.wrapping_add(1);
            return i;
        }
        self.slots.push(ProjectileSlot {
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            owner: Role::Player,
            kind,
            damage: 0.0,
            life_remaining: 0.0,
            active: false,
            generation: 0,
            fired_on_step: 0,
        });
        self.slots.len() - 1
    }

    /// Move active projectiles and expire the ones out of life.
    pub fn step(&mut self, dt: f64) {
        let dt = sanitize(dt);
        for slot in self.slots.iter_mut().filter(|s| s.active) {
            slot.position += slot.velocity * dt;
            slot.life_remaining -= dt;
            if slot.life_remaining <= 0.0 {
                slot.active = false;
            }
        }
    }

    pub fn deactivate(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.active = false;
        }
    }

    pub fn get(&self, index: usize) -> Option<&ProjectileSlot> {
        self.slots.get(index)
    }

    /// All slots, active or idle.
    pub fn slots(&self) -> &[ProjectileSlot] {
        &self.slots
    }

    pub fn active(&self) -> impl Iterator<Item = (usize, &ProjectileSlot)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.active)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// Number of slots ever allocated.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Tear down the pool.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
