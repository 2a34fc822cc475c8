//! Gameplay tuning, loadable from a RON file.
//!
//! Every field has a default, so a config file only needs to list the values
//! it changes:
//!
//! ```ron
//! (lock_max_range: 800.0, ai_fire_chance: 0.08)
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::WeaponKind;
use crate::error::{CombatError, Result};

/// Designer-facing combat parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    // --- Projectiles ---
    pub laser_speed: f64,
    pub missile_speed: f64,
    pub projectile_lifetime_secs: f64,
    pub laser_default_damage: f64,
    pub missile_default_damage: f64,
    pub hit_radius: f64,

    // --- Targeting ---
    /// Nose alignment (cosine) a hostile must exceed to be acquired.
    pub lock_acquire_cone: f64,
    /// Minimum nose alignment (cosine) for keeping a lock.
    pub lock_maintain_cone: f64,
    pub lock_max_range: f64,
    /// How long a lock may stay out of bounds before it drops.
    pub lock_grace_secs: f64,

    // --- Hostile AI ---
    pub ai_attack_range: f64,
    pub ai_break_range: f64,
    pub ai_attack_secs: f64,
    pub ai_evade_secs: f64,
    /// Slerp rate while chasing (per second).
    pub ai_chase_turn_rate: f64,
    pub ai_attack_speed_factor: f64,
    pub ai_evade_speed_factor: f64,
    pub ai_evade_roll_rate: f64,
    pub ai_evade_climb_rate: f64,
    /// Chance to fire per reference frame while attacking.
    pub ai_fire_chance: f64,

    // --- Formation ---
    pub formation_lateral_tolerance: f64,
    pub formation_longitudinal_tolerance: f64,
    /// Slerp rate toward the slot or leader heading (per second).
    pub formation_turn_rate: f64,
    /// Speed correction per unit of longitudinal error.
    pub formation_speed_gain: f64,
    pub formation_max_slowdown: f64,
    pub formation_max_catch_up: f64,
    pub formation_catch_up_range: f64,
    pub formation_catch_up_bonus: f64,
    /// Rate at which wingman speed eases toward the desired speed (per second).
    pub formation_speed_ease: f64,
    pub wingman_radar_range: f64,
    pub wingman_fire_cone: f64,

    // --- Session ---
    pub wave_clear_delay_secs: f64,
    pub exit_delay_secs: f64,
    pub wave_spawn_min_radius: f64,
    pub wave_spawn_max_radius: f64,
    pub credits_per_hostile: u32,
    pub alloys_per_even_wave: u32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            laser_speed: LASER_SPEED,
            missile_speed: MISSILE_SPEED,
            projectile_lifetime_secs: PROJECTILE_LIFETIME_SECS,
            laser_default_damage: LASER_DEFAULT_DAMAGE,
            missile_default_damage: MISSILE_DEFAULT_DAMAGE,
            hit_radius: HIT_RADIUS,

            lock_acquire_cone: 0.95,
            lock_maintain_cone: 0.92,
            lock_max_range: 650.0,
            lock_grace_secs: 0.35,

            ai_attack_range: 40.0,
            ai_break_range: 10.0,
            ai_attack_secs: 3.0,
            ai_evade_secs: 2.0,
            ai_chase_turn_rate: 2.0,
            ai_attack_speed_factor: 1.5,
            ai_evade_speed_factor: 1.2,
            ai_evade_roll_rate: 2.0,
            ai_evade_climb_rate: 10.0,
            ai_fire_chance: 0.05,

            formation_lateral_tolerance: 6.0,
            formation_longitudinal_tolerance: 12.0,
            formation_turn_rate: 2.5,
            formation_speed_gain: 0.7,
            formation_max_slowdown: 15.0,
            formation_max_catch_up: 30.0,
            formation_catch_up_range: 150.0,
            formation_catch_up_bonus: 30.0,
            formation_speed_ease: 2.0,
            wingman_radar_range: 300.0,
            wingman_fire_cone: 0.95,

            wave_clear_delay_secs: 1.6,
            exit_delay_secs: 2.25,
            wave_spawn_min_radius: 40.0,
            wave_spawn_max_radius: 100.0,
            credits_per_hostile: 10,
            alloys_per_even_wave: 2,
        }
    }
}

impl CombatTuning {
    /// Parse tuning from RON text and validate it.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let tuning: CombatTuning = ron::from_str(text)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CombatError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    /// Load tuning from a RON file, falling back to defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Invalid tuning, using defaults");
                Self::default()
            }
        }
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("laser_speed", self.laser_speed),
            ("missile_speed", self.missile_speed),
            ("projectile_lifetime_secs", self.projectile_lifetime_secs),
            ("hit_radius", self.hit_radius),
            ("lock_max_range", self.lock_max_range),
            ("ai_attack_secs", self.ai_attack_secs),
            ("ai_evade_secs", self.ai_evade_secs),
            ("wave_spawn_max_radius", self.wave_spawn_max_radius),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(CombatError::InvalidTuning(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        let non_negative = [
            ("laser_default_damage", self.laser_default_damage),
            ("missile_default_damage", self.missile_default_damage),
            ("lock_grace_secs", self.lock_grace_secs),
            ("wave_clear_delay_secs", self.wave_clear_delay_secs),
            ("exit_delay_secs", self.exit_delay_secs),
            ("wave_spawn_min_radius", self.wave_spawn_min_radius),
            ("formation_lateral_tolerance", self.formation_lateral_tolerance),
            ("formation_longitudinal_tolerance", self.formation_longitudinal_tolerance),
            ("formation_turn_rate", self.formation_turn_rate),
            ("formation_speed_gain", self.formation_speed_gain),
            ("formation_max_slowdown", self.formation_max_slowdown),
            ("formation_max_catch_up", self.formation_max_catch_up),
            ("formation_catch_up_range", self.formation_catch_up_range),
            ("formation_catch_up_bonus", self.formation_catch_up_bonus),
            ("formation_speed_ease", self.formation_speed_ease),
            ("wingman_radar_range", self.wingman_radar_range),
            ("ai_attack_range", self.ai_attack_range),
            ("ai_break_range", self.ai_break_range),
            ("ai_chase_turn_rate", self.ai_chase_turn_rate),
            ("ai_attack_speed_factor", self.ai_attack_speed_factor),
            ("ai_evade_speed_factor", self.ai_evade_speed_factor),
            ("ai_evade_roll_rate", self.ai_evade_roll_rate),
            ("ai_evade_climb_rate", self.ai_evade_climb_rate),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(CombatError::InvalidTuning(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }

        let cones = [
            ("lock_acquire_cone", self.lock_acquire_cone),
            ("lock_maintain_cone", self.lock_maintain_cone),
            ("wingman_fire_cone", self.wingman_fire_cone),
        ];
        for (name, value) in cones {
            if !(-1.0..=1.0).contains(&value) {
                return Err(CombatError::InvalidTuning(format!(
                    "{name} must be a cosine within [-1, 1], got {value}"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.ai_fire_chance) {
            return Err(CombatError::InvalidTuning(format!(
                "ai_fire_chance must be within [0, 1], got {}",
                self.ai_fire_chance
            )));
        }
        if self.wave_spawn_min_radius > self.wave_spawn_max_radius {
            return Err(CombatError::InvalidTuning(
                "wave_spawn_min_radius exceeds wave_spawn_max_radius".to_string(),
            ));
        }
        Ok(())
    }

    /// Projectile speed for a weapon kind.
    pub fn projectile_speed(&self, kind: WeaponKind) -> f64 {
        match kind {
            WeaponKind::Laser => self.laser_speed,
            WeaponKind::Missile => self.missile_speed,
        }
    }

    /// Damage used when a shot carries no explicit damage value.
    pub fn default_damage(&self, kind: WeaponKind) -> f64 {
        match kind {
            WeaponKind::Laser => self.laser_default_damage,
            WeaponKind::Missile => self.missile_default_damage,
        }
    }
}
