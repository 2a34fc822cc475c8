//! Archetype stat presets.
//!
//! Consolidates per-archetype hull, shield, speed and damage values.

use starfighter_core::constants::*;
use starfighter_core::enums::Archetype;

/// Stat block a hostile spawns with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeProfile {
    pub hull: f64,
    pub shields: f64,
    /// Shield points per second.
    pub shield_regen: f64,
    pub shield_regen_delay: f64,
    /// Base cruise speed (units/s).
    pub speed: f64,
    /// Laser damage per hit.
    pub damage: f64,
}

/// Get the stat preset for a given archetype.
pub fn get_profile(archetype: Archetype) -> ArchetypeProfile {
    match archetype {
        Archetype::Fighter => ArchetypeProfile {
            hull: FIGHTER_HULL,
            shields: FIGHTER_SHIELDS,
            shield_regen: HOSTILE_SHIELD_REGEN,
            shield_regen_delay: HOSTILE_SHIELD_REGEN_DELAY,
            speed: FIGHTER_SPEED,
            damage: FIGHTER_DAMAGE,
        },
        Archetype::Scout => ArchetypeProfile {
            hull: SCOUT_HULL,
            shields: SCOUT_SHIELDS,
            shield_regen: HOSTILE_SHIELD_REGEN,
            shield_regen_delay: HOSTILE_SHIELD_REGEN_DELAY,
            speed: SCOUT_SPEED,
            damage: SCOUT_DAMAGE,
        },
        Archetype::Ace => ArchetypeProfile {
            hull: ACE_HULL,
            shields: ACE_SHIELDS,
            shield_regen: HOSTILE_SHIELD_REGEN,
            shield_regen_delay: HOSTILE_SHIELD_REGEN_DELAY,
            speed: ACE_SPEED,
            damage: ACE_DAMAGE,
        },
        Archetype::Tank => ArchetypeProfile {
            hull: TANK_HULL,
            shields: TANK_SHIELDS,
            shield_regen: TANK_SHIELD_REGEN,
            shield_regen_delay: HOSTILE_SHIELD_REGEN_DELAY,
            speed: TANK_SPEED,
            damage: TANK_DAMAGE,
        },
    }
}

/// Archetype for spawn `index` in a wave that names none.
pub fn default_mix(index: usize) -> Archetype {
    const MIX: [Archetype; 4] = [
        Archetype::Fighter,
        Archetype::Scout,
        Archetype::Fighter,
        Archetype::Tank,
    ];
    MIX[index % MIX.len()]
}
