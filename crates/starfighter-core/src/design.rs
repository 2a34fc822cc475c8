//! Squadron ship designs and the stats derived from them.
//!
//! A design is supplied by the ship designer and read once at ship
//! construction. Any malformed number in it is ignored.

use serde::{Deserialize, Serialize};

use crate::components::WeaponDamage;
use crate::constants::*;
use crate::enums::HullKind;
use crate::types::{sanitize_opt, sanitize};

/// A weapon module: id plus damage stat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponModule {
    pub id: String,
    #[serde(default)]
    pub damage: Option<f64>,
}

/// A shield module: id plus hit points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShieldModule {
    pub id: String,
    #[serde(default)]
    pub hp: Option<f64>,
}

/// Generic fitted module (older designs list shields here).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignModule {
    pub id: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub hp: Option<f64>,
}

/// Designer-computed stat overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignStats {
    #[serde(default)]
    pub hp: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub damage: Option<f64>,
    #[serde(default)]
    pub range: Option<f64>,
}

/// A squadron member as designed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipDesign {
    pub name: String,
    #[serde(default)]
    pub hull: String,
    #[serde(default)]
    pub weapons: Vec<WeaponModule>,
    #[serde(default)]
    pub shields: Vec<ShieldModule>,
    #[serde(default)]
    pub modules: Vec<DesignModule>,
    #[serde(default)]
    pub stats: Option<DesignStats>,
}

/// Multipliers from pilot skills, applied once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotBonuses {
    pub speed: f64,
    pub turn: f64,
    pub hull_hp: f64,
    pub shield_hp: f64,
    pub shield_regen: f64,
    pub laser_damage: f64,
    pub missile_damage: f64,
}

/// Everything a ship needs, derived from a design.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipLoadout {
    pub name: String,
    pub hull: HullKind,
    pub max_health: f64,
    pub max_shields: f64,
    pub shield_regen_rate: f64,
    pub shield_regen_delay: f64,
    pub max_speed: f64,
    pub turn_rate: f64,
    pub weapon_damage: WeaponDamage,
    pub range: Option<f64>,
}

impl Default for PilotBonuses {
    fn default() -> Self {
        Self {
            speed: 1.0,
            turn: 1.0,
            hull_hp: 1.0,
            shield_hp: 1.0,
            shield_regen: 1.0,
            laser_damage: 1.0,
            missile_damage: 1.0,
        }
    }
}

impl ShipDesign {
    /// Fallback design used when a session starts with no squadron.
    pub fn rookie() -> Self {
        Self {
            name: "Rookie One".to_string(),
            hull: "Interceptor".to_string(),
            ..Default::default()
        }
    }

    /// Total hit points of fitted shield modules.
    pub fn shield_hp(&self) -> f64 {
        if !self.shields.is_empty() {
            self.shields
                .iter()
                .filter_map(|s| sanitize_opt(s.hp))
                .sum()
        } else {
            self.modules
                .iter()
                .filter(|m| m.kind.eq_ignore_ascii_case("shield"))
                .filter_map(|m| sanitize_opt(m.hp))
                .sum()
        }
    }

    fn shield_ids(&self) -> Vec<&str> {
        if !self.shields.is_empty() {
            self.shields.iter().map(|s| s.id.as_str()).collect()
        } else {
            self.modules.iter().map(|m| m.id.as_str()).collect()
        }
    }

    /// Derive combat stats from the design.
    pub fn loadout(&self, bonuses: &PilotBonuses) -> ShipLoadout {
        let hull = HullKind::from_name(&self.hull);
        let (mut max_speed, mut turn_rate, mut max_health) = match hull {
            HullKind::Interceptor => (
                INTERCEPTOR_MAX_SPEED,
                INTERCEPTOR_TURN_RATE,
                INTERCEPTOR_HULL,
            ),
            HullKind::Bomber => (BOMBER_MAX_SPEED, BOMBER_TURN_RATE, BOMBER_HULL),
            HullKind::Dreadnought => (
                DREADNOUGHT_MAX_SPEED,
                DREADNOUGHT_TURN_RATE,
                DREADNOUGHT_HULL,
            ),
        };

        let stats = self.stats.unwrap_or_default();
        let stat_hp = sanitize_opt(stats.hp).filter(|hp| *hp > 0.0);
        let stat_damage = sanitize_opt(stats.damage);
        if let Some(hp) = stat_hp {
            max_health = hp;
        }
        if let Some(speed) = sanitize_opt(stats.speed) {
            max_speed = 20.0 + speed * 0.5;
            turn_rate = 1.2 + speed / 50.0;
        }

        let mut max_shields = 0.0;
        let mut shield_regen_rate = 0.0;
        let shield_hp = self.shield_hp();
        if shield_hp > 0.0 {
            max_shields = shield_hp;
            if let Some(hp) = stat_hp {
                let hull_hp = hp - shield_hp;
                if hull_hp > 0.0 {
                    max_health = hull_hp;
                }
            }
            let ids = self.shield_ids();
            shield_regen_rate = if ids.contains(&SHIELD_MODULE_REGENERATIVE) {
                SHIELD_REGEN_REGENERATIVE
            } else if ids.contains(&SHIELD_MODULE_HEAVY) {
                SHIELD_REGEN_HEAVY
            } else {
                SHIELD_REGEN_STANDARD
            };
        }

        let mut weapon_damage = self.weapon_damage(stat_damage);

        max_speed *= multiplier(bonuses.speed);
        turn_rate *= multiplier(bonuses.turn);
        max_health *= multiplier(bonuses.hull_hp);
        if max_shields > 0.0 {
            max_shields *= multiplier(bonuses.shield_hp);
            shield_regen_rate *= multiplier(bonuses.shield_regen);
        }
        weapon_damage.laser *= multiplier(bonuses.laser_damage);
        weapon_damage.missile *= multiplier(bonuses.missile_damage);

        ShipLoadout {
            name: self.name.clone(),
            hull,
            max_health,
            max_shields,
            shield_regen_rate,
            shield_regen_delay: SHIP_SHIELD_REGEN_DELAY,
            max_speed,
            turn_rate,
            weapon_damage,
            range: sanitize_opt(stats.range),
        }
    }

    fn weapon_damage(&self, stat_damage: Option<f64>) -> WeaponDamage {
        let mut damage = WeaponDamage::default();
        if !self.weapons.is_empty() {
            let (mut laser, mut missile) = (0.0, 0.0);
            for weapon in &self.weapons {
                let Some(d) = sanitize_opt(weapon.damage) else {
                    continue;
                };
                let id = weapon.id.to_ascii_lowercase();
                if id.contains("missile") || id.contains("torpedo") {
                    missile += d;
                } else {
                    laser += d;
                }
            }
            if laser > 0.0 {
                damage.laser = laser;
            }
            if missile > 0.0 {
                damage.missile = missile;
            }
            if laser > 0.0 && missile == 0.0 {
                damage.missile = laser;
            }
            if missile > 0.0 && laser == 0.0 {
                damage.laser = missile;
            }
        } else if let Some(d) = stat_damage {
            damage.laser = d;
            damage.missile = d;
        }
        damage
    }
}

/// Bonus multipliers that are not positive and finite count as 1.
fn multiplier(value: f64) -> f64 {
    let v = sanitize(value);
    if v > 0.0 {
        v
    } else {
        1.0
    }
}
