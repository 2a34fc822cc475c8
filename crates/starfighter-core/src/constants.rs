//! Simulation constants and tuning defaults.
//!
//! Values that designers are expected to tweak are mirrored in
//! [`crate::config::CombatTuning`]; the rest are fixed here.

/// Reference frame rate used when converting per-frame chances to rates (Hz).
pub const REFERENCE_FRAME_RATE: f64 = 60.0;

/// Largest slice of time the systems integrate at once (seconds). Longer
/// frames are split into sub-steps of at most this size.
pub const MAX_STEP_DT: f64 = 0.25;

/// Upper bound on sub-steps per frame. Frames beyond this budget use
/// proportionally larger sub-steps so the full dt is still applied.
pub const MAX_SUB_STEPS: u32 = 240;

// --- Arena bounds ---

/// Half-extent of the arena on the X and Z axes.
pub const ARENA_HALF_WIDTH: f64 = 1000.0;

/// Half-extent of the arena on the Y axis.
pub const ARENA_HALF_HEIGHT: f64 = 500.0;

// --- Projectiles ---

/// Laser bolt speed (units/s).
pub const LASER_SPEED: f64 = 150.0;

/// Missile speed (units/s).
pub const MISSILE_SPEED: f64 = 60.0;

/// Projectile lifetime (seconds).
pub const PROJECTILE_LIFETIME_SECS: f64 = 2.0;

/// Damage used when a laser is fired without an explicit damage value.
pub const LASER_DEFAULT_DAMAGE: f64 = 10.0;

/// Damage used when a missile is fired without an explicit damage value.
pub const MISSILE_DEFAULT_DAMAGE: f64 = 25.0;

/// Projectile-to-ship hit radius (units).
pub const HIT_RADIUS: f64 = 5.0;

/// Distance ahead of the nose at which shots spawn.
pub const MUZZLE_OFFSET: f64 = 2.0;

/// Damage that maps to a full-intensity impact effect.
pub const IMPACT_FULL_INTENSITY_DAMAGE: f64 = 40.0;

/// Scale hint for a destroyed hostile.
pub const HOSTILE_EXPLOSION_SCALE: f64 = 2.0;

/// Scale hint for a destroyed squadron ship.
pub const SHIP_EXPLOSION_SCALE: f64 = 1.5;

// --- Weapons & energy ---

/// Laser refire delay (seconds).
pub const LASER_COOLDOWN_SECS: f64 = 0.15;

/// Missile refire delay (seconds).
pub const MISSILE_COOLDOWN_SECS: f64 = 0.8;

/// Energy spent per laser shot.
pub const LASER_ENERGY_COST: f64 = 4.0;

/// Energy spent per missile shot.
pub const MISSILE_ENERGY_COST: f64 = 20.0;

/// Energy capacity.
pub const MAX_ENERGY: f64 = 100.0;

/// Energy regeneration (points/s).
pub const ENERGY_REGEN_RATE: f64 = 10.0;

/// Energy drained while boosting (points/s).
pub const BOOST_DRAIN_RATE: f64 = 15.0;

/// Minimum interval between "missile lock required" advisories (seconds).
pub const MISSILE_ADVISORY_INTERVAL_SECS: f64 = 0.9;

// --- Flight model ---

/// Throttle acceleration (units/s²).
pub const THROTTLE_ACCELERATION: f64 = 50.0;

/// Speed the throttle eases back to when neutral (capped by max speed).
pub const CRUISE_SPEED: f64 = 20.0;

/// Speed cap multiplier while boosting.
pub const BOOST_SPEED_FACTOR: f64 = 1.5;

/// Roll rate relative to pitch/yaw rate.
pub const ROLL_RATE_FACTOR: f64 = 1.5;

// --- Hull presets ---

pub const INTERCEPTOR_MAX_SPEED: f64 = 40.0;
pub const INTERCEPTOR_TURN_RATE: f64 = 2.0;
pub const INTERCEPTOR_HULL: f64 = 100.0;

pub const BOMBER_MAX_SPEED: f64 = 30.0;
pub const BOMBER_TURN_RATE: f64 = 1.5;
pub const BOMBER_HULL: f64 = 200.0;

pub const DREADNOUGHT_MAX_SPEED: f64 = 20.0;
pub const DREADNOUGHT_TURN_RATE: f64 = 0.8;
pub const DREADNOUGHT_HULL: f64 = 500.0;

// --- Shield modules ---

/// Default shield regen delay for squadron ships (seconds).
pub const SHIP_SHIELD_REGEN_DELAY: f64 = 2.5;

pub const SHIELD_REGEN_STANDARD: f64 = 10.0;
pub const SHIELD_REGEN_HEAVY: f64 = 6.0;
pub const SHIELD_REGEN_REGENERATIVE: f64 = 16.0;

pub const SHIELD_MODULE_HEAVY: &str = "mod_shield_heavy";
pub const SHIELD_MODULE_REGENERATIVE: &str = "mod_shield_regenerative";

// --- Formation ---

/// Lateral spacing of the first wingman pair.
pub const FORMATION_SPACING: f64 = 20.0;

/// Additional spacing per row behind the first pair.
pub const FORMATION_ROW_STEP: f64 = 12.0;

// --- Hostile archetype presets ---

pub const HOSTILE_SHIELD_REGEN_DELAY: f64 = 3.0;

pub const FIGHTER_HULL: f64 = 50.0;
pub const FIGHTER_SHIELDS: f64 = 25.0;
pub const FIGHTER_SPEED: f64 = 15.0;
pub const FIGHTER_DAMAGE: f64 = 10.0;

pub const SCOUT_HULL: f64 = 35.0;
pub const SCOUT_SHIELDS: f64 = 12.0;
pub const SCOUT_SPEED: f64 = 22.0;
pub const SCOUT_DAMAGE: f64 = 8.0;

pub const ACE_HULL: f64 = 70.0;
pub const ACE_SHIELDS: f64 = 40.0;
pub const ACE_SPEED: f64 = 18.0;
pub const ACE_DAMAGE: f64 = 14.0;

pub const TANK_HULL: f64 = 110.0;
pub const TANK_SHIELDS: f64 = 65.0;
pub const TANK_SHIELD_REGEN: f64 = 8.0;
pub const TANK_SPEED: f64 = 10.0;
pub const TANK_DAMAGE: f64 = 12.0;

/// Shield regen for every archetype except tank.
pub const HOSTILE_SHIELD_REGEN: f64 = 6.0;

// --- Waves ---

/// How far ahead of the player (along -Z) a wave is centred.
pub const WAVE_SPAWN_AHEAD: f64 = 140.0;

/// Vertical jitter of spawned hostiles (total spread).
pub const WAVE_SPAWN_VERTICAL_SPREAD: f64 = 40.0;
