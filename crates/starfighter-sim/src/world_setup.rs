//! Entity spawn factories for the combat world.
//!
//! Creates squadron ships and hostile fighters with their component
//! bundles, and clears the battlefield between sessions.

use glam::DVec3;
use hecs::{Entity, World};

use starfighter_core::assets::{hull_model_spec, ModelLoader, HOSTILE_MODEL_KEY};
use starfighter_core::components::*;
use starfighter_core::constants::*;
use starfighter_core::design::{PilotBonuses, ShipDesign};
use starfighter_core::enums::*;
use starfighter_core::types::{look_rotation, Pose, Velocity, UP};

use starfighter_hostile_ai::profiles::get_profile;

/// Resolve a model through the loader, falling back to the built-in mesh.
fn resolve_visual(loader: &mut dyn ModelLoader, key: &str) -> Visual {
    match loader.load(key) {
        Some(handle) => Visual::Model(handle),
        None => {
            tracing::debug!(key, "Model unavailable, using fallback");
            Visual::Fallback
        }
    }
}

/// Spawn a squadron ship from its design at `position`, facing -Z.
pub fn spawn_squadron_ship(
    world: &mut World,
    loader: &mut dyn ModelLoader,
    design: &ShipDesign,
    bonuses: &PilotBonuses,
    position: DVec3,
    formation_offset: DVec3,
) -> Entity {
    let loadout = design.loadout(bonuses);
    let visual = resolve_visual(loader, hull_model_spec(loadout.hull).asset_key);

    world.spawn((
        Ship { role: Role::Player },
        Pose::new(position),
        Velocity::default(),
        Integrity::new(
            loadout.max_health,
            loadout.max_shields,
            loadout.shield_regen_rate,
            loadout.shield_regen_delay,
        ),
        Flight {
            speed: 0.0,
            max_speed: loadout.max_speed,
            turn_rate: loadout.turn_rate,
        },
        Armament {
            damage: loadout.weapon_damage,
            range: loadout.range,
            ..Default::default()
        },
        Pilot {
            name: loadout.name,
            hull: loadout.hull,
            energy: MAX_ENERGY,
            formation_offset,
            advisory_cooldown: 0.0,
        },
        visual,
    ))
}

/// Spawn a hostile of `archetype` at `position`, nose toward `facing`.
pub fn spawn_hostile(
    world: &mut World,
    loader: &mut dyn ModelLoader,
    archetype: Archetype,
    position: DVec3,
    facing: DVec3,
) -> Entity {
    let profile = get_profile(archetype);
    let visual = resolve_visual(loader, HOSTILE_MODEL_KEY);

    world.spawn((
        Ship {
            role: Role::Hostile,
        },
        Pose::with_rotation(position, look_rotation(position, facing, UP)),
        Velocity::default(),
        Integrity::new(
            profile.hull,
            profile.shields,
            profile.shield_regen,
            profile.shield_regen_delay,
        ),
        Flight {
            speed: profile.speed,
            max_speed: profile.speed,
            turn_rate: 0.0,
        },
        Armament {
            damage: WeaponDamage {
                laser: profile.damage,
                missile: profile.damage,
            },
            ..Default::default()
        },
        HostileBrain {
            archetype,
            state: AiState::Chase,
            state_timer: 0.0,
        },
        visual,
    ))
}

/// V-formation slot for each wingman, in squadron order.
///
/// The first two sit 20 units out to either side and 20 back; later ones
/// alternate sides, stepping further out and back every row.
pub fn formation_offsets(wingmen: usize) -> Vec<DVec3> {
    (0..wingmen)
        .map(|i| match i {
            0 => DVec3::new(-FORMATION_SPACING, 0.0, FORMATION_SPACING),
            1 => DVec3::new(FORMATION_SPACING, 0.0, FORMATION_SPACING),
            _ => {
                let side = if i % 2 == 0 { -1.0 } else { 1.0 };
                let row = (i / 2) as f64;
                let step = FORMATION_SPACING + row * FORMATION_ROW_STEP;
                DVec3::new(side * step, 0.0, step)
            }
        })
        .collect()
}

/// Give the leader a zero offset and lay everyone else out in a V.
pub fn assign_formation(world: &mut World, squadron: &[Entity], leader: Entity) {
    if let Ok(mut pilot) = world.get::<&mut Pilot>(leader) {
        pilot.formation_offset = DVec3::ZERO;
    }
    let wingmen: Vec<Entity> = squadron.iter().copied().filter(|&e| e != leader).collect();
    for (entity, offset) in wingmen.iter().zip(formation_offsets(wingmen.len())) {
        if let Ok(mut pilot) = world.get::<&mut Pilot>(*entity) {
            pilot.formation_offset = offset;
        }
    }
}

/// Remove every ship from the world.
pub fn clear_battlefield(world: &mut World) {
    world.clear();
}
