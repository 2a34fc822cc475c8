//! Collision system: resolves active projectiles against opposing ships.
//!
//! Read-modify only: damage is applied in place, but destroyed ships are
//! returned to the engine for removal so no collection is mutated while
//! it is being scanned.

use hecs::{Entity, World};

use starfighter_core::combat::apply_damage;
use starfighter_core::components::Integrity;
use starfighter_core::config::CombatTuning;
use starfighter_core::constants::IMPACT_FULL_INTENSITY_DAMAGE;
use starfighter_core::enums::Role;
use starfighter_core::events::CombatEvent;
use starfighter_core::types::Pose;

use crate::pool::ProjectilePool;

/// Ships destroyed during the pass, in the order they died.
#[derive(Debug, Default)]
pub struct CollisionOutcome {
    pub destroyed_hostiles: Vec<Entity>,
    pub destroyed_squadron: Vec<Entity>,
}

/// Run collision resolution.
///
/// Each projectile hits at most one ship: the first within the hit radius
/// when scanning the target collection from its end. Projectiles fired on
/// `step` are skipped until the next step.
pub fn run(
    world: &mut World,
    pool: &mut ProjectilePool,
    hostiles: &[Entity],
    squadron: &[Entity],
    step: u64,
    tuning: &CombatTuning,
    events: &mut Vec<CombatEvent>,
) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();

    let candidates: Vec<usize> = pool
        .active()
        .filter(|(_, slot)| slot.fired_on_step != step)
        .map(|(i, _)| i)
        .collect();

    for index in candidates {
        let Some(slot) = pool.get(index).copied() else {
            continue;
        };
        let (targets, destroyed) = match slot.owner {
            Role::Player => (hostiles, &mut outcome.destroyed_hostiles),
            Role::Hostile => (squadron, &mut outcome.destroyed_squadron),
        };

        for &entity in targets.iter().rev() {
            if destroyed.contains(&entity) {
                continue;
            }
            let Ok((pose, integrity)) = world.query_one_mut::<(&Pose, &mut Integrity)>(entity)
            else {
                continue;
            };
            if integrity.is_destroyed() {
                continue;
            }
            if slot.position.distance(pose.position) >= tuning.hit_radius {
                continue;
            }

            let report = apply_damage(integrity, slot.damage);
            pool.deactivate(index);

            if let Some(layer) = report.layer() {
                events.push(CombatEvent::Impact {
                    position: slot.position,
                    layer,
                    intensity: (slot.damage / IMPACT_FULL_INTENSITY_DAMAGE).clamp(0.0, 1.0),
                });
            }
            if integrity.is_destroyed() {
                destroyed.push(entity);
            }
            break;
        }
    }

    outcome
}
