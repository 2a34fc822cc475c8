//! Target lock: acquisition, maintenance and lead aim.
//!
//! The lock holds a plain entity handle. Every use re-checks that the
//! hostile still exists and is alive, so a lock can never outlive its
//! target.

use glam::DVec3;
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use starfighter_core::components::{Armament, Integrity};
use starfighter_core::config::CombatTuning;
use starfighter_core::constants::MUZZLE_OFFSET;
use starfighter_core::events::CombatEvent;
use starfighter_core::types::{sanitize, Pose, Velocity, COINCIDENT_EPSILON};

use crate::guidance::solve_intercept;

/// Ties within this much alignment are broken by distance.
const ALIGNMENT_TIE: f64 = 0.01;

/// The player's target lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetLock {
    #[serde(skip)]
    pub target: Option<Entity>,
    /// Seconds the target has been continuously out of bounds.
    pub invalid_time: f64,
}

/// A candidate found by [`best_target`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetCandidate {
    pub entity: Entity,
    pub alignment: f64,
    pub distance: f64,
}

impl TargetLock {
    pub fn is_locked(&self) -> bool {
        self.target.is_some()
    }

    /// Drop the lock. Returns whether there was one.
    pub fn clear(&mut self) -> bool {
        self.invalid_time = 0.0;
        self.target.take().is_some()
    }

    fn set(&mut self, entity: Entity) {
        self.target = Some(entity);
        self.invalid_time = 0.0;
    }
}

/// Living, in-world hostile.
fn is_alive(world: &World, entity: Entity) -> bool {
    world
        .get::<&Integrity>(entity)
        .map(|i| !i.is_destroyed())
        .unwrap_or(false)
}

/// Pick the hostile best aligned with the shooter's nose, strictly above `threshold`.
/// Near-ties go to the closer hostile.
pub fn best_target(
    world: &World,
    shooter: &Pose,
    hostiles: &[Entity],
    threshold: f64,
) -> Option<TargetCandidate> {
    let forward = shooter.forward();
    let mut best: Option<TargetCandidate> = None;

    for &entity in hostiles {
        if !is_alive(world, entity) {
            continue;
        }
        let Ok(pose) = world.get::<&Pose>(entity) else {
            continue;
        };
        let to_target = pose.position - shooter.position;
        let distance = to_target.length();
        if distance <= COINCIDENT_EPSILON {
            continue;
        }
        let alignment = forward.dot(to_target / distance);
        if alignment <= threshold {
            continue;
        }

        let better = match best {
            None => true,
            Some(b) => {
                alignment > b.alignment + ALIGNMENT_TIE
                    || (alignment >= b.alignment - 1e-6 && distance < b.distance)
            }
        };
        if better {
            best = Some(TargetCandidate {
                entity,
                alignment,
                distance,
            });
        }
    }
    best
}

/// Toggle the lock: drop it if held, otherwise try to acquire one.
pub fn toggle(
    world: &World,
    lock: &mut TargetLock,
    shooter: Option<Entity>,
    hostiles: &[Entity],
    tuning: &CombatTuning,
    events: &mut Vec<CombatEvent>,
) {
    if lock.clear() {
        tracing::debug!("Target lock released");
        events.push(CombatEvent::LockLost);
        return;
    }

    let Some(shooter_pose) = shooter.and_then(|e| world.get::<&Pose>(e).ok().map(|p| *p)) else {
        return;
    };
    if let Some(candidate) = best_target(world, &shooter_pose, hostiles, tuning.lock_acquire_cone) {
        lock.set(candidate.entity);
        let target = candidate.entity.to_bits().get();
        tracing::debug!(target, distance = candidate.distance, "Target lock acquired");
        events.push(CombatEvent::LockAcquired { target });
    }
}

/// Per-step lock maintenance.
///
/// The lock drops at once if the target vanished or died, or if there is
/// no controlled ship. Leaving the cone or range only starts the grace
/// timer; the lock drops once it has been out of bounds longer than the
/// grace period.
pub fn update(
    world: &World,
    lock: &mut TargetLock,
    shooter: Option<Entity>,
    hostiles: &[Entity],
    dt: f64,
    tuning: &CombatTuning,
    events: &mut Vec<CombatEvent>,
) {
    let Some(target) = lock.target else {
        lock.invalid_time = 0.0;
        return;
    };

    let shooter_pose = shooter.and_then(|e| world.get::<&Pose>(e).ok().map(|p| *p));
    let target_pose = world.get::<&Pose>(target).ok().map(|p| *p);
    let (Some(shooter_pose), Some(target_pose)) = (shooter_pose, target_pose) else {
        drop_lock(lock, events, "target or shooter gone");
        return;
    };
    if !hostiles.contains(&target) || !is_alive(world, target) {
        drop_lock(lock, events, "target destroyed");
        return;
    }

    let distance = shooter_pose.position.distance(target_pose.position);
    let alignment = shooter_pose.alignment_to(target_pose.position).unwrap_or(-1.0);
    let out_of_cone = alignment < tuning.lock_maintain_cone;
    let out_of_range = distance > tuning.lock_max_range;

    if out_of_cone || out_of_range {
        lock.invalid_time += sanitize(dt);
    } else {
        lock.invalid_time = 0.0;
    }

    if lock.invalid_time > tuning.lock_grace_secs {
        drop_lock(lock, events, "target out of bounds");
    }
}

fn drop_lock(lock: &mut TargetLock, events: &mut Vec<CombatEvent>, reason: &'static str) {
    if lock.clear() {
        tracing::debug!(reason, "Target lock lost");
        events.push(CombatEvent::LockLost);
    }
}

/// Position and velocity of the locked target, if it is still valid.
pub fn locked_target(world: &World, lock: &TargetLock) -> Option<(Entity, DVec3, DVec3)> {
    let target = lock.target?;
    if !is_alive(world, target) {
        return None;
    }
    let pose = world.get::<&Pose>(target).ok()?;
    let velocity = world.get::<&Velocity>(target).map(|v| v.0).unwrap_or(DVec3::ZERO);
    Some((target, pose.position, velocity))
}

/// Lead point for the shooter's selected weapon, aimed from its muzzle.
pub fn lead_point(
    world: &World,
    lock: &TargetLock,
    shooter: Option<Entity>,
    tuning: &CombatTuning,
) -> Option<DVec3> {
    let shooter = shooter?;
    let (_, target_pos, target_vel) = locked_target(world, lock)?;
    let pose = *world.get::<&Pose>(shooter).ok()?;
    let weapon = world.get::<&Armament>(shooter).ok()?.current_weapon;
    solve_intercept(
        pose.muzzle(MUZZLE_OFFSET),
        target_pos,
        target_vel,
        tuning.projectile_speed(weapon),
    )
    .map(|i| i.point)
}
