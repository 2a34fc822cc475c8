//! Squadron system: flies the controlled ship from input and the wingmen
//! in formation, and collects the shots they want to fire.

use glam::{DQuat, DVec3};
use hecs::{Entity, World};

use starfighter_core::commands::{InputAction, InputSnapshot};
use starfighter_core::components::{Armament, Flight, Integrity, Pilot};
use starfighter_core::combat::regen_shields;
use starfighter_core::config::CombatTuning;
use starfighter_core::constants::*;
use starfighter_core::enums::{Role, WeaponKind};
use starfighter_core::events::CombatEvent;
use starfighter_core::types::{ease, look_rotation, slerp_towards, Pose, Velocity, UP};

use crate::guidance::aim_point;
use crate::pool::Shot;

/// Read-only inputs for one squadron pass.
pub struct SquadronContext<'a> {
    pub dt: f64,
    pub tuning: &'a CombatTuning,
    pub input: &'a InputSnapshot,
    pub controlled: Option<Entity>,
    pub squadron: &'a [Entity],
    /// Living hostiles and their positions at the start of the step.
    pub hostiles: &'a [(Entity, DVec3)],
    /// Locked target position and velocity, if the lock is valid.
    pub lock: Option<(DVec3, DVec3)>,
}

/// Leader state wingmen fly against.
#[derive(Clone, Copy)]
struct LeaderState {
    pose: Pose,
    speed: f64,
}

/// Why a trigger pull did not produce a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotRejected {
    /// Not enough energy.
    Energy,
    /// Missiles need a lock.
    LockRequired,
    /// Weapon still cycling.
    Cooldown,
}

/// Run the squadron pass. Shots are appended to `shots`.
pub fn run(
    world: &mut World,
    ctx: &SquadronContext,
    shots: &mut Vec<Shot>,
    events: &mut Vec<CombatEvent>,
) {
    let Some(controlled) = ctx.controlled else {
        return;
    };

    // Leader first, so wingmen track where it is this step
    fly_controlled(world, controlled, ctx, shots, events);
    let leader = {
        let Ok(pose) = world.get::<&Pose>(controlled).map(|p| *p) else {
            return;
        };
        let speed = world.get::<&Flight>(controlled).map(|f| f.speed).unwrap_or(0.0);
        LeaderState { pose, speed }
    };

    for &entity in ctx.squadron.iter().filter(|&&e| e != controlled) {
        fly_wingman(world, entity, leader, ctx, shots);
    }
}

fn fly_controlled(
    world: &mut World,
    entity: Entity,
    ctx: &SquadronContext,
    shots: &mut Vec<Shot>,
    events: &mut Vec<CombatEvent>,
) {
    let dt = ctx.dt;
    let input = ctx.input;
    let Ok((pose, velocity, flight, armament, pilot, integrity)) = world
        .query_one_mut::<(
            &mut Pose,
            &mut Velocity,
            &mut Flight,
            &mut Armament,
            &mut Pilot,
            &mut Integrity,
        )>(entity)
    else {
        return;
    };

    // Rate control: + pitch noses up, + yaw turns left, roll is faster
    let turn = flight.turn_rate * dt;
    pose.rotate_local(
        DVec3::X,
        input.axis(InputAction::PitchUp, InputAction::PitchDown) * turn,
    );
    pose.rotate_local(
        DVec3::Y,
        input.axis(InputAction::YawLeft, InputAction::YawRight) * turn,
    );
    pose.rotate_local(
        DVec3::Z,
        input.axis(InputAction::RollLeft, InputAction::RollRight) * turn * ROLL_RATE_FACTOR,
    );

    if input.pressed(InputAction::SelectLaser) {
        armament.current_weapon = WeaponKind::Laser;
    }
    if input.pressed(InputAction::SelectMissile) {
        armament.current_weapon = WeaponKind::Missile;
    }

    tick_weapon_timers(armament, pilot, dt);
    if input.pressed(InputAction::Fire) {
        match try_shoot(pose, armament, pilot, ctx.lock, ctx.tuning) {
            Ok(shot) => shots.push(shot),
            Err(ShotRejected::LockRequired) => {
                if pilot.advisory_cooldown <= 0.0 {
                    pilot.advisory_cooldown = MISSILE_ADVISORY_INTERVAL_SECS;
                    tracing::info!(ship = %pilot.name, "Missile lock required");
                    events.push(CombatEvent::MissileLockRequired);
                }
            }
            Err(_) => {}
        }
    }

    // Throttle
    let boosting = input.pressed(InputAction::Boost) && pilot.energy > 0.0;
    let accelerating = input.pressed(InputAction::ThrottleUp) || boosting;
    let decelerating = input.pressed(InputAction::ThrottleDown);
    if boosting {
        pilot.energy = (pilot.energy - BOOST_DRAIN_RATE * dt).max(0.0);
    }
    if accelerating {
        flight.speed += THROTTLE_ACCELERATION * dt;
    }
    if decelerating {
        flight.speed -= THROTTLE_ACCELERATION * dt;
    }
    if !accelerating && !decelerating {
        flight.speed = ease(flight.speed, CRUISE_SPEED.min(flight.max_speed), dt);
    }
    let cap = if boosting {
        flight.max_speed * BOOST_SPEED_FACTOR
    } else {
        flight.max_speed
    };
    flight.speed = flight.speed.clamp(0.0, cap.max(0.0));

    velocity.0 = pose.forward() * flight.speed;
    integrate(pose, velocity, pilot, integrity, dt);
}

fn fly_wingman(
    world: &mut World,
    entity: Entity,
    leader: LeaderState,
    ctx: &SquadronContext,
    shots: &mut Vec<Shot>,
) {
    let dt = ctx.dt;
    let tuning = ctx.tuning;
    let Ok((pose, velocity, flight, armament, pilot, integrity)) = world
        .query_one_mut::<(
            &mut Pose,
            &mut Velocity,
            &mut Flight,
            &mut Armament,
            &mut Pilot,
            &mut Integrity,
        )>(entity)
    else {
        return;
    };

    let steer = formation_steering(pose, flight, pilot.formation_offset, leader, tuning, dt);
    pose.rotation = steer.rotation;
    flight.speed = steer.speed;

    // Cover fire: nearest hostile on radar, only if already lined up
    tick_weapon_timers(armament, pilot, dt);
    let nearest = ctx
        .hostiles
        .iter()
        .map(|&(_, p)| (p, pose.position.distance(p)))
        .filter(|&(_, d)| d < tuning.wingman_radar_range)
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((target, _)) = nearest {
        let lined_up = pose
            .alignment_to(target)
            .is_some_and(|dot| dot > tuning.wingman_fire_cone);
        if lined_up {
            if let Ok(shot) = try_shoot(pose, armament, pilot, ctx.lock, tuning) {
                shots.push(shot);
            }
        }
    }

    velocity.0 = pose.forward() * flight.speed;
    integrate(pose, velocity, pilot, integrity, dt);
}

/// Result of one formation-keeping evaluation.
#[derive(Debug, Clone, Copy)]
pub struct FormationSteer {
    pub rotation: DQuat,
    pub speed: f64,
    /// Slot position in world space.
    pub slot: DVec3,
}

/// Steer toward the formation slot while out of tolerance, otherwise
/// match the leader's heading. Speed follows the leader with a correction
/// for longitudinal error and a catch-up burst when far from the slot.
fn formation_steering(
    pose: &Pose,
    flight: &Flight,
    offset: DVec3,
    leader: LeaderState,
    tuning: &CombatTuning,
    dt: f64,
) -> FormationSteer {
    let slot = leader.pose.to_world(offset);
    let slot_distance = pose.position.distance(slot);

    let error = leader.pose.to_local(pose.position) - offset;
    let lateral = (error.x * error.x + error.y * error.y).sqrt();

    let blend = tuning.formation_turn_rate * dt;
    let rotation = if lateral > tuning.formation_lateral_tolerance
        || error.z.abs() > tuning.formation_longitudinal_tolerance
    {
        slerp_towards(pose.rotation, look_rotation(pose.position, slot, UP), blend)
    } else {
        slerp_towards(pose.rotation, leader.pose.rotation, blend)
    };

    // +Z error means the wingman sits behind its slot
    let burst_cap = flight.max_speed * BOOST_SPEED_FACTOR;
    let mut desired = leader.speed
        + (error.z * tuning.formation_speed_gain)
            .clamp(-tuning.formation_max_slowdown, tuning.formation_max_catch_up);
    if slot_distance > tuning.formation_catch_up_range {
        desired = (desired + tuning.formation_catch_up_bonus).min(burst_cap);
    }
    let desired = desired.min(burst_cap).max(0.0);

    FormationSteer {
        rotation,
        speed: ease(flight.speed, desired, tuning.formation_speed_ease * dt),
        slot,
    }
}

/// Formation evaluation for one wingman against a leader, without
/// touching the world.
pub fn evaluate_formation(
    pose: &Pose,
    flight: &Flight,
    offset: DVec3,
    leader_pose: &Pose,
    leader_speed: f64,
    tuning: &CombatTuning,
    dt: f64,
) -> FormationSteer {
    formation_steering(
        pose,
        flight,
        offset,
        LeaderState {
            pose: *leader_pose,
            speed: leader_speed,
        },
        tuning,
        dt,
    )
}

fn tick_weapon_timers(armament: &mut Armament, pilot: &mut Pilot, dt: f64) {
    armament.cooldown = (armament.cooldown - dt).max(0.0);
    pilot.advisory_cooldown = (pilot.advisory_cooldown - dt).max(0.0);
}

/// Pull the trigger on the selected weapon.
///
/// Checks energy, then the missile lock requirement, then the cooldown.
/// Missiles aim at the lead point of the locked target, falling back to its
/// current position; lasers fire straight ahead.
pub fn try_shoot(
    pose: &Pose,
    armament: &mut Armament,
    pilot: &mut Pilot,
    lock: Option<(DVec3, DVec3)>,
    tuning: &CombatTuning,
) -> Result<Shot, ShotRejected> {
    let kind = armament.current_weapon;
    let (cost, rate) = match kind {
        WeaponKind::Laser => (LASER_ENERGY_COST, LASER_COOLDOWN_SECS),
        WeaponKind::Missile => (MISSILE_ENERGY_COST, MISSILE_COOLDOWN_SECS),
    };
    if pilot.energy < cost {
        return Err(ShotRejected::Energy);
    }
    if kind == WeaponKind::Missile && lock.is_none() {
        return Err(ShotRejected::LockRequired);
    }
    if armament.cooldown > 0.0 {
        return Err(ShotRejected::Cooldown);
    }

    armament.cooldown = rate;
    pilot.energy = (pilot.energy - cost).max(0.0);

    let forward = pose.forward();
    let origin = pose.position + forward * MUZZLE_OFFSET;
    let direction = match (kind, lock) {
        (WeaponKind::Missile, Some((target_pos, target_vel))) => {
            let aim = aim_point(origin, target_pos, target_vel, tuning.projectile_speed(kind));
            (aim - origin).try_normalize().unwrap_or(forward)
        }
        _ => forward,
    };

    Ok(Shot {
        origin,
        direction,
        owner: Role::Player,
        kind,
        damage: Some(armament.damage.get(kind)),
    })
}

/// Move, clamp to the arena, regenerate energy and shields.
fn integrate(
    pose: &mut Pose,
    velocity: &Velocity,
    pilot: &mut Pilot,
    integrity: &mut Integrity,
    dt: f64,
) {
    pose.position += velocity.0 * dt;
    pose.position = pose.position.clamp(
        DVec3::new(-ARENA_HALF_WIDTH, -ARENA_HALF_HEIGHT, -ARENA_HALF_WIDTH),
        DVec3::new(ARENA_HALF_WIDTH, ARENA_HALF_HEIGHT, ARENA_HALF_WIDTH),
    );
    pilot.energy = (pilot.energy + ENERGY_REGEN_RATE * dt).min(MAX_ENERGY);
    regen_shields(integrity, dt);
}
