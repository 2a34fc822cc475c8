//! Tests for the combat engine, projectile pool, targeting, formation and
//! session flow.

use glam::DVec3;
use hecs::{Entity, World};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use starfighter_core::assets::NullLoader;
use starfighter_core::commands::{InputAction, InputSnapshot, SessionCommand};
use starfighter_core::components::{Armament, Flight, HostileBrain, Integrity, Pilot};
use starfighter_core::config::CombatTuning;
use starfighter_core::design::{DesignStats, PilotBonuses, ShipDesign};
use starfighter_core::enums::*;
use starfighter_core::events::CombatEvent;
use starfighter_core::state::CombatSnapshot;
use starfighter_core::types::{Pose, Velocity};
use starfighter_core::wave::{Reward, WavePlan, WaveSpec};

use crate::engine::{CombatEngine, SimConfig};
use crate::guidance::{aim_point, solve_intercept};
use crate::pool::{ProjectilePool, Shot};
use crate::session::CombatSession;
use crate::systems::{self, collision, squadron, wave_spawner};
use crate::targeting::{self, TargetLock};
use crate::world_setup;

const DT: f64 = 1.0 / 60.0;

fn laser(origin: DVec3, direction: DVec3, owner: Role) -> Shot {
    Shot {
        origin,
        direction,
        owner,
        kind: WeaponKind::Laser,
        damage: None,
    }
}

/// A bare hostile with only what collision and targeting look at.
fn spawn_target(world: &mut World, position: DVec3, health: f64) -> Entity {
    world.spawn((
        Pose::new(position),
        Velocity::default(),
        Integrity::new(health, 0.0, 0.0, 0.0),
    ))
}

fn started_engine(ships: usize, plan: Option<WavePlan>) -> CombatEngine {
    let mut engine = CombatEngine::new(SimConfig::default());
    engine.start(vec![ShipDesign::rookie(); ships], plan);
    engine
}

/// Stage a lethal projectile on `target`, to resolve on the next step.
fn doom(engine: &mut CombatEngine, target: Entity, owner: Role) {
    let tuning = engine.tuning().clone();
    let position = engine
        .world()
        .get::<&Pose>(target)
        .map(|p| p.position)
        .unwrap();
    let shot = Shot {
        damage: Some(1.0e6),
        ..laser(position, DVec3::Y, owner)
    };
    let step = engine.time().step;
    engine.pool_mut().fire(shot, &tuning, step).unwrap();
}

fn count_events(snapshots: &[CombatSnapshot], pred: impl Fn(&CombatEvent) -> bool) -> usize {
    snapshots
        .iter()
        .flat_map(|s| s.events.iter())
        .filter(|e| pred(e))
        .count()
}

// ---- Intercept ----

#[test]
fn test_intercept_stationary_target() {
    let target = DVec3::new(0.0, 0.0, -150.0);
    let intercept = solve_intercept(DVec3::ZERO, target, DVec3::ZERO, 150.0).unwrap();
    assert!((intercept.point - target).length() < 1e-9);
    assert!((intercept.time - 1.0).abs() < 1e-9);
}

#[test]
fn test_intercept_crossing_target() {
    let shooter = DVec3::ZERO;
    let target = DVec3::new(0.0, 0.0, -100.0);
    let velocity = DVec3::new(20.0, 0.0, 0.0);
    let intercept = solve_intercept(shooter, target, velocity, 150.0).unwrap();

    // Projectile and target arrive together
    let travelled = 150.0 * intercept.time;
    assert!((intercept.point.distance(shooter) - travelled).abs() < 1e-6);
    assert!((intercept.point - (target + velocity * intercept.time)).length() < 1e-9);
    assert!(intercept.point.x > 0.0, "Lead should be ahead of the target");
}

#[test]
fn test_intercept_unreachable() {
    // Target flees faster than the projectile
    let result = solve_intercept(
        DVec3::ZERO,
        DVec3::new(0.0, 0.0, -100.0),
        DVec3::new(0.0, 0.0, -200.0),
        60.0,
    );
    assert!(result.is_none());
    assert!(solve_intercept(DVec3::ZERO, DVec3::X, DVec3::ZERO, 0.0).is_none());

    // Aim falls back to the raw position
    let aim = aim_point(
        DVec3::ZERO,
        DVec3::new(0.0, 0.0, -100.0),
        DVec3::new(0.0, 0.0, -200.0),
        60.0,
    );
    assert_eq!(aim, DVec3::new(0.0, 0.0, -100.0));
}

proptest! {
    #[test]
    fn prop_stationary_intercept_is_target(
        x in -500.0f64..500.0,
        y in -500.0f64..500.0,
        z in -500.0f64..500.0,
        speed in 10.0f64..300.0,
    ) {
        let target = DVec3::new(x, y, z);
        prop_assume!(target.length() > 1.0);
        let intercept = solve_intercept(DVec3::ZERO, target, DVec3::ZERO, speed).unwrap();
        prop_assert!((intercept.point - target).length() < 1e-6);
        prop_assert!((intercept.time - target.length() / speed).abs() < 1e-6);
    }
}

// ---- Projectile pool ----

#[test]
fn test_pool_projectile_lifetime() {
    let tuning = CombatTuning::default();
    let mut pool = ProjectilePool::new();
    let index = pool
        .fire(laser(DVec3::ZERO, DVec3::NEG_Z, Role::Player), &tuning, 0)
        .unwrap();

    let slot = pool.get(index).unwrap();
    assert_eq!(slot.damage, tuning.laser_default_damage);
    assert!((slot.velocity.length() - tuning.laser_speed).abs() < 1e-9);

    pool.step(1.0);
    assert_eq!(pool.active_count(), 1);
    assert!((pool.get(index).unwrap().position.z + tuning.laser_speed).abs() < 1e-9);

    pool.step(1.0);
    assert_eq!(pool.active_count(), 0, "Projectile should expire after its lifetime");
}

#[test]
fn test_pool_reuses_idle_slots() {
    let tuning = CombatTuning::default();
    let mut pool = ProjectilePool::new();

    for _ in 0..5 {
        let index = pool
            .fire(laser(DVec3::ZERO, DVec3::NEG_Z, Role::Player), &tuning, 0)
            .unwrap();
        pool.deactivate(index);
    }
    assert_eq!(pool.capacity(), 1, "Sequential shots should share one slot");
    assert_eq!(pool.get(0).unwrap().generation, 0);

    pool.fire(laser(DVec3::ZERO, DVec3::NEG_Z, Role::Player), &tuning, 0);
    pool.fire(laser(DVec3::ZERO, DVec3::NEG_Z, Role::Player), &tuning, 0);
    assert_eq!(pool.capacity(), 2, "Pool grows only to peak concurrency");
}

#[test]
fn test_pool_reallocates_slot_for_new_kind() {
    let tuning = CombatTuning::default();
    let mut pool = ProjectilePool::new();
    let index = pool
        .fire(laser(DVec3::ZERO, DVec3::NEG_Z, Role::Player), &tuning, 0)
        .unwrap();
    pool.deactivate(index);

    let missile = Shot {
        kind: WeaponKind::Missile,
        ..laser(DVec3::ZERO, DVec3::NEG_Z, Role::Player)
    };
    let reused = pool.fire(missile, &tuning, 0).unwrap();
    assert_eq!(reused, index);

    let slot = pool.get(reused).unwrap();
    assert_eq!(slot.kind, WeaponKind::Missile);
    assert_eq!(slot.generation, 1);
    assert_eq!(slot.damage, tuning.missile_default_damage);
    assert!((slot.velocity.length() - tuning.missile_speed).abs() < 1e-9);
}

#[test]
fn test_pool_rejects_shot_without_direction() {
    let tuning = CombatTuning::default();
    let mut pool = ProjectilePool::new();
    assert!(pool
        .fire(laser(DVec3::ZERO, DVec3::ZERO, Role::Player), &tuning, 0)
        .is_none());
    assert_eq!(pool.capacity(), 0);
}

// ---- Collision ----

#[test]
fn test_collision_hits_last_target_in_collection() {
    let tuning = CombatTuning::default();
    let mut world = World::new();
    let spot = DVec3::new(0.0, 0.0, -50.0);
    let first = spawn_target(&mut world, spot, 100.0);
    let second = spawn_target(&mut world, spot, 100.0);
    let hostiles = vec![first, second];

    let mut pool = ProjectilePool::new();
    let index = pool
        .fire(laser(spot, DVec3::NEG_Z, Role::Player), &tuning, 1)
        .unwrap();
    let mut events = Vec::new();
    let outcome = collision::run(&mut world, &mut pool, &hostiles, &[], 2, &tuning, &mut events);

    assert!(outcome.destroyed_hostiles.is_empty());
    assert_eq!(world.get::<&Integrity>(first).unwrap().health, 100.0);
    assert_eq!(world.get::<&Integrity>(second).unwrap().health, 90.0);
    assert!(!pool.get(index).unwrap().active, "Projectile is consumed by the hit");
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::Impact {
            layer: HitLayer::Hull,
            ..
        }
    )));
}

#[test]
fn test_collision_skips_projectiles_fired_this_step() {
    let tuning = CombatTuning::default();
    let mut world = World::new();
    let spot = DVec3::new(0.0, 0.0, -50.0);
    let target = spawn_target(&mut world, spot, 100.0);

    let mut pool = ProjectilePool::new();
    pool.fire(laser(spot, DVec3::NEG_Z, Role::Player), &tuning, 7);
    let mut events = Vec::new();
    collision::run(&mut world, &mut pool, &[target], &[], 7, &tuning, &mut events);

    assert_eq!(world.get::<&Integrity>(target).unwrap().health, 100.0);
    assert_eq!(pool.active_count(), 1);
    assert!(events.is_empty());
}

#[test]
fn test_collision_respects_ownership_and_reports_kills() {
    let tuning = CombatTuning::default();
    let mut world = World::new();
    let spot = DVec3::new(10.0, 0.0, 0.0);
    let hostile = spawn_target(&mut world, spot, 5.0);
    let ship = spawn_target(&mut world, spot, 5.0);

    let mut pool = ProjectilePool::new();
    pool.fire(laser(spot, DVec3::NEG_Z, Role::Hostile), &tuning, 0);
    let mut events = Vec::new();
    let outcome = collision::run(&mut world, &mut pool, &[hostile], &[ship], 1, &tuning, &mut events);

    assert_eq!(outcome.destroyed_squadron, vec![ship]);
    assert!(outcome.destroyed_hostiles.is_empty());
    assert_eq!(world.get::<&Integrity>(hostile).unwrap().health, 5.0);
}

#[test]
fn test_collision_misses_outside_hit_radius() {
    let tuning = CombatTuning::default();
    let mut world = World::new();
    let target = spawn_target(&mut world, DVec3::ZERO, 100.0);

    let mut pool = ProjectilePool::new();
    let origin = DVec3::new(tuning.hit_radius, 0.0, 0.0);
    pool.fire(laser(origin, DVec3::X, Role::Player), &tuning, 0);
    let mut events = Vec::new();
    collision::run(&mut world, &mut pool, &[target], &[], 1, &tuning, &mut events);

    assert_eq!(world.get::<&Integrity>(target).unwrap().health, 100.0);
    assert_eq!(pool.active_count(), 1);
}

// ---- Targeting ----

fn lock_scene() -> (World, Entity, Entity) {
    let mut world = World::new();
    let shooter = spawn_target(&mut world, DVec3::ZERO, 100.0);
    let hostile = spawn_target(&mut world, DVec3::new(0.0, 0.0, -100.0), 100.0);
    (world, shooter, hostile)
}

fn move_to(world: &mut World, entity: Entity, position: DVec3) {
    world.get::<&mut Pose>(entity).unwrap().position = position;
}

#[test]
fn test_lock_toggle_acquires_and_releases() {
    let tuning = CombatTuning::default();
    let (world, shooter, hostile) = lock_scene();
    let mut lock = TargetLock::default();
    let mut events = Vec::new();

    targeting::toggle(&world, &mut lock, Some(shooter), &[hostile], &tuning, &mut events);
    assert_eq!(lock.target, Some(hostile));
    assert_eq!(
        events,
        vec![CombatEvent::LockAcquired {
            target: hostile.to_bits().get()
        }]
    );

    targeting::toggle(&world, &mut lock, Some(shooter), &[hostile], &tuning, &mut events);
    assert!(!lock.is_locked());
    assert_eq!(events.last(), Some(&CombatEvent::LockLost));
}

#[test]
fn test_lock_requires_alignment() {
    let tuning = CombatTuning::default();
    let (mut world, shooter, hostile) = lock_scene();
    move_to(&mut world, hostile, DVec3::new(100.0, 0.0, -20.0));
    let mut lock = TargetLock::default();
    let mut events = Vec::new();

    targeting::toggle(&world, &mut lock, Some(shooter), &[hostile], &tuning, &mut events);
    assert!(!lock.is_locked());
    assert!(events.is_empty());
}

#[test]
fn test_best_target_breaks_ties_by_distance() {
    let mut world = World::new();
    let far = spawn_target(&mut world, DVec3::new(0.0, 0.0, -300.0), 100.0);
    let near = spawn_target(&mut world, DVec3::new(0.0, 0.0, -80.0), 100.0);
    let shooter = Pose::new(DVec3::ZERO);

    let best = targeting::best_target(&world, &shooter, &[far, near], 0.95).unwrap();
    assert_eq!(best.entity, near);
}

#[test]
fn test_best_target_needs_alignment_above_threshold() {
    let mut world = World::new();
    let ahead = spawn_target(&mut world, DVec3::new(0.0, 0.0, -100.0), 100.0);
    let abeam = spawn_target(&mut world, DVec3::new(100.0, 0.0, 0.0), 100.0);
    let shooter = Pose::new(DVec3::ZERO);

    // exactly on the threshold is not enough
    assert!(targeting::best_target(&world, &shooter, &[ahead], 1.0).is_none());
    assert!(targeting::best_target(&world, &shooter, &[abeam], 0.0).is_none());
    let best = targeting::best_target(&world, &shooter, &[ahead, abeam], 0.0).unwrap();
    assert_eq!(best.entity, ahead);
}

#[test]
fn test_lock_survives_brief_excursion() {
    let tuning = CombatTuning::default();
    let (mut world, shooter, hostile) = lock_scene();
    let mut lock = TargetLock::default();
    let mut events = Vec::new();
    targeting::toggle(&world, &mut lock, Some(shooter), &[hostile], &tuning, &mut events);

    // Behind the shooter for less than the grace period
    move_to(&mut world, hostile, DVec3::new(0.0, 0.0, 100.0));
    targeting::update(&world, &mut lock, Some(shooter), &[hostile], 0.2, &tuning, &mut events);
    assert!(lock.is_locked());

    // Back in the cone: timer resets
    move_to(&mut world, hostile, DVec3::new(0.0, 0.0, -100.0));
    targeting::update(&world, &mut lock, Some(shooter), &[hostile], 0.2, &tuning, &mut events);
    assert!(lock.is_locked());
    assert_eq!(lock.invalid_time, 0.0);

    // Out again, now past the grace period
    move_to(&mut world, hostile, DVec3::new(0.0, 0.0, 100.0));
    targeting::update(&world, &mut lock, Some(shooter), &[hostile], 0.2, &tuning, &mut events);
    targeting::update(&world, &mut lock, Some(shooter), &[hostile], 0.2, &tuning, &mut events);
    assert!(!lock.is_locked());
    assert_eq!(events.last(), Some(&CombatEvent::LockLost));
}

#[test]
fn test_lock_drops_when_target_dies() {
    let tuning = CombatTuning::default();
    let (mut world, shooter, hostile) = lock_scene();
    let mut lock = TargetLock::default();
    let mut events = Vec::new();
    targeting::toggle(&world, &mut lock, Some(shooter), &[hostile], &tuning, &mut events);

    world.despawn(hostile).unwrap();
    assert!(targeting::locked_target(&world, &lock).is_none());
    targeting::update(&world, &mut lock, Some(shooter), &[], DT, &tuning, &mut events);
    assert!(!lock.is_locked());
}

#[test]
fn test_lead_point_tracks_moving_target() {
    let tuning = CombatTuning::default();
    let mut world = World::new();
    let shooter = world_setup::spawn_squadron_ship(
        &mut world,
        &mut NullLoader,
        &ShipDesign::rookie(),
        &PilotBonuses::default(),
        DVec3::ZERO,
        DVec3::ZERO,
    );
    let hostile = spawn_target(&mut world, DVec3::new(0.0, 0.0, -100.0), 100.0);
    world.get::<&mut Velocity>(hostile).unwrap().0 = DVec3::new(10.0, 0.0, 0.0);

    let mut lock = TargetLock::default();
    let mut events = Vec::new();
    assert!(targeting::lead_point(&world, &lock, Some(shooter), &tuning).is_none());

    targeting::toggle(&world, &mut lock, Some(shooter), &[hostile], &tuning, &mut events);
    let lead = targeting::lead_point(&world, &lock, Some(shooter), &tuning).unwrap();
    assert!(lead.x > 0.0, "Lead should sit ahead of a target moving +X");
    assert!((lead.y).abs() < 1e-9);
}

proptest! {
    #[test]
    fn prop_lock_held_within_grace(total in 0.0f64..0.34, steps in 1usize..20) {
        let tuning = CombatTuning::default();
        let (mut world, shooter, hostile) = lock_scene();
        let mut lock = TargetLock::default();
        let mut events = Vec::new();
        targeting::toggle(&world, &mut lock, Some(shooter), &[hostile], &tuning, &mut events);

        move_to(&mut world, hostile, DVec3::new(0.0, 0.0, 100.0));
        let dt = total / steps as f64;
        for _ in 0..steps {
            targeting::update(&world, &mut lock, Some(shooter), &[hostile], dt, &tuning, &mut events);
        }
        prop_assert!(lock.is_locked());
    }
}

// ---- Formation ----

#[test]
fn test_formation_zero_error_is_stable() {
    let tuning = CombatTuning::default();
    let leader = Pose::new(DVec3::new(5.0, 0.0, -30.0));
    let offset = DVec3::new(-20.0, 0.0, 20.0);
    let wingman = Pose::new(leader.to_world(offset));
    let flight = Flight {
        speed: 20.0,
        max_speed: 40.0,
        turn_rate: 2.0,
    };

    let steer = squadron::evaluate_formation(&wingman, &flight, offset, &leader, 20.0, &tuning, DT);
    assert!((steer.speed - 20.0).abs() < 1e-9);
    assert!(steer.rotation.angle_between(leader.rotation) < 1e-6);
    assert!(steer.slot.distance(wingman.position) < 1e-9);
}

#[test]
fn test_formation_catches_up_when_behind() {
    let tuning = CombatTuning::default();
    let leader = Pose::new(DVec3::ZERO);
    let offset = DVec3::new(20.0, 0.0, 20.0);
    // 40 units further back than the slot
    let wingman = Pose::new(leader.to_world(offset) + DVec3::new(0.0, 0.0, 40.0));
    let flight = Flight {
        speed: 20.0,
        max_speed: 40.0,
        turn_rate: 2.0,
    };

    let steer = squadron::evaluate_formation(&wingman, &flight, offset, &leader, 20.0, &tuning, DT);
    assert!(steer.speed > 20.0, "Trailing wingman should speed up");
}

#[test]
fn test_formation_offsets_form_v() {
    let offsets = world_setup::formation_offsets(4);
    assert_eq!(offsets[0], DVec3::new(-20.0, 0.0, 20.0));
    assert_eq!(offsets[1], DVec3::new(20.0, 0.0, 20.0));
    assert_eq!(offsets[2], DVec3::new(-32.0, 0.0, 32.0));
    assert_eq!(offsets[3], DVec3::new(32.0, 0.0, 32.0));
    assert!(world_setup::formation_offsets(0).is_empty());
}

// ---- Weapons ----

#[test]
fn test_try_shoot_gates() {
    let tuning = CombatTuning::default();
    let pose = Pose::new(DVec3::ZERO);
    let mut world = World::new();
    let ship = world_setup::spawn_squadron_ship(
        &mut world,
        &mut NullLoader,
        &ShipDesign::rookie(),
        &PilotBonuses::default(),
        DVec3::ZERO,
        DVec3::ZERO,
    );
    let (armament, pilot) = world
        .query_one_mut::<(&mut Armament, &mut Pilot)>(ship)
        .unwrap();

    let shot = squadron::try_shoot(&pose, armament, pilot, None, &tuning).unwrap();
    assert_eq!(shot.kind, WeaponKind::Laser);
    assert_eq!(shot.owner, Role::Player);
    assert!((shot.direction - DVec3::NEG_Z).length() < 1e-9);
    assert_eq!(
        squadron::try_shoot(&pose, armament, pilot, None, &tuning),
        Err(squadron::ShotRejected::Cooldown)
    );

    armament.cooldown = 0.0;
    armament.current_weapon = WeaponKind::Missile;
    assert_eq!(
        squadron::try_shoot(&pose, armament, pilot, None, &tuning),
        Err(squadron::ShotRejected::LockRequired)
    );

    pilot.energy = 1.0;
    assert_eq!(
        squadron::try_shoot(&pose, armament, pilot, Some((DVec3::NEG_Z * 50.0, DVec3::ZERO)), &tuning),
        Err(squadron::ShotRejected::Energy)
    );
}

#[test]
fn test_missile_needs_lock_advisory_rate_limited() {
    let mut engine = started_engine(1, None);
    let input = InputSnapshot::new()
        .with(InputAction::SelectMissile)
        .with(InputAction::Fire);

    let snapshots: Vec<CombatSnapshot> = (0..30).map(|_| engine.step(DT, &input)).collect();
    assert_eq!(
        count_events(&snapshots, |e| *e == CombatEvent::MissileLockRequired),
        1
    );
    assert!(engine
        .projectiles()
        .active()
        .all(|(_, p)| !(p.owner == Role::Player && p.kind == WeaponKind::Missile)));
}

// ---- Waves ----

#[test]
fn test_wave_spawn_placement_and_mix() {
    let tuning = CombatTuning::default();
    let mut world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let anchor = DVec3::new(10.0, 5.0, 0.0);
    let spawned = wave_spawner::spawn_wave(
        &mut world,
        &mut NullLoader,
        &mut rng,
        &WaveSpec::new(4, None),
        anchor,
        &tuning,
    );
    assert_eq!(spawned.len(), 4);

    let center = anchor + DVec3::new(0.0, 0.0, -140.0);
    let archetypes: Vec<Archetype> = spawned
        .iter()
        .map(|&e| {
            let pose = world.get::<&Pose>(e).unwrap();
            let offset = pose.position - center;
            let radius = (offset.x * offset.x + offset.z * offset.z).sqrt();
            assert!(radius >= tuning.wave_spawn_min_radius - 1e-9);
            assert!(radius <= tuning.wave_spawn_max_radius + 1e-9);
            assert!(offset.y.abs() <= 20.0);
            world.get::<&HostileBrain>(e).unwrap().archetype
        })
        .collect();
    assert_eq!(
        archetypes,
        vec![
            Archetype::Fighter,
            Archetype::Scout,
            Archetype::Fighter,
            Archetype::Tank
        ]
    );
}

#[test]
fn test_start_spawns_first_wave() {
    let mut engine = started_engine(1, None);
    assert_eq!(engine.phase(), SessionPhase::InProgress);
    assert_eq!(engine.squadron().len(), 1);
    assert_eq!(engine.hostiles().len(), 3);

    let snap = engine.step(DT, &InputSnapshot::new());
    assert_eq!(snap.wave.number, 1);
    assert_eq!(snap.wave.total, 3);
    assert!(snap
        .events
        .contains(&CombatEvent::WaveStart { number: 1, hostiles: 3 }));
    assert_eq!(snap.hud.hostiles_remaining, 3);
}

#[test]
fn test_start_without_designs_uses_rookie() {
    let mut engine = CombatEngine::new(SimConfig::default());
    engine.queue_command(SessionCommand::Start {
        designs: Vec::new(),
        wave_plan: None,
        bonuses: PilotBonuses::default(),
    });
    let snap = engine.step(DT, &InputSnapshot::new());
    assert_eq!(snap.squadron.len(), 1);
    assert_eq!(snap.squadron[0].name, "Rookie One");
    assert!(snap.squadron[0].controlled);
}

#[test]
fn test_zero_hp_design_spawns_alive_and_can_die() {
    let design = ShipDesign {
        stats: Some(DesignStats {
            hp: Some(0.0),
            ..Default::default()
        }),
        ..ShipDesign::rookie()
    };
    let mut engine = CombatEngine::new(SimConfig::default());
    engine.start(vec![design], None);
    let ship = engine.squadron()[0];
    assert_eq!(engine.world().get::<&Integrity>(ship).unwrap().health, 100.0);

    doom(&mut engine, ship, Role::Hostile);
    engine.step(DT, &InputSnapshot::new());
    assert!(engine.squadron().is_empty());
    assert_eq!(engine.outcome(), Some(Outcome::Defeat));
}

// ---- Session ----

fn session_with_all_waves_spawned() -> CombatSession {
    let mut session = CombatSession::new(None);
    while session.advance_wave().is_some() {}
    session
}

#[test]
fn test_session_victory_reward() {
    let tuning = CombatTuning::default();
    let mut session = session_with_all_waves_spawned();
    let mut events = Vec::new();

    let signal = systems::session::run(&mut session, 0, 1, DT, &tuning, &mut events);
    assert_eq!(signal.finished, None);
    assert_eq!(session.outcome, Some(Outcome::Victory));
    assert_eq!(
        session.reward,
        Some(Reward {
            credits: Some(80),
            alloys: Some(2)
        })
    );
    assert!(events.contains(&CombatEvent::WaveCleared { number: 3 }));
    assert!(events.contains(&CombatEvent::CombatEnd {
        outcome: Outcome::Victory
    }));
}

#[test]
fn test_session_defeat_takes_precedence() {
    let tuning = CombatTuning::default();
    let mut session = session_with_all_waves_spawned();
    let mut events = Vec::new();

    systems::session::run(&mut session, 0, 0, DT, &tuning, &mut events);
    assert_eq!(session.outcome, Some(Outcome::Defeat));
    assert_eq!(session.reward, None);
    assert_eq!(
        events,
        vec![CombatEvent::CombatEnd {
            outcome: Outcome::Defeat
        }]
    );
}

#[test]
fn test_session_exit_timer_delivers_result_once() {
    let tuning = CombatTuning::default();
    let mut session = session_with_all_waves_spawned();
    let mut events = Vec::new();
    systems::session::run(&mut session, 0, 1, DT, &tuning, &mut events);

    let signal = systems::session::run(&mut session, 0, 1, 1.0, &tuning, &mut events);
    assert_eq!(signal.finished, None);
    let signal = systems::session::run(&mut session, 0, 1, 1.5, &tuning, &mut events);
    let result = signal.finished.unwrap();
    assert_eq!(result.outcome, Outcome::Victory);
    assert_eq!(session.phase(), SessionPhase::Finished);

    let signal = systems::session::run(&mut session, 0, 1, 1.0, &tuning, &mut events);
    assert_eq!(signal, systems::session::SessionSignal::default());
}

#[test]
fn test_session_waits_between_waves() {
    let tuning = CombatTuning::default();
    let mut session = CombatSession::new(None);
    session.advance_wave();
    let mut events = Vec::new();

    let signal = systems::session::run(&mut session, 0, 1, DT, &tuning, &mut events);
    assert!(!signal.spawn_next_wave);
    assert_eq!(session.phase(), SessionPhase::WaveClearedWait);
    assert_eq!(events, vec![CombatEvent::WaveCleared { number: 1 }]);

    let signal = systems::session::run(&mut session, 0, 1, 1.0, &tuning, &mut events);
    assert!(!signal.spawn_next_wave);
    let signal = systems::session::run(&mut session, 0, 1, 0.7, &tuning, &mut events);
    assert!(signal.spawn_next_wave);
    assert_eq!(events.len(), 1, "Clearance is reported once");
}

#[test]
fn test_engine_victory_flow() {
    let plan = WavePlan::new(vec![WaveSpec::new(1, Some(Archetype::Fighter))]);
    let mut engine = started_engine(1, Some(plan));
    let hostile = engine.hostiles()[0];
    doom(&mut engine, hostile, Role::Player);

    let snap = engine.step(DT, &InputSnapshot::new());
    assert!(engine.hostiles().is_empty());
    assert_eq!(engine.outcome(), Some(Outcome::Victory));
    assert!(snap.events.iter().any(|e| matches!(
        e,
        CombatEvent::EntityDestroyed {
            role: Role::Hostile,
            scale,
            ..
        } if (*scale - 2.0).abs() < 1e-9
    )));

    let mut results = Vec::new();
    for _ in 0..20 {
        let snap = engine.step(0.25, &InputSnapshot::new());
        results.extend(snap.result);
    }
    assert_eq!(results.len(), 1, "Result is delivered in exactly one snapshot");
    assert_eq!(results[0].outcome, Outcome::Victory);
    assert_eq!(
        results[0].reward,
        Some(Reward {
            credits: Some(10),
            alloys: None
        })
    );
    assert_eq!(engine.phase(), SessionPhase::Finished);
    assert_eq!(engine.take_result(), Some(results[0]));
    assert_eq!(engine.take_result(), None);
}

#[test]
fn test_engine_defeat_flow() {
    let mut engine = started_engine(1, None);
    let ship = engine.squadron()[0];
    doom(&mut engine, ship, Role::Hostile);

    let snap = engine.step(DT, &InputSnapshot::new());
    assert!(engine.squadron().is_empty());
    assert_eq!(engine.controlled(), None);
    assert_eq!(engine.outcome(), Some(Outcome::Defeat));
    assert!(snap.events.contains(&CombatEvent::CombatEnd {
        outcome: Outcome::Defeat
    }));

    let mut finished = None;
    for _ in 0..20 {
        if let Some(result) = engine.step(0.25, &InputSnapshot::new()).result {
            finished = Some(result);
        }
    }
    let result = finished.unwrap();
    assert_eq!(result.outcome, Outcome::Defeat);
    assert_eq!(result.reward, None);
}

// ---- Control ----

#[test]
fn test_control_transfers_when_controlled_ship_dies() {
    let mut engine = started_engine(3, None);
    let leader = engine.squadron()[0];
    let next = engine.squadron()[1];
    let last = engine.squadron()[2];
    doom(&mut engine, leader, Role::Hostile);

    let snap = engine.step(DT, &InputSnapshot::new());
    assert_eq!(engine.squadron(), &[next, last]);
    assert_eq!(engine.controlled(), Some(next));
    assert!(snap.events.contains(&CombatEvent::ControlTransferred {
        ship: next.to_bits().get()
    }));
    assert!(snap.events.iter().any(|e| matches!(
        e,
        CombatEvent::EntityDestroyed {
            role: Role::Player,
            scale,
            ..
        } if (*scale - 1.5).abs() < 1e-9
    )));

    let world = engine.world();
    assert_eq!(world.get::<&Pilot>(next).unwrap().formation_offset, DVec3::ZERO);
    assert_eq!(
        world.get::<&Pilot>(last).unwrap().formation_offset,
        DVec3::new(-20.0, 0.0, 20.0)
    );
    assert_eq!(engine.phase(), SessionPhase::InProgress);
}

#[test]
fn test_switch_ship_on_key_press() {
    let mut engine = started_engine(2, None);
    let first = engine.squadron()[0];
    let second = engine.squadron()[1];
    let switch = InputSnapshot::new().with(InputAction::SwitchShip);

    let a = engine.step(DT, &switch);
    let b = engine.step(DT, &switch);
    let transfers = count_events(&[a, b], |e| matches!(e, CombatEvent::ControlTransferred { .. }));
    assert_eq!(transfers, 1, "Holding the key switches once");
    assert_eq!(engine.controlled(), Some(second));

    engine.step(DT, &InputSnapshot::new());
    engine.step(DT, &switch);
    assert_eq!(engine.controlled(), Some(first));
}

#[test]
fn test_initial_squadron_in_v_formation() {
    let engine = started_engine(3, None);
    let world = engine.world();
    let positions: Vec<DVec3> = engine
        .squadron()
        .iter()
        .map(|&e| world.get::<&Pose>(e).unwrap().position)
        .collect();
    assert_eq!(positions[0], DVec3::ZERO);
    assert_eq!(positions[1], DVec3::new(-20.0, 0.0, 20.0));
    assert_eq!(positions[2], DVec3::new(20.0, 0.0, 20.0));
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let config = || SimConfig {
        seed: 12345,
        ..Default::default()
    };
    let mut engine_a = CombatEngine::new(config());
    let mut engine_b = CombatEngine::new(config());
    engine_a.start(vec![ShipDesign::rookie(); 3], None);
    engine_b.start(vec![ShipDesign::rookie(); 3], None);

    let input = InputSnapshot::new()
        .with(InputAction::ThrottleUp)
        .with(InputAction::Fire)
        .with(InputAction::YawLeft);
    for _ in 0..300 {
        let json_a = serde_json::to_string(&engine_a.step(DT, &input)).unwrap();
        let json_b = serde_json::to_string(&engine_b.step(DT, &input)).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = CombatEngine::new(SimConfig {
        seed: 111,
        ..Default::default()
    });
    let mut engine_b = CombatEngine::new(SimConfig {
        seed: 222,
        ..Default::default()
    });
    engine_a.start(Vec::new(), None);
    engine_b.start(Vec::new(), None);

    // Spawn positions come from the seed
    let json_a = serde_json::to_string(&engine_a.snapshot()).unwrap();
    let json_b = serde_json::to_string(&engine_b.snapshot()).unwrap();
    assert_ne!(json_a, json_b);
}

// ---- Commands ----

#[test]
fn test_step_before_start_is_inert() {
    let mut engine = CombatEngine::new(SimConfig::default());
    let snap = engine.step(DT, &InputSnapshot::new());
    assert_eq!(snap.phase, SessionPhase::Inactive);
    assert_eq!(engine.time().step, 0);
    assert!(snap.squadron.is_empty());
}

#[test]
fn test_pause_stops_simulation() {
    let mut engine = started_engine(1, None);
    for _ in 0..10 {
        engine.step(DT, &InputSnapshot::new());
    }
    assert_eq!(engine.time().step, 10);

    engine.queue_command(SessionCommand::Pause);
    for _ in 0..10 {
        let snap = engine.step(DT, &InputSnapshot::new());
        assert!(snap.paused);
    }
    assert_eq!(engine.time().step, 10, "Time should not advance while paused");

    engine.queue_command(SessionCommand::Resume);
    engine.step(DT, &InputSnapshot::new());
    assert_eq!(engine.time().step, 11);
}

/// An engine whose hostiles never shoot, so long frames cannot end the session.
fn ceasefire_engine() -> CombatEngine {
    let config = SimConfig {
        tuning: CombatTuning {
            ai_fire_chance: 0.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut engine = CombatEngine::new(config);
    engine.start(vec![ShipDesign::rookie()], None);
    engine
}

#[test]
fn test_time_scale_and_long_frames() {
    let mut engine = ceasefire_engine();
    engine.step(5.0, &InputSnapshot::new());
    assert!((engine.time().elapsed_secs - 5.0).abs() < 1e-9);
    assert_eq!(engine.time().step, 20, "5 s runs as 0.25 s sub-steps");

    engine.queue_command(SessionCommand::SetTimeScale { scale: 10.0 });
    engine.step(0.1, &InputSnapshot::new());
    assert_eq!(engine.time_scale(), 4.0);
    assert!((engine.time().elapsed_secs - 5.4).abs() < 1e-9);

    engine.queue_command(SessionCommand::SetTimeScale { scale: -1.0 });
    engine.step(0.1, &InputSnapshot::new());
    assert_eq!(engine.time_scale(), 0.0);
    assert!((engine.time().elapsed_secs - 5.4).abs() < 1e-9);

    engine.step(f64::NAN, &InputSnapshot::new());
    assert!((engine.time().elapsed_secs - 5.4).abs() < 1e-9);
}

#[test]
fn test_long_frame_advances_session_timers() {
    let plan = WavePlan::new(vec![
        WaveSpec::new(1, Some(Archetype::Fighter)),
        WaveSpec::new(1, Some(Archetype::Fighter)),
    ]);
    let mut engine = CombatEngine::new(SimConfig::default());
    engine.start(vec![ShipDesign::rookie()], Some(plan));

    let hostile = engine.hostiles()[0];
    doom(&mut engine, hostile, Role::Player);
    engine.step(DT, &InputSnapshot::new());
    assert_eq!(engine.phase(), SessionPhase::WaveClearedWait);

    let snap = engine.step(2.0, &InputSnapshot::new());
    assert!(snap
        .events
        .contains(&CombatEvent::WaveStart { number: 2, hostiles: 1 }));
    assert_eq!(engine.hostiles().len(), 1);

    let hostile = engine.hostiles()[0];
    doom(&mut engine, hostile, Role::Player);
    engine.step(DT, &InputSnapshot::new());
    assert_eq!(engine.outcome(), Some(Outcome::Victory));

    let snap = engine.step(3.0, &InputSnapshot::new());
    assert_eq!(snap.result.map(|r| r.outcome), Some(Outcome::Victory));
    assert_eq!(engine.phase(), SessionPhase::Finished);
}

#[test]
fn test_key_press_applies_once_per_long_frame() {
    let mut engine = started_engine(3, None);
    let second = engine.squadron()[1];
    // three sub-steps: a repeated press would wrap back to the first ship
    let snap = engine.step(0.75, &InputSnapshot::new().with(InputAction::SwitchShip));
    assert_eq!(engine.time().step, 3);
    assert_eq!(engine.controlled(), Some(second));
    let transfers = count_events(&[snap], |e| matches!(e, CombatEvent::ControlTransferred { .. }));
    assert_eq!(transfers, 1);
}

#[test]
fn test_stop_clears_battlefield() {
    let mut engine = started_engine(2, None);
    engine.step(DT, &InputSnapshot::new().with(InputAction::Fire));
    engine.queue_command(SessionCommand::Stop);
    let snap = engine.step(DT, &InputSnapshot::new());

    assert_eq!(snap.phase, SessionPhase::Inactive);
    assert_eq!(engine.world().len(), 0);
    assert!(engine.squadron().is_empty());
    assert!(engine.hostiles().is_empty());
    assert_eq!(engine.projectiles().capacity(), 0);
    assert!(!engine.lock().is_locked());
    assert_eq!(engine.take_result(), None);
}

#[test]
fn test_restart_discards_previous_session() {
    let mut engine = started_engine(2, None);
    for _ in 0..5 {
        engine.step(DT, &InputSnapshot::new());
    }
    engine.start(Vec::new(), None);
    assert_eq!(engine.squadron().len(), 1);
    assert_eq!(engine.hostiles().len(), 3);
    assert_eq!(engine.time().step, 0);
}

#[test]
fn test_model_loader_fallback() {
    let snap = started_engine(1, None).snapshot();
    assert!(!snap.squadron[0].has_model);
}
