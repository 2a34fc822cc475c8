//! Snapshot system: queries the ECS world and builds a complete CombatSnapshot.
//!
//! This system is read-only; it never modifies the world.

use hecs::{Entity, World};

use starfighter_core::components::*;
use starfighter_core::config::CombatTuning;
use starfighter_core::enums::*;
use starfighter_core::events::CombatEvent;
use starfighter_core::state::*;
use starfighter_core::types::{Pose, SimTime};

use crate::pool::ProjectilePool;
use crate::session::CombatSession;
use crate::targeting::{lead_point, TargetLock};

/// Engine state the snapshot is built from.
pub struct SnapshotSource<'a> {
    pub world: &'a World,
    pub time: SimTime,
    pub paused: bool,
    pub time_scale: f64,
    pub session: Option<&'a CombatSession>,
    pub squadron: &'a [Entity],
    pub hostiles: &'a [Entity],
    pub controlled: Option<Entity>,
    pub pool: &'a ProjectilePool,
    pub lock: &'a TargetLock,
    pub tuning: &'a CombatTuning,
}

/// Build a complete snapshot from the current world state.
pub fn build_snapshot(
    src: &SnapshotSource,
    events: Vec<CombatEvent>,
    result: Option<SessionResult>,
) -> CombatSnapshot {
    CombatSnapshot {
        time: src.time,
        phase: src
            .session
            .map(|s| s.phase())
            .unwrap_or(SessionPhase::Inactive),
        paused: src.paused,
        time_scale: src.time_scale,
        outcome: src.session.and_then(|s| s.outcome),
        wave: build_wave(src.session),
        squadron: build_squadron(src),
        hostiles: build_hostiles(src),
        projectiles: build_projectiles(src.pool),
        hud: build_hud(src),
        events,
        result,
    }
}

fn build_wave(session: Option<&CombatSession>) -> WaveView {
    let Some(session) = session else {
        return WaveView::default();
    };
    WaveView {
        number: session.wave_number(),
        total: session.total_waves(),
        waiting_for_next: session.waiting_for_next_wave,
        next_wave_timer: session.next_wave_timer,
        exit_timer: session.outcome.map(|_| session.exit_timer),
    }
}

fn build_squadron(src: &SnapshotSource) -> Vec<ShipView> {
    src.squadron
        .iter()
        .filter_map(|&entity| {
            let mut query = src
                .world
                .query_one::<(&Pose, &Flight, &Integrity, &Pilot, &Visual)>(entity)
                .ok()?;
            let (pose, flight, integrity, pilot, visual) = query.get()?;
            Some(ShipView {
                id: entity.to_bits().get(),
                name: pilot.name.clone(),
                hull: pilot.hull,
                position: pose.position,
                rotation: pose.rotation,
                speed: flight.speed,
                health: integrity.health,
                max_health: integrity.max_health,
                shields: integrity.shields,
                max_shields: integrity.max_shields,
                energy: pilot.energy,
                controlled: src.controlled == Some(entity),
                has_model: matches!(visual, Visual::Model(_)),
            })
        })
        .collect()
}

fn build_hostiles(src: &SnapshotSource) -> Vec<HostileView> {
    src.hostiles
        .iter()
        .filter_map(|&entity| {
            let mut query = src
                .world
                .query_one::<(&Pose, &Integrity, &HostileBrain)>(entity)
                .ok()?;
            let (pose, integrity, brain) = query.get()?;
            Some(HostileView {
                id: entity.to_bits().get(),
                archetype: brain.archetype,
                state: brain.state,
                position: pose.position,
                rotation: pose.rotation,
                health: integrity.health,
                max_health: integrity.max_health,
                shields: integrity.shields,
                max_shields: integrity.max_shields,
                locked: src.lock.target == Some(entity),
            })
        })
        .collect()
}

fn build_projectiles(pool: &ProjectilePool) -> Vec<ProjectileView> {
    pool.active()
        .map(|(slot, p)| ProjectileView {
            slot,
            kind: p.kind,
            owner: p.owner,
            position: p.position,
            velocity: p.velocity,
        })
        .collect()
}

fn build_hud(src: &SnapshotSource) -> HudView {
    let mut hud = HudView {
        hostiles_remaining: src.hostiles.len() as u32,
        squadron_size: src.squadron.len() as u32,
        ..Default::default()
    };

    let Some(controlled) = src.controlled else {
        return hud;
    };
    if let Ok(mut query) = src
        .world
        .query_one::<(&Pose, &Flight, &Integrity, &Pilot, &Armament)>(controlled)
    {
        if let Some((pose, flight, integrity, pilot, armament)) = query.get() {
            hud.health_pct = integrity.health_fraction();
            hud.shield_pct = integrity.shield_fraction();
            hud.energy = pilot.energy;
            hud.speed = flight.speed;
            hud.weapon = armament.current_weapon;

            if let Some(target) = src.lock.target {
                if let Ok(target_pose) = src.world.get::<&Pose>(target) {
                    hud.locked = true;
                    hud.lock_target = Some(target.to_bits().get());
                    hud.lock_distance = Some(pose.position.distance(target_pose.position));
                }
            }
        }
    }
    hud.lead_point = lead_point(src.world, src.lock, Some(controlled), src.tuning);
    hud
}
