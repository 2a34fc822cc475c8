//! Combat engine: the core of the game.
//!
//! `CombatEngine` owns the hecs ECS world, processes session commands,
//! runs all systems in a fixed order and produces `CombatSnapshot`s.
//! Completely headless, enabling deterministic testing.

use std::collections::VecDeque;

use glam::DVec3;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use starfighter_core::assets::{ModelLoader, NullLoader};
use starfighter_core::commands::{InputAction, InputSnapshot, SessionCommand};
use starfighter_core::components::{Integrity, Ship};
use starfighter_core::config::CombatTuning;
use starfighter_core::constants::{
    HOSTILE_EXPLOSION_SCALE, MAX_STEP_DT, MAX_SUB_STEPS, SHIP_EXPLOSION_SCALE,
};
use starfighter_core::design::{PilotBonuses, ShipDesign};
use starfighter_core::enums::{Outcome, SessionPhase};
use starfighter_core::events::CombatEvent;
use starfighter_core::state::{CombatSnapshot, SessionResult};
use starfighter_core::types::{sanitize, Pose, SimTime};
use starfighter_core::wave::WavePlan;

use crate::pool::{ProjectilePool, Shot};
use crate::session::CombatSession;
use crate::systems;
use crate::systems::snapshot::SnapshotSource;
use crate::targeting::{self, TargetLock};
use crate::world_setup;

/// Configuration for a new engine.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub tuning: CombatTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tuning: CombatTuning::default(),
        }
    }
}

/// The combat engine. Owns the ECS world and all combat state.
pub struct CombatEngine {
    world: World,
    time: SimTime,
    tuning: CombatTuning,
    rng: ChaCha8Rng,
    loader: Box<dyn ModelLoader>,
    command_queue: VecDeque<SessionCommand>,
    events: Vec<CombatEvent>,
    shot_buffer: Vec<Shot>,
    previous_input: InputSnapshot,
    paused: bool,
    time_scale: f64,

    /// Canonical ship collections, in spawn order.
    squadron: Vec<Entity>,
    hostiles: Vec<Entity>,
    controlled: Option<Entity>,
    pool: ProjectilePool,
    lock: TargetLock,
    session: Option<CombatSession>,
    /// Result waiting to be collected with `take_result`.
    result: Option<SessionResult>,
}

impl CombatEngine {
    /// Create an engine with no model loader.
    pub fn new(config: SimConfig) -> Self {
        Self::with_loader(config, Box::new(NullLoader))
    }

    /// Create an engine that resolves ship models through `loader`.
    pub fn with_loader(config: SimConfig, loader: Box<dyn ModelLoader>) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            tuning: config.tuning,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            loader,
            command_queue: VecDeque::new(),
            events: Vec::new(),
            shot_buffer: Vec::new(),
            previous_input: InputSnapshot::default(),
            paused: false,
            time_scale: 1.0,
            squadron: Vec::new(),
            hostiles: Vec::new(),
            controlled: None,
            pool: ProjectilePool::new(),
            lock: TargetLock::default(),
            session: None,
            result: None,
        }
    }

    /// Queue a session command for processing at the next step boundary.
    pub fn queue_command(&mut self, command: SessionCommand) {
        self.command_queue.push_back(command);
    }

    /// Start a session with default pilot bonuses.
    pub fn start(&mut self, designs: Vec<ShipDesign>, plan: Option<WavePlan>) {
        self.start_with_bonuses(designs, plan, PilotBonuses::default());
    }

    /// Start a session. Any running session is discarded without a result.
    pub fn start_with_bonuses(
        &mut self,
        designs: Vec<ShipDesign>,
        plan: Option<WavePlan>,
        bonuses: PilotBonuses,
    ) {
        self.reset_battlefield();
        self.time = SimTime::default();
        self.paused = false;
        self.result = None;

        let designs = if designs.is_empty() {
            vec![ShipDesign::rookie()]
        } else {
            designs
        };

        let offsets = world_setup::formation_offsets(designs.len().saturating_sub(1));
        for (index, design) in designs.iter().enumerate() {
            let offset = if index == 0 {
                DVec3::ZERO
            } else {
                offsets[index - 1]
            };
            let entity = world_setup::spawn_squadron_ship(
                &mut self.world,
                self.loader.as_mut(),
                design,
                &bonuses,
                offset,
                offset,
            );
            self.squadron.push(entity);
        }
        self.controlled = self.squadron.first().copied();

        let session = CombatSession::new(plan);
        tracing::info!(
            ships = self.squadron.len(),
            waves = session.total_waves(),
            hostiles = session.wave_plan.total_hostiles(),
            "Combat session started"
        );
        self.session = Some(session);
        self.spawn_next_wave();
    }

    /// Abandon the running session. Safe to call between any two steps.
    pub fn stop(&mut self) {
        if self.session.take().is_some() {
            tracing::info!("Combat session stopped");
        }
        self.reset_battlefield();
        self.paused = false;
    }

    /// Take the result of the last finished session. Returns it only once.
    pub fn take_result(&mut self) -> Option<SessionResult> {
        self.result.take()
    }

    /// Advance by `dt` seconds (scaled by the time scale) with this frame's
    /// input. Commands queued since the last step are applied first. Long
    /// frames run as several sub-steps of at most [`MAX_STEP_DT`]; key-press
    /// actions fire once per frame, on the first sub-step.
    pub fn step(&mut self, dt: f64, input: &InputSnapshot) -> CombatSnapshot {
        self.process_commands();

        let mut finished = None;
        let running = self
            .session
            .as_ref()
            .is_some_and(|s| s.phase() != SessionPhase::Finished);
        if running && !self.paused {
            let total = sanitize(dt * self.time_scale);
            let sub_steps = sub_step_count(total);
            let sub_dt = total / f64::from(sub_steps);
            self.handle_edge_actions(input);
            for _ in 0..sub_steps {
                self.time.advance(sub_dt);
                finished = self.run_systems(sub_dt, input);
                if finished.is_some() {
                    break;
                }
            }
        }
        self.previous_input = input.clone();

        if let Some(result) = finished {
            self.lock.clear();
            self.result = Some(result);
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.snapshot_source(), events, finished)
    }

    /// Build a snapshot without advancing.
    pub fn snapshot(&self) -> CombatSnapshot {
        systems::snapshot::build_snapshot(&self.snapshot_source(), Vec::new(), None)
    }

    pub fn phase(&self) -> SessionPhase {
        self.session
            .as_ref()
            .map(|s| s.phase())
            .unwrap_or(SessionPhase::Inactive)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.session.as_ref().and_then(|s| s.outcome)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn lock(&self) -> &TargetLock {
        &self.lock
    }

    /// Squadron ships in order; index 0 leads after any control loss.
    pub fn squadron(&self) -> &[Entity] {
        &self.squadron
    }

    pub fn hostiles(&self) -> &[Entity] {
        &self.hostiles
    }

    pub fn controlled(&self) -> Option<Entity> {
        self.controlled
    }

    pub fn projectiles(&self) -> &ProjectilePool {
        &self.pool
    }

    pub fn session(&self) -> Option<&CombatSession> {
        self.session.as_ref()
    }

    /// Mutable world access for tests that need to stage a situation.
    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[cfg(test)]
    pub(crate) fn pool_mut(&mut self) -> &mut ProjectilePool {
        &mut self.pool
    }

    #[cfg(test)]
    pub(crate) fn lock_mut(&mut self) -> &mut TargetLock {
        &mut self.lock
    }

    fn snapshot_source(&self) -> SnapshotSource<'_> {
        SnapshotSource {
            world: &self.world,
            time: self.time,
            paused: self.paused,
            time_scale: self.time_scale,
            session: self.session.as_ref(),
            squadron: &self.squadron,
            hostiles: &self.hostiles,
            controlled: self.controlled,
            pool: &self.pool,
            lock: &self.lock,
            tuning: &self.tuning,
        }
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single session command.
    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Start {
                designs,
                wave_plan,
                bonuses,
            } => self.start_with_bonuses(designs, wave_plan, bonuses),
            SessionCommand::Stop => self.stop(),
            SessionCommand::Pause => {
                if self.session.is_some() {
                    self.paused = true;
                }
            }
            SessionCommand::Resume => {
                self.paused = false;
            }
            SessionCommand::SetTimeScale { scale } => {
                self.time_scale = sanitize(scale).min(4.0);
            }
        }
    }

    /// Run all systems in contract order. Returns the session result on
    /// the step the session finishes.
    fn run_systems(&mut self, dt: f64, input: &InputSnapshot) -> Option<SessionResult> {
        let step = self.time.step;

        // (a) Squadron: input, formation, wingman fire
        let hostile_positions: Vec<(Entity, DVec3)> = self
            .hostiles
            .iter()
            .filter_map(|&e| self.world.get::<&Pose>(e).ok().map(|p| (e, p.position)))
            .collect();
        let lock = targeting::locked_target(&self.world, &self.lock).map(|(_, p, v)| (p, v));
        systems::squadron::run(
            &mut self.world,
            &systems::squadron::SquadronContext {
                dt,
                tuning: &self.tuning,
                input,
                controlled: self.controlled,
                squadron: &self.squadron,
                hostiles: &hostile_positions,
                lock,
            },
            &mut self.shot_buffer,
            &mut self.events,
        );
        self.commit_shots(step);

        // (b) Hostile AI
        let target = self.controlled_position();
        systems::hostile_ai::run(
            &mut self.world,
            &self.hostiles,
            target,
            &mut self.rng,
            dt,
            &self.tuning,
            &mut self.shot_buffer,
        );
        self.commit_shots(step);

        // (c) Projectiles
        self.pool.step(dt);

        // (d) Collision, then removals
        let outcome = systems::collision::run(
            &mut self.world,
            &mut self.pool,
            &self.hostiles,
            &self.squadron,
            step,
            &self.tuning,
            &mut self.events,
        );
        for entity in outcome.destroyed_hostiles {
            self.destroy_hostile(entity);
        }
        for entity in outcome.destroyed_squadron {
            self.destroy_ship(entity);
        }

        // (e) Targeting
        targeting::update(
            &self.world,
            &mut self.lock,
            self.controlled,
            &self.hostiles,
            dt,
            &self.tuning,
            &mut self.events,
        );

        // (f) Session
        let session = self.session.as_mut()?;
        let signal = systems::session::run(
            session,
            self.hostiles.len(),
            self.squadron.len(),
            dt,
            &self.tuning,
            &mut self.events,
        );
        if signal.spawn_next_wave {
            self.spawn_next_wave();
        }
        signal.finished
    }

    /// Toggle-lock and switch-ship fire once per key press.
    fn handle_edge_actions(&mut self, input: &InputSnapshot) {
        let pressed =
            |action| input.pressed(action) && !self.previous_input.pressed(action);
        let switch = pressed(InputAction::SwitchShip);
        let toggle = pressed(InputAction::ToggleLock);

        if switch {
            self.cycle_control();
        }
        if toggle {
            targeting::toggle(
                &self.world,
                &mut self.lock,
                self.controlled,
                &self.hostiles,
                &self.tuning,
                &mut self.events,
            );
        }
    }

    fn commit_shots(&mut self, step: u64) {
        for shot in self.shot_buffer.drain(..) {
            self.pool.fire(shot, &self.tuning, step);
        }
    }

    fn controlled_position(&self) -> Option<DVec3> {
        self.controlled
            .and_then(|e| self.world.get::<&Pose>(e).ok().map(|p| p.position))
    }

    fn spawn_next_wave(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some((number, wave)) = session.advance_wave() else {
            return;
        };
        let anchor = self
            .controlled
            .and_then(|e| self.world.get::<&Pose>(e).ok().map(|p| p.position))
            .unwrap_or(DVec3::ZERO);
        let spawned = systems::wave_spawner::spawn_wave(
            &mut self.world,
            self.loader.as_mut(),
            &mut self.rng,
            &wave,
            anchor,
            &self.tuning,
        );
        tracing::info!(wave = number, hostiles = spawned.len(), "Wave incoming");
        self.events.push(CombatEvent::WaveStart {
            number,
            hostiles: spawned.len() as u32,
        });
        self.hostiles.extend(spawned);
    }

    fn destroy_hostile(&mut self, entity: Entity) {
        if self.lock.target == Some(entity) && self.lock.clear() {
            self.events.push(CombatEvent::LockLost);
        }
        self.remove_entity(entity, HOSTILE_EXPLOSION_SCALE);
        self.hostiles.retain(|&e| e != entity);
    }

    /// Remove a squadron ship. Control falls to the first remaining ship
    /// if the controlled one died, and the V is re-laid either way.
    fn destroy_ship(&mut self, entity: Entity) {
        self.remove_entity(entity, SHIP_EXPLOSION_SCALE);
        self.squadron.retain(|&e| e != entity);

        if self.controlled == Some(entity) {
            self.controlled = self.squadron.first().copied();
            match self.controlled {
                Some(next) => {
                    tracing::info!(
                        ship = next.to_bits().get(),
                        "Controlled ship lost, control transferred"
                    );
                    self.events.push(CombatEvent::ControlTransferred {
                        ship: next.to_bits().get(),
                    });
                }
                None => {
                    if self.lock.clear() {
                        self.events.push(CombatEvent::LockLost);
                    }
                }
            }
        }
        if let Some(leader) = self.controlled {
            world_setup::assign_formation(&mut self.world, &self.squadron, leader);
        }
    }

    fn remove_entity(&mut self, entity: Entity, scale: f64) {
        let role = self
            .world
            .get::<&Ship>(entity)
            .map(|s| s.role)
            .ok();
        let position = self.world.get::<&Pose>(entity).map(|p| p.position).ok();
        if let (Some(role), Some(position)) = (role, position) {
            self.events.push(CombatEvent::EntityDestroyed {
                id: entity.to_bits().get(),
                role,
                position,
                scale,
            });
        }
        let _ = self.world.despawn(entity);
    }

    /// Hand control to the next squadron ship, wrapping around.
    fn cycle_control(&mut self) {
        if self.squadron.len() <= 1 {
            return;
        }
        let current = self
            .controlled
            .and_then(|c| self.squadron.iter().position(|&e| e == c))
            .unwrap_or(0);
        let next = self.squadron[(current + 1) % self.squadron.len()];
        self.controlled = Some(next);
        world_setup::assign_formation(&mut self.world, &self.squadron, next);
        tracing::info!(ship = next.to_bits().get(), "Control switched");
        self.events.push(CombatEvent::ControlTransferred {
            ship: next.to_bits().get(),
        });
    }

    /// Despawn everything and drop the lock and pool.
    fn reset_battlefield(&mut self) {
        world_setup::clear_battlefield(&mut self.world);
        self.squadron.clear();
        self.hostiles.clear();
        self.controlled = None;
        self.pool.clear();
        self.lock.clear();
        self.shot_buffer.clear();
        self.events.clear();
    }

    /// True if `entity` is a living ship.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.world
            .get::<&Integrity>(entity)
            .map(|i| !i.is_destroyed())
            .unwrap_or(false)
    }
}

/// Number of sub-steps needed to integrate `total` seconds. Always at least one.
fn sub_step_count(total: f64) -> u32 {
    let needed = (total / MAX_STEP_DT).ceil();
    if needed <= 1.0 {
        1
    } else if needed >= f64::from(MAX_SUB_STEPS) {
        MAX_SUB_STEPS
    } else {
        needed as u32
    }
}
