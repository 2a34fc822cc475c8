//! Hostile behavior finite state machine.
//!
//! Pure functions that compute state transitions, steering and fire
//! decisions for one hostile. No ECS dependency; operates on plain data.
//! The random roll for firing is supplied by the caller so the machine
//! itself stays deterministic.

use glam::DVec3;
use rand::Rng;

use starfighter_core::config::CombatTuning;
use starfighter_core::constants::{MUZZLE_OFFSET, REFERENCE_FRAME_RATE};
use starfighter_core::enums::AiState;
use starfighter_core::types::{look_rotation, sanitize, slerp_towards, Pose, UP};

/// Input to the hostile FSM for a single entity.
pub struct HostileContext<'a> {
    pub state: AiState,
    pub state_timer: f64,
    pub pose: Pose,
    /// Base cruise speed from the archetype.
    pub speed: f64,
    /// Position of the ship being hunted.
    pub target: DVec3,
    pub dt: f64,
    /// Uniform sample in `[0, 1)` used for the fire decision.
    pub fire_roll: f64,
    pub tuning: &'a CombatTuning,
}

/// A shot the hostile wants fired this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireOrder {
    pub origin: DVec3,
    pub direction: DVec3,
}

/// Output from the hostile FSM.
#[derive(Debug, Clone, Copy)]
pub struct HostileUpdate {
    pub state: AiState,
    pub state_timer: f64,
    pub pose: Pose,
    pub fire: Option<FireOrder>,
    pub state_changed: bool,
}

/// Chance to fire during one step of `dt` seconds while attacking.
///
/// `ai_fire_chance` is the per-frame chance at the reference frame rate;
/// scaling by `dt` keeps the expected fire rate the same at any frame rate.
pub fn fire_chance(dt: f64, tuning: &CombatTuning) -> f64 {
    let dt = sanitize(dt);
    let per_frame = tuning.ai_fire_chance.clamp(0.0, 1.0);
    1.0 - (1.0 - per_frame).powf(dt * REFERENCE_FRAME_RATE)
}

/// Draw the fire roll for one hostile.
pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

/// Evaluate the FSM for one hostile: count down, transition at most once,
/// then act on the resulting state.
pub fn evaluate(ctx: &HostileContext) -> HostileUpdate {
    let dt = sanitize(ctx.dt);
    let tuning = ctx.tuning;
    let distance = ctx.pose.position.distance(ctx.target);

    let mut state = ctx.state;
    let mut state_timer = ctx.state_timer - dt;

    match state {
        AiState::Chase => {
            if distance < tuning.ai_attack_range {
                state = AiState::Attack;
                state_timer = tuning.ai_attack_secs;
            }
        }
        AiState::Attack => {
            if state_timer <= 0.0 || distance < tuning.ai_break_range {
                state = AiState::Evade;
                state_timer = tuning.ai_evade_secs;
            }
        }
        AiState::Evade => {
            if state_timer <= 0.0 {
                state = AiState::Chase;
                state_timer = 0.0;
            }
        }
    }

    let mut pose = ctx.pose;
    let mut fire = None;
    match state {
        AiState::Chase => {
            let goal = look_rotation(pose.position, ctx.target, UP);
            pose.rotation = slerp_towards(pose.rotation, goal, tuning.ai_chase_turn_rate * dt);
            pose.translate_local(DVec3::NEG_Z * ctx.speed * dt);
        }
        AiState::Attack => {
            pose.rotation = look_rotation(pose.position, ctx.target, UP);
            pose.translate_local(DVec3::NEG_Z * ctx.speed * tuning.ai_attack_speed_factor * dt);
            if ctx.fire_roll < fire_chance(dt, tuning) {
                let direction = pose.forward();
                fire = Some(FireOrder {
                    origin: pose.position + direction * MUZZLE_OFFSET,
                    direction,
                });
            }
        }
        AiState::Evade => {
            pose.rotate_local(DVec3::Z, tuning.ai_evade_roll_rate * dt);
            pose.translate_local(DVec3::NEG_Z * ctx.speed * tuning.ai_evade_speed_factor * dt);
            pose.translate_local(DVec3::Y * tuning.ai_evade_climb_rate * dt);
        }
    }

    HostileUpdate {
        state,
        state_timer,
        pose,
        fire,
        state_changed: state != ctx.state,
    }
}
