//! Hostile AI system: regenerates shields, evaluates the FSM for each
//! hostile and applies the resulting pose.
//!
//! Calls the FSM from starfighter-hostile-ai; shots are returned to the
//! engine rather than fired directly.

use glam::DVec3;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use starfighter_core::combat::regen_shields;
use starfighter_core::components::{Armament, Flight, HostileBrain, Integrity};
use starfighter_core::config::CombatTuning;
use starfighter_core::enums::{Role, WeaponKind};
use starfighter_core::types::{Pose, Velocity};

use starfighter_hostile_ai::fsm::{evaluate, roll, HostileContext};

use crate::pool::Shot;

/// Run the hostile pass against the ship at `target`. With no target the
/// hostiles hold still.
pub fn run(
    world: &mut World,
    hostiles: &[Entity],
    target: Option<DVec3>,
    rng: &mut ChaCha8Rng,
    dt: f64,
    tuning: &CombatTuning,
    shots: &mut Vec<Shot>,
) {
    let Some(target) = target else {
        return;
    };

    for &entity in hostiles {
        let Ok((pose, velocity, flight, armament, brain, integrity)) = world
            .query_one_mut::<(
                &mut Pose,
                &mut Velocity,
                &Flight,
                &Armament,
                &mut HostileBrain,
                &mut Integrity,
            )>(entity)
        else {
            continue;
        };

        regen_shields(integrity, dt);

        let previous = pose.position;
        let update = evaluate(&HostileContext {
            state: brain.state,
            state_timer: brain.state_timer,
            pose: *pose,
            speed: flight.speed,
            target,
            dt,
            fire_roll: roll(rng),
            tuning,
        });

        if update.state_changed {
            tracing::trace!(
                hostile = entity.to_bits().get(),
                from = ?brain.state,
                to = ?update.state,
                "Hostile state change"
            );
        }
        brain.state = update.state;
        brain.state_timer = update.state_timer;
        *pose = update.pose;
        if dt > 0.0 {
            velocity.0 = (pose.position - previous) / dt;
        }

        if let Some(order) = update.fire {
            shots.push(Shot {
                origin: order.origin,
                direction: order.direction,
                owner: Role::Hostile,
                kind: WeaponKind::Laser,
                damage: Some(armament.damage.laser),
            });
        }
    }
}
