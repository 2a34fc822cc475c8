//! Scripted pilot for headless runs: turns toward the nearest hostile,
//! keeps a lock on it and fires once the nose is on target.

use glam::DVec3;

use starfighter_core::commands::{InputAction, InputSnapshot};
use starfighter_core::state::{CombatSnapshot, HostileView, ShipView};

/// Steering dead zone, as a component of the unit direction to target.
const STEER_DEADBAND: f64 = 0.02;
/// Fire when the aim point is within this alignment of the nose.
const FIRE_ALIGNMENT: f64 = 0.98;
/// Throttle up until this close.
const ENGAGE_RANGE: f64 = 60.0;

#[derive(Debug, Default)]
pub struct Autopilot {
    /// Lock toggles on a key press, so the key must be released between
    /// attempts.
    lock_held: bool,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input for the next step, given the latest snapshot.
    pub fn input(&mut self, snapshot: &CombatSnapshot) -> InputSnapshot {
        let mut input = InputSnapshot::new();
        let Some(ship) = snapshot.squadron.iter().find(|s| s.controlled) else {
            self.lock_held = false;
            return input;
        };
        let Some(target) = pick_target(ship, &snapshot.hostiles) else {
            self.lock_held = false;
            return input;
        };

        let aim = if target.locked {
            snapshot.hud.lead_point.unwrap_or(target.position)
        } else {
            target.position
        };
        let local = ship.rotation.inverse() * (aim - ship.position);
        let distance = local.length();
        let Some(dir) = local.try_normalize() else {
            return input;
        };

        if dir.x < -STEER_DEADBAND || (dir.z > 0.0 && dir.x.abs() <= STEER_DEADBAND) {
            input = input.with(InputAction::YawLeft);
        } else if dir.x > STEER_DEADBAND {
            input = input.with(InputAction::YawRight);
        }
        if dir.y > STEER_DEADBAND {
            input = input.with(InputAction::PitchUp);
        } else if dir.y < -STEER_DEADBAND {
            input = input.with(InputAction::PitchDown);
        }
        if dir.dot(DVec3::NEG_Z) > FIRE_ALIGNMENT {
            input = input.with(InputAction::Fire);
        }
        if distance > ENGAGE_RANGE {
            input = input.with(InputAction::ThrottleUp);
        }

        let press_lock = !snapshot.hud.locked && !self.lock_held;
        if press_lock {
            input = input.with(InputAction::ToggleLock);
        }
        self.lock_held = press_lock;
        input
    }
}

/// The locked hostile if there is one, else the nearest.
fn pick_target<'a>(ship: &ShipView, hostiles: &'a [HostileView]) -> Option<&'a HostileView> {
    hostiles.iter().find(|h| h.locked).or_else(|| {
        hostiles.iter().min_by(|a, b| {
            let da = a.position.distance_squared(ship.position);
            let db = b.position.distance_squared(ship.position);
            da.total_cmp(&db)
        })
    })
}
