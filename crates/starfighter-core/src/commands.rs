//! Input and session commands sent from the caller to the simulation.
//!
//! Per-frame flight input arrives as an [`InputSnapshot`]. Session control
//! arrives as [`SessionCommand`]s, queued and processed at the next step
//! boundary.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::design::{PilotBonuses, ShipDesign};
use crate::wave::WavePlan;

/// Abstract flight and weapon actions. No device details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InputAction {
    PitchUp,
    PitchDown,
    YawLeft,
    YawRight,
    RollLeft,
    RollRight,
    ThrottleUp,
    ThrottleDown,
    Boost,
    Fire,
    SelectLaser,
    SelectMissile,
    /// Edge-triggered: acquire a lock, or drop the current one.
    ToggleLock,
    /// Edge-triggered: hand control to the next squadron ship.
    SwitchShip,
}

/// Set of actions held down during one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub actions: BTreeSet<InputAction>,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper.
    pub fn with(mut self, action: InputAction) -> Self {
        self.actions.insert(action);
        self
    }

    pub fn pressed(&self, action: InputAction) -> bool {
        self.actions.contains(&action)
    }

    /// -1, 0 or +1 from a pair of opposing actions.
    pub fn axis(&self, positive: InputAction, negative: InputAction) -> f64 {
        let mut value = 0.0;
        if self.pressed(positive) {
            value += 1.0;
        }
        if self.pressed(negative) {
            value -= 1.0;
        }
        value
    }
}

impl FromIterator<InputAction> for InputSnapshot {
    fn from_iter<I: IntoIterator<Item = InputAction>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

/// Session-level control.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionCommand {
    /// Start a new session. Replaces any running one.
    Start {
        #[serde(default)]
        designs: Vec<ShipDesign>,
        #[serde(default)]
        wave_plan: Option<WavePlan>,
        #[serde(default)]
        bonuses: PilotBonuses,
    },
    /// Abandon the running session without a result.
    Stop,
    /// Freeze all timers and movement.
    Pause,
    Resume,
    /// Set time scale (1.0 = normal, 0.0 = frozen).
    SetTimeScale { scale: f64 },
}
