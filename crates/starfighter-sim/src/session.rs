//! Combat session bookkeeping: wave progress, outcome and reward.

use serde::{Deserialize, Serialize};

use starfighter_core::config::CombatTuning;
use starfighter_core::enums::{Outcome, SessionPhase};
use starfighter_core::state::SessionResult;
use starfighter_core::wave::{Reward, WavePlan, WaveSpec};

/// State of one combat session, from start to hand-off.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatSession {
    pub wave_plan: WavePlan,
    /// Number of waves spawned so far.
    pub wave_index: usize,
    pub outcome: Option<Outcome>,
    pub waiting_for_next_wave: bool,
    pub next_wave_timer: f64,
    pub exit_timer: f64,
    pub reward: Option<Reward>,
    /// Result has been handed back; nothing more happens.
    pub finished: bool,
}

impl CombatSession {
    /// New session for `plan`, falling back to the default plan.
    pub fn new(plan: Option<WavePlan>) -> Self {
        Self {
            wave_plan: WavePlan::or_default(plan),
            ..Default::default()
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.finished {
            SessionPhase::Finished
        } else if self.outcome.is_some() {
            SessionPhase::Resolved
        } else if self.waiting_for_next_wave {
            SessionPhase::WaveClearedWait
        } else {
            SessionPhase::InProgress
        }
    }

    /// 1-based number of the most recently spawned wave.
    pub fn wave_number(&self) -> u32 {
        self.wave_index as u32
    }

    pub fn total_waves(&self) -> u32 {
        self.wave_plan.len() as u32
    }

    pub fn all_waves_spawned(&self) -> bool {
        self.wave_index >= self.wave_plan.len()
    }

    /// Take the next wave to spawn, with its 1-based number.
    pub fn advance_wave(&mut self) -> Option<(u32, WaveSpec)> {
        let wave = self.wave_plan.waves.get(self.wave_index)?.clone();
        self.wave_index += 1;
        Some((self.wave_index as u32, wave))
    }

    /// Record the outcome. Only the first call has any effect.
    pub fn decide(&mut self, outcome: Outcome, tuning: &CombatTuning) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        self.waiting_for_next_wave = false;
        self.reward = match outcome {
            Outcome::Victory => Some(
                self.wave_plan
                    .reward(tuning.credits_per_hostile, tuning.alloys_per_even_wave),
            ),
            Outcome::Defeat => None,
        };
        self.exit_timer = tuning.exit_delay_secs;
        true
    }

    /// The hand-off value, once an outcome exists.
    pub fn result(&self) -> Option<SessionResult> {
        self.outcome.map(|outcome| SessionResult {
            outcome,
            reward: self.reward.filter(|r| *r != Reward::default()),
        })
    }
}
