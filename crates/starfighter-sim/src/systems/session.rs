//! Session system: wave timers, outcome detection and exit timing.
//!
//! Timers run first, then detection, so a timer set this step starts
//! counting on the next one. Squadron loss is checked before hostile
//! clearance, so a step that empties both ends in defeat.

use starfighter_core::config::CombatTuning;
use starfighter_core::enums::Outcome;
use starfighter_core::events::CombatEvent;
use starfighter_core::state::SessionResult;
use starfighter_core::types::sanitize;

use crate::session::CombatSession;

/// What the engine must do after the session pass.
#[derive(Debug, Default, PartialEq)]
pub struct SessionSignal {
    /// Spawn the next planned wave.
    pub spawn_next_wave: bool,
    /// The exit timer ran out; hand this back and stop.
    pub finished: Option<SessionResult>,
}

pub fn run(
    session: &mut CombatSession,
    hostiles_remaining: usize,
    squadron_remaining: usize,
    dt: f64,
    tuning: &CombatTuning,
    events: &mut Vec<CombatEvent>,
) -> SessionSignal {
    let dt = sanitize(dt);
    let mut signal = SessionSignal::default();
    if session.finished {
        return signal;
    }

    // Outcome decided: only the exit countdown remains
    if session.outcome.is_some() {
        session.exit_timer = (session.exit_timer - dt).max(0.0);
        if session.exit_timer <= 0.0 {
            session.finished = true;
            signal.finished = session.result();
            tracing::info!(result = ?signal.finished, "Combat session finished");
        }
        return signal;
    }

    if session.waiting_for_next_wave {
        session.next_wave_timer = (session.next_wave_timer - dt).max(0.0);
        if session.next_wave_timer <= 0.0 {
            session.waiting_for_next_wave = false;
            signal.spawn_next_wave = true;
        }
    }

    if squadron_remaining == 0 {
        signal.spawn_next_wave = false;
        if session.decide(Outcome::Defeat, tuning) {
            tracing::info!("Squadron destroyed");
            events.push(CombatEvent::CombatEnd {
                outcome: Outcome::Defeat,
            });
        }
        return signal;
    }

    if hostiles_remaining == 0 && !session.waiting_for_next_wave && !signal.spawn_next_wave {
        let number = session.wave_number();
        tracing::info!(wave = number, "Wave cleared");
        events.push(CombatEvent::WaveCleared { number });
        if session.all_waves_spawned() {
            session.decide(Outcome::Victory, tuning);
            tracing::info!(reward = ?session.reward, "Victory");
            events.push(CombatEvent::CombatEnd {
                outcome: Outcome::Victory,
            });
        } else {
            session.waiting_for_next_wave = true;
            session.next_wave_timer = tuning.wave_clear_delay_secs;
        }
    }

    signal
}
