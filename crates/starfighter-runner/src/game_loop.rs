//! Game loop: steps the combat engine at a fixed rate.
//!
//! Two drivers share the same step: `run_headless` runs inline as fast as
//! possible, `spawn_game_loop` paces a worker thread in real time. The
//! thread owns its engine; commands and input arrive over an `mpsc`
//! channel and the latest snapshot is stored for polling.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use starfighter_core::commands::InputSnapshot;
use starfighter_core::constants::REFERENCE_FRAME_RATE;
use starfighter_core::enums::SessionPhase;
use starfighter_core::error::{CombatError, Result};
use starfighter_core::state::{CombatSnapshot, SessionResult};
use starfighter_core::types::sanitize;
use starfighter_sim::engine::{CombatEngine, SimConfig};

use crate::autopilot::Autopilot;
use crate::state::LoopCommand;

/// Simulated seconds per step.
pub const TICK_DT: f64 = 1.0 / REFERENCE_FRAME_RATE;

/// Nominal wall-clock duration of one step at 1x speed.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / REFERENCE_FRAME_RATE as u64);

/// Fly a started session to the end with the autopilot, as fast as possible.
///
/// Returns `Ok(None)` if `max_secs` of simulated time pass first.
pub fn run_headless(
    engine: &mut CombatEngine,
    autopilot: &mut Autopilot,
    max_secs: f64,
) -> Result<Option<SessionResult>> {
    if engine.phase() == SessionPhase::Inactive {
        return Err(CombatError::SessionNotActive);
    }

    let max_steps = (sanitize(max_secs) * REFERENCE_FRAME_RATE).ceil() as u64;
    let mut snapshot = engine.snapshot();
    for _ in 0..max_steps {
        let input = autopilot.input(&snapshot);
        snapshot = engine.step(TICK_DT, &input);
        if let Some(result) = engine.take_result() {
            return Ok(Some(result));
        }
    }

    tracing::warn!(max_secs, "Time budget spent before the session finished");
    Ok(None)
}

/// Spawn the game loop in a new thread.
///
/// Returns the command sender and a handle that yields the session result,
/// or `None` if the loop was shut down first.
pub fn spawn_game_loop(
    config: SimConfig,
    latest_snapshot: Arc<Mutex<Option<CombatSnapshot>>>,
) -> Result<(mpsc::Sender<LoopCommand>, JoinHandle<Option<SessionResult>>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<LoopCommand>();

    let handle = std::thread::Builder::new()
        .name("starfighter-game-loop".into())
        .spawn(move || run_game_loop(config, cmd_rx, &latest_snapshot))?;

    Ok((cmd_tx, handle))
}

/// The game loop. Runs until the session finishes, a Shutdown command
/// arrives or the channel disconnects.
fn run_game_loop(
    config: SimConfig,
    cmd_rx: mpsc::Receiver<LoopCommand>,
    latest_snapshot: &Mutex<Option<CombatSnapshot>>,
) -> Option<SessionResult> {
    let mut engine = CombatEngine::new(config);
    let mut input = InputSnapshot::new();
    let mut next_tick_time = Instant::now();

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(LoopCommand::Session(cmd)) => engine.queue_command(cmd),
                Ok(LoopCommand::Input(next)) => input = next,
                Ok(LoopCommand::Shutdown) => return None,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return None,
            }
        }

        // 2. Advance one step (the engine handles pause internally)
        let snapshot = engine.step(TICK_DT, &input);

        // 3. Store latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        if let Some(result) = engine.take_result() {
            tracing::info!(outcome = ?result.outcome, "Game loop finished");
            return Some(result);
        }

        // 4. Sleep until next step, adjusting for time scale
        let time_scale = engine.time_scale();
        let effective_tick_duration = if time_scale > 0.001 {
            TICK_DURATION.div_f64(time_scale)
        } else {
            TICK_DURATION
        };

        next_tick_time += effective_tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > effective_tick_duration * 2 {
            // Too far behind: reset to avoid a catch-up spiral
            next_tick_time = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starfighter_core::commands::SessionCommand;
    use starfighter_core::design::{PilotBonuses, ShipDesign};

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<LoopCommand>();

        tx.send(LoopCommand::Session(SessionCommand::Pause)).unwrap();
        tx.send(LoopCommand::Input(InputSnapshot::new())).unwrap();
        tx.send(LoopCommand::Shutdown).unwrap();

        let commands: Vec<LoopCommand> = rx.try_iter().collect();
        assert_eq!(commands.len(), 3);
        assert!(matches!(
            commands[0],
            LoopCommand::Session(SessionCommand::Pause)
        ));
        assert!(matches!(commands[1], LoopCommand::Input(_)));
        assert!(matches!(commands[2], LoopCommand::Shutdown));
    }

    #[test]
    fn test_headless_requires_session() {
        let mut engine = CombatEngine::new(SimConfig::default());
        let result = run_headless(&mut engine, &mut Autopilot::new(), 1.0);
        assert!(matches!(result, Err(CombatError::SessionNotActive)));
    }

    #[test]
    fn test_headless_respects_time_budget() {
        let mut engine = CombatEngine::new(SimConfig::default());
        engine.start(vec![ShipDesign::rookie()], None);
        let result = run_headless(&mut engine, &mut Autopilot::new(), 0.5).unwrap();
        assert_eq!(result, None);
        assert_eq!(engine.time().step, 30);
    }

    #[test]
    fn test_game_loop_thread_runs_and_shuts_down() {
        let latest = Arc::new(Mutex::new(None));
        let (tx, handle) = spawn_game_loop(SimConfig::default(), Arc::clone(&latest)).unwrap();
        tx.send(LoopCommand::Session(SessionCommand::Start {
            designs: vec![ShipDesign::rookie()],
            wave_plan: None,
            bonuses: PilotBonuses::default(),
        }))
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut started = false;
        while Instant::now() < deadline {
            let phase = latest.lock().unwrap().as_ref().map(|s| s.phase);
            if phase == Some(SessionPhase::InProgress) {
                started = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(started, "Loop should publish in-progress snapshots");

        tx.send(LoopCommand::Shutdown).unwrap();
        assert_eq!(handle.join().unwrap(), None);
    }

    #[test]
    fn test_game_loop_stops_on_disconnect() {
        let latest = Arc::new(Mutex::new(None));
        let (tx, handle) = spawn_game_loop(SimConfig::default(), latest).unwrap();
        drop(tx);
        assert_eq!(handle.join().unwrap(), None);
    }

    #[test]
    fn test_tick_duration_constant() {
        // 60Hz = 16.667ms per step
        let expected_nanos = 1_000_000_000u64 / 60;
        assert_eq!(TICK_DURATION.as_nanos(), expected_nanos as u128);
    }
}
