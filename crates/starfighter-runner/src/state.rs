//! State shared between the driver and the game loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use starfighter_core::commands::{InputSnapshot, SessionCommand};
use starfighter_core::state::CombatSnapshot;

/// Commands sent from the driver to the game loop thread.
#[derive(Debug)]
pub enum LoopCommand {
    /// Forward a session command to the engine.
    Session(SessionCommand),
    /// Replace the held input with this one from the next step on.
    Input(InputSnapshot),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Handle to a running game loop.
///
/// The sender sits behind a `Mutex` so the handle can be shared between
/// threads (`Sender` is `Send` but not `Sync`).
pub struct LoopState {
    pub command_tx: Mutex<Option<mpsc::Sender<LoopCommand>>>,
    /// Latest snapshot, updated by the loop thread after each step.
    pub latest_snapshot: Arc<Mutex<Option<CombatSnapshot>>>,
}

impl Default for LoopState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
        }
    }
}

impl LoopState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send a command to the loop. Returns false if no loop is listening.
    pub fn send(&self, command: LoopCommand) -> bool {
        let Ok(guard) = self.command_tx.lock() else {
            return false;
        };
        guard
            .as_ref()
            .is_some_and(|tx| tx.send(command).is_ok())
    }

    /// Clone of the latest snapshot, if the loop has produced one.
    pub fn snapshot(&self) -> Option<CombatSnapshot> {
        self.latest_snapshot.lock().ok().and_then(|s| s.clone())
    }
}
