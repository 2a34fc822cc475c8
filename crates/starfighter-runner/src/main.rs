//! Headless starfighter skirmish.
//!
//! Runs one combat session flown by the autopilot and prints the session
//! result as JSON on stdout. Logs go to stderr.
//!
//! ```bash
//! starfighter --seed 7 --ships 3 --waves waves.json --config tuning.ron
//! RUST_LOG=debug starfighter --realtime
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use starfighter_core::commands::SessionCommand;
use starfighter_core::config::CombatTuning;
use starfighter_core::design::{PilotBonuses, ShipDesign};
use starfighter_core::error::Result;
use starfighter_core::state::SessionResult;
use starfighter_core::types::sanitize;
use starfighter_core::wave::WavePlan;
use starfighter_runner::autopilot::Autopilot;
use starfighter_runner::game_loop::{run_headless, spawn_game_loop, TICK_DT};
use starfighter_runner::state::{LoopCommand, LoopState};
use starfighter_sim::engine::{CombatEngine, SimConfig};

/// Cap on the real-time run, one day.
const MAX_WALL_SECS: f64 = 86_400.0;

#[derive(Parser)]
#[command(name = "starfighter")]
#[command(about = "Headless starfighter skirmish runner")]
#[command(version)]
struct Cli {
    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// RON tuning file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON wave plan file
    #[arg(short, long)]
    waves: Option<PathBuf>,

    /// Squadron size
    #[arg(long, default_value = "3")]
    ships: usize,

    /// Give up after this many seconds of simulated time
    #[arg(long, default_value = "600")]
    max_secs: f64,

    /// Pace the loop in real time on a worker thread
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let tuning = match &cli.config {
        Some(path) => CombatTuning::load(path)?,
        None => CombatTuning::default(),
    };
    let plan = cli.waves.as_ref().map(|p| WavePlan::load(p)).transpose()?;
    let designs: Vec<ShipDesign> = (1..=cli.ships.max(1))
        .map(|n| ShipDesign {
            name: format!("Blue {n}"),
            ..ShipDesign::rookie()
        })
        .collect();
    let config = SimConfig {
        seed: cli.seed,
        tuning,
    };

    let result = if cli.realtime {
        run_realtime(config, designs, plan, cli.max_secs)?
    } else {
        let mut engine = CombatEngine::new(config);
        engine.start(designs, plan);
        run_headless(&mut engine, &mut Autopilot::new(), cli.max_secs)?
    };

    match result {
        Some(result) => println!("{}", serde_json::to_string(&result)?),
        None => println!("null"),
    }
    Ok(())
}

/// Drive the threaded game loop, feeding it autopilot input from the
/// latest snapshot once per step.
fn run_realtime(
    config: SimConfig,
    designs: Vec<ShipDesign>,
    plan: Option<WavePlan>,
    max_secs: f64,
) -> Result<Option<SessionResult>> {
    let state = LoopState::new();
    let (tx, handle) = spawn_game_loop(config, Arc::clone(&state.latest_snapshot))?;
    if let Ok(mut slot) = state.command_tx.lock() {
        *slot = Some(tx);
    }
    state.send(LoopCommand::Session(SessionCommand::Start {
        designs,
        wave_plan: plan,
        bonuses: PilotBonuses::default(),
    }));

    let mut autopilot = Autopilot::new();
    let deadline = Instant::now() + Duration::from_secs_f64(sanitize(max_secs).min(MAX_WALL_SECS));
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            tracing::warn!(max_secs, "Wall-clock budget spent, shutting down");
            state.send(LoopCommand::Shutdown);
            break;
        }
        if let Some(snapshot) = state.snapshot() {
            state.send(LoopCommand::Input(autopilot.input(&snapshot)));
        }
        std::thread::sleep(Duration::from_secs_f64(TICK_DT));
    }

    match handle.join() {
        Ok(result) => Ok(result),
        Err(_) => {
            tracing::error!("Game loop thread panicked");
            Ok(None)
        }
    }
}
