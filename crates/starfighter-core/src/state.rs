//! State snapshot: the complete visible state handed to the caller each step.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::CombatEvent;
use crate::types::SimTime;
use crate::wave::Reward;

/// Everything a presentation layer needs after one step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatSnapshot {
    pub time: SimTime,
    pub phase: SessionPhase,
    pub paused: bool,
    pub time_scale: f64,
    pub outcome: Option<Outcome>,
    pub wave: WaveView,
    pub squadron: Vec<ShipView>,
    pub hostiles: Vec<HostileView>,
    pub projectiles: Vec<ProjectileView>,
    pub hud: HudView,
    pub events: Vec<CombatEvent>,
    /// Set on exactly one snapshot: the step the session finished.
    pub result: Option<SessionResult>,
}

/// Wave progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveView {
    /// 1-based number of the current wave, 0 before the first spawn.
    pub number: u32,
    pub total: u32,
    pub waiting_for_next: bool,
    pub next_wave_timer: f64,
    pub exit_timer: Option<f64>,
}

/// A squadron ship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipView {
    pub id: u64,
    pub name: String,
    pub hull: HullKind,
    pub position: DVec3,
    pub rotation: DQuat,
    pub speed: f64,
    pub health: f64,
    pub max_health: f64,
    pub shields: f64,
    pub max_shields: f64,
    pub energy: f64,
    pub controlled: bool,
    pub has_model: bool,
}

/// A hostile fighter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostileView {
    pub id: u64,
    pub archetype: Archetype,
    pub state: AiState,
    pub position: DVec3,
    pub rotation: DQuat,
    pub health: f64,
    pub max_health: f64,
    pub shields: f64,
    pub max_shields: f64,
    pub locked: bool,
}

/// An active projectile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub slot: usize,
    pub kind: WeaponKind,
    pub owner: Role,
    pub position: DVec3,
    pub velocity: DVec3,
}

/// Read-only values for a HUD to format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HudView {
    /// 0.0 - 1.0.
    pub health_pct: f64,
    /// 0.0 - 1.0.
    pub shield_pct: f64,
    pub energy: f64,
    pub speed: f64,
    pub weapon: WeaponKind,
    pub locked: bool,
    pub lock_target: Option<u64>,
    pub lock_distance: Option<f64>,
    /// Intercept point for the selected weapon while locked.
    pub lead_point: Option<DVec3>,
    pub hostiles_remaining: u32,
    pub squadron_size: u32,
}

/// Handed back once when a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub outcome: Outcome,
    /// Only victories pay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<Reward>,
}
