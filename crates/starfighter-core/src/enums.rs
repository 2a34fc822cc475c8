//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Which side a ship or projectile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Player squadron (controlled ship and wingmen).
    Player,
    /// Hostile fighter.
    Hostile,
}

impl Role {
    /// The side this one shoots at.
    pub fn opponent(self) -> Role {
        match self {
            Role::Player => Role::Hostile,
            Role::Hostile => Role::Player,
        }
    }
}

/// Weapon / projectile kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    #[default]
    Laser,
    Missile,
}

/// Hostile AI behaviour state. Cyclic: chase, attack, evade, chase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiState {
    /// Smoothly steer toward the player.
    #[default]
    Chase,
    /// Timed attack run: hard lock on, boost, fire at random.
    Attack,
    /// Timed break-off: roll and climb, ignoring the player.
    Evade,
}

/// Hostile stat preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Scout,
    #[default]
    Fighter,
    Ace,
    Tank,
}

impl Archetype {
    /// Parse a free-form archetype tag. Unknown tags fall back to fighter.
    pub fn from_tag(tag: &str) -> Archetype {
        match tag.trim().to_ascii_lowercase().as_str() {
            "scout" => Archetype::Scout,
            "ace" => Archetype::Ace,
            "tank" => Archetype::Tank,
            _ => Archetype::Fighter,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Archetype::Scout => "scout",
            Archetype::Fighter => "fighter",
            Archetype::Ace => "ace",
            Archetype::Tank => "tank",
        }
    }
}

/// Hull class of a squadron ship design.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HullKind {
    #[default]
    Interceptor,
    Bomber,
    Dreadnought,
}

impl HullKind {
    /// Parse a hull name. Capital-ship names map to dreadnought,
    /// anything unrecognised to interceptor.
    pub fn from_name(name: &str) -> HullKind {
        let lower = name.to_ascii_lowercase();
        if lower.contains("bomber") {
            HullKind::Bomber
        } else if ["dreadnought", "cruiser", "destroyer", "frigate"]
            .iter()
            .any(|k| lower.contains(k))
        {
            HullKind::Dreadnought
        } else {
            HullKind::Interceptor
        }
    }
}

/// Which damage layer a hit landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitLayer {
    /// Fully absorbed by shields.
    Shield,
    /// Reached the hull.
    Hull,
}

/// Final outcome of a combat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Victory,
    Defeat,
}

/// Combat session phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No session running.
    #[default]
    Inactive,
    /// A wave is being fought.
    InProgress,
    /// Wave cleared, counting down to the next one.
    WaveClearedWait,
    /// Outcome decided, counting down to exit.
    Resolved,
    /// Result handed back; the session is over.
    Finished,
}
