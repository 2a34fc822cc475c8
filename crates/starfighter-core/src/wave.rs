//! Wave plans and rewards.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::enums::Archetype;
use crate::error::{CombatError, Result};

/// One batch of hostiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveSpec {
    pub count: u32,
    /// Archetype tag for every hostile in the wave. `None` spawns a mix.
    #[serde(default)]
    pub archetype: Option<String>,
}

/// Ordered waves for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WavePlan {
    pub waves: Vec<WaveSpec>,
}

/// Session payout. Zero-valued fields are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alloys: Option<u32>,
}

impl WaveSpec {
    pub fn new(count: u32, archetype: Option<Archetype>) -> Self {
        Self {
            count,
            archetype: archetype.map(|a| a.tag().to_string()),
        }
    }

    /// Parsed archetype, if the wave names one.
    pub fn archetype(&self) -> Option<Archetype> {
        self.archetype.as_deref().map(Archetype::from_tag)
    }
}

impl WavePlan {
    pub fn new(waves: Vec<WaveSpec>) -> Self {
        Self { waves }
    }

    /// Default three-wave plan: 3 scouts, 4 fighters, 1 ace.
    pub fn default_plan() -> Self {
        Self::new(vec![
            WaveSpec::new(3, Some(Archetype::Scout)),
            WaveSpec::new(4, Some(Archetype::Fighter)),
            WaveSpec::new(1, Some(Archetype::Ace)),
        ])
    }

    /// Parse `[{"count": 3, "archetype": "scout"}, ...]`.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a plan from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CombatError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// The plan itself, or the default plan when it has no waves.
    pub fn or_default(plan: Option<WavePlan>) -> Self {
        match plan {
            Some(plan) if !plan.waves.is_empty() => plan,
            _ => Self::default_plan(),
        }
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    pub fn total_hostiles(&self) -> u32 {
        self.waves.iter().map(|w| w.count).sum()
    }

    /// Reward for clearing the whole plan: `credits_per_hostile` per hostile,
    /// plus `alloys_per_even_wave` for every even-numbered (1-based) wave.
    pub fn reward(&self, credits_per_hostile: u32, alloys_per_even_wave: u32) -> Reward {
        let credits = self.total_hostiles().saturating_mul(credits_per_hostile);
        let even_waves = (1..=self.waves.len()).filter(|n| n % 2 == 0).count() as u32;
        let alloys = even_waves.saturating_mul(alloys_per_even_wave);
        Reward {
            credits: (credits > 0).then_some(credits),
            alloys: (alloys > 0).then_some(alloys),
        }
    }
}
