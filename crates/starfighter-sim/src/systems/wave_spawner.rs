//! Wave spawning: places a wave of hostiles ahead of the player.

use std::f64::consts::TAU;

use glam::DVec3;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use starfighter_core::assets::ModelLoader;
use starfighter_core::config::CombatTuning;
use starfighter_core::constants::{WAVE_SPAWN_AHEAD, WAVE_SPAWN_VERTICAL_SPREAD};
use starfighter_core::wave::WaveSpec;

use starfighter_hostile_ai::profiles::default_mix;

use crate::world_setup::spawn_hostile;

/// Spawn `wave` in an annulus around a point ahead of `anchor` (the
/// controlled ship, or the origin). Returns the new hostiles in spawn order.
pub fn spawn_wave(
    world: &mut World,
    loader: &mut dyn ModelLoader,
    rng: &mut ChaCha8Rng,
    wave: &WaveSpec,
    anchor: DVec3,
    tuning: &CombatTuning,
) -> Vec<Entity> {
    let center = anchor + DVec3::new(0.0, 0.0, -WAVE_SPAWN_AHEAD);
    let min_r = tuning.wave_spawn_min_radius;
    let max_r = tuning.wave_spawn_max_radius.max(min_r);
    let half_spread = WAVE_SPAWN_VERTICAL_SPREAD / 2.0;

    let archetype = wave.archetype();
    (0..wave.count as usize)
        .map(|i| {
            let angle = rng.gen_range(0.0..TAU);
            let radius = if max_r > min_r {
                rng.gen_range(min_r..max_r)
            } else {
                min_r
            };
            let y = rng.gen_range(-half_spread..half_spread);
            let position = center + DVec3::new(angle.cos() * radius, y, angle.sin() * radius);
            spawn_hostile(
                world,
                loader,
                archetype.unwrap_or_else(|| default_mix(i)),
                position,
                anchor,
            )
        })
        .collect()
}
