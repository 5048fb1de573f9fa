//! Enemy spawning
//!
//! Owns the only source of randomness the simulation sees: where new enemies
//! enter. When to spawn is decided by the interval timer in `scheduler`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Enemy, GameState};
use crate::consts::{ENEMY_SPAWN_MARGIN, ENEMY_SPAWN_Y};

#[derive(Debug, Clone)]
pub struct EnemySpawner {
    rng: Pcg32,
}

impl EnemySpawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Random x that keeps the sprite on the canvas
    pub fn spawn_x(&mut self, arena_width: f32) -> f32 {
        let span = arena_width - ENEMY_SPAWN_MARGIN;
        if span <= 0.0 {
            return 0.0;
        }
        self.rng.random::<f32>() * span
    }

    /// Append one enemy just above the visible area. Returns its id.
    pub fn spawn(&mut self, state: &mut GameState, health: u8) -> u32 {
        let x = self.spawn_x(state.arena.x);
        let id = state.next_entity_id();
        // Health is never zero at creation
        state
            .enemies
            .push(Enemy::new(id, Vec2::new(x, ENEMY_SPAWN_Y), health.max(1)));
        log::debug!("Spawned enemy {} at x={:.1}", id, x);
        id
    }
}
