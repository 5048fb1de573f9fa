//! Simulation module
//!
//! All gameplay logic lives here:
//! - One call to `tick` per display frame
//! - No rendering or platform dependencies
//! - Randomness only in the spawner, from a seeded RNG

pub mod collision;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::Bounds;
pub use spawner::EnemySpawner;
pub use state::{
    Bullet, ControlLayout, Effect, EffectKind, Enemy, GameEvent, GamePhase, GameState, Player,
    Rgba, PLAYER_ID,
};
pub use tick::{TickInput, tick, try_shoot};
