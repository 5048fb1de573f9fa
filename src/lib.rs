//! Air Strike - an arcade shooter fed by AI-generated assets
//!
//! Core modules:
//! - `sim`: Per-frame simulation (movement, collisions, score, lives, effects)
//! - `renderer`: Scene building, camera shake and the Canvas2D painter
//! - `scheduler`: Frame loop and spawner timer lifetime
//! - `session`: Game session shell (pause, resize, input, game-over)
//! - `platform`: Browser host glue
//! - `tuning`: Difficulty table

pub mod assets;
pub mod audio;
pub mod input;
pub mod platform;
pub mod renderer;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use assets::{GeneratedAssets, SoundRef};
pub use session::{FrameReport, GameSession};
pub use settings::Settings;
pub use tuning::Difficulty;

/// Game configuration constants
pub mod consts {
    /// Player ship size
    pub const PLAYER_WIDTH: f32 = 60.0;
    pub const PLAYER_HEIGHT: f32 = 60.0;
    /// Horizontal player speed (pixels per frame)
    pub const PLAYER_SPEED: f32 = 7.0;
    /// Gap between the player and the bottom edge at session start
    pub const PLAYER_BOTTOM_MARGIN: f32 = 20.0;
    /// Same gap when on-screen touch controls cover the bottom of the canvas
    pub const PLAYER_BOTTOM_MARGIN_TOUCH: f32 = 120.0;

    /// Bullet size and upward speed (pixels per frame)
    pub const BULLET_WIDTH: f32 = 5.0;
    pub const BULLET_HEIGHT: f32 = 20.0;
    pub const BULLET_SPEED: f32 = 10.0;
    /// Minimum wall-clock gap between accepted shots
    pub const SHOT_COOLDOWN_MS: f64 = 200.0;

    /// Enemy size
    pub const ENEMY_WIDTH: f32 = 50.0;
    pub const ENEMY_HEIGHT: f32 = 50.0;
    /// Enemies start just above the visible area
    pub const ENEMY_SPAWN_Y: f32 = -60.0;
    /// Right-hand margin kept free when picking a spawn x
    pub const ENEMY_SPAWN_MARGIN: f32 = 60.0;

    /// Score per destroyed enemy
    pub const KILL_SCORE: u64 = 100;
    pub const STARTING_LIVES: u8 = 3;

    /// Screen shake
    pub const SHAKE_DURATION_MS: f64 = 150.0;
    pub const SHAKE_ENEMY_KILL: f32 = 8.0;
    pub const SHAKE_PLAYER_HIT: f32 = 12.0;

    /// Fraction of the remaining gap an effect's radius closes each frame
    pub const EFFECT_EASE: f32 = 0.15;
    /// Opacity = life / (max_radius * EFFECT_FADE)
    pub const EFFECT_FADE: f32 = 1.5;

    /// Nominal frame length used by headless drivers
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
}

/// Clamp a left edge so a box of `extent` stays inside `[0, limit]`.
///
/// When the box is wider than the limit the edge pins to 0.
#[inline]
pub fn clamp_edge(edge: f32, extent: f32, limit: f32) -> f32 {
    edge.min(limit - extent).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_edge_inside() {
        assert_eq!(clamp_edge(100.0, 60.0, 800.0), 100.0);
        assert_eq!(clamp_edge(-5.0, 60.0, 800.0), 0.0);
        assert_eq!(clamp_edge(790.0, 60.0, 800.0), 740.0);
    }

    #[test]
    fn test_clamp_edge_narrow_limit() {
        assert_eq!(clamp_edge(30.0, 60.0, 40.0), 0.0);
    }
}
