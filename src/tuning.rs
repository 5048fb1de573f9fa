//! Difficulty table
//!
//! Static mapping from difficulty level to enemy speed, spawn interval and
//! enemy health.

use serde::{Deserialize, Serialize};

/// Difficulty levels selectable from the settings menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// One row of the difficulty table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyParams {
    /// Downward enemy speed (pixels per frame)
    pub enemy_speed: f32,
    /// Milliseconds between enemy spawns
    pub spawn_interval_ms: u32,
    /// Hits needed to destroy an enemy
    pub enemy_health: u8,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn params(&self) -> DifficultyParams {
        match self {
            Difficulty::Easy => DifficultyParams {
                enemy_speed: 2.0,
                spawn_interval_ms: 1500,
                enemy_health: 1,
            },
            Difficulty::Medium => DifficultyParams {
                enemy_speed: 3.0,
                spawn_interval_ms: 1000,
                enemy_health: 2,
            },
            Difficulty::Hard => DifficultyParams {
                enemy_speed: 4.0,
                spawn_interval_ms: 700,
                enemy_health: 3,
            },
        }
    }
}
