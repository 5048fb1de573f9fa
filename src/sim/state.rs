//! Game state and entity types
//!
//! Plain data records mutated in place by the simulation step. The render
//! step only ever borrows them.

use glam::Vec2;

use super::collision::Bounds;
use crate::audio::SoundEffect;
use crate::clamp_edge;
use crate::consts::*;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen by the player; frames keep coming but nothing moves
    Paused,
    /// Lives ran out
    GameOver,
}

/// Where the player's ship rests vertically at session start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlLayout {
    #[default]
    Keyboard,
    /// On-screen buttons occupy the bottom of the canvas
    Touch,
}

impl ControlLayout {
    pub fn bottom_margin(&self) -> f32 {
        match self {
            ControlLayout::Keyboard => PLAYER_BOTTOM_MARGIN,
            ControlLayout::Touch => PLAYER_BOTTOM_MARGIN_TOUCH,
        }
    }
}

/// Identity of the single player entity
pub const PLAYER_ID: u32 = 0;

/// The player's ship
#[derive(Debug, Clone)]
pub struct Player {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
}

impl Player {
    /// Horizontally centred, resting above the bottom margin
    pub fn new(arena: Vec2, layout: ControlLayout) -> Self {
        let size = Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT);
        Self {
            id: PLAYER_ID,
            pos: Vec2::new(
                clamp_edge(arena.x / 2.0 - size.x / 2.0, size.x, arena.x),
                arena.y - size.y - layout.bottom_margin(),
            ),
            size,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.pos, self.size)
    }

    /// Top-left corner of a bullet fired from the middle of the nose
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x / 2.0 - BULLET_WIDTH / 2.0, self.pos.y)
    }
}

/// A descending enemy ship
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub health: u8,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, health: u8) -> Self {
        Self {
            id,
            pos,
            size: Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT),
            health,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.pos, self.size)
    }

    pub fn is_destroyed(&self) -> bool {
        self.health == 0
    }
}

/// A player projectile
#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
}

impl Bullet {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            size: Vec2::new(BULLET_WIDTH, BULLET_HEIGHT),
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.pos, self.size)
    }
}

/// RGBA colour; the alpha channel is replaced at draw time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba()` form for canvas fill styles
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Visual effect flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Bullet strikes an enemy
    Impact,
    /// Enemy destroyed
    Explosion,
    /// Player rammed
    Damage,
}

impl EffectKind {
    pub fn max_radius(&self) -> f32 {
        match self {
            EffectKind::Impact => 15.0,
            EffectKind::Explosion => 40.0,
            EffectKind::Damage => 60.0,
        }
    }

    pub fn color(&self) -> Rgba {
        match self {
            EffectKind::Impact => Rgba::new(255, 255, 150, 0.9),
            EffectKind::Explosion => Rgba::new(255, 165, 0, 0.9),
            EffectKind::Damage => Rgba::new(255, 0, 0, 0.7),
        }
    }

    /// Lifetime in frames
    pub fn life(&self) -> u32 {
        match self {
            EffectKind::Impact => 8,
            EffectKind::Explosion => 25,
            EffectKind::Damage => 20,
        }
    }
}

/// An expanding, fading circle
#[derive(Debug, Clone)]
pub struct Effect {
    pub id: u32,
    pub kind: EffectKind,
    pub center: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub color: Rgba,
    /// Frames left to live
    pub life: u32,
}

impl Effect {
    pub fn new(id: u32, kind: EffectKind, center: Vec2) -> Self {
        Self {
            id,
            kind,
            center,
            radius: 0.0,
            max_radius: kind.max_radius(),
            color: kind.color(),
            life: kind.life(),
        }
    }

    /// Advance one frame: shorten life, ease radius toward its maximum
    pub fn update(&mut self) {
        self.life = self.life.saturating_sub(1);
        self.radius += (self.max_radius - self.radius) * EFFECT_EASE;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0
    }

    /// Fill opacity derived from remaining life
    pub fn opacity(&self) -> f32 {
        (self.life as f32 / (self.max_radius * EFFECT_FADE)).clamp(0.0, 1.0)
    }

    pub fn fill_color(&self) -> Rgba {
        self.color.with_alpha(self.opacity())
    }
}

/// Something the simulation wants the outside world to know about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    ShotFired { bullet_id: u32 },
    EnemyHit { enemy_id: u32 },
    EnemyDestroyed { enemy_id: u32, points: u64 },
    PlayerHit { enemy_id: u32, lives_left: u8 },
    ScreenShake { intensity: f32 },
    Sound(SoundEffect),
    GameOver { final_score: u64 },
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Canvas size in pixels
    pub arena: Vec2,
    pub player: Player,
    /// Live enemies, in spawn order
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub effects: Vec<Effect>,
    pub score: u64,
    pub lives: u8,
    pub phase: GamePhase,
    /// Wall-clock time of the last accepted shot
    pub last_shot_ms: Option<f64>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    pub fn new(width: f32, height: f32, layout: ControlLayout) -> Self {
        let arena = Vec2::new(width, height);
        Self {
            arena,
            player: Player::new(arena, layout),
            enemies: Vec::new(),
            bullets: Vec::new(),
            effects: Vec::new(),
            score: 0,
            lives: STARTING_LIVES,
            phase: GamePhase::Playing,
            last_shot_ms: None,
            next_id: PLAYER_ID + 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Adopt a new canvas size and pull the player back on screen
    pub fn resize(&mut self, width: f32, height: f32) {
        self.arena = Vec2::new(width, height);
        let player = &mut self.player;
        player.pos.x = clamp_edge(player.pos.x, player.size.x, width);
        player.pos.y = clamp_edge(player.pos.y, player.size.y, height);
    }

    pub fn spawn_effect(&mut self, kind: EffectKind, center: Vec2) {
        let id = self.next_entity_id();
        self.effects.push(Effect::new(id, kind, center));
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }
}
