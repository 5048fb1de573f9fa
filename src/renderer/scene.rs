//! Scene building
//!
//! Converts a borrowed `GameState` into a flat list of draw commands. Pure:
//! nothing here mutates the simulation, and the commands can be painted by
//! any 2D backend.

use glam::Vec2;

use crate::sim::{Bounds, GameState, Rgba};

/// Bullet fill and glow colour
pub const BULLET_COLOR: &str = "#00FFFF";
/// Bullet glow radius
pub const BULLET_GLOW: f64 = 10.0;

/// Which pre-loaded sprite image to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sprite {
    Player,
    Enemy,
}

/// One painting operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Clear the whole canvas
    Clear { size: Vec2 },
    /// Sprite image stretched over a box
    Sprite { sprite: Sprite, bounds: Bounds },
    /// Filled rectangle with a glow halo
    GlowRect { bounds: Bounds, color: &'static str, blur: f64 },
    /// Filled circle
    Circle { center: Vec2, radius: f32, color: Rgba },
}

/// A frame's worth of draw commands under one camera offset
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub offset: Vec2,
    pub commands: Vec<DrawCmd>,
}

/// Build the draw list for the current state
pub fn build_scene(state: &GameState, offset: Vec2) -> Scene {
    let mut commands =
        Vec::with_capacity(2 + state.bullets.len() + state.enemies.len() + state.effects.len());

    commands.push(DrawCmd::Clear { size: state.arena });

    commands.push(DrawCmd::Sprite {
        sprite: Sprite::Player,
        bounds: state.player.bounds(),
    });

    for bullet in &state.bullets {
        commands.push(DrawCmd::GlowRect {
            bounds: bullet.bounds(),
            color: BULLET_COLOR,
            blur: BULLET_GLOW,
        });
    }

    for enemy in &state.enemies {
        commands.push(DrawCmd::Sprite {
            sprite: Sprite::Enemy,
            bounds: enemy.bounds(),
        });
    }

    // Effects last so they glow over ships
    for effect in &state.effects {
        commands.push(DrawCmd::Circle {
            center: effect.center,
            radius: effect.radius,
            color: effect.fill_color(),
        });
    }

    Scene { offset, commands }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Bullet, ControlLayout, EffectKind, Enemy};

    #[test]
    fn test_empty_scene() {
        let state = GameState::new(800.0, 600.0, ControlLayout::Keyboard);
        let scene = build_scene(&state, Vec2::ZERO);
        assert_eq!(scene.commands.len(), 2);
        assert_eq!(
            scene.commands[0],
            DrawCmd::Clear {
                size: Vec2::new(800.0, 600.0)
            }
        );
        assert!(matches!(
            scene.commands[1],
            DrawCmd::Sprite {
                sprite: Sprite::Player,
                ..
            }
        ));
    }

    #[test]
    fn test_scene_contains_every_entity() {
        let mut state = GameState::new(800.0, 600.0, ControlLayout::Keyboard);
        state.enemies.push(Enemy::new(10, Vec2::new(5.0, 5.0), 2));
        state.bullets.push(Bullet::new(11, Vec2::new(50.0, 50.0)));
        state.bullets.push(Bullet::new(12, Vec2::new(60.0, 50.0)));
        state.spawn_effect(EffectKind::Damage, Vec2::new(100.0, 100.0));

        let scene = build_scene(&state, Vec2::new(2.0, -1.0));
        assert_eq!(scene.offset, Vec2::new(2.0, -1.0));

        let glow = scene
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::GlowRect { .. }))
            .count();
        let enemies = scene
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Sprite { sprite: Sprite::Enemy, .. }))
            .count();
        assert_eq!(glow, 2);
        assert_eq!(enemies, 1);

        match scene.commands.last().unwrap() {
            DrawCmd::Circle { color, radius, .. } => {
                assert_eq!((color.r, color.g, color.b), (255, 0, 0));
                assert!((color.a - 20.0 / 90.0).abs() < 1e-6);
                assert_eq!(*radius, 0.0);
            }
            other => panic!("expected effect circle last, got {:?}", other),
        }
    }
}
