//! Per-frame simulation step
//!
//! Advances the game by one display frame. Step order is fixed:
//! movement, bullets, enemies, bullet/enemy hits, destruction,
//! player/enemy rams, effects. Collision bookkeeping relies on it.

use glam::Vec2;

use super::state::{Bullet, EffectKind, GameEvent, GamePhase, GameState};
use crate::audio::SoundEffect;
use crate::clamp_edge;
use crate::consts::*;
use crate::tuning::DifficultyParams;

/// Input snapshot for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Fire held (space) or triggered (touch button)
    pub fire: bool,
    /// Wall-clock time of this frame, used by the shot cooldown
    pub now_ms: f64,
}

/// Advance the game state by one frame and report what happened
pub fn tick(state: &mut GameState, input: &TickInput, params: &DifficultyParams) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Don't tick if paused or game over
    if state.phase != GamePhase::Playing {
        return events;
    }

    move_player(state, input);
    if input.fire {
        try_shoot(state, input.now_ms, &mut events);
    }

    advance_bullets(state);
    advance_enemies(state, params.enemy_speed);

    resolve_bullet_hits(state, &mut events);
    remove_destroyed_enemies(state, &mut events);
    resolve_player_rams(state, &mut events);

    update_effects(state);

    events
}

fn move_player(state: &mut GameState, input: &TickInput) {
    let width = state.arena.x;
    let player = &mut state.player;
    if input.left {
        player.pos.x = (player.pos.x - PLAYER_SPEED).max(0.0);
    }
    if input.right {
        player.pos.x = clamp_edge(player.pos.x + PLAYER_SPEED, player.size.x, width);
    }
}

/// Fire a bullet unless the cooldown is still running.
///
/// Returns the new bullet's id when the shot was accepted.
pub fn try_shoot(state: &mut GameState, now_ms: f64, events: &mut Vec<GameEvent>) -> Option<u32> {
    if let Some(last) = state.last_shot_ms {
        if now_ms - last <= SHOT_COOLDOWN_MS {
            return None;
        }
    }

    let id = state.next_entity_id();
    state.bullets.push(Bullet::new(id, state.player.muzzle()));
    state.last_shot_ms = Some(now_ms);

    events.push(GameEvent::ShotFired { bullet_id: id });
    events.push(GameEvent::Sound(SoundEffect::Laser));
    Some(id)
}

fn advance_bullets(state: &mut GameState) {
    for bullet in &mut state.bullets {
        bullet.pos.y -= BULLET_SPEED;
    }
    // Gone once the top edge leaves the canvas
    state.bullets.retain(|b| b.pos.y > 0.0);
}

fn advance_enemies(state: &mut GameState, speed: f32) {
    for enemy in &mut state.enemies {
        enemy.pos.y += speed;
    }
    // Escaping off the bottom costs nothing
    let floor = state.arena.y;
    state.enemies.retain(|e| e.pos.y < floor);
}

/// Single pass: each bullet connects with at most one enemy, and an enemy
/// already at zero health absorbs no further bullets this frame.
fn resolve_bullet_hits(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let mut impacts: Vec<Vec2> = Vec::new();

    for enemy in state.enemies.iter_mut() {
        let enemy_box = enemy.bounds();
        state.bullets.retain(|bullet| {
            if enemy.is_destroyed() {
                return true;
            }
            let bullet_box = bullet.bounds();
            if !bullet_box.overlaps(&enemy_box) {
                return true;
            }

            enemy.health = enemy.health.saturating_sub(1);
            impacts.push(Vec2::new(bullet_box.center().x, bullet_box.top()));
            events.push(GameEvent::EnemyHit { enemy_id: enemy.id });
            events.push(GameEvent::Sound(SoundEffect::Hit));
            false
        });
    }

    for at in impacts {
        state.spawn_effect(EffectKind::Impact, at);
    }
}

fn remove_destroyed_enemies(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let (destroyed, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut state.enemies)
        .into_iter()
        .partition(|e| e.is_destroyed());
    state.enemies = alive;

    for enemy in destroyed {
        state.score += KILL_SCORE;
        state.spawn_effect(EffectKind::Explosion, enemy.bounds().center());
        events.push(GameEvent::EnemyDestroyed {
            enemy_id: enemy.id,
            points: KILL_SCORE,
        });
        events.push(GameEvent::ScreenShake {
            intensity: SHAKE_ENEMY_KILL,
        });
        events.push(GameEvent::Sound(SoundEffect::Explosion));
    }
}

/// Runs on the post-destruction enemy set so a shot-down enemy can never
/// also ram the player in the same frame.
fn resolve_player_rams(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let player_box = state.player.bounds();
    let (rammed, clear): (Vec<_>, Vec<_>) = std::mem::take(&mut state.enemies)
        .into_iter()
        .partition(|e| e.bounds().overlaps(&player_box));
    state.enemies = clear;

    for enemy in rammed {
        state.spawn_effect(EffectKind::Explosion, enemy.bounds().center());
        events.push(GameEvent::Sound(SoundEffect::Explosion));

        state.spawn_effect(EffectKind::Damage, player_box.center());
        events.push(GameEvent::ScreenShake {
            intensity: SHAKE_PLAYER_HIT,
        });

        state.lives = state.lives.saturating_sub(1);
        events.push(GameEvent::PlayerHit {
            enemy_id: enemy.id,
            lives_left: state.lives,
        });

        if state.lives == 0 && state.phase == GamePhase::Playing {
            state.phase = GamePhase::GameOver;
            log::info!("Game over with score {}", state.score);
            events.push(GameEvent::GameOver {
                final_score: state.score,
            });
        }
    }
}

fn update_effects(state: &mut GameState) {
    for effect in &mut state.effects {
        effect.update();
    }
    state.effects.retain(|e| e.is_alive());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{ControlLayout, Enemy};
    use crate::tuning::Difficulty;

    fn new_state() -> GameState {
        GameState::new(800.0, 600.0, ControlLayout::Keyboard)
    }

    fn idle(now_ms: f64) -> TickInput {
        TickInput {
            now_ms,
            ..Default::default()
        }
    }

    fn add_enemy(state: &mut GameState, pos: Vec2, health: u8) -> u32 {
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, pos, health));
        id
    }

    fn add_bullet(state: &mut GameState, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        state.bullets.push(Bullet::new(id, pos));
        id
    }

    /// Zero-speed params so enemies stay where tests put them
    fn frozen(difficulty: Difficulty) -> DifficultyParams {
        DifficultyParams {
            enemy_speed: 0.0,
            ..difficulty.params()
        }
    }

    fn count<F: Fn(&GameEvent) -> bool>(events: &[GameEvent], f: F) -> usize {
        events.iter().filter(|e| f(e)).count()
    }

    #[test]
    fn test_hold_right_clamps_at_edge() {
        let mut state = new_state();
        state.player.pos.x = 100.0;
        let params = Difficulty::Easy.params();
        let input = TickInput {
            right: true,
            ..Default::default()
        };

        let mut reached_at = None;
        for frame in 0..100 {
            tick(&mut state, &input, &params);
            if reached_at.is_none() && state.player.pos.x == 740.0 {
                reached_at = Some(frame);
            }
            assert!(state.player.pos.x <= 740.0);
        }
        assert_eq!(state.player.pos.x, 740.0);
        assert!(reached_at.unwrap() < 100);
    }

    #[test]
    fn test_hold_left_clamps_at_zero() {
        let mut state = new_state();
        state.player.pos.x = 10.0;
        let input = TickInput {
            left: true,
            ..Default::default()
        };
        tick(&mut state, &input, &Difficulty::Easy.params());
        assert_eq!(state.player.pos.x, 3.0);
        tick(&mut state, &input, &Difficulty::Easy.params());
        assert_eq!(state.player.pos.x, 0.0);
    }

    #[test]
    fn test_shot_cooldown() {
        let mut state = new_state();
        let mut events = Vec::new();

        assert!(try_shoot(&mut state, 1000.0, &mut events).is_some());
        assert!(try_shoot(&mut state, 1100.0, &mut events).is_none());
        assert!(try_shoot(&mut state, 1200.0, &mut events).is_none());
        assert!(try_shoot(&mut state, 1201.0, &mut events).is_some());
        assert!(try_shoot(&mut state, 1500.0, &mut events).is_some());

        assert_eq!(state.bullets.len(), 3);
        assert_eq!(count(&events, |e| *e == GameEvent::Sound(SoundEffect::Laser)), 3);
    }

    #[test]
    fn test_held_fire_is_rate_limited_across_frames() {
        let mut state = new_state();
        let params = Difficulty::Easy.params();
        // 12 frames at ~16.7ms span ~183ms: one shot only
        for frame in 0..12 {
            let input = TickInput {
                fire: true,
                now_ms: 5000.0 + frame as f64 * FRAME_MS,
                ..Default::default()
            };
            tick(&mut state, &input, &params);
        }
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_bullets_move_up_and_leave_the_top() {
        let mut state = new_state();
        add_bullet(&mut state, Vec2::new(100.0, 25.0));
        tick(&mut state, &idle(0.0), &Difficulty::Easy.params());
        assert_eq!(state.bullets[0].pos.y, 15.0);

        tick(&mut state, &idle(0.0), &Difficulty::Easy.params());
        assert_eq!(state.bullets[0].pos.y, 5.0);

        // y = -5: dropped even though its tail is still on screen
        tick(&mut state, &idle(0.0), &Difficulty::Easy.params());
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_offscreen_bullet_cannot_hit_entering_enemy() {
        let mut state = new_state();
        let params = frozen(Difficulty::Easy);
        add_enemy(&mut state, Vec2::new(100.0, -45.0), params.enemy_health);
        add_bullet(&mut state, Vec2::new(120.0, 5.0));

        let events = tick(&mut state, &idle(0.0), &params);
        assert!(state.bullets.is_empty());
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.score, 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_two_kills_same_frame_score_200() {
        let mut state = new_state();
        let params = frozen(Difficulty::Easy);
        add_enemy(&mut state, Vec2::new(100.0, 100.0), params.enemy_health);
        add_enemy(&mut state, Vec2::new(400.0, 100.0), params.enemy_health);
        add_bullet(&mut state, Vec2::new(120.0, 150.0));
        add_bullet(&mut state, Vec2::new(420.0, 150.0));

        let events = tick(&mut state, &idle(0.0), &params);
        assert!(state.enemies.is_empty());
        assert!(state.bullets.is_empty());
        assert_eq!(state.score, 2 * KILL_SCORE);
        assert_eq!(count(&events, |e| matches!(e, GameEvent::EnemyDestroyed { points: 100, .. })), 2);
        assert_eq!(count(&events, |e| *e == GameEvent::ScreenShake { intensity: SHAKE_ENEMY_KILL }), 2);
    }

    #[test]
    fn test_enemy_passing_bottom_costs_nothing() {
        let mut state = new_state();
        add_enemy(&mut state, Vec2::new(0.0, 598.0), 1);
        let events = tick(&mut state, &idle(0.0), &Difficulty::Hard.params());
        assert!(state.enemies.is_empty());
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(state.score, 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_easy_single_hit_destroys_enemy() {
        let mut state = new_state();
        let params = frozen(Difficulty::Easy);
        add_enemy(&mut state, Vec2::new(100.0, 100.0), params.enemy_health);
        add_bullet(&mut state, Vec2::new(120.0, 150.0));

        let events = tick(&mut state, &idle(0.0), &params);
        assert!(state.enemies.is_empty());
        assert!(state.bullets.is_empty());
        assert_eq!(state.score, 100);
        assert_eq!(count(&events, |e| matches!(e, GameEvent::EnemyDestroyed { points: 100, .. })), 1);
        assert_eq!(count(&events, |e| *e == GameEvent::ScreenShake { intensity: SHAKE_ENEMY_KILL }), 1);
        assert_eq!(count(&events, |e| *e == GameEvent::Sound(SoundEffect::Explosion)), 1);
        assert!(state.effects.iter().any(|e| e.kind == EffectKind::Impact));
        assert!(state.effects.iter().any(|e| e.kind == EffectKind::Explosion));
    }

    #[test]
    fn test_hard_needs_three_hits() {
        let mut state = new_state();
        let params = frozen(Difficulty::Hard);
        add_enemy(&mut state, Vec2::new(100.0, 100.0), params.enemy_health);

        for hit in 1..=3u8 {
            add_bullet(&mut state, Vec2::new(120.0, 150.0));
            tick(&mut state, &idle(0.0), &params);
            if hit < 3 {
                assert_eq!(state.enemies.len(), 1);
                assert_eq!(state.enemies[0].health, 3 - hit);
                assert_eq!(state.score, 0);
            }
        }
        assert!(state.enemies.is_empty());
        assert_eq!(state.score, 100);
    }

    #[test]
    fn test_bullet_over_two_enemies_hits_first_only() {
        let mut state = new_state();
        let params = frozen(Difficulty::Medium);
        let first = add_enemy(&mut state, Vec2::new(100.0, 100.0), 2);
        let second = add_enemy(&mut state, Vec2::new(110.0, 100.0), 2);
        add_bullet(&mut state, Vec2::new(120.0, 120.0));

        let events = tick(&mut state, &idle(0.0), &params);
        let health = |id| state.enemies.iter().find(|e| e.id == id).unwrap().health;
        assert_eq!(health(first), 1);
        assert_eq!(health(second), 2);
        assert_eq!(count(&events, |e| matches!(e, GameEvent::EnemyHit { .. })), 1);
    }

    #[test]
    fn test_dead_enemy_absorbs_no_extra_bullets() {
        let mut state = new_state();
        let params = frozen(Difficulty::Easy);
        add_enemy(&mut state, Vec2::new(100.0, 100.0), 1);
        add_bullet(&mut state, Vec2::new(110.0, 150.0));
        add_bullet(&mut state, Vec2::new(130.0, 150.0));

        tick(&mut state, &idle(0.0), &params);
        assert!(state.enemies.is_empty());
        assert_eq!(state.bullets.len(), 1);
        assert_eq!(state.score, 100);
    }

    #[test]
    fn test_shot_down_enemy_does_not_also_ram_player() {
        let mut state = new_state();
        let params = frozen(Difficulty::Easy);
        let player = state.player.pos;
        // Enemy overlapping the player and a bullet at the same time
        add_enemy(&mut state, player + Vec2::new(5.0, -10.0), 1);
        add_bullet(&mut state, player + Vec2::new(20.0, 0.0));

        let events = tick(&mut state, &idle(0.0), &params);
        assert_eq!(state.score, 100);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(count(&events, |e| matches!(e, GameEvent::PlayerHit { .. })), 0);
        assert_eq!(count(&events, |e| *e == GameEvent::Sound(SoundEffect::Explosion)), 1);
    }

    #[test]
    fn test_ram_costs_a_life_regardless_of_health() {
        let mut state = new_state();
        let params = frozen(Difficulty::Hard);
        let player = state.player.pos;
        add_enemy(&mut state, player, 3);

        let events = tick(&mut state, &idle(0.0), &params);
        assert!(state.enemies.is_empty());
        assert_eq!(state.lives, 2);
        assert_eq!(state.score, 0);
        assert_eq!(count(&events, |e| *e == GameEvent::ScreenShake { intensity: SHAKE_PLAYER_HIT }), 1);
        assert!(state.effects.iter().any(|e| e.kind == EffectKind::Damage));
        assert!(state.effects.iter().any(|e| e.kind == EffectKind::Explosion));
    }

    #[test]
    fn test_multiple_rams_in_one_frame_each_cost_a_life() {
        let mut state = new_state();
        let params = frozen(Difficulty::Medium);
        let player = state.player.pos;
        add_enemy(&mut state, player, 2);
        add_enemy(&mut state, player + Vec2::new(10.0, 0.0), 2);

        let events = tick(&mut state, &idle(0.0), &params);
        assert_eq!(state.lives, 1);
        assert_eq!(count(&events, |e| matches!(e, GameEvent::PlayerHit { .. })), 2);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_game_over_fires_exactly_once() {
        let mut state = new_state();
        let params = frozen(Difficulty::Medium);
        let player = state.player.pos;
        state.lives = 1;
        // More rams than lives, all in the same frame
        for i in 0..3 {
            add_enemy(&mut state, player + Vec2::new(i as f32 * 5.0, 0.0), 2);
        }

        let events = tick(&mut state, &idle(0.0), &params);
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(count(&events, |e| matches!(e, GameEvent::GameOver { .. })), 1);

        // Simulation has stopped
        add_enemy(&mut state, player, 2);
        let events = tick(&mut state, &idle(16.0), &params);
        assert!(events.is_empty());
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_paused_state_is_frozen() {
        let mut state = new_state();
        let params = Difficulty::Medium.params();
        add_enemy(&mut state, Vec2::new(100.0, 100.0), 2);
        add_bullet(&mut state, Vec2::new(300.0, 300.0));
        state.phase = GamePhase::Paused;

        let input = TickInput {
            right: true,
            fire: true,
            now_ms: 10_000.0,
            ..Default::default()
        };
        for _ in 0..50 {
            assert!(tick(&mut state, &input, &params).is_empty());
        }
        assert_eq!(state.enemies[0].pos.y, 100.0);
        assert_eq!(state.bullets.len(), 1);
        assert_eq!(state.bullets[0].pos.y, 300.0);
        assert_eq!(state.player.pos.x, 370.0);
    }

    #[test]
    fn test_effects_expire() {
        let mut state = new_state();
        state.spawn_effect(EffectKind::Impact, Vec2::new(50.0, 50.0));
        for _ in 0..7 {
            tick(&mut state, &idle(0.0), &Difficulty::Easy.params());
        }
        assert_eq!(state.effects.len(), 1);
        assert_eq!(state.effects[0].life, 1);
        tick(&mut state, &idle(0.0), &Difficulty::Easy.params());
        assert!(state.effects.is_empty());
    }

    #[test]
    fn test_determinism() {
        let mut a = new_state();
        let mut b = new_state();
        for state in [&mut a, &mut b] {
            add_enemy(state, Vec2::new(350.0, 0.0), 2);
        }

        for frame in 0..120 {
            let input = TickInput {
                left: frame % 40 < 10,
                right: frame % 40 > 30,
                fire: true,
                now_ms: frame as f64 * FRAME_MS,
            };
            let ea = tick(&mut a, &input, &Difficulty::Medium.params());
            let eb = tick(&mut b, &input, &Difficulty::Medium.params());
            assert_eq!(ea, eb);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.bullets.len(), b.bullets.len());
    }
}
