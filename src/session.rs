//! Game session shell
//!
//! Wraps the simulation with everything a frame needs from the outside:
//! input, live settings, the enemy spawner and the camera. The host calls
//! `frame` once per display refresh and `spawn_tick` on the spawner timer,
//! then acts on the returned `FrameReport`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::assets::GeneratedAssets;
use crate::audio::SoundEffect;
use crate::input::{InputState, TouchDirection};
use crate::renderer::{Scene, ScreenShake, build_scene};
use crate::settings::Settings;
use crate::sim::{self, ControlLayout, EnemySpawner, GameEvent, GamePhase, GameState};

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub events: Vec<GameEvent>,
    /// Sounds to play now, empty when SFX are off
    pub sounds: Vec<SoundEffect>,
    /// False when the frame was skipped (paused, over, or exited)
    pub simulated: bool,
    /// Set on the single frame where lives ran out
    pub session_ended: bool,
}

pub struct GameSession {
    state: GameState,
    input: InputState,
    settings: Settings,
    shake: ScreenShake,
    spawner: EnemySpawner,
    /// Camera jitter only; kept apart from the spawner stream
    shake_rng: Pcg32,
    mission: String,
    ended_reported: bool,
    exited: bool,
}

impl GameSession {
    pub fn new(
        width: f32,
        height: f32,
        layout: ControlLayout,
        settings: Settings,
        assets: &GeneratedAssets,
        seed: u64,
    ) -> Self {
        log::info!(
            "New session {}x{} ({:?} controls, {} difficulty)",
            width,
            height,
            layout,
            settings.difficulty.as_str()
        );
        Self {
            state: GameState::new(width, height, layout),
            input: InputState::new(),
            settings,
            shake: ScreenShake::default(),
            spawner: EnemySpawner::new(seed),
            shake_rng: Pcg32::seed_from_u64(seed.rotate_left(32) ^ 0x5eed),
            mission: assets.mission_text().to_string(),
            ended_reported: false,
            exited: false,
        }
    }

    /// Advance one frame at wall-clock time `now_ms`
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        let mut report = FrameReport::default();
        if self.exited || !self.state.is_playing() {
            return report;
        }

        let input = self.input.snapshot(now_ms);
        let params = self.settings.difficulty.params();
        report.events = sim::tick(&mut self.state, &input, &params);
        report.simulated = true;

        for event in &report.events {
            match *event {
                GameEvent::ScreenShake { intensity } => self.shake.trigger(intensity, now_ms),
                GameEvent::Sound(effect) if self.settings.sfx => report.sounds.push(effect),
                GameEvent::GameOver { final_score } if !self.ended_reported => {
                    log::info!("Game over, final score {}", final_score);
                    self.ended_reported = true;
                    report.session_ended = true;
                }
                _ => {}
            }
        }
        report
    }

    /// Spawner timer callback; returns the new enemy's id
    pub fn spawn_tick(&mut self) -> Option<u32> {
        if self.exited || !self.state.is_playing() {
            return None;
        }
        let health = self.settings.difficulty.params().enemy_health;
        Some(self.spawner.spawn(&mut self.state, health))
    }

    /// Draw list for this frame, including camera shake
    pub fn scene(&mut self, now_ms: f64) -> Scene {
        let offset = self.shake.offset(&mut self.shake_rng, now_ms);
        build_scene(&self.state, offset)
    }

    /// Scene to paint after `report`, or `None` while paused so the last
    /// picture (shake included) stays on screen
    pub fn frame_scene(&mut self, report: &FrameReport, now_ms: f64) -> Option<Scene> {
        if !report.simulated && self.is_paused() {
            return None;
        }
        Some(self.scene(now_ms))
    }

    pub fn toggle_pause(&mut self) {
        let paused = self.is_paused();
        self.set_paused(!paused);
    }

    /// Pause or resume; ignored once the game is over
    pub fn set_paused(&mut self, paused: bool) {
        if self.exited {
            return;
        }
        let next = match (self.state.phase, paused) {
            (GamePhase::Playing, true) => GamePhase::Paused,
            (GamePhase::Paused, false) => GamePhase::Playing,
            _ => return,
        };
        self.state.phase = next;
        // A fire tap made while paused must not shoot on resume
        self.input.discard_fire();
        log::info!("{}", if paused { "Paused" } else { "Resumed" });
    }

    pub fn is_paused(&self) -> bool {
        self.state.phase == GamePhase::Paused
    }

    pub fn is_playing(&self) -> bool {
        !self.exited && self.state.is_playing()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if self.exited {
            return;
        }
        self.state.resize(width, height);
    }

    pub fn key_down(&mut self, key: &str) {
        if !self.exited {
            self.input.key_down(key);
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if !self.exited {
            self.input.key_up(key);
        }
    }

    /// On-screen pad: "left", "right" or "stop"
    pub fn touch_move(&mut self, direction: &str) {
        if self.exited {
            return;
        }
        match TouchDirection::from_str(direction) {
            Some(direction) => self.input.set_touch(direction),
            None => log::warn!("Unknown touch direction {:?}", direction),
        }
    }

    /// On-screen fire button
    pub fn fire(&mut self) {
        if !self.exited && self.state.is_playing() {
            self.input.trigger_fire();
        }
    }

    /// Adopt new settings; sound and spawn rate follow on the next frame
    pub fn set_settings(&mut self, settings: Settings) {
        if settings.difficulty != self.settings.difficulty {
            log::info!(
                "Difficulty {} -> {}",
                self.settings.difficulty.as_str(),
                settings.difficulty.as_str()
            );
        }
        self.settings = settings;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn spawn_interval_ms(&self) -> u32 {
        self.settings.difficulty.params().spawn_interval_ms
    }

    /// Leave the session; later calls are ignored
    pub fn exit(&mut self) {
        if !self.exited {
            log::info!("Session exited with score {}", self.state.score);
        }
        self.exited = true;
        self.input.clear();
    }

    pub fn is_exited(&self) -> bool {
        self.exited
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn lives(&self) -> u8 {
        self.state.lives
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn mission(&self) -> &str {
        &self.mission
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn shake(&self) -> &ScreenShake {
        &self.shake
    }

    pub fn player_pos(&self) -> Vec2 {
        self.state.player.pos
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}
