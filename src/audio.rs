//! Audio playback
//!
//! Sound effects are URLs handed over by the asset pipeline and played through
//! `<audio>` elements. Playback failures are logged and never reach the game
//! loop.

/// Looping background track
pub const MUSIC_URL: &str = "https://assets.mixkit.co/music/preview/mixkit-whip-858.mp3";
pub const MUSIC_VOLUME: f64 = 0.3;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Shot accepted
    Laser,
    /// Bullet strikes an enemy
    Hit,
    /// Enemy destroyed or rammed
    Explosion,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 3] = [SoundEffect::Laser, SoundEffect::Hit, SoundEffect::Explosion];

    /// Element volume (0.0 - 1.0)
    pub fn volume(&self) -> f64 {
        match self {
            SoundEffect::Laser => 0.4,
            SoundEffect::Hit => 0.3,
            SoundEffect::Explosion => 0.5,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen_futures::JsFuture;
    use web_sys::HtmlAudioElement;

    use super::{MUSIC_URL, MUSIC_VOLUME, SoundEffect};
    use crate::assets::GeneratedAssets;

    /// Audio manager for one session
    pub struct AudioManager {
        clips: Vec<(SoundEffect, HtmlAudioElement)>,
        music: Option<HtmlAudioElement>,
        music_playing: bool,
    }

    impl AudioManager {
        pub fn new(assets: &GeneratedAssets) -> Self {
            let clips = SoundEffect::ALL
                .iter()
                .filter_map(|&effect| {
                    let sound = assets.sound(effect);
                    match HtmlAudioElement::new_with_src(&sound.url) {
                        Ok(el) => {
                            el.set_volume(effect.volume());
                            Some((effect, el))
                        }
                        Err(err) => {
                            log::warn!("Failed to create audio for {:?}: {:?}", effect, err);
                            None
                        }
                    }
                })
                .collect();

            let music = match HtmlAudioElement::new_with_src(MUSIC_URL) {
                Ok(el) => {
                    el.set_loop(true);
                    el.set_volume(MUSIC_VOLUME);
                    Some(el)
                }
                Err(err) => {
                    log::warn!("Failed to create music element - music disabled: {:?}", err);
                    None
                }
            };

            Self {
                clips,
                music,
                music_playing: false,
            }
        }

        /// Restart and play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let Some((_, el)) = self.clips.iter().find(|(e, _)| *e == effect) else {
                return;
            };
            el.set_current_time(0.0);
            play_element(el, effect);
        }

        /// Start or stop the looping music track
        pub fn set_music(&mut self, enabled: bool) {
            let Some(music) = &self.music else { return };
            if enabled == self.music_playing {
                return;
            }
            if enabled {
                play_element(music, "music");
            } else {
                let _ = music.pause();
                music.set_current_time(0.0);
            }
            self.music_playing = enabled;
        }

        /// Silence everything (session exit)
        pub fn stop_all(&mut self) {
            self.set_music(false);
            for (_, el) in &self.clips {
                let _ = el.pause();
            }
        }
    }

    fn play_element(el: &HtmlAudioElement, what: impl std::fmt::Debug + 'static) {
        match el.play() {
            Ok(promise) => {
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(err) = JsFuture::from(promise).await {
                        log::warn!("Audio play failed for {:?}: {:?}", what, err);
                    }
                });
            }
            Err(err) => log::warn!("Audio play failed for {:?}: {:?}", what, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volumes_in_range() {
        for effect in SoundEffect::ALL {
            let vol = effect.volume();
            assert!(vol > 0.0 && vol <= 1.0);
        }
        assert!(SoundEffect::Explosion.volume() > SoundEffect::Hit.volume());
    }
}
