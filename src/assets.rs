//! Generated asset set
//!
//! Produced once by the external generation pipeline before a session starts
//! and immutable afterwards. Parsing is lenient: a missing or malformed sound
//! reference falls back to a bundled default instead of failing the session.

use serde::{Deserialize, Deserializer, Serialize};

use crate::audio::SoundEffect;

/// Default sound URLs used when the pipeline gives us nothing usable
pub const DEFAULT_LASER_URL: &str =
    "https://assets.mixkit.co/sfx/preview/mixkit-short-laser-gun-shot-1670.mp3";
pub const DEFAULT_HIT_URL: &str =
    "https://assets.mixkit.co/sfx/preview/mixkit-electronic-retro-block-hit-2185.mp3";
pub const DEFAULT_EXPLOSION_URL: &str =
    "https://assets.mixkit.co/sfx/preview/mixkit-fast-explosion-1688.mp3";

/// Shown when the pipeline returned no briefing
pub const FALLBACK_MISSION: &str = "Destroy all enemy ships!";

const AUDIO_EXTENSIONS: [&str; 3] = [".mp3", ".wav", ".ogg"];

/// A sound reference and where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundRef {
    pub url: String,
    #[serde(default)]
    pub source: String,
}

impl SoundRef {
    pub fn new(url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Bundled default for an effect
    pub fn fallback(effect: SoundEffect) -> Self {
        let url = match effect {
            SoundEffect::Laser => DEFAULT_LASER_URL,
            SoundEffect::Hit => DEFAULT_HIT_URL,
            SoundEffect::Explosion => DEFAULT_EXPLOSION_URL,
        };
        Self::new(url, "fallback")
    }

    /// Direct link to an audio file (https + known extension) or inline audio
    pub fn is_playable(&self) -> bool {
        let url = self.url.trim();
        if url.starts_with("data:audio/") {
            return true;
        }
        let path = url.split(['?', '#']).next().unwrap_or_default().to_lowercase();
        url.starts_with("https://") && AUDIO_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
    }
}

/// Sound references for the three in-game effects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SfxRefs {
    #[serde(default, deserialize_with = "lenient_sound")]
    pub laser: Option<SoundRef>,
    #[serde(default, deserialize_with = "lenient_sound")]
    pub hit: Option<SoundRef>,
    #[serde(default, deserialize_with = "lenient_sound")]
    pub explosion: Option<SoundRef>,
}

/// Accept only the `{url, source}` shape; anything else reads as absent
fn lenient_sound<'de, D>(deserializer: D) -> Result<Option<SoundRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match serde_json::from_value::<SoundRef>(v) {
        Ok(sound) => Some(sound),
        Err(err) => {
            log::warn!("Ignoring malformed sound reference: {}", err);
            None
        }
    }))
}

/// Everything a session needs from the generation pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedAssets {
    /// Player sprite, base64 PNG or a `data:` URL
    #[serde(default)]
    pub player: String,
    /// Enemy sprite, base64 PNG or a `data:` URL
    #[serde(default)]
    pub enemy: String,
    #[serde(default)]
    pub mission: String,
    #[serde(default)]
    pub sfx: SfxRefs,
}

impl GeneratedAssets {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn player_image_src(&self) -> Option<String> {
        image_src(&self.player)
    }

    pub fn enemy_image_src(&self) -> Option<String> {
        image_src(&self.enemy)
    }

    pub fn mission_text(&self) -> &str {
        let mission = self.mission.trim();
        if mission.is_empty() {
            FALLBACK_MISSION
        } else {
            mission
        }
    }

    /// Sound to play for an effect, falling back to the bundled default
    pub fn sound(&self, effect: SoundEffect) -> SoundRef {
        let supplied = match effect {
            SoundEffect::Laser => self.sfx.laser.as_ref(),
            SoundEffect::Hit => self.sfx.hit.as_ref(),
            SoundEffect::Explosion => self.sfx.explosion.as_ref(),
        };
        match supplied {
            Some(sound) if sound.is_playable() => sound.clone(),
            Some(sound) => {
                log::warn!("Unplayable {:?} sound '{}', using fallback", effect, sound.url);
                SoundRef::fallback(effect)
            }
            None => SoundRef::fallback(effect),
        }
    }
}

/// Turn a sprite payload into something an `<img>` can load
fn image_src(payload: &str) -> Option<String> {
    let payload = payload.trim();
    if payload.is_empty() {
        None
    } else if payload.starts_with("data:") {
        Some(payload.to_string())
    } else {
        Some(format!("data:image/png;base64,{}", payload))
    }
}
