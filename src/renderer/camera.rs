//! Screen shake camera
//!
//! Shake is time-boxed in wall-clock milliseconds so it lasts the same on
//! every refresh rate.

use glam::Vec2;
use rand::Rng;

use crate::consts::SHAKE_DURATION_MS;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenShake {
    intensity: f32,
    until_ms: f64,
}

impl ScreenShake {
    /// Start (or restart) a shake; the latest trigger wins
    pub fn trigger(&mut self, intensity: f32, now_ms: f64) {
        self.intensity = intensity;
        self.until_ms = now_ms + SHAKE_DURATION_MS;
    }

    pub fn intensity_at(&self, now_ms: f64) -> f32 {
        if now_ms < self.until_ms {
            self.intensity
        } else {
            0.0
        }
    }

    pub fn is_active(&self, now_ms: f64) -> bool {
        self.intensity_at(now_ms) > 0.0
    }

    /// Camera jitter for this frame, each axis within half the intensity
    pub fn offset<R: Rng>(&self, rng: &mut R, now_ms: f64) -> Vec2 {
        let intensity = self.intensity_at(now_ms);
        if intensity <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            (rng.random::<f32>() - 0.5) * intensity,
            (rng.random::<f32>() - 0.5) * intensity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_shake_expires_after_duration() {
        let mut shake = ScreenShake::default();
        assert!(!shake.is_active(0.0));

        shake.trigger(8.0, 1000.0);
        assert_eq!(shake.intensity_at(1000.0), 8.0);
        assert_eq!(shake.intensity_at(1149.0), 8.0);
        assert_eq!(shake.intensity_at(1150.0), 0.0);
    }

    #[test]
    fn test_retrigger_extends_and_replaces() {
        let mut shake = ScreenShake::default();
        shake.trigger(8.0, 1000.0);
        shake.trigger(12.0, 1100.0);
        assert_eq!(shake.intensity_at(1200.0), 12.0);
        assert!(!shake.is_active(1250.0));
    }

    #[test]
    fn test_offset_zero_when_idle() {
        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(ScreenShake::default().offset(&mut rng, 0.0), Vec2::ZERO);
    }

    #[test]
    fn test_offset_rerolls_each_frame() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut shake = ScreenShake::default();
        shake.trigger(12.0, 0.0);
        let a = shake.offset(&mut rng, 10.0);
        let b = shake.offset(&mut rng, 26.0);
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn offset_bounded_by_intensity(seed in any::<u64>(), intensity in 0.1f32..50.0, t in 0.0f64..149.0) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut shake = ScreenShake::default();
            shake.trigger(intensity, 0.0);
            let off = shake.offset(&mut rng, t);
            prop_assert!(off.x.abs() <= intensity / 2.0);
            prop_assert!(off.y.abs() <= intensity / 2.0);
        }
    }
}
