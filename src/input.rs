//! Input aggregation
//!
//! Input events (keyboard, on-screen touch buttons) write here whenever they
//! arrive; the frame reads exactly one snapshot per tick.

use std::collections::HashSet;

use crate::sim::TickInput;

const LEFT_KEYS: [&str; 2] = ["ArrowLeft", "a"];
const RIGHT_KEYS: [&str; 2] = ["ArrowRight", "d"];
const FIRE_KEYS: [&str; 2] = [" ", "Spacebar"];

/// Direction of the on-screen touch pad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchDirection {
    Left,
    Right,
    #[default]
    Stop,
}

impl TouchDirection {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "left" => Some(TouchDirection::Left),
            "right" => Some(TouchDirection::Right),
            "stop" => Some(TouchDirection::Stop),
            _ => None,
        }
    }
}

/// Held keys, touch direction and a latched fire press
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<String>,
    touch: TouchDirection,
    fire_latched: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: &str) {
        self.held.insert(key.to_string());
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(key);
    }

    pub fn set_touch(&mut self, direction: TouchDirection) {
        self.touch = direction;
    }

    /// Edge-triggered fire from the touch button; consumed by the next snapshot
    pub fn trigger_fire(&mut self) {
        self.fire_latched = true;
    }

    /// Forget everything held, e.g. when the session loses focus
    pub fn clear(&mut self) {
        self.held.clear();
        self.touch = TouchDirection::Stop;
        self.fire_latched = false;
    }

    /// Drop a pending touch fire without touching held state
    pub fn discard_fire(&mut self) {
        self.fire_latched = false;
    }

    /// Read the input for one frame
    pub fn snapshot(&mut self, now_ms: f64) -> TickInput {
        let any_held = |keys: &[&str]| keys.iter().any(|k| self.held.contains(*k));
        let input = TickInput {
            left: any_held(&LEFT_KEYS) || self.touch == TouchDirection::Left,
            right: any_held(&RIGHT_KEYS) || self.touch == TouchDirection::Right,
            fire: any_held(&FIRE_KEYS) || self.fire_latched,
            now_ms,
        };
        self.fire_latched = false;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_keys() {
        let mut input = InputState::new();
        input.key_down("ArrowLeft");
        let snap = input.snapshot(0.0);
        assert!(snap.left);
        assert!(!snap.right);

        input.key_up("ArrowLeft");
        input.key_down("d");
        let snap = input.snapshot(16.0);
        assert!(!snap.left);
        assert!(snap.right);
        assert_eq!(snap.now_ms, 16.0);
    }

    #[test]
    fn test_touch_direction() {
        let mut input = InputState::new();
        input.set_touch(TouchDirection::Right);
        assert!(input.snapshot(0.0).right);
        input.set_touch(TouchDirection::Stop);
        let snap = input.snapshot(0.0);
        assert!(!snap.left && !snap.right);
    }

    #[test]
    fn test_space_is_held_fire() {
        let mut input = InputState::new();
        input.key_down(" ");
        assert!(input.snapshot(0.0).fire);
        assert!(input.snapshot(16.0).fire);
    }

    #[test]
    fn test_touch_fire_is_edge_triggered() {
        let mut input = InputState::new();
        input.trigger_fire();
        assert!(input.snapshot(0.0).fire);
        assert!(!input.snapshot(16.0).fire);
    }

    #[test]
    fn test_touch_direction_parsing() {
        assert_eq!(TouchDirection::from_str("left"), Some(TouchDirection::Left));
        assert_eq!(TouchDirection::from_str("stop"), Some(TouchDirection::Stop));
        assert_eq!(TouchDirection::from_str("up"), None);
    }

    #[test]
    fn test_clear() {
        let mut input = InputState::new();
        input.key_down("a");
        input.set_touch(TouchDirection::Left);
        input.trigger_fire();
        input.clear();
        let snap = input.snapshot(0.0);
        assert!(!snap.left && !snap.fire);
    }
}
