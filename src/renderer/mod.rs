//! Rendering module
//!
//! `scene` turns simulation state into draw commands, `camera` owns screen
//! shake, and `canvas` paints on a browser Canvas2D context.

pub mod camera;
#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;

pub use camera::ScreenShake;
#[cfg(target_arch = "wasm32")]
pub use canvas::{CanvasRenderer, SpriteImages};
pub use scene::{DrawCmd, Scene, Sprite, build_scene};
