//! Canvas2D painter (WASM only)
//!
//! Paints a `Scene` onto a `CanvasRenderingContext2d`. A sprite that failed to
//! load simply isn't drawn; paint errors are logged once and swallowed.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Result, anyhow};
use futures::channel::oneshot;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::scene::{DrawCmd, Scene, Sprite};
use crate::assets::GeneratedAssets;

/// Decoded sprite images; either may be missing
#[derive(Default)]
pub struct SpriteImages {
    pub player: Option<HtmlImageElement>,
    pub enemy: Option<HtmlImageElement>,
}

impl SpriteImages {
    /// Load both sprites, degrading to `None` on failure
    pub async fn load(assets: &GeneratedAssets) -> Self {
        let (player, enemy) = futures::join!(
            load_optional("player", assets.player_image_src()),
            load_optional("enemy", assets.enemy_image_src()),
        );
        Self { player, enemy }
    }
}

async fn load_optional(name: &str, src: Option<String>) -> Option<HtmlImageElement> {
    let Some(src) = src else {
        log::warn!("No {} sprite supplied", name);
        return None;
    };
    match load_image(&src).await {
        Ok(image) => Some(image),
        Err(err) => {
            log::error!("Failed to load {} sprite: {:#}", name, err);
            None
        }
    }
}

/// Resolve once the image has decoded (or failed to)
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = HtmlImageElement::new()
        .map_err(|err| anyhow!("Could not create image element: {:?}", err))?;
    let (tx, rx) = oneshot::channel::<Result<()>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let on_load = Closure::once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });
    let on_error = Closure::once(move |err: wasm_bindgen::JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!("Error decoding image: {:?}", err)));
        }
    });

    image.set_onload(Some(on_load.as_ref().unchecked_ref()));
    image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    image.set_src(source);

    // Both callbacks must outlive this frame; rx settles after one of them runs
    let result = rx.await;
    image.set_onload(None);
    image.set_onerror(None);
    drop(on_load);
    drop(on_error);

    result.map_err(|_| anyhow!("Image load was cancelled"))??;
    Ok(image)
}

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    sprites: SpriteImages,
    reported_error: bool,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement, sprites: SpriteImages) -> Result<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(|err| anyhow!("Error getting 2d context: {:?}", err))?
            .ok_or_else(|| anyhow!("No 2d context found"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|element| anyhow!("Error converting {:?} to CanvasRenderingContext2d", element))?;
        Ok(Self {
            canvas,
            context,
            sprites,
            reported_error: false,
        })
    }

    /// Match the backing store to the element's CSS size
    pub fn fit_to_container(&self) -> (f32, f32) {
        let width = self.canvas.client_width().max(0) as u32;
        let height = self.canvas.client_height().max(0) as u32;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        (width as f32, height as f32)
    }

    pub fn render(&mut self, scene: &Scene) {
        let ctx = &self.context;
        ctx.save();
        if scene.offset.x != 0.0 || scene.offset.y != 0.0 {
            if let Err(err) = ctx.translate(scene.offset.x as f64, scene.offset.y as f64) {
                log::warn!("Camera translate failed: {:?}", err);
            }
        }

        for cmd in &scene.commands {
            if let Err(err) = self.paint(cmd) {
                if !self.reported_error {
                    log::error!("Paint error (further errors suppressed): {:#}", err);
                    self.reported_error = true;
                }
            }
        }

        self.context.restore();
    }

    fn paint(&self, cmd: &DrawCmd) -> Result<()> {
        let ctx = &self.context;
        match cmd {
            DrawCmd::Clear { size } => {
                ctx.clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
            }
            DrawCmd::Sprite { sprite, bounds } => {
                let image = match sprite {
                    Sprite::Player => self.sprites.player.as_ref(),
                    Sprite::Enemy => self.sprites.enemy.as_ref(),
                };
                if let Some(image) = image {
                    ctx.draw_image_with_html_image_element_and_dw_and_dh(
                        image,
                        bounds.pos.x as f64,
                        bounds.pos.y as f64,
                        bounds.size.x as f64,
                        bounds.size.y as f64,
                    )
                    .map_err(|err| anyhow!("drawImage failed: {:?}", err))?;
                }
            }
            DrawCmd::GlowRect { bounds, color, blur } => {
                ctx.set_fill_style_str(color);
                ctx.set_shadow_color(color);
                ctx.set_shadow_blur(*blur);
                ctx.fill_rect(
                    bounds.pos.x as f64,
                    bounds.pos.y as f64,
                    bounds.size.x as f64,
                    bounds.size.y as f64,
                );
                ctx.set_shadow_blur(0.0);
            }
            DrawCmd::Circle {
                center,
                radius,
                color,
            } => {
                ctx.begin_path();
                ctx.arc(
                    center.x as f64,
                    center.y as f64,
                    radius.max(0.0) as f64,
                    0.0,
                    std::f64::consts::PI * 2.0,
                )
                .map_err(|err| anyhow!("arc failed: {:?}", err))?;
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill();
            }
        }
        Ok(())
    }
}
