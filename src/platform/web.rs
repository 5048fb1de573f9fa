//! Browser host (WASM only)
//!
//! `GameHandle` is what the page's JS shell holds on to. Everything behind it
//! lives in one `Runtime` shared through `Rc<RefCell<_>>`; the frame, spawner
//! and DOM callbacks only keep a `Weak`, so exiting (or dropping the handle)
//! tears the whole thing down.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use anyhow::{Context, Result, anyhow};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, EventTarget, HtmlCanvasElement, KeyboardEvent, Window};

use crate::assets::GeneratedAssets;
use crate::audio::AudioManager;
use crate::renderer::{CanvasRenderer, SpriteImages};
use crate::scheduler::{FrameScheduler, TimerHandle, TimerHost};
use crate::session::{FrameReport, GameSession};
use crate::settings::Settings;
use crate::sim::{ControlLayout, GamePhase};

/// `requestAnimationFrame` / `setInterval` behind `TimerHost`
struct WebTimers {
    window: Window,
    on_frame: Closure<dyn FnMut(f64)>,
    on_spawn: Closure<dyn FnMut()>,
}

impl WebTimers {
    fn new(window: Window, runtime: Weak<RefCell<Runtime>>) -> Self {
        let frame_rt = runtime.clone();
        let on_frame = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
            if let Some(rt) = frame_rt.upgrade() {
                run_frame(&rt, time);
            }
        });
        let on_spawn = Closure::<dyn FnMut()>::new(move || {
            if let Some(rt) = runtime.upgrade() {
                let mut guard = rt.borrow_mut();
                let rt = &mut *guard;
                rt.scheduler.on_spawn_timer(&mut rt.session);
            }
        });
        Self {
            window,
            on_frame,
            on_spawn,
        }
    }
}

impl TimerHost for WebTimers {
    fn request_frame(&mut self) -> Option<TimerHandle> {
        match self
            .window
            .request_animation_frame(self.on_frame.as_ref().unchecked_ref())
        {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::error!("requestAnimationFrame failed: {:?}", err);
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: TimerHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle) {
            log::warn!("cancelAnimationFrame failed: {:?}", err);
        }
    }

    fn start_interval(&mut self, interval_ms: u32) -> Option<TimerHandle> {
        let timeout = i32::try_from(interval_ms).unwrap_or(i32::MAX);
        match self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                self.on_spawn.as_ref().unchecked_ref(),
                timeout,
            ) {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::error!("setInterval failed: {:?}", err);
                None
            }
        }
    }

    fn cancel_interval(&mut self, handle: TimerHandle) {
        self.window.clear_interval_with_handle(handle);
    }
}

/// A DOM listener we have to remove again on exit
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        kind: &'static str,
        callback: Closure<dyn FnMut(web_sys::Event)>,
    ) -> Result<Self> {
        target
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .map_err(|err| anyhow!("Could not listen for {}: {:?}", kind, err))?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }

    fn detach(self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref())
        {
            log::warn!("Could not remove {} listener: {:?}", self.kind, err);
        }
    }
}

struct Runtime {
    session: GameSession,
    scheduler: FrameScheduler,
    timers: WebTimers,
    renderer: CanvasRenderer,
    audio: AudioManager,
    document: Document,
    listeners: Vec<Listener>,
    on_ended: js_sys::Function,
}

impl Runtime {
    fn apply_report(&mut self, report: &FrameReport, now_ms: f64) {
        for &sound in &report.sounds {
            self.audio.play(sound);
        }
        if let Some(scene) = self.session.frame_scene(report, now_ms) {
            self.renderer.render(&scene);
            self.update_hud();
        }
    }

    /// Music follows the setting, and stops while paused
    fn sync_music(&mut self) {
        let wanted = self.session.settings().music && self.session.is_playing();
        self.audio.set_music(wanted);
    }

    fn update_hud(&self) {
        if let Some(el) = self.document.get_element_by_id("hud-score") {
            el.set_text_content(Some(&self.session.score().to_string()));
        }
        if let Some(el) = self.document.get_element_by_id("hud-lives") {
            el.set_text_content(Some(&self.session.lives().to_string()));
        }
        if let Some(el) = self.document.get_element_by_id("pause-menu") {
            let hidden = self.session.phase() != GamePhase::Paused;
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn toggle_pause(&mut self) {
        self.session.toggle_pause();
        self.after_pause_change();
    }

    fn set_paused(&mut self, paused: bool) {
        self.session.set_paused(paused);
        self.after_pause_change();
    }

    fn after_pause_change(&mut self) {
        self.scheduler.sync_spawner(&mut self.timers, &self.session);
        self.sync_music();
        self.update_hud();
    }

    fn shutdown(&mut self) {
        if self.session.is_exited() {
            return;
        }
        self.scheduler.stop(&mut self.timers);
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        self.audio.stop_all();
        self.session.exit();
    }
}

fn run_frame(rt: &Rc<RefCell<Runtime>>, now_ms: f64) {
    let ended = {
        let mut guard = rt.borrow_mut();
        let runtime = &mut *guard;
        let Some(report) =
            runtime
                .scheduler
                .on_frame(&mut runtime.timers, &mut runtime.session, now_ms)
        else {
            return;
        };
        runtime.apply_report(&report, now_ms);
        if report.session_ended {
            runtime.sync_music();
            Some((runtime.on_ended.clone(), runtime.session.score()))
        } else {
            None
        }
    };

    // The JS callback may call back into the handle, so no borrow is held here
    if let Some((callback, score)) = ended {
        if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_f64(score as f64)) {
            log::error!("Session-ended callback threw: {:?}", err);
        }
    }
}

fn init_logging() {
    console_error_panic_hook::set_once();
    // Already initialised by an earlier session
    let _ = console_log::init_with_level(log::Level::Info);
}

fn with_runtime<T>(rt: &Weak<RefCell<Runtime>>, f: impl FnOnce(&mut Runtime) -> T) -> Option<T> {
    let rt = rt.upgrade()?;
    let mut guard = rt.try_borrow_mut().ok()?;
    Some(f(&mut guard))
}

fn register_listeners(window: &Window, runtime: &Weak<RefCell<Runtime>>) -> Result<Vec<Listener>> {
    let target: &EventTarget = window.as_ref();
    let mut listeners = Vec::with_capacity(3);

    let rt = runtime.clone();
    listeners.push(Listener::attach(
        target,
        "keydown",
        Closure::new(move |event: web_sys::Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = event.key();
            if key == " " {
                // Keep the page from scrolling
                event.prevent_default();
            }
            with_runtime(&rt, |runtime| match key.as_str() {
                "Escape" | "p" => runtime.toggle_pause(),
                _ => runtime.session.key_down(&key),
            });
        }),
    )?);

    let rt = runtime.clone();
    listeners.push(Listener::attach(
        target,
        "keyup",
        Closure::new(move |event: web_sys::Event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                let key = event.key();
                with_runtime(&rt, |runtime| runtime.session.key_up(&key));
            }
        }),
    )?);

    let rt = runtime.clone();
    listeners.push(Listener::attach(
        target,
        "resize",
        Closure::new(move |_event: web_sys::Event| {
            with_runtime(&rt, |runtime| {
                let (width, height) = runtime.renderer.fit_to_container();
                runtime.session.resize(width, height);
            });
        }),
    )?);

    Ok(listeners)
}

fn parse_settings(json: &str) -> Settings {
    if json.trim().is_empty() {
        return Settings::load();
    }
    match Settings::from_json(json) {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("Invalid settings from host ({}), using stored settings", err);
            Settings::load()
        }
    }
}

async fn launch(
    canvas_id: &str,
    assets_json: &str,
    settings_json: &str,
    touch_layout: bool,
    on_ended: js_sys::Function,
) -> Result<Rc<RefCell<Runtime>>> {
    let window = web_sys::window().context("no window")?;
    let document = window.document().context("no document")?;

    let canvas: HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .with_context(|| format!("no canvas with id '{}'", canvas_id))?
        .dyn_into()
        .map_err(|el| anyhow!("#{} is not a canvas: {:?}", canvas_id, el))?;

    let assets = GeneratedAssets::from_json(assets_json).unwrap_or_else(|err| {
        log::error!("Could not parse generated assets ({}), using fallbacks", err);
        GeneratedAssets::default()
    });
    let settings = parse_settings(settings_json);

    let sprites = SpriteImages::load(&assets).await;
    let renderer = CanvasRenderer::new(canvas, sprites)?;
    let (width, height) = renderer.fit_to_container();

    let layout = if touch_layout {
        ControlLayout::Touch
    } else {
        ControlLayout::Keyboard
    };
    let seed = js_sys::Date::now() as u64;
    let session = GameSession::new(width, height, layout, settings, &assets, seed);
    log::info!("Session seeded with {}", seed);

    if let Some(el) = document.get_element_by_id("hud-mission") {
        el.set_text_content(Some(session.mission()));
    }

    let runtime = Rc::new_cyclic(|weak: &Weak<RefCell<Runtime>>| {
        RefCell::new(Runtime {
            session,
            scheduler: FrameScheduler::new(),
            timers: WebTimers::new(window.clone(), weak.clone()),
            renderer,
            audio: AudioManager::new(&assets),
            document,
            listeners: Vec::new(),
            on_ended,
        })
    });

    let listeners = register_listeners(&window, &Rc::downgrade(&runtime))?;
    {
        let mut guard = runtime.borrow_mut();
        let rt = &mut *guard;
        rt.listeners = listeners;
        rt.scheduler.start(&mut rt.timers, &rt.session);
        rt.sync_music();
        rt.update_hud();
    }

    Ok(runtime)
}

/// Handle to a running session, owned by the page
#[wasm_bindgen]
pub struct GameHandle {
    runtime: Rc<RefCell<Runtime>>,
}

#[wasm_bindgen]
impl GameHandle {
    /// Build the session on `canvas_id` and start the frame loop.
    ///
    /// `on_ended` is called once with the final score when lives run out.
    pub async fn start(
        canvas_id: String,
        assets_json: String,
        settings_json: String,
        touch_layout: bool,
        on_ended: js_sys::Function,
    ) -> Result<GameHandle, JsValue> {
        init_logging();
        let runtime = launch(&canvas_id, &assets_json, &settings_json, touch_layout, on_ended)
            .await
            .map_err(|err| {
                log::error!("Failed to start session: {:#}", err);
                JsValue::from_str(&format!("{:#}", err))
            })?;
        Ok(GameHandle { runtime })
    }

    pub fn toggle_pause(&self) {
        self.runtime.borrow_mut().toggle_pause();
    }

    pub fn set_paused(&self, paused: bool) {
        self.runtime.borrow_mut().set_paused(paused);
    }

    /// On-screen pad: "left", "right" or "stop"
    pub fn touch_move(&self, direction: &str) {
        self.runtime.borrow_mut().session.touch_move(direction);
    }

    pub fn fire(&self) {
        self.runtime.borrow_mut().session.fire();
    }

    /// Apply and persist new settings
    pub fn set_settings(&self, settings_json: &str) -> Result<(), JsValue> {
        let settings = Settings::from_json(settings_json)
            .map_err(|err| JsValue::from_str(&format!("Invalid settings: {}", err)))?;
        settings.save();

        let mut guard = self.runtime.borrow_mut();
        let rt = &mut *guard;
        rt.session.set_settings(settings);
        rt.scheduler.sync_spawner(&mut rt.timers, &rt.session);
        rt.sync_music();
        Ok(())
    }

    /// Stop the loop and the spawner, and release every listener
    pub fn exit(&self) {
        self.runtime.borrow_mut().shutdown();
    }

    pub fn score(&self) -> f64 {
        self.runtime.borrow().session.score() as f64
    }

    pub fn lives(&self) -> u8 {
        self.runtime.borrow().session.lives()
    }

    pub fn mission(&self) -> String {
        self.runtime.borrow().session.mission().to_string()
    }
}

impl Drop for GameHandle {
    fn drop(&mut self) {
        if let Ok(mut rt) = self.runtime.try_borrow_mut() {
            rt.shutdown();
        }
    }
}
