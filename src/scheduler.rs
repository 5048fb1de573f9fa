//! Frame scheduler
//!
//! One frame callback is kept in flight at a time and resubmitted after every
//! frame, paused or not. The enemy spawner runs on a separate interval timer
//! that only exists while the session is playing, so a resume never replays
//! intervals that elapsed during the pause.
//!
//! The host's frame and timer facilities sit behind `TimerHost`: the browser
//! uses `requestAnimationFrame`/`setInterval`, tests and the native driver use
//! `ManualTimers`.

use crate::session::{FrameReport, GameSession};

/// Opaque id for a pending frame request or a running interval
pub type TimerHandle = i32;

/// Frame and interval facilities of whatever is driving the game
pub trait TimerHost {
    /// Ask for the frame callback to run at the next display refresh
    fn request_frame(&mut self) -> Option<TimerHandle>;
    fn cancel_frame(&mut self, handle: TimerHandle);
    /// Start firing the spawn callback every `interval_ms`
    fn start_interval(&mut self, interval_ms: u32) -> Option<TimerHandle>;
    fn cancel_interval(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SpawnTimer {
    handle: TimerHandle,
    interval_ms: u32,
}

/// Owns the lifetime of the frame loop and the spawner timer
#[derive(Debug, Default)]
pub struct FrameScheduler {
    frame: Option<TimerHandle>,
    spawner: Option<SpawnTimer>,
    running: bool,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending_frame(&self) -> Option<TimerHandle> {
        self.frame
    }

    /// Interval of the live spawner timer, if any
    pub fn spawner_interval(&self) -> Option<u32> {
        self.spawner.map(|s| s.interval_ms)
    }

    /// Request the first frame and start the spawner
    pub fn start<H: TimerHost>(&mut self, host: &mut H, session: &GameSession) {
        if self.running {
            log::warn!("Frame scheduler already running");
            return;
        }
        self.running = true;
        self.frame = host.request_frame();
        self.sync_spawner(host, session);
        log::info!("Frame loop started");
    }

    /// Frame callback body: run one frame, then resubmit
    pub fn on_frame<H: TimerHost>(
        &mut self,
        host: &mut H,
        session: &mut GameSession,
        now_ms: f64,
    ) -> Option<FrameReport> {
        // This callback consumed the pending request
        self.frame = None;
        if !self.running {
            return None;
        }

        let report = session.frame(now_ms);
        self.sync_spawner(host, session);

        if self.running {
            self.frame = host.request_frame();
        }
        Some(report)
    }

    /// Spawn callback body
    pub fn on_spawn_timer(&mut self, session: &mut GameSession) -> Option<u32> {
        if !self.running || self.spawner.is_none() {
            return None;
        }
        session.spawn_tick()
    }

    /// Keep the spawner timer in step with the session: alive only while
    /// playing, and always at the current difficulty's interval.
    pub fn sync_spawner<H: TimerHost>(&mut self, host: &mut H, session: &GameSession) {
        let wanted = (self.running && session.is_playing()).then(|| session.spawn_interval_ms());

        match (self.spawner, wanted) {
            (Some(timer), Some(interval)) if timer.interval_ms == interval => {}
            (Some(timer), Some(interval)) => {
                log::warn!(
                    "Spawn interval changed mid-session ({} -> {} ms), restarting spawner",
                    timer.interval_ms,
                    interval
                );
                host.cancel_interval(timer.handle);
                self.spawner = host
                    .start_interval(interval)
                    .map(|handle| SpawnTimer { handle, interval_ms: interval });
            }
            (Some(timer), None) => {
                host.cancel_interval(timer.handle);
                self.spawner = None;
            }
            (None, Some(interval)) => {
                self.spawner = host
                    .start_interval(interval)
                    .map(|handle| SpawnTimer { handle, interval_ms: interval });
                if self.spawner.is_none() {
                    log::error!("Host refused to start the spawner timer");
                }
            }
            (None, None) => {}
        }
    }

    /// Cancel the pending frame and the spawner; nothing runs afterwards
    pub fn stop<H: TimerHost>(&mut self, host: &mut H) {
        if let Some(handle) = self.frame.take() {
            host.cancel_frame(handle);
        }
        if let Some(timer) = self.spawner.take() {
            host.cancel_interval(timer.handle);
        }
        if self.running {
            log::info!("Frame loop stopped");
        }
        self.running = false;
    }
}

/// Deterministic in-process host.
///
/// Frames run when the driver says so; the interval fires at most once per
/// `due_spawn` call, so a late poll never produces a burst of spawns.
#[derive(Debug, Default)]
pub struct ManualTimers {
    next_handle: TimerHandle,
    frame: Option<TimerHandle>,
    interval: Option<ManualInterval>,
    now_ms: f64,
    /// Every request/cancel, for assertions
    pub log: Vec<TimerCall>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ManualInterval {
    handle: TimerHandle,
    interval_ms: u32,
    next_due_ms: f64,
}

/// A call made on `ManualTimers`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCall {
    RequestFrame(TimerHandle),
    CancelFrame(TimerHandle),
    StartInterval(TimerHandle, u32),
    CancelInterval(TimerHandle),
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the host clock; intervals started later are measured from here
    pub fn set_now(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }

    pub fn has_pending_frame(&self) -> bool {
        self.frame.is_some()
    }

    pub fn has_interval(&self) -> bool {
        self.interval.is_some()
    }

    /// Take the pending frame request, as the display refresh would
    pub fn take_frame(&mut self) -> Option<TimerHandle> {
        self.frame.take()
    }

    /// Whether the spawn interval has elapsed by `now_ms`
    pub fn due_spawn(&mut self, now_ms: f64) -> bool {
        self.now_ms = now_ms;
        match &mut self.interval {
            Some(interval) if now_ms >= interval.next_due_ms => {
                interval.next_due_ms = now_ms + interval.interval_ms as f64;
                true
            }
            _ => false,
        }
    }

    fn allocate(&mut self) -> TimerHandle {
        self.next_handle += 1;
        self.next_handle
    }
}

impl TimerHost for ManualTimers {
    fn request_frame(&mut self) -> Option<TimerHandle> {
        let handle = self.allocate();
        self.frame = Some(handle);
        self.log.push(TimerCall::RequestFrame(handle));
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: TimerHandle) {
        if self.frame == Some(handle) {
            self.frame = None;
        }
        self.log.push(TimerCall::CancelFrame(handle));
    }

    fn start_interval(&mut self, interval_ms: u32) -> Option<TimerHandle> {
        let handle = self.allocate();
        self.interval = Some(ManualInterval {
            handle,
            interval_ms,
            next_due_ms: self.now_ms + interval_ms as f64,
        });
        self.log.push(TimerCall::StartInterval(handle, interval_ms));
        Some(handle)
    }

    fn cancel_interval(&mut self, handle: TimerHandle) {
        if self.interval.map(|i| i.handle) == Some(handle) {
            self.interval = None;
        }
        self.log.push(TimerCall::CancelInterval(handle));
    }
}
