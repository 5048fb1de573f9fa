//! Air Strike entry point
//!
//! The browser build is driven from JS through `platform::web::GameHandle`.
//! Natively this runs a headless autopilot session on manual timers, which
//! exercises the whole frame/spawner loop without a browser.
//!
//! Usage: `air-strike [frames] [seed] [easy|medium|hard]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let frames: u32 = args.next().and_then(|a| a.parse().ok()).unwrap_or(3600);
    let seed: u64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(42);
    let difficulty = args
        .next()
        .and_then(|a| air_strike::Difficulty::from_str(&a))
        .unwrap_or_default();

    log::info!("Air Strike (native) starting...");
    headless::run(frames, seed, difficulty);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is GameHandle::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use air_strike::consts::FRAME_MS;
    use air_strike::scheduler::{FrameScheduler, ManualTimers};
    use air_strike::sim::GameState;
    use air_strike::{Difficulty, GameSession, GeneratedAssets, Settings};

    const LEFT: &str = "ArrowLeft";
    const RIGHT: &str = "ArrowRight";
    const FIRE: &str = " ";

    pub fn run(frames: u32, seed: u64, difficulty: Difficulty) {
        let settings = Settings {
            difficulty,
            ..Settings::default()
        };
        let mut session = GameSession::new(
            800.0,
            600.0,
            Default::default(),
            settings,
            &GeneratedAssets::default(),
            seed,
        );
        let mut timers = ManualTimers::new();
        let mut scheduler = FrameScheduler::new();

        log::info!("Mission: {}", session.mission());
        scheduler.start(&mut timers, &session);
        session.key_down(FIRE);

        let mut played = 0;
        for i in 0..frames {
            let now = i as f64 * FRAME_MS;
            if timers.due_spawn(now) {
                scheduler.on_spawn_timer(&mut session);
            }

            steer(&mut session);

            if timers.take_frame().is_none() {
                log::warn!("No frame pending at {:.0} ms, stopping", now);
                break;
            }
            let Some(report) = scheduler.on_frame(&mut timers, &mut session, now) else {
                break;
            };
            played += 1;
            if report.session_ended {
                log::info!("Out of lives after {} frames", played);
                break;
            }
        }

        scheduler.stop(&mut timers);
        session.exit();
        log::info!(
            "Final score {} with {} lives left ({} frames, {} difficulty)",
            session.score(),
            session.lives(),
            played,
            difficulty.as_str()
        );
    }

    /// Line up under the lowest enemy
    fn steer(session: &mut GameSession) {
        let direction = target_offset(session.state());
        session.key_up(LEFT);
        session.key_up(RIGHT);
        match direction {
            Some(dx) if dx < -4.0 => session.key_down(LEFT),
            Some(dx) if dx > 4.0 => session.key_down(RIGHT),
            _ => {}
        }
    }

    fn target_offset(state: &GameState) -> Option<f32> {
        let target = state
            .enemies
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))?;
        Some(target.bounds().center().x - state.player.bounds().center().x)
    }
}
