use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::Receiver,
    },
    time::{Duration, Instant},
};

use crate::{
    config::Scenario,
    engine::{Engine, EngineStats, Event},
    error::DriftfieldResult,
    render_cpu::{CpuRenderer, RgbaFrame},
    scene::build_scene,
};

/// Presentation seam: where finished frames go. Implemented by whatever
/// hosts the player (a window, a recorder, a test).
pub trait FrameSink {
    fn present(&mut self, frame: &RgbaFrame) -> DriftfieldResult<()>;
}

/// Cooperative stop handle for [`Player::run`]. Cloneable; any clone can
/// request cancellation, and the loop observes it between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Real-time driver for an [`Engine`]: the explicit scheduler the animation
/// loop hands its self-rescheduling to.
///
/// Each iteration drains pending viewport events in delivery order, advances
/// the simulation one tick, renders, presents the frame to the sink, then
/// sleeps out the remainder of the frame period. The loop runs until the
/// cancellation token fires or the sink errors.
pub struct Player {
    engine: Engine,
    renderer: CpuRenderer,
    frame_period: Duration,
}

impl Player {
    pub fn new(scenario: &Scenario) -> DriftfieldResult<Self> {
        Ok(Self {
            engine: Engine::new(scenario)?,
            renderer: CpuRenderer::new(),
            frame_period: Duration::from_secs_f64(scenario.fps.frame_duration_secs()),
        })
    }

    /// Run until cancelled. Returns the engine's accumulated stats.
    ///
    /// A disconnected event channel is not an error; the loop simply stops
    /// receiving viewport signals. A degenerate viewport (after a zero-area
    /// resize) suspends rendering but keeps ticking, so the animation resumes
    /// as soon as a usable size arrives.
    pub fn run(
        mut self,
        events: &Receiver<Event>,
        sink: &mut dyn FrameSink,
        cancel: &CancelToken,
    ) -> DriftfieldResult<EngineStats> {
        tracing::debug!(period_ms = self.frame_period.as_millis() as u64, "player loop started");

        while !cancel.is_cancelled() {
            let frame_start = Instant::now();

            for event in events.try_iter() {
                self.engine.handle_event(event);
            }
            self.engine.tick();

            if !self.engine.viewport().is_degenerate() {
                let frame = self.renderer.render(&build_scene(&self.engine))?;
                sink.present(&frame)?;
            }

            let elapsed = frame_start.elapsed();
            if let Some(remaining) = self.frame_period.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }

        let stats = self.engine.stats();
        tracing::debug!(ticks = stats.ticks, "player loop stopped");
        Ok(stats)
    }
}
