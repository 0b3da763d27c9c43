use std::path::PathBuf;

use crate::{
    config::Scenario,
    core::{FrameIndex, FrameRange},
    encode_ffmpeg::{EncodeConfig, FfmpegEncoder},
    engine::Engine,
    error::{DriftfieldError, DriftfieldResult},
    render_cpu::{CpuRenderer, RgbaFrame},
    scene::build_scene,
};

/// Counters reported by the offline drivers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames_rendered: u64,
    pub comets_spawned: u64,
    pub comets_retired: u64,
}

/// Apply every scripted event scheduled for `frame`, in authored order,
/// before that frame's tick runs.
fn apply_events(engine: &mut Engine, scenario: &Scenario, frame: u64) {
    for timed in &scenario.events {
        if timed.frame == frame {
            engine.handle_event(timed.event);
        }
    }
}

/// Simulate from frame 0 (applying scripted events) up to and including
/// `frame`, then render that frame.
///
/// The simulation is stateful, so rendering frame N always costs N+1 ticks;
/// there is no random access into a run.
#[tracing::instrument(skip(scenario))]
pub fn simulate_frame(scenario: &Scenario, frame: FrameIndex) -> DriftfieldResult<RgbaFrame> {
    if frame.0 >= scenario.duration.0 {
        return Err(DriftfieldError::validation(format!(
            "frame {} is outside the scenario duration of {} frames",
            frame.0, scenario.duration.0
        )));
    }

    let mut engine = Engine::new(scenario)?;
    let mut renderer = CpuRenderer::new();
    for f in 0..=frame.0 {
        apply_events(&mut engine, scenario, f);
        engine.tick();
    }
    renderer.render(&build_scene(&engine))
}

/// Simulate the scenario from frame 0 and collect the frames in `range`.
pub fn run_frames(
    scenario: &Scenario,
    range: FrameRange,
) -> DriftfieldResult<(Vec<RgbaFrame>, RunStats)> {
    if range.is_empty() {
        return Err(DriftfieldError::validation("frame range must be non-empty"));
    }
    if range.end.0 > scenario.duration.0 {
        return Err(DriftfieldError::validation(
            "frame range must be within the scenario duration",
        ));
    }

    let mut engine = Engine::new(scenario)?;
    let mut renderer = CpuRenderer::new();
    let mut out = Vec::with_capacity(range.len_frames() as usize);
    let mut stats = RunStats::default();

    for f in 0..range.end.0 {
        apply_events(&mut engine, scenario, f);
        engine.tick();
        if range.contains(FrameIndex(f)) {
            out.push(renderer.render(&build_scene(&engine))?);
            stats.frames_rendered += 1;
        }
    }

    let engine_stats = engine.stats();
    stats.comets_spawned = engine_stats.comets_spawned;
    stats.comets_retired = engine_stats.comets_retired;
    Ok((out, stats))
}

/// Options for [`render_to_mp4`].
#[derive(Clone, Debug)]
pub struct Mp4Opts {
    /// Background color to flatten alpha over (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Whether to overwrite the output file if it already exists.
    pub overwrite: bool,
}

impl Default for Mp4Opts {
    fn default() -> Self {
        Self {
            bg_rgba: [0, 0, 0, 255],
            overwrite: true,
        }
    }
}

/// Render every frame of the scenario into an MP4 by streaming raw frames to
/// the system `ffmpeg` binary.
///
/// `ffmpeg` must be installed and on PATH. MP4 output requires integer FPS
/// (`fps.den == 1`) and a scenario without scripted resize events, since the
/// encoder is locked to one frame size for the whole stream.
pub fn render_to_mp4(
    scenario: &Scenario,
    out_path: impl Into<PathBuf>,
    opts: Mp4Opts,
) -> DriftfieldResult<()> {
    let _ = render_to_mp4_with_stats(scenario, out_path, opts)?;
    Ok(())
}

#[tracing::instrument(skip(scenario, out_path, opts))]
pub fn render_to_mp4_with_stats(
    scenario: &Scenario,
    out_path: impl Into<PathBuf>,
    opts: Mp4Opts,
) -> DriftfieldResult<RunStats> {
    scenario.validate()?;

    let fps = if scenario.fps.den == 1 {
        scenario.fps.num
    } else {
        return Err(DriftfieldError::validation(
            "render_to_mp4 currently requires integer fps (fps.den == 1)",
        ));
    };
    if scenario
        .events
        .iter()
        .any(|t| matches!(t.event, crate::engine::Event::Resize { .. }))
    {
        return Err(DriftfieldError::validation(
            "render_to_mp4 requires a fixed frame size; remove scripted resize events",
        ));
    }

    let cfg = EncodeConfig {
        width: scenario.viewport.width,
        height: scenario.viewport.height,
        fps,
        out_path: out_path.into(),
        overwrite: opts.overwrite,
    };
    let mut enc = FfmpegEncoder::new(cfg, opts.bg_rgba)?;

    let mut engine = Engine::new(scenario)?;
    let mut renderer = CpuRenderer::new();
    let mut stats = RunStats::default();

    for f in 0..scenario.duration.0 {
        apply_events(&mut engine, scenario, f);
        engine.tick();
        let frame = renderer.render(&build_scene(&engine))?;
        enc.encode_frame(&frame)?;
        stats.frames_rendered += 1;
    }
    enc.finish()?;

    let engine_stats = engine.stats();
    stats.comets_spawned = engine_stats.comets_spawned;
    stats.comets_retired = engine_stats.comets_retired;
    tracing::info!(frames = stats.frames_rendered, "mp4 encode complete");
    Ok(stats)
}
