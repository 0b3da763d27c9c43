#![forbid(unsafe_code)]

//! Deterministic particle/starfield background animation: a headless engine
//! for the classic canvas decoration (drifting particle network or twinkling
//! stars, transient comets, scroll parallax), rendered on the CPU and
//! exported as PNG stills or MP4 video.

pub mod comet;
pub mod config;
pub mod core;
pub mod encode_ffmpeg;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod player;
pub mod render_cpu;
pub mod rng;
pub mod scene;
pub mod sprite;

pub use crate::comet::Comet;
pub use crate::config::{CometConfig, FieldConfig, FieldMode, Scenario, TimedEvent};
pub use crate::core::{Fps, FrameIndex, FrameRange, Point, Rgba8, Vec2, Viewport};
pub use crate::engine::{Engine, EngineStats, Event};
pub use crate::error::{DriftfieldError, DriftfieldResult};
pub use crate::pipeline::{
    Mp4Opts, RunStats, render_to_mp4, render_to_mp4_with_stats, run_frames, simulate_frame,
};
pub use crate::player::{CancelToken, FrameSink, Player};
pub use crate::render_cpu::{CpuRenderer, RgbaFrame};
pub use crate::rng::Rng64;
pub use crate::scene::{DrawOp, Scene, build_scene};
pub use crate::sprite::{Particle, Sprite, Star};
