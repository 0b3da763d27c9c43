use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "driftfield", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a starter scenario JSON.
    Init(InitArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct InitArgs {
    /// Output scenario JSON path.
    #[arg(long)]
    out: PathBuf,

    /// Which field preset to start from.
    #[arg(long, value_enum, default_value_t = ModeChoice::ParticleNetwork)]
    mode: ModeChoice,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scenario JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scenario JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    ParticleNetwork,
    Starfield,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Init(args) => cmd_init(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_scenario_json(path: &Path) -> anyhow::Result<driftfield::Scenario> {
    let f = File::open(path).with_context(|| format!("open scenario '{}'", path.display()))?;
    let r = BufReader::new(f);
    let scenario: driftfield::Scenario =
        serde_json::from_reader(r).with_context(|| "parse scenario JSON")?;
    Ok(scenario)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let viewport = driftfield::Viewport::new(args.width, args.height);
    let scenario = match args.mode {
        ModeChoice::ParticleNetwork => driftfield::Scenario::particle_network(viewport),
        ModeChoice::Starfield => driftfield::Scenario::starfield(viewport),
    };
    scenario.validate()?;

    ensure_parent(&args.out)?;
    let f = File::create(&args.out)
        .with_context(|| format!("create scenario '{}'", args.out.display()))?;
    serde_json::to_writer_pretty(f, &scenario).with_context(|| "write scenario JSON")?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scenario = read_scenario_json(&args.in_path)?;
    scenario.validate()?;

    let frame = driftfield::simulate_frame(&scenario, driftfield::FrameIndex(args.frame))?;

    ensure_parent(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let scenario = read_scenario_json(&args.in_path)?;
    scenario.validate()?;

    let opts = driftfield::Mp4Opts {
        bg_rgba: scenario.background.as_array(),
        overwrite: true,
    };
    let stats = driftfield::render_to_mp4_with_stats(&scenario, &args.out, opts)?;

    eprintln!(
        "wrote {} ({} frames, {} comets)",
        args.out.display(),
        stats.frames_rendered,
        stats.comets_spawned
    );
    Ok(())
}
