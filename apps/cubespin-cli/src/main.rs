use anyhow::Context;
use clap::{Parser, Subcommand};
use cubespin_common::{MAX_OBJECTS, SceneConfig};
use cubespin_input::PointerEvent;
use cubespin_render::{RecordingBackend, SceneResources};
use cubespin_session::FrameContext;
use glam::Vec2;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubespin-cli", about = "Headless driver for the cubespin core")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON scene config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and resolved scene config
    Info,
    /// Run scripted drags through the frame loop and dump state
    Simulate {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "120")]
        ticks: u64,
        /// Milliseconds between ticks
        #[arg(long, default_value = "16")]
        frame_ms: u64,
        /// Number of cubes
        #[arg(short, long)]
        objects: Option<usize>,
        /// Drag applied at tick 0, as `x0,y0:x1,y1`. Repeatable.
        #[arg(short, long)]
        drag: Vec<DragScript>,
        /// Enable lighting
        #[arg(long)]
        lighting: bool,
        /// Print cube state every N ticks (0 prints only the final state)
        #[arg(long, default_value = "0")]
        every: u64,
    },
}

/// A press at `from`, a single move to `to`, then release.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragScript {
    from: Vec2,
    to: Vec2,
}

fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let x = x.trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f32>().map_err(|e| e.to_string())?;
    Ok(Vec2::new(x, y))
}

impl FromStr for DragScript {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once(':')
            .ok_or_else(|| format!("expected `x0,y0:x1,y1`, got `{s}`"))?;
        Ok(Self {
            from: parse_point(from)?,
            to: parse_point(to)?,
        })
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

fn print_objects(ctx: &FrameContext) {
    for (i, obj) in ctx.scene().objects().iter().enumerate() {
        let o = obj.orientation();
        let v = obj.angular_velocity();
        println!(
            "  cube {i}: orientation=({:.4}, {:.4}) velocity=({:.5}, {:.5}) auto={:.2}",
            o.x,
            o.y,
            v.x,
            v.y,
            obj.auto_rotation()
        );
    }
}

/// Apply `drags` at time zero, then run exactly `ticks` frames `frame_ms` apart.
fn simulate(
    config: &SceneConfig,
    drags: &[DragScript],
    ticks: u64,
    frame_ms: u64,
    every: u64,
) -> anyhow::Result<(FrameContext, RecordingBackend)> {
    let mut ctx = FrameContext::new(config)?;
    let mut backend = RecordingBackend::new();
    let resources = SceneResources::create(&mut backend, RecordingBackend::SHADERS, ctx.scene())?;

    let step = Duration::from_millis(frame_ms);
    let mut now = Duration::ZERO;
    for script in drags {
        ctx.handle_input(PointerEvent::Down(script.from), now)?;
        ctx.handle_input(PointerEvent::Move(script.to), now)?;
        ctx.handle_input(PointerEvent::Up, now)?;
        tracing::debug!(from = %script.from, to = %script.to, "scripted drag");
    }

    println!(
        "Simulating {ticks} ticks at {frame_ms}ms, {} cube(s), {} drag(s)",
        ctx.scene().len(),
        drags.len()
    );
    for t in 1..=ticks {
        now += step;
        if !ctx.render_tick(&mut backend, &resources, now)? {
            anyhow::bail!("frame loop stopped at tick {t}");
        }
        if every > 0 && t % every == 0 {
            println!("tick {t}:");
            print_objects(&ctx);
        }
    }
    Ok((ctx, backend))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("cubespin-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("max objects: {MAX_OBJECTS}");
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Simulate {
            ticks,
            frame_ms,
            objects,
            drag,
            lighting,
            every,
        } => {
            if let Some(objects) = objects {
                config.object_count = objects;
            }
            if lighting {
                config.lighting_enabled = true;
            }

            let (mut ctx, backend) = simulate(&config, &drag, ticks, frame_ms, every)?;
            println!("Final state after {} ticks:", ctx.scene().tick());
            print_objects(&ctx);
            print!("{}", ctx.plan());
            println!("frames recorded: {}", backend.frame_count());

            ctx.shutdown();
        }
    }

    Ok(())
}
