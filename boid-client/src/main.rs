use anyhow::{Context, Result};
use boid_client::{run, PointerSource, RunOptions};
use boid_shared::{BoidSettings, SettingsUpdate};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless 3D boid flocking simulation", long_about = None)]
struct Args {
    /// JSON settings file; missing fields use defaults
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// JSON lines of settings updates, each applied before its frame
    #[arg(short, long)]
    updates: Option<PathBuf>,

    /// Number of boids to spawn
    #[arg(short, long, default_value_t = 50)]
    boids: usize,

    /// Number of obstacles to spawn
    #[arg(short = 'O', long, default_value_t = 10)]
    obstacles: usize,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Pointer source: 'none', 'orbit' or a fixed viewport position 'X,Y'
    #[arg(short, long, default_value = "none")]
    pointer: String,

    /// Write JSON lines here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a snapshot every N frames (0 disables snapshots)
    #[arg(long, default_value_t = 1)]
    snapshot_every: u64,

    /// Write the debug grid cells before the first frame
    #[arg(long)]
    debug_grid: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn load_settings(path: Option<&PathBuf>) -> Result<BoidSettings> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse settings in {}", path.display()))
        }
        None => Ok(BoidSettings::default()),
    }
}

fn load_updates(path: Option<&PathBuf>) -> Result<Vec<SettingsUpdate>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings updates from {}", path.display()))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str(line).with_context(|| {
                format!("Failed to parse settings update on line {} of {}", number + 1, path.display())
            })
        })
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Boid simulation starting...");

    let settings = load_settings(args.settings.as_ref())?;
    let updates = load_updates(args.updates.as_ref())?;
    let pointer: PointerSource = args
        .pointer
        .parse()
        .context("Pointer must be 'none', 'orbit' or 'X,Y'")?;

    let options = RunOptions {
        boids: args.boids,
        obstacles: args.obstacles,
        frames: args.frames,
        seed: args.seed,
        pointer,
        snapshot_every: args.snapshot_every,
        debug_grid: args.debug_grid,
        updates,
    };
    log::info!("Options: {:?}", options);

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => {
            log::info!("Writing frames to {}", path.display());
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let status = run(&settings, &options, &mut out).context("Simulation error")?;
    log::info!(
        "{} boids, {} obstacles, {} frames at {} fps",
        status.boid_count,
        status.obstacle_count,
        status.frames,
        status.fps
    );

    Ok(())
}
