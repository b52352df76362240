use std::io::Write;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use boid_core::Flock;
use boid_shared::{
    BoidSettings, EntitySnapshot, FrameSnapshot, ObstacleSnapshot, SettingsUpdate, StatusResponse,
};

use crate::visual::{debug_grid_cells, VisualStates};
use crate::{config_from_settings, PointerSource};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub boids: usize,
    pub obstacles: usize,
    pub frames: u64,
    /// Fixed seed for reproducible spawns; entropy otherwise.
    pub seed: Option<u64>,
    pub pointer: PointerSource,
    /// Write a snapshot every this many frames; 0 writes none.
    pub snapshot_every: u64,
    /// Write the debug grid cells as the first line.
    pub debug_grid: bool,
    /// Settings to swap in mid-run, each before its frame is stepped.
    pub updates: Vec<SettingsUpdate>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            boids: 50,
            obstacles: 10,
            frames: 600,
            seed: None,
            pointer: PointerSource::None,
            snapshot_every: 1,
            debug_grid: false,
            updates: Vec::new(),
        }
    }
}

fn snapshot(frame: u64, flock: &Flock, visuals: &VisualStates) -> FrameSnapshot {
    let boids = flock
        .flock_entities()
        .iter()
        .filter_map(|boid| {
            visuals.get(boid.id).map(|state| EntitySnapshot {
                id: boid.id.raw(),
                position: state.position.as_array(),
                heading: state.heading.as_array(),
            })
        })
        .collect();

    let obstacles = flock
        .obstacles()
        .iter()
        .map(|obstacle| ObstacleSnapshot {
            id: obstacle.id.raw(),
            position: obstacle.position.as_array(),
            radius: obstacle.radius,
        })
        .collect();

    FrameSnapshot {
        frame,
        pointer: flock.pointer_target().map(|t| t.as_array()),
        boids,
        obstacles,
    }
}

/// Swap a running flock's configuration for `update.settings`.
///
/// Tuning values may change freely; the box extents are fixed once the flock exists.
pub fn apply_settings_update(flock: &mut Flock, update: &SettingsUpdate) -> Result<()> {
    let (boundary, config) = config_from_settings(&update.settings)
        .with_context(|| format!("Invalid settings update for frame {}", update.frame))?;
    if boundary != flock.boundary() {
        bail!(
            "Settings update for frame {} changes the boundary from {:?} to {:?}",
            update.frame,
            flock.boundary(),
            boundary
        );
    }
    flock
        .set_config(config)
        .with_context(|| format!("Failed to apply settings update for frame {}", update.frame))?;
    log::info!("Applied settings update at frame {}", update.frame);
    Ok(())
}

/// Run the simulation for `options.frames` frames, writing JSON lines to `out`.
pub fn run<W: Write>(
    settings: &BoidSettings,
    options: &RunOptions,
    out: &mut W,
) -> Result<StatusResponse> {
    let (boundary, config) = config_from_settings(settings)?;

    let mut flock = match options.seed {
        Some(seed) => Flock::with_seed(boundary, config, seed),
        None => Flock::from_entropy(boundary, config),
    }
    .context("Failed to create flock")?;

    flock.add_flock_entities(options.boids);
    flock.add_obstacles(options.obstacles);
    log::info!(
        "Spawned {} boids and {} obstacles",
        options.boids,
        options.obstacles
    );

    if options.debug_grid {
        let cells = debug_grid_cells(&flock.boundary(), flock.subdivision_count());
        log::debug!("Debug grid has {} cells", cells.len());
        serde_json::to_writer(&mut *out, &cells).context("Failed to write debug grid")?;
        writeln!(out)?;
    }

    let mut updates: Vec<&SettingsUpdate> = options.updates.iter().collect();
    updates.sort_by_key(|update| update.frame);
    let mut pending = updates.into_iter().peekable();
    let mut viewport = (settings.viewport_width, settings.viewport_height);
    let mut settings_updates = 0;

    let mut visuals = VisualStates::new();
    let mut target_active = false;
    let started = Instant::now();

    for frame in 0..options.frames {
        while let Some(update) = pending.next_if(|update| update.frame <= frame) {
            apply_settings_update(&mut flock, update)?;
            viewport = (update.settings.viewport_width, update.settings.viewport_height);
            settings_updates += 1;
        }

        let update = options.pointer.update(frame, viewport.0, viewport.1);
        let (x, y) = update.coordinates();
        let stats = flock.step(x, y);
        target_active = stats.pointer_active;
        visuals.sync(flock.flock_entities());

        if options.snapshot_every > 0 && frame % options.snapshot_every == 0 {
            let line = snapshot(frame, &flock, &visuals)
                .to_json_line()
                .context("Failed to serialize frame")?;
            writeln!(out, "{}", line).context("Failed to write frame")?;
        }

        if frame > 0 && frame % 100 == 0 {
            log::debug!(
                "Frame {}: {} neighbor checks, pointer {}",
                frame,
                stats.neighbor_checks,
                stats.pointer_active
            );
        }
    }
    out.flush()?;

    let skipped = pending.count();
    if skipped > 0 {
        log::warn!("{} settings updates were scheduled past the last frame", skipped);
    }

    let elapsed = started.elapsed().as_secs_f64();
    let fps = if elapsed > 0.0 {
        (options.frames as f64 / elapsed) as u32
    } else {
        0
    };

    let status = StatusResponse {
        boid_count: flock.flock_entities().len(),
        obstacle_count: flock.obstacles().len(),
        frames: flock.steps(),
        fps,
        target_active,
        settings_updates,
    };
    log::info!("Run finished: {:?}", status);
    Ok(status)
}
