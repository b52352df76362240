//! Headless driver for the flocking simulation.
//!
//! Turns [`BoidSettings`] into a core configuration, feeds the simulation a
//! pointer each frame, smooths what it sees for display and writes frame
//! snapshots as JSON lines.

use std::f32::consts::TAU;
use std::str::FromStr;

use anyhow::{Context, Result};
use boid_core::{BoidConfig, Boundary, PointerConfig, PointerMode};
use boid_shared::{BoidSettings, PointerUpdate, Position};

pub mod runner;
pub mod visual;

pub use runner::{apply_settings_update, run, RunOptions};
pub use visual::{debug_grid_cells, DebugCell, VisualState, VisualStates};

/// Build the simulation boundary and configuration described by `settings`.
pub fn config_from_settings(settings: &BoidSettings) -> Result<(Boundary, BoidConfig)> {
    let boundary = Boundary::new(settings.width, settings.height, settings.depth)
        .context("Invalid boundary in settings")?;

    let config = BoidConfig {
        min_speed: settings.min_speed,
        max_speed: settings.max_speed,
        max_force: settings.max_force,
        separation_distance: settings.separation_distance,
        alignment_distance: settings.alignment_distance,
        cohesion_distance: settings.cohesion_distance,
        separation_weight: settings.separation_weight,
        alignment_weight: settings.alignment_weight,
        cohesion_weight: settings.cohesion_weight,
        obstacle_radius: settings.obstacle_radius,
        obstacle_margin: settings.obstacle_margin,
        obstacle_weight: settings.obstacle_weight,
        containment_margin: settings.containment_margin,
        containment_weight: settings.containment_weight,
        subdivision_count: settings.subdivision_count,
        pointer: PointerConfig {
            viewport_width: settings.viewport_width,
            viewport_height: settings.viewport_height,
            mode: if settings.pointer_repel {
                PointerMode::Repel
            } else {
                PointerMode::Attract
            },
            weight: settings.pointer_weight,
            influence_radius: settings.pointer_radius,
            ..PointerConfig::default()
        },
        ..BoidConfig::default()
    };

    config
        .validate(&boundary)
        .context("Invalid simulation settings")?;

    Ok((boundary, config))
}

/// Where the pointer comes from on each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerSource {
    None,
    /// Circles the middle of the viewport.
    Orbit,
    Fixed(Position),
}

/// Frames per full orbit.
const ORBIT_PERIOD: f32 = 600.0;

impl PointerSource {
    pub fn update(&self, frame: u64, viewport_width: f32, viewport_height: f32) -> PointerUpdate {
        let position = match *self {
            PointerSource::None => None,
            PointerSource::Fixed(position) => Some(position),
            PointerSource::Orbit => {
                let angle = (frame as f32 / ORBIT_PERIOD) * TAU;
                let radius = 0.35 * viewport_width.min(viewport_height);
                Some(Position::new(
                    viewport_width / 2.0 + radius * angle.cos(),
                    viewport_height / 2.0 + radius * angle.sin(),
                ))
            }
        };
        PointerUpdate { position }
    }
}

impl FromStr for PointerSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "none" => Ok(PointerSource::None),
            "orbit" => Ok(PointerSource::Orbit),
            other => {
                let (x, y) = other
                    .split_once(',')
                    .context("Pointer must be 'none', 'orbit' or 'X,Y'")?;
                let x: f32 = x.trim().parse().context("Pointer X is not a number")?;
                let y: f32 = y.trim().parse().context("Pointer Y is not a number")?;
                Ok(PointerSource::Fixed(Position::new(x, y)))
            }
        }
    }
}
