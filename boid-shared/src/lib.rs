#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

/// Pointer position in viewport pixels, origin top-left, y pointing down
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Pointer input for the next frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PointerUpdate {
    /// Optional pointer position (None means no pointer/free flying)
    pub position: Option<Position>,
}

impl PointerUpdate {
    /// Raw coordinates to hand to the simulation step. "No pointer" is sent as NaN,
    /// which the simulation ignores.
    pub fn coordinates(&self) -> (f32, f32) {
        match self.position {
            Some(p) => (p.x, p.y),
            None => (f32::NAN, f32::NAN),
        }
    }
}

/// Flocking simulation settings.
///
/// Every field is optional on the wire; missing ones take the default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoidSettings {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub subdivision_count: usize,
    pub min_speed: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub separation_distance: f32,
    pub alignment_distance: f32,
    pub cohesion_distance: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub obstacle_radius: f32,
    pub obstacle_margin: f32,
    pub obstacle_weight: f32,
    pub containment_margin: f32,
    pub containment_weight: f32,
    pub pointer_weight: f32,
    pub pointer_radius: f32,
    pub pointer_repel: bool,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Default for BoidSettings {
    fn default() -> Self {
        Self {
            width: 2000.0,
            height: 600.0,
            depth: 2000.0,
            subdivision_count: 4,
            min_speed: 1.0,
            max_speed: 6.0,
            max_force: 0.15,
            separation_distance: 30.0,
            alignment_distance: 80.0,
            cohesion_distance: 80.0,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            obstacle_radius: 50.0,
            obstacle_margin: 30.0,
            obstacle_weight: 8.0,
            containment_margin: 40.0,
            containment_weight: 8.0,
            pointer_weight: 2.0,
            pointer_radius: 600.0,
            pointer_repel: false,
            viewport_width: 1280.0,
            viewport_height: 720.0,
        }
    }
}

/// Settings update message, applied before `frame` is stepped.
///
/// The boundary extents in `settings` must match the running simulation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub frame: u64,
    pub settings: BoidSettings,
}

/// One boid as a renderer sees it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EntitySnapshot {
    pub id: u64,
    pub position: [f32; 3],
    /// Unit heading, or zero for a boid at rest.
    pub heading: [f32; 3],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ObstacleSnapshot {
    pub id: u64,
    pub position: [f32; 3],
    pub radius: f32,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameSnapshot {
    pub frame: u64,
    /// World-space pointer target, if the pointer was active this frame.
    pub pointer: Option<[f32; 3]>,
    pub boids: Vec<EntitySnapshot>,
    pub obstacles: Vec<ObstacleSnapshot>,
}

#[cfg(feature = "std")]
impl FrameSnapshot {
    /// Serialize as a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Summary of a simulation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub boid_count: usize,
    pub obstacle_count: usize,
    pub frames: u64,
    pub fps: u32,
    pub target_active: bool,
    /// Settings updates applied during the run.
    pub settings_updates: usize,
}
