//! Display-side state the simulation never sees.

use std::collections::{HashMap, HashSet};

use boid_core::{Boid, Boundary, EntityId, Vector3D};
use serde::Serialize;

/// Weight of the newest sample when smoothing.
pub const SMOOTHING: f32 = 0.1;

/// Smoothed position and heading of one boid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualState {
    pub position: Vector3D,
    pub heading: Vector3D,
}

impl VisualState {
    fn from_boid(boid: &Boid) -> Self {
        Self {
            position: boid.position,
            heading: boid.velocity.normalize(),
        }
    }

    fn blend(&mut self, target: &VisualState) {
        self.position = self.position * (1.0 - SMOOTHING) + target.position * SMOOTHING;
        let heading = self.heading * (1.0 - SMOOTHING) + target.heading * SMOOTHING;
        // Opposite headings can cancel; keep the old one rather than lose direction.
        let heading = heading.normalize();
        if heading != Vector3D::zero() {
            self.heading = heading;
        }
    }
}

/// Visual state for every boid, keyed by identity
#[derive(Debug, Default)]
pub struct VisualStates {
    states: HashMap<EntityId, VisualState>,
}

impl VisualStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blend every boid toward its latest simulated state. New boids start
    /// exactly where they are; states for boids that no longer exist are dropped.
    pub fn sync(&mut self, boids: &[Boid]) {
        for boid in boids {
            let latest = VisualState::from_boid(boid);
            self.states
                .entry(boid.id)
                .and_modify(|state| state.blend(&latest))
                .or_insert(latest);
        }

        if self.states.len() > boids.len() {
            let alive: HashSet<EntityId> = boids.iter().map(|b| b.id).collect();
            let before = self.states.len();
            self.states.retain(|id, _| alive.contains(id));
            log::debug!("Pruned {} visual states", before - self.states.len());
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&VisualState> {
        self.states.get(&id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// One cube of the debug grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DebugCell {
    pub center: [f32; 3],
    pub size: f32,
}

/// Cubes of side `largest extent / subdivision_count` tiling the boundary.
/// Cubes whose center falls outside the box are skipped.
pub fn debug_grid_cells(boundary: &Boundary, subdivision_count: usize) -> Vec<DebugCell> {
    if subdivision_count == 0 {
        return Vec::new();
    }

    let size = boundary.largest_extent() / subdivision_count as f32;
    let mut cells = Vec::new();
    for i in 0..subdivision_count {
        for j in 0..subdivision_count {
            for k in 0..subdivision_count {
                let center = Vector3D::new(
                    (i as f32 + 0.5) * size,
                    (j as f32 + 0.5) * size,
                    (k as f32 + 0.5) * size,
                );
                if boundary.contains(center) {
                    cells.push(DebugCell {
                        center: center.as_array(),
                        size,
                    });
                }
            }
        }
    }
    cells
}
