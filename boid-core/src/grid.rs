//! Uniform spatial grid for radius-bounded neighbor queries.
//!
//! The grid covers the boundary with cubic cells whose side is the boundary's
//! largest extent divided by the subdivision count.
//!
//! Cells hold *slot indices*, not [`EntityId`](crate::entity::EntityId)s: slot
//! `i` is `boids[i]` in the slice passed to [`SpatialGrid::rebuild`] (for a
//! [`Flock`](crate::flock::Flock), `flock.flock_entities()[i]`), and that
//! boid's `id` is its identity. Slots are only meaningful until the slice
//! changes, so the grid must be rebuilt after any add or remove.

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::boundary::Boundary;
use crate::entity::Boid;
use crate::error::ConfigError;
use crate::vector::{floor, Vector3D};

/// Integer cell coordinate `(x, y, z)`
pub type CellCoord = [usize; 3];

pub struct SpatialGrid {
    cell_size: f32,
    subdivision_count: usize,
    dims: [usize; 3],
    cells: Vec<Vec<usize>>,
    len: usize,
}

fn cells_along(extent: f32, cell_size: f32) -> usize {
    let span = extent / cell_size;
    let whole = floor(span);
    let count = if span > whole { whole + 1.0 } else { whole };
    (count as usize).max(1)
}

impl SpatialGrid {
    pub fn new(boundary: &Boundary, subdivision_count: usize) -> Result<Self, ConfigError> {
        if subdivision_count == 0 {
            return Err(ConfigError::NonPositiveSubdivisions);
        }

        let cell_size = boundary.largest_extent() / subdivision_count as f32;
        let dims = [
            cells_along(boundary.width(), cell_size),
            cells_along(boundary.height(), cell_size),
            cells_along(boundary.depth(), cell_size),
        ];

        let mut cells = Vec::new();
        cells.resize_with(dims[0] * dims[1] * dims[2], Vec::new);

        Ok(Self {
            cell_size,
            subdivision_count,
            dims,
            cells,
            len: 0,
        })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn subdivision_count(&self) -> usize {
        self.subdivision_count
    }

    /// Number of cells along each axis.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Number of entries inserted since the last clear.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cell containing `position`. Positions outside the grid (and NaN) are
    /// clamped to the nearest valid cell.
    pub fn cell_coord(&self, position: Vector3D) -> CellCoord {
        let axis = |value: f32, dim: usize| -> usize {
            let cell = floor(value / self.cell_size);
            if cell > 0.0 {
                (cell as usize).min(dim - 1)
            } else {
                0
            }
        };

        [
            axis(position.x, self.dims[0]),
            axis(position.y, self.dims[1]),
            axis(position.z, self.dims[2]),
        ]
    }

    #[inline]
    fn flat_index(&self, coord: CellCoord) -> usize {
        (coord[2] * self.dims[1] + coord[1]) * self.dims[0] + coord[0]
    }

    /// Slot indices stored in `coord`.
    pub fn cell(&self, coord: CellCoord) -> &[usize] {
        if coord.iter().zip(self.dims).any(|(&c, dim)| c >= dim) {
            return &[];
        }
        &self.cells[self.flat_index(coord)]
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.len = 0;
    }

    #[inline]
    pub fn insert(&mut self, slot: usize, position: Vector3D) {
        let index = self.flat_index(self.cell_coord(position));
        self.cells[index].push(slot);
        self.len += 1;
    }

    /// Clear the grid and insert every boid under its slot index in `boids`.
    pub fn rebuild(&mut self, boids: &[Boid]) {
        self.clear();
        for (slot, boid) in boids.iter().enumerate() {
            self.insert(slot, boid.position);
        }
    }

    /// Candidate slots for a search of `radius` around `position`.
    ///
    /// For `radius <= cell_size` this is the 3x3x3 block of cells around the
    /// one containing `position`; larger radii widen the block so no neighbor
    /// is missed. The result includes the querying boid itself if it is in
    /// the grid, and callers filter by exact distance.
    ///
    /// Returned values index the slice the grid was last rebuilt from; resolve
    /// them with `boids[slot]` (and `boids[slot].id` for the identity).
    pub fn query(&self, position: Vector3D, radius: f32) -> Vec<usize> {
        let mut result = Vec::new();
        self.query_into(position, radius, &mut result);
        result
    }

    /// Same as [`SpatialGrid::query`], reusing `out` to avoid allocating.
    pub fn query_into(&self, position: Vector3D, radius: f32, out: &mut Vec<usize>) {
        out.clear();

        // Past the widest axis every cell is already in range.
        let widest = self.dims.iter().copied().max().unwrap_or(1);
        let reach = if !(radius > self.cell_size) {
            1
        } else if radius.is_finite() {
            cells_along(radius, self.cell_size).min(widest)
        } else {
            widest
        };

        let center = self.cell_coord(position);
        let range = |c: usize, dim: usize| -> (usize, usize) {
            (c.saturating_sub(reach), c.saturating_add(reach).min(dim - 1))
        };

        let (x0, x1) = range(center[0], self.dims[0]);
        let (y0, y1) = range(center[1], self.dims[1]);
        let (z0, z1) = range(center[2], self.dims[2]);

        for z in z0..=z1 {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    out.extend_from_slice(&self.cells[self.flat_index([x, y, z])]);
                }
            }
        }
    }
}
