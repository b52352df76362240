//! Containment volume and the soft wall policy.
//!
//! The boundary is an axis-aligned box with one corner at the origin. Boids are
//! never clamped back inside; near a wall they receive a corrective
//! acceleration that grows as they approach it and keeps growing past it.

use crate::error::{Axis, ConfigError};
use crate::vector::Vector3D;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    width: f32,
    height: f32,
    depth: f32,
}

impl Boundary {
    pub fn new(width: f32, height: f32, depth: f32) -> Result<Self, ConfigError> {
        for (axis, value) in [(Axis::X, width), (Axis::Y, height), (Axis::Z, depth)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::NonPositiveExtent { axis, value });
            }
        }
        Ok(Self {
            width,
            height,
            depth,
        })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn extents(&self) -> [f32; 3] {
        [self.width, self.height, self.depth]
    }

    pub fn largest_extent(&self) -> f32 {
        self.width.max(self.height).max(self.depth)
    }

    pub fn smallest_extent(&self) -> f32 {
        self.width.min(self.height).min(self.depth)
    }

    pub fn center(&self) -> Vector3D {
        Vector3D::new(self.width / 2.0, self.height / 2.0, self.depth / 2.0)
    }

    pub fn contains(&self, position: Vector3D) -> bool {
        self.contains_with_margin(position, 0.0)
    }

    /// Whether `position` lies inside the box grown by `margin` on every side.
    pub fn contains_with_margin(&self, position: Vector3D, margin: f32) -> bool {
        position
            .as_array()
            .iter()
            .zip(self.extents())
            .all(|(&v, extent)| v >= -margin && v <= extent + margin)
    }

    /// Corrective acceleration for a boid at `position`.
    ///
    /// Each axis is handled on its own: inside `margin` of a wall the push is
    /// `strength * depth_into_margin / margin` toward the interior, so it is
    /// zero at the margin's inner edge, `strength` on the wall itself and
    /// larger beyond it. Past the wall the push is at least `wall_push`; a
    /// `wall_push` larger than twice the top speed plus every other force turns
    /// a boid around on the first step it spends outside, so it never ends up
    /// more than one step's travel past the wall.
    pub fn containment_force(
        &self,
        position: Vector3D,
        margin: f32,
        strength: f32,
        wall_push: f32,
    ) -> Vector3D {
        if !(margin > 0.0) {
            return Vector3D::zero();
        }

        let push = |value: f32, extent: f32| -> f32 {
            if value < margin {
                let linear = strength * (margin - value) / margin;
                if value < 0.0 {
                    linear.max(wall_push)
                } else {
                    linear
                }
            } else if value > extent - margin {
                let linear = strength * (value - (extent - margin)) / margin;
                if value > extent {
                    -linear.max(wall_push)
                } else {
                    -linear
                }
            } else {
                0.0
            }
        };

        Vector3D::new(
            push(position.x, self.width),
            push(position.y, self.height),
            push(position.z, self.depth),
        )
    }
}
