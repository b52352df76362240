//! Pointer projection.
//!
//! Raw pointer coordinates are viewport pixels: origin at the top-left corner,
//! x growing to the right and y growing downwards, over a viewport of
//! `viewport_width` x `viewport_height` (see [`PointerConfig`]). The viewport
//! is mapped onto the boundary's mid-depth plane, with the top edge of the
//! viewport at the top of the box:
//!
//! ```text
//! world = (px / vw * width, (1 - py / vh) * height, depth / 2)
//! ```
//!
//! A pointer outside the viewport, non-finite, or at exactly `(0, 0)` while
//! `ignore_origin` is set means there is no pointer this step.

use crate::boundary::Boundary;
use crate::config::PointerConfig;
use crate::vector::Vector3D;

/// Project a raw pointer position into the world, or `None` if it should be ignored.
pub fn project(
    pointer_x: f32,
    pointer_y: f32,
    config: &PointerConfig,
    boundary: &Boundary,
) -> Option<Vector3D> {
    if !(pointer_x.is_finite() && pointer_y.is_finite()) {
        return None;
    }
    if config.ignore_origin && pointer_x == 0.0 && pointer_y == 0.0 {
        return None;
    }

    let in_viewport = (0.0..=config.viewport_width).contains(&pointer_x)
        && (0.0..=config.viewport_height).contains(&pointer_y);
    if !in_viewport {
        return None;
    }

    let u = pointer_x / config.viewport_width;
    let v = pointer_y / config.viewport_height;
    Some(Vector3D::new(
        u * boundary.width(),
        (1.0 - v) * boundary.height(),
        boundary.depth() / 2.0,
    ))
}
