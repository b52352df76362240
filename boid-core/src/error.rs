//! Error types for boid-core.
//!
//! Only construction and reconfiguration can fail. Stepping the simulation is
//! infallible: degenerate numeric cases are resolved inside the force model.

use core::fmt;

/// Invalid boundary or simulation configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A boundary extent is zero, negative or not finite.
    NonPositiveExtent { axis: Axis, value: f32 },
    /// The grid subdivision count is zero.
    NonPositiveSubdivisions,
    /// `min_speed` is negative or exceeds `max_speed`.
    InvalidSpeedRange { min: f32, max: f32 },
    /// A radius, distance or force limit that must be positive is not.
    NonPositiveValue { name: &'static str, value: f32 },
    /// A weight or clearance that must be zero or more is negative or not finite.
    NegativeWeight { name: &'static str, value: f32 },
    /// The containment margin leaves no interior on some axis.
    ContainmentMarginTooLarge { margin: f32, smallest_extent: f32 },
    /// A boid at `max_speed` could travel past the containment margin in one step.
    MarginBelowMaxSpeed { margin: f32, max_speed: f32 },
    /// Obstacle avoidance would not dominate the flocking rules.
    ObstacleWeightTooLow { obstacle_weight: f32, flocking_weight: f32 },
    /// The pointer viewport has a non-positive dimension.
    InvalidViewport { width: f32, height: f32 },
}

/// Boundary axis named in [`ConfigError::NonPositiveExtent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "width"),
            Axis::Y => write!(f, "height"),
            Axis::Z => write!(f, "depth"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositiveExtent { axis, value } => {
                write!(f, "Boundary {} must be positive and finite, got {}", axis, value)
            }
            ConfigError::NonPositiveSubdivisions => {
                write!(f, "Subdivision count must be at least 1")
            }
            ConfigError::InvalidSpeedRange { min, max } => write!(
                f,
                "Speed range is invalid: min_speed {} must be >= 0 and <= max_speed {}",
                min, max
            ),
            ConfigError::NonPositiveValue { name, value } => {
                write!(f, "{} must be positive and finite, got {}", name, value)
            }
            ConfigError::NegativeWeight { name, value } => {
                write!(f, "{} must be non-negative and finite, got {}", name, value)
            }
            ConfigError::ContainmentMarginTooLarge {
                margin,
                smallest_extent,
            } => write!(
                f,
                "Containment margin {} leaves no interior in a boundary extent of {}",
                margin, smallest_extent
            ),
            ConfigError::MarginBelowMaxSpeed { margin, max_speed } => write!(
                f,
                "Containment margin {} must be at least max_speed {}",
                margin, max_speed
            ),
            ConfigError::ObstacleWeightTooLow {
                obstacle_weight,
                flocking_weight,
            } => write!(
                f,
                "Obstacle weight {} must be at least the largest flocking weight {}",
                obstacle_weight, flocking_weight
            ),
            ConfigError::InvalidViewport { width, height } => {
                write!(f, "Pointer viewport {}x{} must have positive dimensions", width, height)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
