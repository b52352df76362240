#![cfg_attr(not(feature = "std"), no_std)]

//! Three-dimensional flocking simulation.
//!
//! A [`Flock`] holds boids and spherical obstacles inside an axis-aligned
//! [`Boundary`]. Each [`Flock::step`] finds neighbors through a uniform
//! [`SpatialGrid`], combines separation, alignment, cohesion, obstacle
//! avoidance, pointer steering and soft containment into one acceleration
//! per boid, then integrates with speeds clamped to the configured range.
//!
//! ```
//! use boid_core::{BoidConfig, Boundary, Flock};
//!
//! let boundary = Boundary::new(2000.0, 600.0, 2000.0).unwrap();
//! let mut flock = Flock::with_seed(boundary, BoidConfig::default(), 42).unwrap();
//! flock.add_flock_entities(50);
//! flock.add_obstacles(10);
//!
//! for _ in 0..10 {
//!     flock.step(640.0, 360.0);
//! }
//! assert_eq!(flock.flock_entities().len(), 50);
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod behavior;
pub mod boundary;
pub mod config;
pub mod entity;
pub mod error;
pub mod flock;
pub mod grid;
pub mod pointer;
pub mod vector;

pub use behavior::SteeringForces;
pub use boundary::Boundary;
pub use config::{BoidConfig, IdleBehavior, PointerConfig, PointerMode};
pub use entity::{Boid, EntityId, EntityStore, Obstacle};
pub use error::{Axis, ConfigError};
pub use flock::{clamp_speed, Flock, FlockState, StepStats};
pub use grid::{CellCoord, SpatialGrid};
pub use vector::Vector3D;
