//! The simulation controller.
//!
//! [`Flock`] owns the entity store and the spatial grid. Each call to
//! [`Flock::step`] rebuilds the grid, computes every boid's acceleration
//! against the state as it was when the step began, and only then integrates,
//! so the result does not depend on the order boids are visited in.

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::behavior;
use crate::boundary::Boundary;
use crate::config::{BoidConfig, IdleBehavior};
use crate::entity::{Boid, EntityId, EntityStore, Obstacle};
use crate::error::ConfigError;
use crate::grid::SpatialGrid;
use crate::pointer;
use crate::vector::Vector3D;

/// Speeds at or below this are treated as "not moving" by the speed clamp.
const REST_SPEED: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlockState {
    /// No boids; stepping does nothing.
    Idle,
    /// At least one boid.
    Active,
}

/// Summary of one call to [`Flock::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepStats {
    pub flock_count: usize,
    /// Grid candidates examined across all boids, before distance filtering.
    pub neighbor_checks: usize,
    pub pointer_active: bool,
}

/// A flock of boids and the obstacles they fly around.
///
/// `R` is the random source used to place new entities. Use
/// [`Flock::with_seed`] for reproducible spawns.
pub struct Flock<R = SmallRng> {
    boundary: Boundary,
    config: BoidConfig,
    store: EntityStore,
    grid: SpatialGrid,
    rng: R,
    pointer_target: Option<Vector3D>,
    steps: u64,
    candidates: Vec<usize>,
    accelerations: Vec<Vector3D>,
}

impl Flock<SmallRng> {
    pub fn with_seed(boundary: Boundary, config: BoidConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(boundary, config, SmallRng::seed_from_u64(seed))
    }

    #[cfg(feature = "std")]
    pub fn from_entropy(boundary: Boundary, config: BoidConfig) -> Result<Self, ConfigError> {
        Self::new(boundary, config, SmallRng::from_entropy())
    }
}

impl<R: Rng> Flock<R> {
    pub fn new(boundary: Boundary, config: BoidConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate(&boundary)?;
        let grid = SpatialGrid::new(&boundary, config.subdivision_count)?;

        log::debug!(
            "Flock created: boundary {}x{}x{}, {} subdivisions (cell size {})",
            boundary.width(),
            boundary.height(),
            boundary.depth(),
            config.subdivision_count,
            grid.cell_size()
        );

        Ok(Self {
            boundary,
            config,
            store: EntityStore::new(),
            grid,
            rng,
            pointer_target: None,
            steps: 0,
            candidates: Vec::new(),
            accelerations: Vec::new(),
        })
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn config(&self) -> &BoidConfig {
        &self.config
    }

    /// Replace the configuration. The grid is rebuilt if the subdivision count changes.
    pub fn set_config(&mut self, config: BoidConfig) -> Result<(), ConfigError> {
        config.validate(&self.boundary)?;
        if config.subdivision_count != self.config.subdivision_count {
            self.grid = SpatialGrid::new(&self.boundary, config.subdivision_count)?;
        }
        self.config = config;
        log::debug!("Flock configuration updated");
        Ok(())
    }

    /// Grid subdivision count, for drawing a debug grid.
    pub fn subdivision_count(&self) -> usize {
        self.grid.subdivision_count()
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn state(&self) -> FlockState {
        if self.store.boid_count() == 0 {
            FlockState::Idle
        } else {
            FlockState::Active
        }
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// World-space pointer target resolved on the last step, if there was one.
    pub fn pointer_target(&self) -> Option<Vector3D> {
        self.pointer_target
    }

    fn random_position(&mut self) -> Vector3D {
        Vector3D::new(
            self.rng.gen_range(0.0..self.boundary.width()),
            self.rng.gen_range(0.0..self.boundary.height()),
            self.rng.gen_range(0.0..self.boundary.depth()),
        )
    }

    fn random_velocity(&mut self) -> Vector3D {
        let speed = self
            .rng
            .gen_range(self.config.min_speed..=self.config.max_speed);
        loop {
            let candidate = Vector3D::new(
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
            );
            let length_squared = candidate.magnitude_squared();
            if length_squared > 1e-4 && length_squared <= 1.0 {
                return candidate.with_magnitude(speed);
            }
        }
    }

    /// Add a boid at a random position inside the boundary with a random
    /// velocity within the configured speed range.
    pub fn add_flock_entity(&mut self) -> EntityId {
        let position = self.random_position();
        let velocity = self.random_velocity();
        self.spawn_flock_entity_at(position, velocity)
    }

    pub fn add_flock_entities(&mut self, count: usize) -> Vec<EntityId> {
        (0..count).map(|_| self.add_flock_entity()).collect()
    }

    /// Add an obstacle of the configured radius at a random position inside the boundary.
    pub fn add_obstacle(&mut self) -> EntityId {
        let position = self.random_position();
        let radius = self.config.obstacle_radius;
        self.spawn_obstacle_at(position, radius)
    }

    pub fn add_obstacles(&mut self, count: usize) -> Vec<EntityId> {
        (0..count).map(|_| self.add_obstacle()).collect()
    }

    /// Add a boid with an exact position and velocity.
    pub fn spawn_flock_entity_at(&mut self, position: Vector3D, velocity: Vector3D) -> EntityId {
        let id = self.store.insert_boid(position, velocity);
        log::debug!("Added boid {} at {:?}", id, position);
        id
    }

    /// Add an obstacle with an exact position and radius.
    pub fn spawn_obstacle_at(&mut self, position: Vector3D, radius: f32) -> EntityId {
        let id = self.store.insert_obstacle(position, radius);
        log::debug!("Added obstacle {} at {:?} (radius {})", id, position, radius);
        id
    }

    /// Remove a boid. Unknown identities are ignored; returns whether one was removed.
    pub fn remove_flock_entity(&mut self, id: EntityId) -> bool {
        let removed = self.store.remove_boid(id);
        if removed {
            log::debug!("Removed boid {}", id);
        }
        removed
    }

    /// Remove an obstacle. Unknown identities are ignored; returns whether one was removed.
    pub fn remove_obstacle(&mut self, id: EntityId) -> bool {
        let removed = self.store.remove_obstacle(id);
        if removed {
            log::debug!("Removed obstacle {}", id);
        }
        removed
    }

    /// Remove every boid and obstacle.
    pub fn clear(&mut self) {
        self.store.clear();
        self.grid.clear();
        log::debug!("Flock cleared");
    }

    pub fn flock_entities(&self) -> &[Boid] {
        self.store.boids()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        self.store.obstacles()
    }

    pub fn flock_entity(&self, id: EntityId) -> Option<&Boid> {
        self.store.boid(id)
    }

    pub fn obstacle(&self, id: EntityId) -> Option<&Obstacle> {
        self.store.obstacle(id)
    }

    /// Advance the simulation by one frame.
    ///
    /// `pointer_x`/`pointer_y` are raw viewport coordinates, interpreted as
    /// described in [`crate::pointer`]. Never fails.
    pub fn step(&mut self, pointer_x: f32, pointer_y: f32) -> StepStats {
        self.steps += 1;
        self.pointer_target = pointer::project(
            pointer_x,
            pointer_y,
            &self.config.pointer,
            &self.boundary,
        );

        let flock_count = self.store.boid_count();
        if flock_count == 0 {
            return StepStats {
                pointer_active: self.pointer_target.is_some(),
                ..StepStats::default()
            };
        }

        self.grid.rebuild(self.store.boids());
        let neighbor_checks = self.compute_accelerations(0..flock_count);
        self.integrate();

        log::trace!(
            "Step {}: {} boids, {} neighbor checks, pointer {:?}",
            self.steps,
            flock_count,
            neighbor_checks,
            self.pointer_target
        );

        StepStats {
            flock_count,
            neighbor_checks,
            pointer_active: self.pointer_target.is_some(),
        }
    }

    /// Advance one frame with no pointer input.
    pub fn step_without_pointer(&mut self) -> StepStats {
        self.step(f32::NAN, f32::NAN)
    }

    /// Fill `self.accelerations` (indexed by slot) visiting boids in `order`.
    /// Reads only the pre-step state, so any visiting order gives the same result.
    fn compute_accelerations<I>(&mut self, order: I) -> usize
    where
        I: Iterator<Item = usize>,
    {
        let mut accelerations = core::mem::take(&mut self.accelerations);
        let mut candidates = core::mem::take(&mut self.candidates);
        accelerations.clear();
        accelerations.resize(self.store.boid_count(), Vector3D::zero());

        let radius = self.config.perception_radius();
        let radius_squared = radius * radius;
        let boids = self.store.boids();
        let obstacles = self.store.obstacles();
        let mut neighbors: Vec<&Boid> = Vec::new();
        let mut checks = 0;

        for slot in order {
            let boid = &boids[slot];
            self.grid.query_into(boid.position, radius, &mut candidates);
            checks += candidates.len();

            neighbors.clear();
            neighbors.extend(candidates.iter().map(|&other| &boids[other]).filter(|other| {
                other.id != boid.id
                    && other.position.distance_squared(&boid.position) <= radius_squared
            }));

            let forces = behavior::steering(
                boid,
                &neighbors,
                obstacles,
                self.pointer_target,
                &self.boundary,
                &self.config,
            );

            let acceleration = forces.total();
            accelerations[slot] = if acceleration.is_finite() {
                acceleration
            } else {
                log::warn!("Dropping non-finite acceleration for boid {}", boid.id);
                Vector3D::zero()
            };
        }

        self.accelerations = accelerations;
        self.candidates = candidates;
        checks
    }

    fn integrate(&mut self) {
        let config = self.config;
        for (boid, &acceleration) in self
            .store
            .boids_mut()
            .iter_mut()
            .zip(self.accelerations.iter())
        {
            boid.acceleration = acceleration;
            boid.velocity = clamp_speed(boid.velocity + acceleration, &config);
            boid.position += boid.velocity;
        }
    }
}

/// Bring `velocity` into `[min_speed, max_speed]`. A velocity with no
/// direction is handled by the configured [`IdleBehavior`].
pub fn clamp_speed(velocity: Vector3D, config: &BoidConfig) -> Vector3D {
    let speed = velocity.magnitude();
    if !(speed > REST_SPEED) {
        return match config.idle_behavior {
            IdleBehavior::Rest => Vector3D::zero(),
            IdleBehavior::Launch(heading) => heading.with_magnitude(config.min_speed),
        };
    }

    if speed > config.max_speed {
        velocity * (config.max_speed / speed)
    } else if speed < config.min_speed {
        velocity * (config.min_speed / speed)
    } else {
        velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Boundary {
        Boundary::new(100.0, 100.0, 100.0).unwrap()
    }

    fn seeded() -> Flock {
        Flock::with_seed(cube(), BoidConfig::default(), 7).unwrap()
    }

    #[test]
    fn test_flock_creation() {
        let flock = seeded();
        assert_eq!(flock.state(), FlockState::Idle);
        assert_eq!(flock.subdivision_count(), 4);
        assert!(flock.flock_entities().is_empty());
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = BoidConfig {
            subdivision_count: 0,
            ..BoidConfig::default()
        };
        assert_eq!(
            Flock::with_seed(cube(), config, 1).err(),
            Some(ConfigError::NonPositiveSubdivisions)
        );
    }

    #[test]
    fn test_add_places_inside_boundary() {
        let mut flock = seeded();
        let ids = flock.add_flock_entities(50);
        flock.add_obstacles(5);

        assert_eq!(ids.len(), 50);
        assert_eq!(flock.state(), FlockState::Active);
        let config = *flock.config();
        for boid in flock.flock_entities() {
            assert!(flock.boundary().contains(boid.position));
            assert!(boid.speed() >= config.min_speed - 1e-4);
            assert!(boid.speed() <= config.max_speed + 1e-4);
        }
        for obstacle in flock.obstacles() {
            assert!(flock.boundary().contains(obstacle.position));
            assert_eq!(obstacle.radius, config.obstacle_radius);
        }
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = seeded();
        let mut b = seeded();
        a.add_flock_entities(10);
        b.add_flock_entities(10);
        assert_eq!(a.flock_entities(), b.flock_entities());
    }

    #[test]
    fn test_idle_step_is_noop() {
        let mut flock = seeded();
        let stats = flock.step_without_pointer();
        assert_eq!(stats.flock_count, 0);
        assert_eq!(stats.neighbor_checks, 0);
        assert_eq!(flock.state(), FlockState::Idle);
    }

    #[test]
    fn test_step_moves_boids() {
        let mut flock = seeded();
        flock.add_flock_entities(10);
        let before: Vec<_> = flock.flock_entities().iter().map(|b| b.position).collect();

        flock.step_without_pointer();

        let changed = flock
            .flock_entities()
            .iter()
            .zip(before.iter())
            .any(|(b, &initial)| b.position != initial);
        assert!(changed);
    }

    #[test]
    fn test_visiting_order_does_not_matter() {
        let mut flock = Flock::with_seed(
            Boundary::new(200.0, 200.0, 200.0).unwrap(),
            BoidConfig::default(),
            11,
        )
        .unwrap();
        flock.add_flock_entities(60);
        flock.add_obstacles(3);
        let n = flock.flock_entities().len();

        flock.grid.rebuild(flock.store.boids());
        flock.compute_accelerations(0..n);
        let forward = flock.accelerations.clone();
        flock.compute_accelerations((0..n).rev());
        let backward = flock.accelerations.clone();

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_huge_perception_radius_steps() {
        let config = BoidConfig {
            cohesion_distance: 1e30,
            ..BoidConfig::default()
        };
        let mut flock = Flock::with_seed(cube(), config, 5).unwrap();
        flock.add_flock_entities(10);

        let stats = flock.step_without_pointer();
        assert_eq!(stats.flock_count, 10);
        assert_eq!(stats.neighbor_checks, 100);
        assert!(flock.flock_entities().iter().all(|b| b.position.is_finite()));
    }

    #[test]
    fn test_clamp_speed_bounds() {
        let config = BoidConfig::default();
        let fast = clamp_speed(Vector3D::new(100.0, 0.0, 0.0), &config);
        assert!((fast.magnitude() - config.max_speed).abs() < 1e-5);

        let slow = clamp_speed(Vector3D::new(0.0, 0.1, 0.0), &config);
        assert!((slow.magnitude() - config.min_speed).abs() < 1e-5);
        assert!(slow.y > 0.0);
    }

    #[test]
    fn test_clamp_speed_idle_behavior() {
        let launch = BoidConfig::default();
        assert_eq!(
            clamp_speed(Vector3D::zero(), &launch),
            Vector3D::new(launch.min_speed, 0.0, 0.0)
        );

        let rest = BoidConfig {
            idle_behavior: IdleBehavior::Rest,
            ..BoidConfig::default()
        };
        assert_eq!(clamp_speed(Vector3D::zero(), &rest), Vector3D::zero());
    }

    #[test]
    fn test_set_config_rebuilds_grid() {
        let mut flock = seeded();
        flock
            .set_config(BoidConfig {
                subdivision_count: 10,
                ..BoidConfig::default()
            })
            .unwrap();
        assert_eq!(flock.subdivision_count(), 10);
        assert_eq!(flock.grid().cell_size(), 10.0);

        let bad = BoidConfig {
            max_speed: -1.0,
            ..BoidConfig::default()
        };
        assert!(flock.set_config(bad).is_err());
        assert_eq!(flock.subdivision_count(), 10);
    }

    #[test]
    fn test_pointer_target_recorded() {
        let mut flock = seeded();
        flock.add_flock_entity();
        let stats = flock.step(640.0, 360.0);
        assert!(stats.pointer_active);
        assert_eq!(flock.pointer_target(), Some(cube().center()));

        flock.step_without_pointer();
        assert_eq!(flock.pointer_target(), None);
    }
}
