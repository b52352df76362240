//! Steering rules.
//!
//! Every rule is a pure function of a boid and what it can see and returns an
//! acceleration. Flocking rules expect `others` to exclude the boid itself;
//! they apply their own radius. Degenerate geometry (coincident boids, empty
//! neighborhoods) yields a zero contribution, never NaN.

use crate::boundary::Boundary;
use crate::config::{BoidConfig, PointerMode};
use crate::entity::{Boid, Obstacle};
use crate::vector::Vector3D;

/// Distances below this are treated as this when dividing.
pub const MIN_DISTANCE: f32 = 1e-3;

/// Weighted contribution of each rule for one boid on one step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SteeringForces {
    pub separation: Vector3D,
    pub alignment: Vector3D,
    pub cohesion: Vector3D,
    pub avoidance: Vector3D,
    pub pointer: Vector3D,
    pub containment: Vector3D,
}

impl SteeringForces {
    pub fn total(&self) -> Vector3D {
        self.separation
            + self.alignment
            + self.cohesion
            + self.avoidance
            + self.pointer
            + self.containment
    }

    /// Magnitude of the strongest of separation, alignment and cohesion.
    pub fn strongest_flocking(&self) -> f32 {
        self.separation
            .magnitude()
            .max(self.alignment.magnitude())
            .max(self.cohesion.magnitude())
    }
}

/// Reynolds steering toward a desired direction: `desired * max_speed - velocity`,
/// limited to `max_force`. A zero direction yields zero.
fn steer(boid: &Boid, direction: Vector3D, config: &BoidConfig) -> Vector3D {
    let direction = direction.normalize();
    if direction == Vector3D::zero() {
        return Vector3D::zero();
    }
    let steering = direction * config.max_speed - boid.velocity;
    steering.limit(config.max_force)
}

pub fn separation<'a, I>(boid: &Boid, others: I, config: &BoidConfig) -> Vector3D
where
    I: Iterator<Item = &'a Boid>,
{
    let mut steering = Vector3D::zero();
    let mut count = 0;

    for other in others {
        let distance = boid.position.distance(&other.position);
        if distance < config.separation_distance {
            let away = (boid.position - other.position).normalize();
            steering += away / distance.max(MIN_DISTANCE);
            count += 1;
        }
    }

    if count > 0 {
        steering = steering / count as f32;
    }

    steer(boid, steering, config)
}

pub fn alignment<'a, I>(boid: &Boid, others: I, config: &BoidConfig) -> Vector3D
where
    I: Iterator<Item = &'a Boid>,
{
    let mut sum = Vector3D::zero();
    let mut count = 0;

    for other in others {
        if boid.position.distance(&other.position) < config.alignment_distance {
            sum += other.velocity;
            count += 1;
        }
    }

    if count > 0 {
        steer(boid, sum / count as f32, config)
    } else {
        Vector3D::zero()
    }
}

pub fn cohesion<'a, I>(boid: &Boid, others: I, config: &BoidConfig) -> Vector3D
where
    I: Iterator<Item = &'a Boid>,
{
    let mut sum = Vector3D::zero();
    let mut count = 0;

    for other in others {
        if boid.position.distance(&other.position) < config.cohesion_distance {
            sum += other.position;
            count += 1;
        }
    }

    if count > 0 {
        seek(boid, sum / count as f32, config)
    } else {
        Vector3D::zero()
    }
}

pub fn seek(boid: &Boid, target: Vector3D, config: &BoidConfig) -> Vector3D {
    steer(boid, target - boid.position, config)
}

pub fn flee(boid: &Boid, target: Vector3D, config: &BoidConfig) -> Vector3D {
    steer(boid, boid.position - target, config)
}

/// Push away from every obstacle closer than its radius plus `obstacle_margin`.
///
/// Unlike the flocking rules this is not limited to `max_force`: each term is
/// `max_force * reach / distance`, which is at least `max_force` and grows
/// without bound toward the obstacle's center.
pub fn obstacle_avoidance<'a, I>(boid: &Boid, obstacles: I, config: &BoidConfig) -> Vector3D
where
    I: Iterator<Item = &'a Obstacle>,
{
    let mut push = Vector3D::zero();

    for obstacle in obstacles {
        let reach = obstacle.radius + config.obstacle_margin;
        let distance = boid.position.distance(&obstacle.position);
        if distance < reach {
            let away = (boid.position - obstacle.position).normalize();
            push += away * (config.max_force * reach / distance.max(MIN_DISTANCE));
        }
    }

    push
}

/// Attraction to (or repulsion from) the pointer target for boids within its influence radius.
pub fn pointer(boid: &Boid, target: Vector3D, config: &BoidConfig) -> Vector3D {
    if boid.position.distance(&target) >= config.pointer.influence_radius {
        return Vector3D::zero();
    }
    match config.pointer.mode {
        PointerMode::Attract => seek(boid, target, config),
        PointerMode::Repel => flee(boid, target, config),
    }
}

/// Evaluate every rule for `boid` and apply the configured weights.
pub fn steering(
    boid: &Boid,
    neighbors: &[&Boid],
    obstacles: &[Obstacle],
    target: Option<Vector3D>,
    boundary: &Boundary,
    config: &BoidConfig,
) -> SteeringForces {
    let others = || neighbors.iter().copied();

    SteeringForces {
        separation: separation(boid, others(), config) * config.separation_weight,
        alignment: alignment(boid, others(), config) * config.alignment_weight,
        cohesion: cohesion(boid, others(), config) * config.cohesion_weight,
        avoidance: obstacle_avoidance(boid, obstacles.iter(), config) * config.obstacle_weight,
        pointer: target
            .map(|t| pointer(boid, t, config) * config.pointer.weight)
            .unwrap_or_default(),
        containment: boundary.containment_force(
            boid.position,
            config.containment_margin,
            config.containment_weight * config.max_force,
            config.wall_push(),
        ),
    }
}
