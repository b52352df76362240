//! Entity store: flock boids and static obstacles.
//!
//! Identities are handed out from a single counter shared by both kinds of
//! entity and are never reused within one store.

use core::fmt;

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::vector::Vector3D;

/// Stable identity of a boid or obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    pub fn new(id: u64) -> Self {
        EntityId(id)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// A single boid entity
#[derive(Debug, Clone, PartialEq)]
pub struct Boid {
    pub id: EntityId,
    pub position: Vector3D,
    pub velocity: Vector3D,
    /// Acceleration applied on the most recent step.
    pub acceleration: Vector3D,
}

impl Boid {
    pub fn new(id: EntityId, position: Vector3D, velocity: Vector3D) -> Self {
        Self {
            id,
            position,
            velocity,
            acceleration: Vector3D::zero(),
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.magnitude()
    }
}

/// A static sphere that boids steer around
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub id: EntityId,
    pub position: Vector3D,
    pub radius: f32,
}

impl Obstacle {
    pub fn new(id: EntityId, position: Vector3D, radius: f32) -> Self {
        Self {
            id,
            position,
            radius,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    boids: Vec<Boid>,
    obstacles: Vec<Obstacle>,
    next_id: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert_boid(&mut self, position: Vector3D, velocity: Vector3D) -> EntityId {
        let id = self.allocate_id();
        self.boids.push(Boid::new(id, position, velocity));
        id
    }

    pub fn insert_obstacle(&mut self, position: Vector3D, radius: f32) -> EntityId {
        let id = self.allocate_id();
        self.obstacles.push(Obstacle::new(id, position, radius));
        id
    }

    /// Remove a boid, keeping the order of the rest. Returns `false` if `id` is unknown.
    pub fn remove_boid(&mut self, id: EntityId) -> bool {
        match self.boids.iter().position(|b| b.id == id) {
            Some(index) => {
                self.boids.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove an obstacle, keeping the order of the rest. Returns `false` if `id` is unknown.
    pub fn remove_obstacle(&mut self, id: EntityId) -> bool {
        match self.obstacles.iter().position(|o| o.id == id) {
            Some(index) => {
                self.obstacles.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub(crate) fn boids_mut(&mut self) -> &mut [Boid] {
        &mut self.boids
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn boid(&self, id: EntityId) -> Option<&Boid> {
        self.boids.iter().find(|b| b.id == id)
    }

    pub fn obstacle(&self, id: EntityId) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.id == id)
    }

    pub fn boid_count(&self) -> usize {
        self.boids.len()
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Drop every entity. Identities keep counting up.
    pub fn clear(&mut self) {
        self.boids.clear();
        self.obstacles.clear();
    }
}
