use crate::boundary::Boundary;
use crate::error::ConfigError;
use crate::vector::Vector3D;

/// What happens to a boid that is at rest and receives no steering at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IdleBehavior {
    /// It stays at rest. This is the only case where speed may sit below `min_speed`.
    Rest,
    /// It is set moving at `min_speed` along the given heading.
    Launch(Vector3D),
}

/// Whether the pointer pulls boids in or pushes them away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerMode {
    Attract,
    Repel,
}

/// How raw pointer coordinates are interpreted and how strongly boids react.
///
/// See [`crate::pointer`] for the coordinate convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub mode: PointerMode,
    pub weight: f32,
    /// Boids farther than this from the projected target ignore the pointer.
    pub influence_radius: f32,
    /// Treat a pointer at exactly `(0, 0)` as "no pointer".
    pub ignore_origin: bool,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            viewport_height: 720.0,
            mode: PointerMode::Attract,
            weight: 2.0,
            influence_radius: 600.0,
            ignore_origin: true,
        }
    }
}

/// Configuration for the boid simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoidConfig {
    pub min_speed: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub separation_distance: f32,
    pub alignment_distance: f32,
    pub cohesion_distance: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    /// Radius given to obstacles created by `add_obstacle`.
    pub obstacle_radius: f32,
    /// Extra clearance around an obstacle's radius where avoidance kicks in.
    pub obstacle_margin: f32,
    pub obstacle_weight: f32,
    pub containment_margin: f32,
    pub containment_weight: f32,
    /// Cells per axis along the boundary's largest extent.
    pub subdivision_count: usize,
    pub idle_behavior: IdleBehavior,
    pub pointer: PointerConfig,
}

impl Default for BoidConfig {
    fn default() -> Self {
        Self {
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
            subdivision_count: 4,
            idle_behavior: IdleBehavior::Launch(Vector3D::new(1.0, 0.0, 0.0)),
            pointer: PointerConfig::default(),
        }
    }
}

fn require_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveValue { name, value })
    }
}

fn require_weight(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NegativeWeight { name, value })
    }
}

impl BoidConfig {
    /// Side length of a grid cell for this configuration inside `boundary`.
    pub fn cell_size(&self, boundary: &Boundary) -> f32 {
        boundary.largest_extent() / self.subdivision_count.max(1) as f32
    }

    /// Largest of the three flocking weights.
    pub fn flocking_weight(&self) -> f32 {
        self.separation_weight
            .max(self.alignment_weight)
            .max(self.cohesion_weight)
    }

    /// Largest radius any flocking rule looks at.
    pub fn perception_radius(&self) -> f32 {
        self.separation_distance
            .max(self.alignment_distance)
            .max(self.cohesion_distance)
    }

    /// Minimum push on a boid that has crossed a wall.
    ///
    /// Exceeds twice `max_speed` plus the largest sum of flocking and pointer
    /// forces, so one step past the wall always reverses the outward velocity.
    pub fn wall_push(&self) -> f32 {
        let other_weights = self.separation_weight
            + self.alignment_weight
            + self.cohesion_weight
            + self.pointer.weight;
        2.0 * self.max_speed + self.max_force * other_weights
    }

    /// Check the configuration against the boundary it will run in.
    pub fn validate(&self, boundary: &Boundary) -> Result<(), ConfigError> {
        if self.subdivision_count == 0 {
            return Err(ConfigError::NonPositiveSubdivisions);
        }

        require_positive("max_speed", self.max_speed)?;
        if !(self.min_speed >= 0.0 && self.min_speed <= self.max_speed) {
            return Err(ConfigError::InvalidSpeedRange {
                min: self.min_speed,
                max: self.max_speed,
            });
        }

        require_positive("max_force", self.max_force)?;
        require_positive("separation_distance", self.separation_distance)?;
        require_positive("alignment_distance", self.alignment_distance)?;
        require_positive("cohesion_distance", self.cohesion_distance)?;
        require_positive("obstacle_radius", self.obstacle_radius)?;
        require_positive("containment_margin", self.containment_margin)?;
        require_weight("obstacle_margin", self.obstacle_margin)?;

        require_weight("separation_weight", self.separation_weight)?;
        require_weight("alignment_weight", self.alignment_weight)?;
        require_weight("cohesion_weight", self.cohesion_weight)?;
        require_weight("obstacle_weight", self.obstacle_weight)?;
        require_weight("containment_weight", self.containment_weight)?;
        require_weight("pointer.weight", self.pointer.weight)?;

        if self.containment_margin * 2.0 >= boundary.smallest_extent() {
            return Err(ConfigError::ContainmentMarginTooLarge {
                margin: self.containment_margin,
                smallest_extent: boundary.smallest_extent(),
            });
        }

        if self.max_speed > self.containment_margin {
            return Err(ConfigError::MarginBelowMaxSpeed {
                margin: self.containment_margin,
                max_speed: self.max_speed,
            });
        }

        if self.obstacle_weight < self.flocking_weight() {
            return Err(ConfigError::ObstacleWeightTooLow {
                obstacle_weight: self.obstacle_weight,
                flocking_weight: self.flocking_weight(),
            });
        }

        if let IdleBehavior::Launch(heading) = self.idle_behavior {
            require_positive("idle heading length", heading.magnitude())?;
        }

        let pointer = &self.pointer;
        if !(pointer.viewport_width > 0.0
            && pointer.viewport_height > 0.0
            && pointer.viewport_width.is_finite()
            && pointer.viewport_height.is_finite())
        {
            return Err(ConfigError::InvalidViewport {
                width: pointer.viewport_width,
                height: pointer.viewport_height,
            });
        }
        require_positive("pointer.influence_radius", pointer.influence_radius)?;

        Ok(())
    }
}
