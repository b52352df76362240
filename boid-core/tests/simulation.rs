use boid_core::{
    BoidConfig, Boundary, EntityId, Flock, FlockState, IdleBehavior, SpatialGrid, Vector3D,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const EPSILON: f32 = 1e-3;

fn cube(side: f32) -> Boundary {
    Boundary::new(side, side, side).unwrap()
}

#[test]
fn speeds_stay_within_range() {
    let mut flock = Flock::with_seed(cube(300.0), BoidConfig::default(), 3).unwrap();
    flock.add_flock_entities(80);
    flock.add_obstacles(4);
    let config = *flock.config();

    for frame in 0..200 {
        flock.step(640.0, 360.0);
        for boid in flock.flock_entities() {
            let speed = boid.speed();
            assert!(
                speed >= config.min_speed - EPSILON && speed <= config.max_speed + EPSILON,
                "frame {}: {} has speed {}",
                frame,
                boid.id,
                speed
            );
        }
    }
}

#[test]
fn resting_boid_may_stay_at_rest() {
    let config = BoidConfig {
        idle_behavior: IdleBehavior::Rest,
        ..BoidConfig::default()
    };
    let mut flock = Flock::with_seed(cube(100.0), config, 1).unwrap();
    let id = flock.spawn_flock_entity_at(Vector3D::new(50.0, 50.0, 50.0), Vector3D::zero());

    flock.step_without_pointer();

    let boid = flock.flock_entity(id).unwrap();
    assert_eq!(boid.velocity, Vector3D::zero());
    assert_eq!(boid.position, Vector3D::new(50.0, 50.0, 50.0));
}

#[test]
fn long_run_stays_near_the_box() {
    let boundary = Boundary::new(400.0, 200.0, 400.0).unwrap();
    let mut flock = Flock::with_seed(boundary, BoidConfig::default(), 99).unwrap();
    flock.add_flock_entities(40);
    let margin = flock.config().containment_margin;

    for frame in 0..2000 {
        flock.step_without_pointer();
        for boid in flock.flock_entities() {
            assert!(
                boundary.contains_with_margin(boid.position, margin),
                "frame {}: {} escaped to {:?}",
                frame,
                boid.id,
                boid.position
            );
        }
    }
}

#[test]
fn fast_boid_turns_back_within_the_margin() {
    let boundary = Boundary::new(400.0, 200.0, 400.0).unwrap();
    let config = BoidConfig {
        max_speed: 20.0,
        ..BoidConfig::default()
    };
    let mut flock = Flock::with_seed(boundary, config, 21).unwrap();
    let id = flock.spawn_flock_entity_at(
        Vector3D::new(200.0, 100.0, 200.0),
        Vector3D::new(20.0, 0.0, 0.0),
    );
    flock.spawn_flock_entity_at(Vector3D::new(200.0, 190.0, 200.0), Vector3D::new(0.0, 20.0, 0.0));

    let mut max_x = f32::MIN;
    for frame in 0..400 {
        flock.step_without_pointer();
        for boid in flock.flock_entities() {
            assert!(
                boundary.contains_with_margin(boid.position, config.containment_margin),
                "frame {}: {} escaped to {:?}",
                frame,
                boid.id,
                boid.position
            );
        }
        max_x = max_x.max(flock.flock_entity(id).unwrap().position.x);
    }

    assert!(max_x > boundary.width() - config.containment_margin);
    assert!(max_x <= boundary.width() + config.max_speed);
}

#[test]
fn margin_narrower_than_one_step_is_rejected() {
    let config = BoidConfig {
        max_speed: 60.0,
        ..BoidConfig::default()
    };
    assert!(Flock::with_seed(cube(400.0), config, 0).is_err());
}

#[test]
fn coincident_boids_never_produce_nan() {
    let mut flock = Flock::with_seed(cube(100.0), BoidConfig::default(), 5).unwrap();
    for _ in 0..5 {
        flock.spawn_flock_entity_at(Vector3D::new(50.0, 50.0, 50.0), Vector3D::new(1.0, 0.0, 0.0));
    }
    flock.spawn_flock_entity_at(Vector3D::new(50.0, 50.0, 50.0), Vector3D::zero());

    for _ in 0..20 {
        flock.step_without_pointer();
        for boid in flock.flock_entities() {
            assert!(boid.position.is_finite());
            assert!(boid.velocity.is_finite());
            assert!(boid.acceleration.is_finite());
        }
    }
}

#[test]
fn insertion_order_does_not_change_the_outcome() {
    let mut rng = SmallRng::seed_from_u64(17);
    let seeds: Vec<(Vector3D, Vector3D)> = (0..60)
        .map(|_| {
            let position = Vector3D::new(
                rng.gen_range(0.0..200.0),
                rng.gen_range(0.0..200.0),
                rng.gen_range(0.0..200.0),
            );
            let velocity = Vector3D::new(
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
            );
            (position, velocity)
        })
        .collect();

    let mut forward = Flock::with_seed(cube(200.0), BoidConfig::default(), 0).unwrap();
    let mut backward = Flock::with_seed(cube(200.0), BoidConfig::default(), 0).unwrap();
    for &(position, velocity) in &seeds {
        forward.spawn_flock_entity_at(position, velocity);
    }
    for &(position, velocity) in seeds.iter().rev() {
        backward.spawn_flock_entity_at(position, velocity);
    }

    for _ in 0..3 {
        forward.step_without_pointer();
        backward.step_without_pointer();
    }

    let n = seeds.len();
    for (i, a) in forward.flock_entities().iter().enumerate() {
        let b = &backward.flock_entities()[n - 1 - i];
        assert!(
            a.position.distance(&b.position) < EPSILON,
            "{:?} vs {:?}",
            a.position,
            b.position
        );
        assert!(a.velocity.distance(&b.velocity) < EPSILON);
    }
}

#[test]
fn grid_query_finds_everything_brute_force_does() {
    let boundary = Boundary::new(2000.0, 600.0, 2000.0).unwrap();
    let mut flock = Flock::with_seed(boundary, BoidConfig::default(), 8).unwrap();
    flock.add_flock_entities(500);
    // Stragglers past each wall land in the nearest edge cell; the last sits just inside a corner.
    for position in [
        [-5.0, 300.0, 1000.0],
        [2010.0, 300.0, 1000.0],
        [1000.0, -3.0, 1000.0],
        [1000.0, 612.0, 1000.0],
        [1000.0, 300.0, -8.0],
        [1000.0, 300.0, 2004.0],
        [-2.0, 605.0, 2001.0],
        [3.0, 598.0, 1995.0],
    ] {
        flock.spawn_flock_entity_at(position.into(), Vector3D::zero());
    }
    let boids = flock.flock_entities();
    let stragglers = boids.len() - 8..boids.len();

    for subdivisions in [1, 4, 10, 40] {
        let mut grid = SpatialGrid::new(&boundary, subdivisions).unwrap();
        grid.rebuild(boids);

        for radius in [30.0_f32, 80.0, 700.0] {
            for center in boids.iter().step_by(25).chain(&boids[stragglers.clone()]) {
                let mut from_grid: Vec<usize> = grid
                    .query(center.position, radius)
                    .into_iter()
                    .filter(|&slot| boids[slot].position.distance(&center.position) <= radius)
                    .collect();
                from_grid.sort_unstable();

                let brute: Vec<usize> = boids
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| b.position.distance(&center.position) <= radius)
                    .map(|(slot, _)| slot)
                    .collect();

                assert_eq!(from_grid, brute, "subdivisions {}, radius {}", subdivisions, radius);
            }
        }
    }
}

#[test]
fn lone_boid_at_rest_launches_and_stays_inside() {
    let config = BoidConfig {
        subdivision_count: 4,
        ..BoidConfig::default()
    };
    let mut flock = Flock::with_seed(cube(100.0), config, 2).unwrap();
    let id = flock.spawn_flock_entity_at(Vector3D::new(50.0, 50.0, 50.0), Vector3D::zero());

    let stats = flock.step_without_pointer();
    assert_eq!(stats.flock_count, 1);

    let boid = flock.flock_entity(id).unwrap();
    assert!(flock.boundary().contains(boid.position));
    assert!(boid.speed() >= config.min_speed - EPSILON);

    for _ in 0..500 {
        flock.step_without_pointer();
        let boid = flock.flock_entity(id).unwrap();
        assert!(flock
            .boundary()
            .contains_with_margin(boid.position, config.containment_margin));
        assert!(boid.speed() >= config.min_speed - EPSILON);
    }
}

#[test]
fn obstacle_avoidance_outweighs_flocking() {
    let mut flock = Flock::with_seed(cube(100.0), BoidConfig::default(), 4).unwrap();
    let config = *flock.config();
    flock.spawn_obstacle_at(Vector3D::new(50.0, 50.0, 50.0), 10.0);
    let id = flock.spawn_flock_entity_at(Vector3D::new(35.0, 50.0, 50.0), Vector3D::new(2.0, 0.0, 0.0));
    // A tight pack just behind it so every flocking rule is active.
    flock.spawn_flock_entity_at(Vector3D::new(25.0, 50.0, 50.0), Vector3D::new(4.0, 0.0, 0.0));
    flock.spawn_flock_entity_at(Vector3D::new(30.0, 55.0, 50.0), Vector3D::new(4.0, 0.0, 0.0));

    flock.step_without_pointer();

    let boid = flock.flock_entity(id).unwrap();
    let strongest_flocking = config.flocking_weight() * config.max_force;
    assert!(
        -boid.acceleration.x > strongest_flocking,
        "acceleration {:?}",
        boid.acceleration
    );
}

#[test]
fn removing_unknown_entity_is_a_noop() {
    let mut flock = Flock::with_seed(cube(100.0), BoidConfig::default(), 6).unwrap();
    flock.add_flock_entities(3);
    flock.add_obstacles(1);

    assert!(!flock.remove_flock_entity(EntityId::new(999)));
    assert!(!flock.remove_obstacle(EntityId::new(999)));
    assert_eq!(flock.flock_entities().len(), 3);
    assert_eq!(flock.obstacles().len(), 1);

    let stats = flock.step_without_pointer();
    assert_eq!(stats.flock_count, 3);
}

#[test]
fn removed_boid_no_longer_steps() {
    let mut flock = Flock::with_seed(cube(100.0), BoidConfig::default(), 6).unwrap();
    let ids = flock.add_flock_entities(3);
    assert!(flock.remove_flock_entity(ids[1]));

    flock.step_without_pointer();
    assert!(flock.flock_entity(ids[1]).is_none());
    assert_eq!(flock.flock_entities().len(), 2);

    flock.clear();
    assert_eq!(flock.state(), FlockState::Idle);
    assert!(flock.obstacles().is_empty());
}

#[test]
fn pointer_draws_a_boid_in() {
    let boundary = Boundary::new(2000.0, 600.0, 2000.0).unwrap();
    let mut flock = Flock::with_seed(boundary, BoidConfig::default(), 12).unwrap();
    let target = boundary.center();
    let id = flock.spawn_flock_entity_at(target + Vector3D::new(300.0, 0.0, 0.0), Vector3D::zero());

    for _ in 0..150 {
        let stats = flock.step(640.0, 360.0);
        assert!(stats.pointer_active);
    }

    assert_eq!(flock.pointer_target(), Some(target));
    let boid = flock.flock_entity(id).unwrap();
    assert!(boid.position.distance(&target) < 150.0, "{:?}", boid.position);
}
