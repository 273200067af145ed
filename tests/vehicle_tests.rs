#![allow(missing_docs)]

use geo::Point;
use proptest::prelude::*;
use racer::simulation::mask::Mask;
use racer::simulation::params::{SensorParams, VehicleParams};
use racer::simulation::vehicle::{Command, SensorArray, Steer, Throttle, Vehicle};

fn create_vehicle() -> Vehicle {
    let params = VehicleParams::default();
    Vehicle::new(&params, Mask::filled(params.width, params.height))
}

#[test]
fn starts_at_rest_facing_up() {
    let vehicle = create_vehicle();
    assert_eq!(vehicle.pos, Point::new(180.0, 200.0));
    assert_eq!(vehicle.start_pos(), vehicle.pos);
    assert_eq!(vehicle.angle, 0.0);
    assert_eq!(vehicle.vel, 0.0);
    assert_eq!(vehicle.center(), Point::new(190.0, 219.0));

    let front = vehicle.front();
    assert!((front.x() - 190.0).abs() < 1e-3);
    assert!((front.y() - 200.0).abs() < 1e-3);
}

#[test]
fn forward_speed_is_clamped() {
    let mut vehicle = create_vehicle();
    for _ in 0..20 {
        let previous = vehicle.vel;
        vehicle.move_forward();
        assert_eq!(vehicle.vel, (previous + 0.8).min(8.0));
    }
    assert_eq!(vehicle.vel, 8.0);
    assert_eq!(vehicle.pos.x(), 180.0);
    assert!(vehicle.pos.y() < 200.0);
}

#[test]
fn reverse_speed_is_half_the_limit() {
    let mut vehicle = create_vehicle();
    for _ in 0..20 {
        vehicle.move_backward();
    }
    assert_eq!(vehicle.vel, -4.0);
    assert!(vehicle.pos.y() > 200.0);
}

#[test]
fn friction_stops_the_car_without_reversing() {
    let mut vehicle = create_vehicle();
    vehicle.vel = 5.0;

    let mut previous = vehicle.vel;
    for _ in 0..20 {
        vehicle.reduce_speed();
        assert!(vehicle.vel >= 0.0);
        assert!(vehicle.vel <= previous);
        previous = vehicle.vel;
    }
    assert_eq!(vehicle.vel, 0.0);

    vehicle.vel = -3.0;
    for _ in 0..20 {
        vehicle.reduce_speed();
        assert!(vehicle.vel <= 0.0);
    }
    assert_eq!(vehicle.vel, 0.0);
}

#[test]
fn coasting_at_rest_stays_put() {
    let mut vehicle = create_vehicle();
    for _ in 0..10 {
        vehicle.apply(Command::default());
    }
    assert_eq!(vehicle.vel, 0.0);
    assert_eq!(vehicle.pos, vehicle.start_pos());
}

#[test]
fn steering_rotates_by_rotation_speed() {
    let mut vehicle = create_vehicle();
    vehicle.rotate(Steer::Left);
    assert_eq!(vehicle.angle, 4.0);
    vehicle.rotate(Steer::Right);
    vehicle.rotate(Steer::Right);
    assert_eq!(vehicle.angle, -4.0);
    vehicle.rotate(Steer::Straight);
    assert_eq!(vehicle.angle, -4.0);
}

#[test]
fn heading_left_drives_left() {
    let mut vehicle = create_vehicle();
    vehicle.angle = 90.0;
    vehicle.move_forward();
    assert!((vehicle.pos.x() - (180.0 - 0.8)).abs() < 1e-4);
    assert!((vehicle.pos.y() - 200.0).abs() < 1e-4);
}

#[test]
fn apply_steers_before_moving() {
    let mut vehicle = create_vehicle();
    vehicle.apply(Command {
        steer: Steer::Left,
        throttle: Throttle::Forward,
    });
    assert_eq!(vehicle.angle, 4.0);
    // Already turned left, so the first step drifts left.
    assert!(vehicle.pos.x() < 180.0);
}

#[test]
fn bounce_reverses_and_moves() {
    let mut vehicle = create_vehicle();
    vehicle.vel = -3.0;
    vehicle.bounce();
    assert_eq!(vehicle.vel, 3.0);
    assert_eq!(vehicle.pos, Point::new(180.0, 197.0));
}

#[test]
fn bounce_respects_reverse_limit() {
    let mut vehicle = create_vehicle();
    vehicle.vel = 8.0;
    vehicle.bounce();
    assert_eq!(vehicle.vel, -4.0);
    assert_eq!(vehicle.pos, Point::new(180.0, 204.0));
}

#[test]
fn reset_is_idempotent() {
    let mut vehicle = create_vehicle();
    for _ in 0..15 {
        vehicle.apply(Command {
            steer: Steer::Left,
            throttle: Throttle::Forward,
        });
    }
    vehicle.reset();
    let once = (vehicle.pos, vehicle.angle, vehicle.vel);
    vehicle.reset();
    assert_eq!((vehicle.pos, vehicle.angle, vehicle.vel), once);
    assert_eq!(once, (Point::new(180.0, 200.0), 0.0, 0.0));
}

#[test]
fn silhouette_rotates_about_the_center() {
    let mut vehicle = create_vehicle();
    let upright = vehicle.silhouette();
    assert_eq!(upright.position, vehicle.pos);
    assert_eq!((upright.mask.width(), upright.mask.height()), (20, 38));

    vehicle.angle = 90.0;
    let sideways = vehicle.silhouette();
    assert_eq!((sideways.mask.width(), sideways.mask.height()), (38, 20));
    assert_eq!(sideways.position, Point::new(171.0, 209.0));
}

#[test]
fn collides_with_border_under_the_car() {
    let vehicle = create_vehicle();
    let mut border = Mask::new(400, 400);
    assert!(vehicle.collide(&border, Point::new(0.0, 0.0)).is_none());

    border.set(199, 237, true);
    assert!(vehicle.collide(&border, Point::new(0.0, 0.0)).is_some());
}

#[test]
fn sensors_are_optional() {
    let border = Mask::new(400, 400);
    let mut vehicle = create_vehicle();
    assert!(vehicle.update_sensors(&[&border]).is_none());

    let mut vehicle = vehicle.with_sensors(SensorArray::new(&SensorParams::default()));
    let readings = vehicle.update_sensors(&[&border]).unwrap();
    assert_eq!(readings.len(), 5);
    assert!(readings.iter().all(|&r| r == 1.0));
}

proptest! {
    #[test]
    fn empty_border_never_collides(
        x in -100.0f32..900.0,
        y in -100.0f32..900.0,
        angle in -720.0f32..720.0,
    ) {
        let mut vehicle = create_vehicle();
        vehicle.pos = Point::new(x, y);
        vehicle.angle = angle;
        prop_assert!(vehicle.collide(&Mask::new(810, 810), Point::new(0.0, 0.0)).is_none());
    }
}
