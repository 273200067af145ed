#![allow(missing_docs)]

use geo::Point;
use proptest::prelude::*;
use racer::simulation::mask::Mask;
use racer::simulation::params::SensorParams;
use racer::simulation::vehicle::{SensorArray, march};

fn single_ray(length: f32) -> SensorArray {
    SensorArray::new(&SensorParams {
        angles: vec![0.0],
        length,
    })
}

/// Solid band covering rows `0..=100` across the whole width.
fn wall_above() -> Mask {
    let mut mask = Mask::new(400, 400);
    mask.fill_rect(0, 0, 400, 101);
    mask
}

#[test]
fn readings_start_clear() {
    let sensors = SensorArray::new(&SensorParams::default());
    assert_eq!(sensors.ray_count(), 5);
    assert!(sensors.readings().iter().all(|&r| r == 1.0));
    assert!(sensors.rays().is_empty());
}

#[test]
fn straight_ray_measures_distance_to_wall() {
    let mut sensors = single_ray(150.0);
    let readings = sensors.update(Point::new(100.5, 200.5), 0.0, &[&wall_above()]);

    assert!((readings[0] - 100.5 / 150.0).abs() < 0.01, "{}", readings[0]);
    let ray = sensors.rays()[0];
    assert!(ray.hit);
    assert_eq!(ray.end.y(), 100.0);
}

#[test]
fn wall_out_of_range_reads_clear() {
    let mut sensors = single_ray(50.0);
    let readings = sensors.update(Point::new(100.5, 200.5), 0.0, &[&wall_above()]);

    assert_eq!(readings[0], 1.0);
    let ray = sensors.rays()[0];
    assert!(!ray.hit);
    assert!((ray.end.y() - 150.5).abs() < 1e-3);
}

#[test]
fn diagonal_rays_see_farther_than_straight_one() {
    let mut sensors = SensorArray::new(&SensorParams::default());
    let readings = sensors
        .update(Point::new(200.5, 200.5), 0.0, &[&wall_above()])
        .clone();

    assert_eq!(readings.len(), 5);
    assert!(readings[2] < readings[1]);
    assert!(readings[2] < readings[3]);
    assert!((readings[0] - readings[4]).abs() < 0.02);
}

#[test]
fn heading_turns_the_fan() {
    // Facing left (heading 90), the wall above is beside the car.
    let mut sensors = single_ray(150.0);
    let readings = sensors.update(Point::new(300.5, 200.5), 90.0, &[&wall_above()]);
    assert_eq!(readings[0], 1.0);
    assert!(sensors.rays()[0].end.x() < 160.0);
}

#[test]
fn nearest_obstacle_wins() {
    let far = wall_above();
    let mut near = Mask::new(400, 400);
    near.fill_rect(0, 150, 400, 1);

    let mut sensors = single_ray(150.0);
    let readings = sensors.update(Point::new(100.5, 200.5), 0.0, &[&far, &near]);
    assert!((readings[0] - 50.5 / 150.0).abs() < 0.01);
}

#[test]
fn samples_outside_the_mask_never_hit() {
    let mask = Mask::filled(10, 10);
    assert!(march(Point::new(20.0, 20.0), Point::new(200.0, 20.0), 180.0, &mask).is_none());
    assert!(march(Point::new(-5.0, 5.0), Point::new(-150.0, 5.0), 145.0, &mask).is_none());
}

#[test]
fn march_stops_at_first_set_pixel() {
    let mut mask = Mask::new(100, 10);
    mask.set(40, 5, true);
    mask.set(60, 5, true);

    let (point, distance) =
        march(Point::new(0.0, 5.0), Point::new(100.0, 5.0), 100.0, &mask).unwrap();
    assert_eq!(point, Point::new(40.0, 5.0));
    assert_eq!(distance, 40.0);
}

proptest! {
    #[test]
    fn readings_stay_normalized(
        x in -50.0f32..450.0,
        y in -50.0f32..450.0,
        heading in -720.0f32..720.0,
        seed in any::<u64>(),
    ) {
        let mask = Mask::from_fn(400, 400, |px, py| {
            (px as u64 * 31 + py as u64 * 17 + seed) % 97 == 0
        });
        let mut sensors = SensorArray::new(&SensorParams::default());
        let readings = sensors.update(Point::new(x, y), heading, &[&mask]);

        prop_assert_eq!(readings.len(), 5);
        for &r in readings {
            prop_assert!((0.0..=1.0).contains(&r));
        }
        prop_assert_eq!(sensors.rays().len(), 5);
    }
}
