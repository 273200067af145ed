#![allow(missing_docs)]

use std::cell::Cell;
use std::sync::atomic::AtomicBool;

use geo::Point;
use ndarray::Array1;
use racer::simulation::controls::Controls;
use racer::simulation::episode::{
    Episode, EpisodeStatus, Mode, NeverStop, PolicyDriver, StopSignal, run_episode,
    run_episode_until,
};
use racer::simulation::mask::Mask;
use racer::simulation::params::WorldConfig;
use racer::simulation::track::Track;
use racer::simulation::world::World;

fn create_world(track: Track, max_ticks: Option<u64>) -> World {
    let mut config = WorldConfig::default();
    config.episode.max_ticks = max_ticks;
    World::with_track(config, track).unwrap()
}

/// No border; a 94x19 finish line at `finish_position`.
fn finish_only_track(finish_position: (f32, f32)) -> Track {
    Track::new(
        Mask::new(810, 810),
        Mask::filled(94, 19),
        Point::new(finish_position.0, finish_position.1),
    )
}

fn walled_track() -> Track {
    Track::new(
        Mask::filled(810, 810),
        Mask::new(0, 0),
        Point::new(0.0, 0.0),
    )
}

fn straight(_: &Array1<f32>) -> f32 {
    0.0
}

/// Fires after `ticks` checks.
struct StopAfter {
    remaining: Cell<u32>,
}

impl StopSignal for StopAfter {
    fn stop_requested(&self) -> bool {
        let remaining = self.remaining.get();
        if remaining == 0 {
            return true;
        }
        self.remaining.set(remaining - 1);
        false
    }
}

#[test]
fn open_track_scores_one_point_per_tick() {
    let world = create_world(Track::open(810, 810), Some(50));
    let outcome = run_episode_until(&world, world.spawn_vehicle(), &mut straight, &NeverStop);

    assert_eq!(outcome.status, EpisodeStatus::Exhausted);
    assert_eq!(outcome.ticks, 50);
    assert_eq!(outcome.fitness, 50);
    assert_eq!(outcome.laps, 0);
}

#[test]
fn touching_the_border_at_the_start_scores_minus_one() {
    let world = create_world(walled_track(), Some(50));
    assert_eq!(run_episode(&world, world.spawn_vehicle(), &mut straight), -1);

    let outcome = run_episode_until(&world, world.spawn_vehicle(), &mut straight, &NeverStop);
    assert_eq!(outcome.status, EpisodeStatus::Collided);
    assert_eq!(outcome.ticks, 1);
}

#[test]
fn collision_resets_the_car() {
    let world = create_world(walled_track(), None);
    let mut episode = Episode::new(&world, world.spawn_vehicle(), Mode::Scored);
    let mut policy = straight;
    let mut driver = PolicyDriver::new(&mut policy, 0.5);

    assert_eq!(episode.step(&mut driver), EpisodeStatus::Collided);
    assert_eq!(episode.vehicle().pos, episode.vehicle().start_pos());
    assert_eq!(episode.vehicle().vel, 0.0);
}

#[test]
fn forward_finish_crossing_awards_the_bonus() {
    let world = create_world(finish_only_track((170.0, 150.0)), Some(1000));
    let outcome = run_episode_until(&world, world.spawn_vehicle(), &mut straight, &NeverStop);

    assert_eq!(outcome.status, EpisodeStatus::Finished);
    assert_eq!(outcome.laps, 1);
    assert_eq!(outcome.fitness, outcome.ticks as i64 + 1000);
}

#[test]
fn backward_finish_crossing_ends_as_collision() {
    let world = create_world(finish_only_track((170.0, 250.0)), Some(1000));
    let mut episode = Episode::new(&world, world.spawn_vehicle(), Mode::Scored);
    let mut reverse = Controls {
        brake: true,
        ..Controls::default()
    };

    let outcome = episode.run(&mut reverse, &NeverStop);
    assert_eq!(outcome.status, EpisodeStatus::Collided);
    assert_eq!(outcome.laps, 0);
    assert_eq!(outcome.fitness, outcome.ticks as i64 - 1);
}

#[test]
fn terminal_episodes_ignore_further_steps() {
    let world = create_world(Track::open(810, 810), Some(3));
    let mut episode = Episode::new(&world, world.spawn_vehicle(), Mode::Scored);
    let mut coast = Controls::default();

    let outcome = episode.run(&mut coast, &NeverStop);
    assert_eq!(outcome.status, EpisodeStatus::Exhausted);

    assert_eq!(episode.step(&mut coast), EpisodeStatus::Exhausted);
    assert_eq!(episode.ticks(), 3);
    assert_eq!(episode.fitness(), 3);
}

#[test]
fn stop_signal_abandons_with_current_fitness() {
    let world = create_world(Track::open(810, 810), None);

    let stopped = AtomicBool::new(true);
    let outcome = run_episode_until(&world, world.spawn_vehicle(), &mut straight, &stopped);
    assert_eq!(outcome.status, EpisodeStatus::Abandoned);
    assert_eq!(outcome.ticks, 0);
    assert_eq!(outcome.fitness, 0);

    let stop = StopAfter {
        remaining: Cell::new(25),
    };
    let outcome = run_episode_until(&world, world.spawn_vehicle(), &mut straight, &stop);
    assert_eq!(outcome.status, EpisodeStatus::Abandoned);
    assert_eq!(outcome.ticks, 25);
    assert_eq!(outcome.fitness, 25);
}

#[test]
fn abandon_only_affects_running_episodes() {
    let world = create_world(walled_track(), None);
    let mut episode = Episode::new(&world, world.spawn_vehicle(), Mode::Scored);
    let mut coast = Controls::default();

    episode.step(&mut coast);
    episode.abandon();
    assert_eq!(episode.status(), EpisodeStatus::Collided);
}

#[test]
fn policy_output_steers_the_car() {
    let world = create_world(Track::open(810, 810), None);
    let mut episode = Episode::new(&world, world.spawn_vehicle(), Mode::Scored);

    let mut right = |_: &Array1<f32>| 1.0;
    episode.step(&mut PolicyDriver::new(&mut right, 0.5));
    assert_eq!(episode.vehicle().angle, -4.0);

    let mut weak = |_: &Array1<f32>| 0.3;
    episode.step(&mut PolicyDriver::new(&mut weak, 0.5));
    assert_eq!(episode.vehicle().angle, -4.0);

    let mut broken = |_: &Array1<f32>| f32::NAN;
    episode.step(&mut PolicyDriver::new(&mut broken, 0.5));
    assert_eq!(episode.vehicle().angle, -4.0);

    // The throttle is always open.
    assert!(episode.vehicle().vel > 2.0);
}

#[test]
fn policy_sees_one_reading_per_ray() {
    let world = create_world(Track::open(810, 810), Some(5));
    let mut seen = Vec::new();
    let mut recorder = |readings: &Array1<f32>| {
        seen.push(readings.len());
        0.0
    };
    run_episode(&world, world.spawn_vehicle(), &mut recorder);

    assert_eq!(seen, vec![5; 5]);
}

#[test]
fn interactive_crash_resets_without_ending() {
    let world = create_world(walled_track(), Some(1));
    let mut episode = Episode::new(&world, world.spawn_vehicle(), Mode::Interactive);
    let mut gas = Controls {
        accelerate: true,
        ..Controls::default()
    };

    for _ in 0..3 {
        assert_eq!(episode.step(&mut gas), EpisodeStatus::Running);
    }
    assert_eq!(episode.crashes(), 3);
    assert_eq!(episode.fitness(), 0);
    assert_eq!(episode.vehicle().pos, episode.vehicle().start_pos());
}

#[test]
fn interactive_lap_resets_the_car() {
    let world = create_world(finish_only_track((170.0, 150.0)), None);
    let mut episode = Episode::new(&world, world.spawn_vehicle(), Mode::Interactive);
    let mut gas = Controls {
        accelerate: true,
        ..Controls::default()
    };

    for _ in 0..200 {
        episode.step(&mut gas);
        if episode.laps() > 0 {
            break;
        }
    }

    assert_eq!(episode.laps(), 1);
    assert_eq!(episode.status(), EpisodeStatus::Running);
    assert_eq!(episode.vehicle().pos, episode.vehicle().start_pos());
    assert_eq!(episode.vehicle().vel, 0.0);
}

#[test]
fn interactive_wrong_way_bounces() {
    let world = create_world(finish_only_track((170.0, 250.0)), None);
    let mut episode = Episode::new(&world, world.spawn_vehicle(), Mode::Interactive);
    let mut reverse = Controls {
        brake: true,
        ..Controls::default()
    };

    let mut bounced = false;
    for _ in 0..200 {
        episode.step(&mut reverse);
        if episode.vehicle().vel > 0.0 {
            bounced = true;
            break;
        }
    }

    assert!(bounced);
    assert_eq!(episode.laps(), 0);
    assert_eq!(episode.status(), EpisodeStatus::Running);
}

#[test]
fn car_starts_on_the_default_track() {
    let world = World::new(WorldConfig::default()).unwrap();
    let vehicle = world.spawn_vehicle();

    assert!(vehicle.collide(&world.track.border, Point::new(0.0, 0.0)).is_none());
    assert!(
        vehicle
            .collide(&world.track.finish, world.track.finish_position)
            .is_none()
    );
    assert!(world.track.border.count() > 0);
}
