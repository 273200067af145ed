//! Fixed-timestep episode runner and fitness accounting.
//!
//! Every tick the runner measures the sensors against the track border, asks the
//! driver for a command, moves the car and checks the border and the finish line.
//! The same step serves human play ([`Mode::Interactive`]) and policy evaluation
//! ([`Mode::Scored`]); only the handling of collisions differs.

use std::sync::atomic::{AtomicBool, Ordering};

use geo::Point;
use ndarray::Array1;

use super::collision::{self, FinishCrossing};
use super::policy::{Policy, steer_from_output};
use super::vehicle::{Command, SensorArray, Throttle, Vehicle};
use super::world::World;

/// How collisions are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Collisions end the episode and every surviving tick scores a point.
    Scored,
    /// Collisions reset the car and play continues; nothing is scored.
    Interactive,
}

/// Lifecycle of an episode. Every state but `Running` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeStatus {
    /// Still ticking.
    Running,
    /// Touched the border, or crossed the finish line the wrong way.
    Collided,
    /// Crossed the finish line in the forward direction.
    Finished,
    /// Stopped from outside.
    Abandoned,
    /// Ran out of its tick budget.
    Exhausted,
}

impl EpisodeStatus {
    /// Returns `true` for every state but `Running`.
    pub fn is_terminal(self) -> bool {
        self != EpisodeStatus::Running
    }
}

/// Source of per-tick commands.
pub trait Driver {
    /// Decides this tick's command from the freshly measured sensor readings.
    fn command(&mut self, readings: &Array1<f32>) -> Command;
}

/// Drives with a [`Policy`]: thresholded steering and the throttle always open.
pub struct PolicyDriver<'p, P: ?Sized> {
    policy: &'p mut P,
    threshold: f32,
}

impl<'p, P: Policy + ?Sized> PolicyDriver<'p, P> {
    /// Wraps a borrowed policy.
    pub fn new(policy: &'p mut P, threshold: f32) -> Self {
        Self { policy, threshold }
    }
}

impl<P: Policy + ?Sized> Driver for PolicyDriver<'_, P> {
    fn command(&mut self, readings: &Array1<f32>) -> Command {
        let output = self.policy.activate(readings);
        Command {
            steer: steer_from_output(output, self.threshold),
            throttle: Throttle::Forward,
        }
    }
}

/// External request to abandon running episodes, checked once per tick.
pub trait StopSignal {
    /// Returns `true` once the episode should stop.
    fn stop_requested(&self) -> bool;
}

impl StopSignal for AtomicBool {
    fn stop_requested(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// A stop signal that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverStop;

impl StopSignal for NeverStop {
    fn stop_requested(&self) -> bool {
        false
    }
}

/// What remains of an episode once it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeOutcome {
    /// Accumulated fitness.
    pub fitness: i64,
    /// Final status.
    pub status: EpisodeStatus,
    /// Ticks simulated.
    pub ticks: u64,
    /// Forward finish-line crossings.
    pub laps: u32,
}

/// One run of a car on the world's track.
pub struct Episode<'w> {
    world: &'w World,
    vehicle: Vehicle,
    mode: Mode,
    fitness: i64,
    status: EpisodeStatus,
    ticks: u64,
    laps: u32,
    crashes: u32,
}

impl<'w> Episode<'w> {
    /// Starts an episode. A car without sensors gets the configured sensor fan.
    pub fn new(world: &'w World, mut vehicle: Vehicle, mode: Mode) -> Self {
        if vehicle.sensors.is_none() {
            vehicle.sensors = Some(SensorArray::new(&world.config.sensors));
        }

        Self {
            world,
            vehicle,
            mode,
            fitness: 0,
            status: EpisodeStatus::Running,
            ticks: 0,
            laps: 0,
            crashes: 0,
        }
    }

    /// The car being driven.
    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    /// Collision handling mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Fitness accumulated so far.
    pub fn fitness(&self) -> i64 {
        self.fitness
    }

    /// Current status.
    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    /// Ticks simulated so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Forward finish-line crossings so far.
    pub fn laps(&self) -> u32 {
        self.laps
    }

    /// Border collisions recovered from in interactive mode.
    pub fn crashes(&self) -> u32 {
        self.crashes
    }

    /// Summary of the episode so far.
    pub fn outcome(&self) -> EpisodeOutcome {
        EpisodeOutcome {
            fitness: self.fitness,
            status: self.status,
            ticks: self.ticks,
            laps: self.laps,
        }
    }

    /// Stops a running episode, keeping the fitness accumulated so far.
    pub fn abandon(&mut self) {
        if self.status == EpisodeStatus::Running {
            self.status = EpisodeStatus::Abandoned;
            log::debug!(
                "episode abandoned after {} ticks with fitness {}",
                self.ticks,
                self.fitness
            );
        }
    }

    /// Advances the episode by one tick. Terminal episodes are left untouched.
    pub fn step<D: Driver + ?Sized>(&mut self, driver: &mut D) -> EpisodeStatus {
        if self.status.is_terminal() {
            return self.status;
        }

        let world = self.world;
        let command = match self.vehicle.update_sensors(&[&world.track.border]) {
            Some(readings) => driver.command(readings),
            None => driver.command(&Array1::zeros(0)),
        };

        self.vehicle.apply(command);
        self.ticks += 1;
        log::trace!(
            "tick {}: {:?} -> pos ({:.1}, {:.1}) angle {:.1} vel {:.2}",
            self.ticks,
            command,
            self.vehicle.pos.x(),
            self.vehicle.pos.y(),
            self.vehicle.angle,
            self.vehicle.vel
        );

        match self.mode {
            Mode::Scored => self.score_tick(),
            Mode::Interactive => self.recover_tick(),
        }

        if self.mode == Mode::Scored && self.status == EpisodeStatus::Running {
            if let Some(max_ticks) = world.config.episode.max_ticks {
                if self.ticks >= max_ticks {
                    self.status = EpisodeStatus::Exhausted;
                }
            }
        }

        if self.status.is_terminal() {
            log::debug!(
                "episode ended after {} ticks: {:?}, fitness {}",
                self.ticks,
                self.status,
                self.fitness
            );
        }

        self.status
    }

    /// Runs until a terminal state, checking `stop` before every tick.
    pub fn run<D, S>(&mut self, driver: &mut D, stop: &S) -> EpisodeOutcome
    where
        D: Driver + ?Sized,
        S: StopSignal + ?Sized,
    {
        while !self.status.is_terminal() {
            if stop.stop_requested() {
                self.abandon();
                break;
            }
            self.step(driver);
        }
        self.outcome()
    }

    fn score_tick(&mut self) {
        let track = &self.world.track;
        let silhouette = self.vehicle.silhouette();

        let hit_border = collision::collide(
            &silhouette.mask,
            silhouette.position,
            &track.border,
            Point::new(0.0, 0.0),
        );
        if hit_border.is_some() {
            self.fitness -= 1;
            self.status = EpisodeStatus::Collided;
            self.vehicle.reset();
            return;
        }

        self.fitness += 1;

        let finish = collision::collide(
            &silhouette.mask,
            silhouette.position,
            &track.finish,
            track.finish_position,
        );
        if let Some(overlap) = finish {
            match overlap.finish_crossing() {
                FinishCrossing::Forward => {
                    self.laps += 1;
                    self.fitness += self.world.config.episode.finish_bonus;
                    self.status = EpisodeStatus::Finished;
                }
                FinishCrossing::Backward => {
                    self.fitness -= 1;
                    self.status = EpisodeStatus::Collided;
                    self.vehicle.reset();
                }
            }
        }
    }

    fn recover_tick(&mut self) {
        let track = &self.world.track;

        if self
            .vehicle
            .collide(&track.border, Point::new(0.0, 0.0))
            .is_some()
        {
            self.crashes += 1;
            log::debug!("crash #{} after {} ticks", self.crashes, self.ticks);
            self.vehicle.reset();
            return;
        }

        if let Some(overlap) = self.vehicle.collide(&track.finish, track.finish_position) {
            match overlap.finish_crossing() {
                FinishCrossing::Forward => {
                    self.laps += 1;
                    log::info!("lap {} completed after {} ticks", self.laps, self.ticks);
                    self.vehicle.reset();
                }
                FinishCrossing::Backward => self.vehicle.bounce(),
            }
        }
    }
}

/// Runs one scored episode to completion and returns its fitness.
pub fn run_episode<P: Policy + ?Sized>(world: &World, vehicle: Vehicle, policy: &mut P) -> i64 {
    run_episode_until(world, vehicle, policy, &NeverStop).fitness
}

/// Runs one scored episode until it ends or `stop` fires.
pub fn run_episode_until<P, S>(
    world: &World,
    vehicle: Vehicle,
    policy: &mut P,
    stop: &S,
) -> EpisodeOutcome
where
    P: Policy + ?Sized,
    S: StopSignal + ?Sized,
{
    let threshold = world.config.episode.steer_threshold;
    let mut driver = PolicyDriver::new(policy, threshold);
    Episode::new(world, vehicle, Mode::Scored).run(&mut driver, stop)
}
