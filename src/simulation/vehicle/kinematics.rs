//! Car kinematics.
//!
//! Headings are in degrees and grow counter-clockwise on screen. At heading 0 the
//! sprite faces up, so driving forward decreases `y`.

use geo::Point;
use ndarray::Array1;

use super::super::collision::{self, Overlap};
use super::super::geometric_utils::project;
use super::super::mask::Mask;
use super::super::params::VehicleParams;
use super::sensors::SensorArray;

/// Steering decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Steer {
    /// Turn counter-clockwise.
    Left,
    /// Turn clockwise.
    Right,
    /// Keep the heading.
    #[default]
    Straight,
}

/// Throttle decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Throttle {
    /// Accelerate forward.
    Forward,
    /// Brake, then reverse.
    Backward,
    /// No input; friction slows the car.
    #[default]
    Coast,
}

/// Everything a driver decides in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Command {
    /// Steering input.
    pub steer: Steer,
    /// Throttle input.
    pub throttle: Throttle,
}

/// The car silhouette at its current heading, placed in world coordinates.
#[derive(Debug, Clone)]
pub struct Silhouette {
    /// Rotated sprite mask.
    pub mask: Mask,
    /// World position of the mask's top-left corner.
    pub position: Point<f32>,
}

/// A car on the track.
///
/// `pos` is the top-left corner of the unrotated sprite bounds; rotation happens
/// around the sprite centre.
#[derive(Debug, Clone)]
pub struct Vehicle {
    /// Top-left corner of the sprite bounds.
    pub pos: Point<f32>,
    /// Heading in degrees. Not wrapped.
    pub angle: f32,
    /// Signed speed along the heading, in pixels per tick.
    pub vel: f32,
    /// Forward speed limit. Reverse is limited to half of it.
    pub max_vel: f32,
    /// Velocity change per throttle tick.
    pub acceleration: f32,
    /// Heading change per steering tick.
    pub rotation_speed: f32,
    /// Optional sensor fan.
    pub sensors: Option<SensorArray>,
    start_pos: Point<f32>,
    sprite: Mask,
}

impl Vehicle {
    /// Creates a car at its start position with the given unrotated silhouette.
    pub fn new(params: &VehicleParams, sprite: Mask) -> Self {
        let start_pos = Point::new(params.start_position.0, params.start_position.1);
        Self {
            pos: start_pos,
            angle: 0.0,
            vel: 0.0,
            max_vel: params.max_velocity,
            acceleration: params.acceleration,
            rotation_speed: params.rotation_speed,
            sensors: None,
            start_pos,
            sprite,
        }
    }

    /// Attaches a sensor fan, replacing any previous one.
    pub fn with_sensors(mut self, sensors: SensorArray) -> Self {
        self.sensors = Some(sensors);
        self
    }

    /// Start position restored by [`Vehicle::reset`].
    pub fn start_pos(&self) -> Point<f32> {
        self.start_pos
    }

    /// Unrotated silhouette.
    pub fn sprite(&self) -> &Mask {
        &self.sprite
    }

    /// Centre of the sprite bounds.
    pub fn center(&self) -> Point<f32> {
        self.pos
            + Point::new(
                self.sprite.width() as f32 / 2.0,
                self.sprite.height() as f32 / 2.0,
            )
    }

    /// Point half a sprite height ahead of the centre, where sensors originate.
    pub fn front(&self) -> Point<f32> {
        project(
            self.center(),
            self.angle + 90.0,
            self.sprite.height() as f32 / 2.0,
        )
    }

    /// Turns by one rotation step.
    pub fn rotate(&mut self, steer: Steer) {
        match steer {
            Steer::Left => self.angle += self.rotation_speed,
            Steer::Right => self.angle -= self.rotation_speed,
            Steer::Straight => {}
        }
    }

    /// Accelerates toward the forward speed limit, then moves.
    pub fn move_forward(&mut self) {
        self.vel = (self.vel + self.acceleration).min(self.max_vel);
        self.advance();
    }

    /// Decelerates toward the reverse speed limit, then moves.
    pub fn move_backward(&mut self) {
        self.vel = (self.vel - self.acceleration).max(-self.max_vel / 2.0);
        self.advance();
    }

    /// Applies friction, then moves. Friction never pushes the velocity through zero.
    pub fn reduce_speed(&mut self) {
        let friction = self.acceleration / 2.0;
        self.vel = if self.vel > 0.0 {
            (self.vel - friction).max(0.0)
        } else {
            (self.vel + friction).min(0.0)
        };
        self.advance();
    }

    /// Reverses the velocity within the speed limits, then moves.
    pub fn bounce(&mut self) {
        self.vel = (-self.vel).clamp(-self.max_vel / 2.0, self.max_vel);
        self.advance();
    }

    /// Moves one tick along the current heading.
    pub fn advance(&mut self) {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        self.pos = Point::new(
            self.pos.x() - sin * self.vel,
            self.pos.y() - cos * self.vel,
        );
    }

    /// Applies one tick of driver input: steering first, then throttle and motion.
    pub fn apply(&mut self, command: Command) {
        self.rotate(command.steer);
        match command.throttle {
            Throttle::Forward => self.move_forward(),
            Throttle::Backward => self.move_backward(),
            Throttle::Coast => self.reduce_speed(),
        }
    }

    /// Returns to the start pose at rest.
    pub fn reset(&mut self) {
        self.pos = self.start_pos;
        self.angle = 0.0;
        self.vel = 0.0;
    }

    /// Rotates the sprite to the current heading, centred on the sprite centre.
    ///
    /// Computed fresh on every call since the shape depends on the heading.
    pub fn silhouette(&self) -> Silhouette {
        let mask = self.sprite.rotated(self.angle);
        let position = self.center()
            - Point::new(mask.width() as f32 / 2.0, mask.height() as f32 / 2.0);
        Silhouette { mask, position }
    }

    /// Tests the current silhouette against an obstacle mask placed at `origin`.
    pub fn collide(&self, obstacle: &Mask, origin: Point<f32>) -> Option<Overlap> {
        let silhouette = self.silhouette();
        collision::collide(&silhouette.mask, silhouette.position, obstacle, origin)
    }

    /// Re-measures the attached sensors against `obstacles`.
    ///
    /// Returns `None` when no sensors are attached.
    pub fn update_sensors(&mut self, obstacles: &[&Mask]) -> Option<&Array1<f32>> {
        let origin = self.front();
        let heading = self.angle;
        self.sensors
            .as_mut()
            .map(|sensors| sensors.update(origin, heading, obstacles))
    }
}
