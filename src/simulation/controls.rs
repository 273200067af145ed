//! Human-input adapter.
//!
//! The window layer polls the keyboard once per tick into [`Controls`]; the episode
//! runner then drives the car with the same commands a policy would produce.

use ndarray::Array1;

use super::episode::Driver;
use super::vehicle::{Command, Steer, Throttle};

/// Discrete key state for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    /// Turn-left key held.
    pub left: bool,
    /// Turn-right key held.
    pub right: bool,
    /// Accelerate key held.
    pub accelerate: bool,
    /// Brake/reverse key held.
    pub brake: bool,
}

impl Controls {
    /// Translates the key state into a command. Opposing keys cancel out.
    pub fn to_command(&self) -> Command {
        let steer = match (self.left, self.right) {
            (true, false) => Steer::Left,
            (false, true) => Steer::Right,
            _ => Steer::Straight,
        };
        let throttle = match (self.accelerate, self.brake) {
            (true, false) => Throttle::Forward,
            (false, true) => Throttle::Backward,
            _ => Throttle::Coast,
        };
        Command { steer, throttle }
    }
}

impl Driver for Controls {
    fn command(&mut self, _readings: &Array1<f32>) -> Command {
        self.to_command()
    }
}
