//! Car state, kinematics and the sensor fan attached to it.

mod kinematics;
mod sensors;

pub use kinematics::*;

pub use sensors::{Ray, SensorArray, march};
