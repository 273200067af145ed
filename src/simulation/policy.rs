//! Policy abstraction and built-in controllers.
//!
//! A policy turns the sensor readings of one tick into a steering scalar. The
//! episode runner thresholds that scalar into a discrete [`Steer`] decision.

use ndarray::Array1;

use super::vehicle::Steer;

/// Anything that can steer a car from its sensor readings.
///
/// Readings hold one value per sensor ray in `[0, 1]`, `1.0` meaning clear.
/// Outputs above the steering threshold turn right, outputs below its negation
/// turn left.
pub trait Policy {
    /// Returns the steering output for this tick's readings.
    fn activate(&mut self, readings: &Array1<f32>) -> f32;
}

impl<F> Policy for F
where
    F: FnMut(&Array1<f32>) -> f32,
{
    fn activate(&mut self, readings: &Array1<f32>) -> f32 {
        self(readings)
    }
}

/// Maps a policy output to a steering decision.
///
/// Non-finite outputs keep the car straight.
pub fn steer_from_output(output: f32, threshold: f32) -> Steer {
    if !output.is_finite() {
        Steer::Straight
    } else if output > threshold {
        Steer::Right
    } else if output < -threshold {
        Steer::Left
    } else {
        Steer::Straight
    }
}

/// Hand-written controller that steers toward the side with more clearance.
///
/// Rays with positive angles look left, rays with negative angles look right;
/// the straight-ahead ray is ignored.
#[derive(Debug, Clone)]
pub struct ScriptedPolicy {
    sides: Vec<f32>,
    gain: f32,
}

impl ScriptedPolicy {
    /// Creates a controller for a sensor fan with the given ray angles.
    pub fn new(angles: &[f32], gain: f32) -> Self {
        let sides = angles
            .iter()
            .map(|&a| if a == 0.0 { 0.0 } else { a.signum() })
            .collect();
        Self { sides, gain }
    }
}

impl Policy for ScriptedPolicy {
    fn activate(&mut self, readings: &Array1<f32>) -> f32 {
        let mut left = 0.0;
        let mut right = 0.0;
        for (&side, &reading) in self.sides.iter().zip(readings.iter()) {
            if side > 0.0 {
                left += reading;
            } else if side < 0.0 {
                right += reading;
            }
        }

        // Positive outputs turn right.
        (right - left) * self.gain
    }
}
