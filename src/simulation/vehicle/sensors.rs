//! Ray-cast distance sensors.
//!
//! Rays are marched one pixel-sized step at a time from the car's front point;
//! the first set pixel of any obstacle mask ends the ray.

use geo::Point;
use ndarray::Array1;

use super::super::geometric_utils::project;
use super::super::mask::Mask;
use super::super::params::SensorParams;

/// One sensor ray as measured on the last update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Front point of the car.
    pub origin: Point<f32>,
    /// Hit point, or the unobstructed endpoint when nothing was hit.
    pub end: Point<f32>,
    /// Whether the ray stopped on an obstacle.
    pub hit: bool,
}

/// Fan of distance sensors.
///
/// For each configured angle the array keeps the last measured ray and a reading
/// in `[0, 1]`: the hit distance divided by the ray length, `1.0` meaning clear.
#[derive(Debug, Clone)]
pub struct SensorArray {
    angles: Vec<f32>,
    length: f32,
    rays: Vec<Ray>,
    readings: Array1<f32>,
}

impl SensorArray {
    /// Creates a sensor fan with every reading clear.
    pub fn new(params: &SensorParams) -> Self {
        let count = params.angles.len();
        Self {
            angles: params.angles.clone(),
            length: params.length,
            rays: Vec::with_capacity(count),
            readings: Array1::ones(count),
        }
    }

    /// Number of rays, which is also the length of the reading vector.
    pub fn ray_count(&self) -> usize {
        self.angles.len()
    }

    /// Maximum ray length.
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Ray angles relative to the car heading.
    pub fn angles(&self) -> &[f32] {
        &self.angles
    }

    /// Rays measured on the last update.
    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }

    /// Normalized readings from the last update.
    pub fn readings(&self) -> &Array1<f32> {
        &self.readings
    }

    /// Re-measures every ray from `origin` for a car facing `heading` degrees.
    ///
    /// The nearest hit across all `obstacles` wins. Hits at or beyond the ray
    /// length count as clear.
    pub fn update(&mut self, origin: Point<f32>, heading: f32, obstacles: &[&Mask]) -> &Array1<f32> {
        self.rays.clear();

        for (i, &offset) in self.angles.iter().enumerate() {
            // Sprites face up at heading 0, screen angles face right.
            let end = project(origin, heading + offset + 90.0, self.length);

            let mut closest_distance = self.length;
            let mut closest_point = end;
            let mut hit = false;

            for obstacle in obstacles {
                if let Some((point, distance)) = march(origin, end, self.length, obstacle) {
                    if distance < closest_distance {
                        closest_distance = distance;
                        closest_point = point;
                        hit = true;
                    }
                }
            }

            self.rays.push(Ray {
                origin,
                end: closest_point,
                hit,
            });
            self.readings[i] = closest_distance / self.length;
        }

        &self.readings
    }
}

/// Marches from `start` toward `end` in `length` equal steps and returns the first
/// set pixel of `mask` with its distance from `start`.
///
/// Sample coordinates are truncated toward zero. Samples outside the mask never hit.
pub fn march(start: Point<f32>, end: Point<f32>, length: f32, mask: &Mask) -> Option<(Point<f32>, f32)> {
    let delta = end - start;
    let steps = length as usize;

    for i in 0..steps {
        let u = i as f32 / length;
        let x = (start.x() + u * delta.x()) as i32;
        let y = (start.y() + u * delta.y()) as i32;

        if mask.get(x, y) {
            let point = Point::new(x as f32, y as f32);
            let offset = point - start;
            return Some((point, offset.x().hypot(offset.y())));
        }
    }

    None
}
