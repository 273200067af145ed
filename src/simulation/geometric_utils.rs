//! Geometric utility functions for rays and polylines.
//!
//! Angles follow the screen convention used throughout the simulation: degrees,
//! counter-clockwise as seen on screen, with `y` growing downwards.

use geo::algorithm::Distance;
use geo::{Euclidean, Line, Point};

/// Unit direction for a screen-space angle in degrees.
///
/// 0° points right and 90° points up (negative `y`).
#[inline]
pub fn screen_direction(angle_degrees: f32) -> Point<f32> {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    Point::new(cos, -sin)
}

/// Point reached by travelling `length` from `origin` along `angle_degrees`.
#[inline]
pub fn project(origin: Point<f32>, angle_degrees: f32, length: f32) -> Point<f32> {
    origin + screen_direction(angle_degrees) * length
}

/// Segments of a polyline given as `(x, y)` pairs, closing the loop back to the
/// first point when `closed` is set.
pub fn polyline_segments(points: &[(f32, f32)], closed: bool) -> Vec<Line<f32>> {
    let mut segments: Vec<Line<f32>> = points
        .windows(2)
        .map(|pair| Line::new(pair[0], pair[1]))
        .collect();

    if closed && points.len() > 2 {
        segments.push(Line::new(points[points.len() - 1], points[0]));
    }

    segments
}

/// Minimum Euclidean distance from a point to any of the segments.
///
/// Returns `f32::INFINITY` for an empty segment list.
pub fn point_segments_distance(point: Point<f32>, segments: &[Line<f32>]) -> f32 {
    segments
        .iter()
        .map(|segment| Euclidean.distance(&point, segment))
        .fold(f32::INFINITY, f32::min)
}
