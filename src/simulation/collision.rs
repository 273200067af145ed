//! Pixel-exact collision between a car silhouette and track masks.

use geo::Point;

use super::mask::Mask;

/// A pixel where a silhouette overlaps an obstacle, in obstacle-mask coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    /// Column in the obstacle mask.
    pub x: i32,
    /// Row in the obstacle mask.
    pub y: i32,
}

/// Direction in which a silhouette entered the finish-line mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishCrossing {
    /// Entered through the bottom edge, i.e. completing a lap.
    Forward,
    /// Entered through the top edge, i.e. driving the wrong way.
    Backward,
}

impl Overlap {
    /// Classifies a finish-line overlap by the row it was first detected on.
    ///
    /// A silhouette coming down from above touches row 0 first.
    pub fn finish_crossing(&self) -> FinishCrossing {
        if self.y == 0 {
            FinishCrossing::Backward
        } else {
            FinishCrossing::Forward
        }
    }
}

/// Integer pixel offset of `position` relative to `origin`, truncated toward zero.
#[inline]
pub fn pixel_offset(position: Point<f32>, origin: Point<f32>) -> (i32, i32) {
    (
        (position.x() - origin.x()) as i32,
        (position.y() - origin.y()) as i32,
    )
}

/// Tests whether `silhouette`, with its top-left corner at `position`, overlaps
/// `obstacle` whose top-left corner is at `origin`.
///
/// Both positions are world coordinates.
pub fn collide(
    silhouette: &Mask,
    position: Point<f32>,
    obstacle: &Mask,
    origin: Point<f32>,
) -> Option<Overlap> {
    obstacle
        .overlap(silhouette, pixel_offset(position, origin))
        .map(|(x, y)| Overlap { x, y })
}
