//! Track border and finish-line masks.

use geo::Point;
use rayon::prelude::*;

use super::geometric_utils::{point_segments_distance, polyline_segments};
use super::mask::Mask;
use super::params::TrackParams;

/// Static collision geometry of a track.
///
/// Built once and shared read-only by every episode.
#[derive(Debug, Clone)]
pub struct Track {
    /// Everything the car must not touch, positioned at the world origin.
    pub border: Mask,
    /// Finish-line region.
    pub finish: Mask,
    /// World position of the finish mask's top-left corner.
    pub finish_position: Point<f32>,
}

impl Track {
    /// Creates a track from prepared masks.
    pub fn new(border: Mask, finish: Mask, finish_position: Point<f32>) -> Self {
        Self {
            border,
            finish,
            finish_position,
        }
    }

    /// A track with no border and no finish line.
    pub fn open(width: usize, height: usize) -> Self {
        Self::new(Mask::new(width, height), Mask::new(0, 0), Point::new(0.0, 0.0))
    }

    /// Rasterizes a track around the configured closed centreline.
    ///
    /// Every pixel whose centre lies farther than `half_width` from the
    /// centreline is border. Rows are rasterized in parallel.
    pub fn from_centerline(params: &TrackParams) -> Self {
        let segments = polyline_segments(&params.centerline, true);

        let rows: Vec<Vec<bool>> = (0..params.height)
            .into_par_iter()
            .map(|y| {
                (0..params.width)
                    .map(|x| {
                        let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                        point_segments_distance(center, &segments) > params.half_width
                    })
                    .collect()
            })
            .collect();

        let border = Mask::from_fn(params.width, params.height, |x, y| rows[y][x]);
        let finish = Mask::filled(params.finish_size.0, params.finish_size.1);

        log::debug!(
            "rasterized {}x{} track from {} segments, {} border pixels",
            params.width,
            params.height,
            segments.len(),
            border.count()
        );

        Self::new(
            border,
            finish,
            Point::new(params.finish_position.0, params.finish_position.1),
        )
    }

    /// Width of the playable surface.
    pub fn width(&self) -> usize {
        self.border.width()
    }

    /// Height of the playable surface.
    pub fn height(&self) -> usize {
        self.border.height()
    }
}
