//! Packed per-pixel opacity masks.
//!
//! A mask is the collision shape of an image: one bit per pixel, set where the
//! pixel is opaque. Rows are stored as 64-bit words so overlap queries can test
//! a whole word of pixels at a time.

use anyhow::ensure;

const WORD_BITS: usize = 64;

/// Default alpha threshold; pixels with alpha strictly above it are opaque.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 127;

/// A `width × height` bitmask in row-major order.
///
/// Bits past `width` in the last word of a row are always clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl Mask {
    /// Creates an empty mask.
    pub fn new(width: usize, height: usize) -> Self {
        let words_per_row = width.div_ceil(WORD_BITS);
        Self {
            width,
            height,
            words_per_row,
            bits: vec![0; words_per_row * height],
        }
    }

    /// Creates a mask with every pixel set.
    pub fn filled(width: usize, height: usize) -> Self {
        let mut mask = Self::new(width, height);
        mask.fill_rect(0, 0, width, height);
        mask
    }

    /// Creates a mask by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if f(x, y) {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    /// Builds a mask from RGBA8 pixels; a pixel is set when its alpha exceeds `threshold`.
    pub fn from_rgba(width: usize, height: usize, rgba: &[u8], threshold: u8) -> anyhow::Result<Self> {
        ensure!(
            rgba.len() == width * height * 4,
            "expected {} bytes for a {}x{} RGBA image, got {}",
            width * height * 4,
            width,
            height,
            rgba.len()
        );

        let mut mask = Self::new(width, height);
        for (i, pixel) in rgba.chunks_exact(4).enumerate() {
            if pixel[3] > threshold {
                mask.set(i % width, i / width, true);
            }
        }
        Ok(mask)
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns whether the pixel is set. Coordinates outside the mask read as clear.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return false;
        }
        let word = self.bits[y * self.words_per_row + x / WORD_BITS];
        (word >> (x % WORD_BITS)) & 1 == 1
    }

    /// Sets or clears a pixel. Writes outside the mask are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.words_per_row + x / WORD_BITS;
        let bit = 1u64 << (x % WORD_BITS);
        if value {
            self.bits[index] |= bit;
        } else {
            self.bits[index] &= !bit;
        }
    }

    /// Sets every pixel of the rectangle, clipped to the mask bounds.
    pub fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize) {
        let x_end = (x + width).min(self.width);
        let y_end = (y + height).min(self.height);
        for row in y..y_end {
            for col in x..x_end {
                self.set(col, row, true);
            }
        }
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns `true` when no pixel is set.
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    /// Finds a pixel set in both `self` and `other`, with `other`'s origin placed at
    /// `offset` in `self`'s coordinates.
    ///
    /// Rows are scanned top to bottom and each row left to right, so the returned
    /// point (in `self`'s coordinates) has the smallest `y` of the overlap region.
    pub fn overlap(&self, other: &Mask, offset: (i32, i32)) -> Option<(i32, i32)> {
        let (ox, oy) = (i64::from(offset.0), i64::from(offset.1));

        let x_start = ox.max(0);
        let x_end = (ox + other.width as i64).min(self.width as i64);
        let y_start = oy.max(0);
        let y_end = (oy + other.height as i64).min(self.height as i64);
        if x_start >= x_end || y_start >= y_end {
            return None;
        }

        for y in y_start..y_end {
            let other_y = (y - oy) as usize;
            let mut x = x_start;
            while x < x_end {
                let remaining = (x_end - x) as u32;
                let keep = if remaining >= 64 {
                    u64::MAX
                } else {
                    (1u64 << remaining) - 1
                };
                let hits =
                    self.row_window(y as usize, x) & other.row_window(other_y, x - ox) & keep;
                if hits != 0 {
                    return Some(((x + i64::from(hits.trailing_zeros())) as i32, y as i32));
                }
                x += WORD_BITS as i64;
            }
        }

        None
    }

    /// Returns this mask rotated counter-clockwise (as seen on screen) by `angle_degrees`.
    ///
    /// The result grows to the rotated bounding box and is sampled with nearest-neighbour
    /// lookup around the centre, so a 0° rotation reproduces the mask exactly.
    pub fn rotated(&self, angle_degrees: f32) -> Mask {
        if self.width == 0 || self.height == 0 {
            return self.clone();
        }

        let theta = angle_degrees.rem_euclid(360.0).to_radians();
        let (sin, cos) = theta.sin_cos();
        let (w, h) = (self.width as f32, self.height as f32);

        // Shave float noise so 90° multiples keep their exact size.
        let rotated_w = ((w * cos.abs() + h * sin.abs()) - 1e-3).ceil().max(1.0) as usize;
        let rotated_h = ((w * sin.abs() + h * cos.abs()) - 1e-3).ceil().max(1.0) as usize;

        let (half_rw, half_rh) = (rotated_w as f32 / 2.0, rotated_h as f32 / 2.0);
        let (half_w, half_h) = (w / 2.0, h / 2.0);

        let mut rotated = Mask::new(rotated_w, rotated_h);
        for j in 0..rotated_h {
            let dy = j as f32 + 0.5 - half_rh;
            for i in 0..rotated_w {
                let dx = i as f32 + 0.5 - half_rw;
                let src_x = dx * cos - dy * sin + half_w;
                let src_y = dx * sin + dy * cos + half_h;
                if self.get(src_x.floor() as i32, src_y.floor() as i32) {
                    rotated.set(i, j, true);
                }
            }
        }
        rotated
    }

    /// Returns the 64 pixels of row `y` starting at column `start` as a word.
    fn row_window(&self, y: usize, start: i64) -> u64 {
        let word_at = |index: i64| -> u64 {
            if index < 0 || index >= self.words_per_row as i64 {
                0
            } else {
                self.bits[y * self.words_per_row + index as usize]
            }
        };

        let index = start.div_euclid(WORD_BITS as i64);
        let shift = start.rem_euclid(WORD_BITS as i64) as u32;
        if shift == 0 {
            word_at(index)
        } else {
            (word_at(index) >> shift) | (word_at(index + 1) << (WORD_BITS as u32 - shift))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_window_handles_negative_and_unaligned_starts() {
        let mut mask = Mask::new(130, 1);
        mask.set(0, 0, true);
        mask.set(64, 0, true);
        mask.set(129, 0, true);

        assert_eq!(mask.row_window(0, 0) & 1, 1);
        assert_eq!(mask.row_window(0, -3) >> 3 & 1, 1);
        assert_eq!(mask.row_window(0, 60) >> 4 & 1, 1);
        assert_eq!(mask.row_window(0, 100) >> 29 & 1, 1);
        assert_eq!(mask.row_window(0, 200), 0);
        assert_eq!(mask.row_window(0, -64), 0);
    }

    #[test]
    fn overlap_crosses_word_boundaries() {
        let mut big = Mask::new(200, 4);
        big.set(150, 2, true);
        let small = Mask::filled(10, 10);

        assert_eq!(big.overlap(&small, (145, -5)), Some((150, 2)));
        assert_eq!(big.overlap(&small, (151, 0)), None);
    }
}
