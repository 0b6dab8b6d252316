//! Image pyramid used by the multi-scale keypoint detector.
//!
//! Downsampling uses a 2x2 box filter with integer rounding:
//! `dst = ((a + b + c + d) + 2) / 4`. Each level halves both dimensions, so a
//! keypoint found at `(x, y)` on level `l` maps to `(x, y) * 2^l` on the base.

use crate::image::RasterImage;
use crate::util::SigMatchResult;

/// Owned image pyramid built from a base level.
pub struct ImagePyramid {
    levels: Vec<RasterImage>,
}

impl ImagePyramid {
    /// Builds a pyramid from a base image.
    ///
    /// `max_levels` is clamped to at least 1 so the base level is always
    /// present. Construction stops early once a level would drop below
    /// `min_side` pixels on either axis.
    pub fn build(base: &RasterImage, max_levels: usize, min_side: usize) -> SigMatchResult<Self> {
        let max_levels = max_levels.max(1);
        let mut levels = vec![base.clone()];

        while levels.len() < max_levels {
            let Some(src) = levels.last() else {
                break;
            };
            let dst_width = src.width() / 2;
            let dst_height = src.height() / 2;
            if dst_width < min_side.max(1) || dst_height < min_side.max(1) {
                break;
            }

            let next = RasterImage::from_fn(dst_width, dst_height, |x, y| {
                let a = u16::from(src.at(2 * x, 2 * y));
                let b = u16::from(src.at(2 * x + 1, 2 * y));
                let c = u16::from(src.at(2 * x, 2 * y + 1));
                let d = u16::from(src.at(2 * x + 1, 2 * y + 1));
                ((a + b + c + d + 2) / 4) as u8
            })?;
            levels.push(next);
        }

        Ok(Self { levels })
    }

    /// Returns all pyramid levels (level 0 is the base resolution).
    pub fn levels(&self) -> &[RasterImage] {
        &self.levels
    }

    /// Returns a specific pyramid level.
    pub fn level(&self, index: usize) -> Option<&RasterImage> {
        self.levels.get(index)
    }

    /// Scale factor mapping level coordinates back to the base level.
    pub fn scale_of(index: usize) -> f32 {
        (1u32 << index.min(16)) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::ImagePyramid;
    use crate::image::RasterImage;

    #[test]
    fn pyramid_downsamples_by_two_with_rounding() {
        let base = RasterImage::new((0u8..16).collect(), 4, 4).unwrap();
        let pyramid = ImagePyramid::build(&base, 10, 1).unwrap();
        assert_eq!(pyramid.levels().len(), 3);

        let level1 = pyramid.level(1).unwrap();
        assert_eq!((level1.width(), level1.height()), (2, 2));
        assert_eq!(level1.data(), &[3u8, 5, 11, 13]);
        assert_eq!(pyramid.level(2).unwrap().width(), 1);
    }

    #[test]
    fn pyramid_respects_minimum_side() {
        let base = RasterImage::filled(64, 40, 7).unwrap();
        let pyramid = ImagePyramid::build(&base, 8, 16).unwrap();
        // 64x40 -> 32x20 -> (16x10 rejected)
        assert_eq!(pyramid.levels().len(), 2);
        assert_eq!(ImagePyramid::scale_of(1), 2.0);
    }
}
