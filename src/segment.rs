//! Letter segmentation for block-style signatures.

use crate::image::morph::threshold;
use crate::image::region::{crop, outer_regions, BoundingBox};
use crate::image::RasterImage;
use crate::normalize::NormalizedSignature;
use crate::style::STYLE_BINARIZE_LEVEL;
use crate::util::SigMatchResult;

/// Regions narrower than this are treated as noise.
pub const MIN_GLYPH_WIDTH: usize = 5;
/// Regions shorter than this are treated as noise.
pub const MIN_GLYPH_HEIGHT: usize = 20;

/// Noise filter for [`segment_letters`].
#[derive(Clone, Copy, Debug)]
pub struct SegmentConfig {
    pub min_width: usize,
    pub min_height: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            min_width: MIN_GLYPH_WIDTH,
            min_height: MIN_GLYPH_HEIGHT,
        }
    }
}

/// One letter crop, ordered left-to-right within its signature.
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    /// Position in the left-to-right sequence.
    pub ordinal: usize,
    /// Where the crop sits on the canonical canvas.
    pub bbox: BoundingBox,
    pub image: RasterImage,
}

/// Splits a normalized signature into letter glyphs sorted by horizontal offset.
///
/// The crop is the full bounding box on the canvas, so strokes of a
/// neighbouring letter that reach into the box are kept. An all-noise
/// signature yields an empty sequence.
pub fn segment_letters(
    sig: &NormalizedSignature,
    cfg: &SegmentConfig,
) -> SigMatchResult<Vec<Glyph>> {
    let mask = threshold(sig.view(), STYLE_BINARIZE_LEVEL)?;
    let mut boxes: Vec<BoundingBox> = outer_regions(mask.view())
        .into_iter()
        .map(|r| r.bbox)
        .filter(|b| b.width >= cfg.min_width && b.height >= cfg.min_height)
        .collect();
    boxes.sort_by_key(|b| b.x);

    Ok(boxes
        .into_iter()
        .filter_map(|bbox| crop(sig.canvas(), bbox).map(|image| (bbox, image)))
        .enumerate()
        .map(|(ordinal, (bbox, image))| Glyph {
            ordinal,
            bbox,
            image,
        })
        .collect())
}
