//! Handwriting style heuristic.
//!
//! Joined script produces a few large ink blobs; printed letters produce
//! many small ones. The classifier counts outer regions of the binarized
//! canvas and calls the signature cursive when the count is small.

use crate::image::morph::threshold;
use crate::image::region::outer_regions;
use crate::normalize::NormalizedSignature;
use crate::util::SigMatchResult;

/// A signature with at most this many outer regions is cursive.
pub const MAX_CURSIVE_REGIONS: usize = 3;
/// Binarization level applied to the canvas before counting.
pub const STYLE_BINARIZE_LEVEL: u8 = 127;

/// Handwriting style of a signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
    /// Connected script with few ink blobs.
    Cursive,
    /// Discrete, segmentable letters.
    Block,
}

impl Style {
    pub fn is_cursive(self) -> bool {
        matches!(self, Style::Cursive)
    }
}

/// Parameters for [`classify_style`].
#[derive(Clone, Copy, Debug)]
pub struct StyleConfig {
    pub max_cursive_regions: usize,
    pub binarize_level: u8,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            max_cursive_regions: MAX_CURSIVE_REGIONS,
            binarize_level: STYLE_BINARIZE_LEVEL,
        }
    }
}

/// Classifies a normalized signature.
pub fn classify_style(sig: &NormalizedSignature, cfg: &StyleConfig) -> SigMatchResult<Style> {
    let mask = threshold(sig.view(), cfg.binarize_level)?;
    let regions = outer_regions(mask.view()).len();
    Ok(if regions <= cfg.max_cursive_regions {
        Style::Cursive
    } else {
        Style::Block
    })
}

#[cfg(test)]
mod tests {
    use super::{classify_style, Style, StyleConfig};
    use crate::image::RasterImage;
    use crate::normalize::{NormalizedSignature, CANVAS_HEIGHT, CANVAS_WIDTH};

    fn canvas_with_blobs(count: usize) -> NormalizedSignature {
        let canvas = RasterImage::from_fn(CANVAS_WIDTH, CANVAS_HEIGHT, |x, y| {
            let slot = x / 60;
            if slot < count && x % 60 < 30 && (60..120).contains(&y) {
                255
            } else {
                0
            }
        })
        .unwrap();
        NormalizedSignature::from_canvas(canvas).unwrap()
    }

    #[test]
    fn three_blobs_are_cursive_four_are_block() {
        let cfg = StyleConfig::default();
        assert_eq!(classify_style(&canvas_with_blobs(3), &cfg).unwrap(), Style::Cursive);
        assert_eq!(classify_style(&canvas_with_blobs(4), &cfg).unwrap(), Style::Block);
        assert!(classify_style(&canvas_with_blobs(0), &cfg)
            .unwrap()
            .is_cursive());
    }
}
