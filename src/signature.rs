//! A signature image together with lazily derived features.
//!
//! Normalization, style, glyphs and descriptors are computed on first use and
//! cached in `OnceLock` slots, so a corpus item prepared once is reused across
//! queries and can be shared between worker threads. The caches hold whatever
//! the first [`FeatureConfig`] produced; call [`Signature::reset`] after
//! switching configurations.

use std::sync::OnceLock;

use crate::image::RasterImage;
use crate::keypoint::{extract_descriptors, DescriptorSet, OrbConfig};
use crate::normalize::{normalize, NormalizeConfig, NormalizedSignature};
use crate::segment::{segment_letters, Glyph, SegmentConfig};
use crate::style::{classify_style, Style, StyleConfig};
use crate::util::SigMatchResult;

/// Parameters for every derived feature.
#[derive(Clone, Debug, Default)]
pub struct FeatureConfig {
    pub normalize: NormalizeConfig,
    pub style: StyleConfig,
    pub segment: SegmentConfig,
    pub orb: OrbConfig,
}

/// Raw signature image plus cached derived features.
#[derive(Debug)]
pub struct Signature {
    raw: RasterImage,
    normalized: OnceLock<NormalizedSignature>,
    style: OnceLock<Style>,
    glyphs: OnceLock<Vec<Glyph>>,
    descriptors: OnceLock<DescriptorSet>,
}

impl Signature {
    pub fn new(raw: RasterImage) -> Self {
        Self {
            raw,
            normalized: OnceLock::new(),
            style: OnceLock::new(),
            glyphs: OnceLock::new(),
            descriptors: OnceLock::new(),
        }
    }

    /// Seeds the descriptor cache, e.g. from a persisted blob.
    pub fn with_descriptors(self, descriptors: DescriptorSet) -> Self {
        let _ = self.descriptors.set(descriptors);
        self
    }

    /// The grayscale image as decoded.
    pub fn raw(&self) -> &RasterImage {
        &self.raw
    }

    /// True once the normalized canvas has been computed.
    pub fn is_normalized(&self) -> bool {
        self.normalized.get().is_some()
    }

    /// Returns the normalized canvas, computing it on first use.
    pub fn normalized(&self, cfg: &FeatureConfig) -> SigMatchResult<&NormalizedSignature> {
        if let Some(norm) = self.normalized.get() {
            return Ok(norm);
        }
        let norm = normalize(&self.raw, &cfg.normalize)?;
        Ok(self.normalized.get_or_init(|| norm))
    }

    /// Returns the handwriting style, computing it on first use.
    pub fn style(&self, cfg: &FeatureConfig) -> SigMatchResult<Style> {
        if let Some(style) = self.style.get() {
            return Ok(*style);
        }
        let style = classify_style(self.normalized(cfg)?, &cfg.style)?;
        Ok(*self.style.get_or_init(|| style))
    }

    /// Returns the letter glyphs, computing them on first use.
    pub fn glyphs(&self, cfg: &FeatureConfig) -> SigMatchResult<&[Glyph]> {
        if let Some(glyphs) = self.glyphs.get() {
            return Ok(glyphs);
        }
        let glyphs = segment_letters(self.normalized(cfg)?, &cfg.segment)?;
        Ok(self.glyphs.get_or_init(|| glyphs))
    }

    /// Returns keypoint descriptors of the raw image, computing them on first use.
    pub fn descriptors(&self, cfg: &FeatureConfig) -> SigMatchResult<&DescriptorSet> {
        if let Some(set) = self.descriptors.get() {
            return Ok(set);
        }
        let set = extract_descriptors(&self.raw, &cfg.orb)?;
        Ok(self.descriptors.get_or_init(|| set))
    }

    /// Drops every cached feature.
    pub fn reset(&mut self) {
        self.normalized.take();
        self.style.take();
        self.glyphs.take();
        self.descriptors.take();
    }
}

impl From<RasterImage> for Signature {
    fn from(raw: RasterImage) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureConfig, Signature};
    use crate::image::RasterImage;
    use crate::style::Style;

    #[test]
    fn features_are_cached_after_first_use() {
        let raw = RasterImage::from_fn(200, 80, |x, y| {
            if (20..180).contains(&x) && (30..50).contains(&y) {
                0
            } else {
                255
            }
        })
        .unwrap();
        let mut sig = Signature::new(raw);
        let cfg = FeatureConfig::default();
        assert!(!sig.is_normalized());
        assert_eq!(sig.style(&cfg).unwrap(), Style::Cursive);
        assert!(sig.is_normalized());
        let first = sig.normalized(&cfg).unwrap() as *const _;
        let second = sig.normalized(&cfg).unwrap() as *const _;
        assert_eq!(first, second);

        sig.reset();
        assert!(!sig.is_normalized());
    }
}
