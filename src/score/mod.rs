//! Similarity scorers.
//!
//! Every scorer returns a similarity in `[0, 100]`, higher meaning more alike,
//! and returns exactly 0 when either side has nothing to compare. [`Scorer`]
//! is the tagged variant the orchestrator dispatches on.

mod correlation;
mod keypoint;
mod structural;

pub use correlation::{letterwise_similarity, template_similarity};
pub use keypoint::keypoint_similarity;
pub use structural::{structural_similarity, SSIM_WINDOW};

use serde::Serialize;

use crate::signature::{FeatureConfig, Signature};
use crate::util::SigMatchResult;

/// Working size for whole-canvas template correlation.
pub const TEMPLATE_SIZE: (usize, usize) = (300, 90);
/// Compact working size for structural similarity.
pub const SSIM_COMPACT_SIZE: (usize, usize) = (200, 60);
/// Canonical working size for structural similarity.
pub const SSIM_CANONICAL_SIZE: (usize, usize) = (600, 180);
/// Working size for each glyph in letter-wise correlation.
pub const GLYPH_SIZE: (usize, usize) = (40, 40);

/// Which algorithm produced a score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMethod {
    Keypoint,
    TemplateCorrelation,
    Structural,
    LetterWise,
    /// Fuzzy name match on recognized text; no visual scorer ran.
    TextRecognition,
}

impl ScoreMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreMethod::Keypoint => "keypoint",
            ScoreMethod::TemplateCorrelation => "template_correlation",
            ScoreMethod::Structural => "structural",
            ScoreMethod::LetterWise => "letter_wise",
            ScoreMethod::TextRecognition => "text_recognition",
        }
    }
}

/// A visual scoring strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scorer {
    /// Cross-checked keypoint descriptor matching on the raw images.
    Keypoint,
    /// Whole-canvas ZNCC at the given working size.
    TemplateCorrelation { size: (usize, usize) },
    /// Mean SSIM at the given working size.
    Structural { size: (usize, usize) },
    /// Positional glyph-by-glyph ZNCC at the given glyph size.
    LetterWise { glyph_size: (usize, usize) },
}

impl Scorer {
    pub const fn template() -> Self {
        Scorer::TemplateCorrelation {
            size: TEMPLATE_SIZE,
        }
    }

    pub const fn structural_compact() -> Self {
        Scorer::Structural {
            size: SSIM_COMPACT_SIZE,
        }
    }

    pub const fn structural_canonical() -> Self {
        Scorer::Structural {
            size: SSIM_CANONICAL_SIZE,
        }
    }

    pub const fn letter_wise() -> Self {
        Scorer::LetterWise {
            glyph_size: GLYPH_SIZE,
        }
    }

    pub fn method(&self) -> ScoreMethod {
        match self {
            Scorer::Keypoint => ScoreMethod::Keypoint,
            Scorer::TemplateCorrelation { .. } => ScoreMethod::TemplateCorrelation,
            Scorer::Structural { .. } => ScoreMethod::Structural,
            Scorer::LetterWise { .. } => ScoreMethod::LetterWise,
        }
    }

    /// Scores `item` against `query`, deriving whatever features this scorer needs.
    pub fn score(&self, query: &Signature, item: &Signature, cfg: &FeatureConfig) -> SigMatchResult<f32> {
        let score = match *self {
            Scorer::Keypoint => keypoint_similarity(query.descriptors(cfg)?, item.descriptors(cfg)?),
            Scorer::TemplateCorrelation { size } => {
                template_similarity(query.normalized(cfg)?, item.normalized(cfg)?, size)?
            }
            Scorer::Structural { size } => {
                structural_similarity(query.normalized(cfg)?, item.normalized(cfg)?, size)?
            }
            Scorer::LetterWise { glyph_size } => {
                letterwise_similarity(query.glyphs(cfg)?, item.glyphs(cfg)?, glyph_size)?
            }
        };
        Ok(score.clamp(0.0, 100.0))
    }
}
