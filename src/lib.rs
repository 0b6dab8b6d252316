//! SigMatch identifies the most likely authors of a handwritten signature.
//!
//! A query image is first read as text: when a recognizer is configured and
//! the recognized text fuzzily matches a known name, that name is returned
//! without any visual comparison. Otherwise the query is normalized onto a
//! fixed canvas, gated on quality, classified as cursive or block, and
//! compared against every corpus signature with a style-appropriate scorer.
//! The best matches are reported with resolved display names.
//!
//! Scoring of corpus items can run on the rayon pool via the `rayon`
//! feature; PNG/JPEG decoding is behind `image-io`.

pub mod corpus;
pub mod image;
pub mod kernel;
pub mod keypoint;
pub mod matcher;
pub mod names;
pub mod normalize;
pub mod ocr;
pub mod quality;
pub mod rank;
pub mod score;
pub mod segment;
pub mod signature;
pub mod style;
pub mod template;
mod trace;
pub mod util;

pub use corpus::{Corpus, CorpusItem, UnreadableItem};
pub use image::pyramid::ImagePyramid;
pub use image::{ImageView, RasterImage};
pub use keypoint::{Descriptor, DescriptorSet, OrbConfig};
pub use matcher::{MatchConfig, MatchOutcome, MatchState, Matcher, VisualStrategy};
pub use names::{NameIndex, UNKNOWN_NAME};
pub use normalize::{normalize, NormalizeConfig, NormalizedSignature};
pub use ocr::{NameMatch, OcrConfig, TextRecognizer};
pub use quality::{QualityPolicy, QualityVerdict};
pub use rank::{MatchReport, RankedMatch, ScoreRecord};
pub use score::{ScoreMethod, Scorer};
pub use segment::Glyph;
pub use signature::{FeatureConfig, Signature};
pub use style::Style;
pub use template::TemplatePlan;
pub use util::{SigMatchError, SigMatchResult};
