//! Error types for sigmatch.

use thiserror::Error;

/// Result alias for sigmatch operations.
pub type SigMatchResult<T> = std::result::Result<T, SigMatchError>;

/// Errors that can occur when running the signature pipeline.
///
/// Low-quality inputs, degenerate comparisons and inconclusive OCR are not
/// errors; they are reported through [`crate::MatchOutcome`] and zero scores.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SigMatchError {
    /// Width or height is zero or overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the described image.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A region of interest falls outside the image.
    #[error("roi ({x},{y}) {width}x{height} outside {img_width}x{img_height} image")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// A correlation template carries no signal.
    #[error("degenerate template: {reason}")]
    DegenerateTemplate { reason: &'static str },
    /// Image bytes could not be decoded.
    #[error("failed to decode image: {reason}")]
    Decode { reason: String },
    /// Image file could not be read.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
    /// The name mapping could not be parsed.
    #[error("invalid name index: {reason}")]
    NameIndex { reason: String },
    /// A persisted descriptor blob does not split into whole vectors.
    #[error("descriptor blob of {len} bytes is not a multiple of {width}")]
    DescriptorBlob { len: usize, width: usize },
    /// The orchestrator ran past its configured deadline.
    #[error("deadline exceeded after {elapsed_ms} ms")]
    DeadlineExceeded { elapsed_ms: u128 },
}
