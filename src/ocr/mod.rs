//! Bridge to an external text recognizer and fuzzy name lookup.
//!
//! The recognizer itself is a collaborator behind [`TextRecognizer`]; this
//! module prepares the image it sees and interprets what it returns. A failed
//! or empty recognition is an empty string, never an error.

mod fuzzy;

pub use fuzzy::sequence_ratio;

use crate::image::morph::{binarize_ink, blur3, dilate, stretch_contrast};
use crate::image::RasterImage;
use crate::names::NameIndex;
use crate::trace::trace_event;
use crate::util::SigMatchResult;

/// Minimum fuzzy ratio for a recognized text to count as a name match.
pub const MIN_NAME_RATIO: f64 = 0.6;
/// Dilation applied to recognizer input to thicken thin strokes.
pub const OCR_DILATE_KERNEL: (usize, usize) = (2, 2);

/// External single-line text recognizer.
///
/// Implementations receive a binarized image with ink as foreground and
/// should treat it as one line of text. `None` means the engine failed.
pub trait TextRecognizer: Send + Sync {
    fn name(&self) -> &str;
    fn recognize_line(&self, binarized: &RasterImage) -> Option<String>;
}

/// Parameters for the recognition bridge.
#[derive(Clone, Copy, Debug)]
pub struct OcrConfig {
    pub min_name_ratio: f64,
    pub dilate_kernel: (usize, usize),
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            min_name_ratio: MIN_NAME_RATIO,
            dilate_kernel: OCR_DILATE_KERNEL,
        }
    }
}

/// Contrast stretch, light blur, inverted Otsu binarization, light dilation.
pub fn prepare_for_ocr(img: &RasterImage, cfg: &OcrConfig) -> SigMatchResult<RasterImage> {
    let stretched = stretch_contrast(img)?;
    let smoothed = blur3(&stretched)?;
    let mask = binarize_ink(smoothed.view())?;
    dilate(&mask, cfg.dilate_kernel.0, cfg.dilate_kernel.1)
}

/// Runs the recognizer and returns its whitespace-trimmed text.
pub fn recognize_text(
    img: &RasterImage,
    recognizer: &dyn TextRecognizer,
    cfg: &OcrConfig,
) -> SigMatchResult<String> {
    let prepared = prepare_for_ocr(img, cfg)?;
    let text = recognizer
        .recognize_line(&prepared)
        .map(|t| t.trim().to_string())
        .unwrap_or_default();
    trace_event!("ocr_text", engine = recognizer.name(), chars = text.chars().count());
    Ok(text)
}

/// True when recognized text contains at least one letter.
pub fn has_alphabetic(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

/// Best fuzzy match of a recognized text among known names.
#[derive(Clone, Debug, PartialEq)]
pub struct NameMatch {
    pub id: String,
    pub name: String,
    /// Similarity ratio in `[0, 1]`.
    pub ratio: f64,
}

impl NameMatch {
    /// Whether the ratio clears the acceptance threshold.
    pub fn is_confident(&self, cfg: &OcrConfig) -> bool {
        self.ratio >= cfg.min_name_ratio
    }
}

/// Finds the known name closest to `text`, comparing lowercased strings.
///
/// Ties keep the first entry in index order. Returns `None` for an empty index.
pub fn best_name_match(text: &str, names: &NameIndex) -> Option<NameMatch> {
    let needle = text.trim().to_lowercase();
    let mut best: Option<NameMatch> = None;
    for (id, name) in names.iter() {
        let ratio = sequence_ratio(&needle, &name.to_lowercase());
        if best.as_ref().map_or(true, |b| ratio > b.ratio) {
            best = Some(NameMatch {
                id: id.to_string(),
                name: name.to_string(),
                ratio,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::{
        best_name_match, has_alphabetic, prepare_for_ocr, recognize_text, OcrConfig,
        TextRecognizer,
    };
    use crate::image::RasterImage;
    use crate::names::NameIndex;

    struct Fixed(Option<&'static str>);

    impl TextRecognizer for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn recognize_line(&self, _binarized: &RasterImage) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    fn page() -> RasterImage {
        RasterImage::from_fn(80, 30, |x, y| {
            if (10..70).contains(&x) && y == 15 {
                20
            } else {
                235
            }
        })
        .unwrap()
    }

    #[test]
    fn preparation_yields_thickened_inverted_ink() {
        let prepared = prepare_for_ocr(&page(), &OcrConfig::default()).unwrap();
        assert_eq!(prepared.at(40, 15), 255);
        assert_eq!(prepared.at(2, 2), 0);
        assert!(prepared.count_nonzero() > 60);
    }

    #[test]
    fn recognizer_output_is_trimmed_and_failures_are_empty() {
        let cfg = OcrConfig::default();
        let text = recognize_text(&page(), &Fixed(Some("  John Smith \n")), &cfg).unwrap();
        assert_eq!(text, "John Smith");
        assert_eq!(recognize_text(&page(), &Fixed(None), &cfg).unwrap(), "");
    }

    #[test]
    fn name_match_is_case_insensitive_and_thresholded() {
        let names: NameIndex = [("a.png", "John Smith"), ("b.png", "Mary Jones")]
            .into_iter()
            .collect();
        let cfg = OcrConfig::default();

        let m = best_name_match("JOHN SMITH", &names).unwrap();
        assert_eq!(m.name, "John Smith");
        assert_eq!(m.id, "a.png");
        assert_eq!(m.ratio, 1.0);
        assert!(m.is_confident(&cfg));

        let weak = best_name_match("qqqq", &names).unwrap();
        assert!(!weak.is_confident(&cfg));
        assert!(best_name_match("x", &NameIndex::new()).is_none());
    }

    #[test]
    fn alphabetic_detection() {
        assert!(has_alphabetic("J. S."));
        assert!(!has_alphabetic("~ 12 --"));
        assert!(!has_alphabetic(""));
    }
}
