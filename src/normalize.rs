//! Signature normalization onto a fixed canvas.
//!
//! The pipeline is: Otsu binarization with dark ink as foreground, an anisotropic
//! closing that bridges broken pen strokes, a crop to the union of all outer
//! ink regions, an aspect-preserving rescale that fits the crop inside the
//! canvas, and a centred paste onto an empty canvas. The result uses `255`
//! for ink and `0` for background. A raster that already is a canonical
//! canvas (canonical size, only `0` and `255`) is taken as-is, so normalizing
//! twice gives the same canvas even when ink covers most of it.

use crate::image::morph::{binarize_ink, close, threshold, INK};
use crate::image::region::{crop, ink_bounds};
use crate::image::resize::resize_image;
use crate::image::{ImageView, RasterImage};
use crate::trace::{trace_event, trace_span};
use crate::util::{SigMatchError, SigMatchResult};

/// Canonical canvas width in samples.
pub const CANVAS_WIDTH: usize = 600;
/// Canonical canvas height in samples.
pub const CANVAS_HEIGHT: usize = 180;
/// Closing kernel width; wider than tall so horizontal pen gaps close first.
pub const CLOSE_KERNEL_WIDTH: usize = 5;
/// Closing kernel height.
pub const CLOSE_KERNEL_HEIGHT: usize = 3;

/// Parameters for [`normalize`]. The canvas size is fixed.
#[derive(Clone, Debug)]
pub struct NormalizeConfig {
    pub close_kernel: (usize, usize),
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            close_kernel: (CLOSE_KERNEL_WIDTH, CLOSE_KERNEL_HEIGHT),
        }
    }
}

/// A signature rendered onto the canonical canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedSignature {
    canvas: RasterImage,
    fallback: bool,
}

impl NormalizedSignature {
    /// Wraps an existing canvas, e.g. a cached normalization.
    ///
    /// The canvas must already have the canonical size.
    pub fn from_canvas(canvas: RasterImage) -> SigMatchResult<Self> {
        if canvas.width() != CANVAS_WIDTH || canvas.height() != CANVAS_HEIGHT {
            return Err(SigMatchError::InvalidDimensions {
                width: canvas.width(),
                height: canvas.height(),
            });
        }
        Ok(Self {
            canvas,
            fallback: false,
        })
    }

    /// Returns the canvas raster.
    pub fn canvas(&self) -> &RasterImage {
        &self.canvas
    }

    /// Returns a borrowed view of the canvas.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.canvas.view()
    }

    /// Number of ink samples on the canvas.
    pub fn ink_count(&self) -> usize {
        self.canvas.count_nonzero()
    }

    /// True when no ink was found and the canvas is a plain rescale.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Normalizes with the default canonical canvas.
pub fn normalize_default(img: &RasterImage) -> SigMatchResult<NormalizedSignature> {
    normalize(img, &NormalizeConfig::default())
}

/// True for a raster shaped like [`normalize`] output: canonical size with
/// both `0` and `INK` present and nothing else.
fn is_canonical_canvas(img: &RasterImage) -> bool {
    img.width() == CANVAS_WIDTH
        && img.height() == CANVAS_HEIGHT
        && img.data().iter().all(|&v| v == 0 || v == INK)
        && img.data().contains(&0)
        && img.data().contains(&INK)
}

/// Normalizes a grayscale raster onto the canonical canvas.
///
/// Never fails on content: an image without ink is rescaled as-is.
pub fn normalize(img: &RasterImage, cfg: &NormalizeConfig) -> SigMatchResult<NormalizedSignature> {
    let _span = trace_span!("normalize", width = img.width(), height = img.height()).entered();
    if is_canonical_canvas(img) {
        trace_event!("normalize_passthrough", ink = img.count_nonzero());
        return NormalizedSignature::from_canvas(img.clone());
    }
    let (canvas_w, canvas_h) = (CANVAS_WIDTH, CANVAS_HEIGHT);

    let mask = binarize_ink(img.view())?;
    let closed = close(&mask, cfg.close_kernel.0, cfg.close_kernel.1)?;

    let Some(bounds) = ink_bounds(closed.view()) else {
        trace_event!("normalize_fallback", width = img.width(), height = img.height());
        return Ok(NormalizedSignature {
            canvas: resize_image(&mask, canvas_w, canvas_h)?,
            fallback: true,
        });
    };

    let cropped = crop(&closed, bounds).ok_or(SigMatchError::RoiOutOfBounds {
        x: bounds.x,
        y: bounds.y,
        width: bounds.width,
        height: bounds.height,
        img_width: closed.width(),
        img_height: closed.height(),
    })?;

    let scale = (canvas_w as f32 / bounds.width as f32).min(canvas_h as f32 / bounds.height as f32);
    let scaled_w = ((bounds.width as f32 * scale).round() as usize).clamp(1, canvas_w);
    let scaled_h = ((bounds.height as f32 * scale).round() as usize).clamp(1, canvas_h);
    let scaled = resize_image(&cropped, scaled_w, scaled_h)?;
    let scaled = threshold(scaled.view(), 127)?;

    let off_x = (canvas_w - scaled_w) / 2;
    let off_y = (canvas_h - scaled_h) / 2;
    let canvas = RasterImage::from_fn(canvas_w, canvas_h, |x, y| {
        if x >= off_x && x < off_x + scaled_w && y >= off_y && y < off_y + scaled_h {
            scaled.at(x - off_x, y - off_y)
        } else {
            0
        }
    })?;

    trace_event!(
        "normalized",
        crop_width = bounds.width,
        crop_height = bounds.height,
        scale = scale
    );
    Ok(NormalizedSignature {
        canvas,
        fallback: false,
    })
}

#[cfg(test)]
mod tests {
    use super::{normalize_default, NormalizedSignature, CANVAS_HEIGHT, CANVAS_WIDTH};
    use crate::image::RasterImage;

    fn page_with_bar(x0: usize, x1: usize, y0: usize, y1: usize) -> RasterImage {
        RasterImage::from_fn(400, 300, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                15
            } else {
                240
            }
        })
        .unwrap()
    }

    #[test]
    fn wide_ink_fills_canvas_width_and_is_centered() {
        let norm = normalize_default(&page_with_bar(50, 350, 140, 160)).unwrap();
        let canvas = norm.canvas();
        assert_eq!((canvas.width(), canvas.height()), (CANVAS_WIDTH, CANVAS_HEIGHT));
        assert!(!norm.is_fallback());
        // 300x20 scales by 2 -> 600x40, centred vertically at rows 70..110.
        assert_eq!(canvas.at(0, 90), 255);
        assert_eq!(canvas.at(599, 90), 255);
        assert_eq!(canvas.at(300, 69), 0);
        assert_eq!(canvas.at(300, 70), 255);
        assert_eq!(canvas.at(300, 109), 255);
        assert_eq!(canvas.at(300, 110), 0);
        assert_eq!(norm.ink_count(), 600 * 40);
    }

    #[test]
    fn tall_ink_is_limited_by_canvas_height() {
        let norm = normalize_default(&page_with_bar(100, 130, 20, 200)).unwrap();
        // 30x180 fits at scale 1.0 -> centred horizontally at 285..315.
        assert_eq!(norm.canvas().at(284, 90), 0);
        assert_eq!(norm.canvas().at(285, 90), 255);
        assert_eq!(norm.canvas().at(314, 0), 255);
        assert_eq!(norm.canvas().at(315, 0), 0);
    }

    #[test]
    fn blank_page_falls_back_to_empty_canvas() {
        let blank = RasterImage::filled(320, 200, 255).unwrap();
        let norm = normalize_default(&blank).unwrap();
        assert!(norm.is_fallback());
        assert_eq!(norm.ink_count(), 0);
        assert_eq!(norm.canvas().width(), CANVAS_WIDTH);
    }

    #[test]
    fn dense_dark_ink_stays_foreground() {
        // Stripes with 1-px gaps cover well over half the page.
        let page = RasterImage::from_fn(200, 60, |x, y| {
            let inside = (5..195).contains(&x) && (5..55).contains(&y);
            if inside && x % 4 != 3 {
                15
            } else {
                240
            }
        })
        .unwrap();
        assert!(page.data().iter().filter(|&&v| v == 15).count() > 200 * 60 / 2);

        let norm = normalize_default(&page).unwrap();
        assert!(!norm.is_fallback());
        assert_eq!(
            (norm.canvas().width(), norm.canvas().height()),
            (CANVAS_WIDTH, CANVAS_HEIGHT)
        );
        assert_eq!(norm.canvas().at(300, 90), 255);
        assert_eq!(norm.canvas().at(0, 0), 0);
        assert!(norm.ink_count() > CANVAS_WIDTH * CANVAS_HEIGHT / 2);
    }

    #[test]
    fn renormalizing_a_mostly_ink_canvas_is_exact() {
        let once = normalize_default(&page_with_bar(50, 350, 100, 200)).unwrap();
        // 300x100 scales by 1.8 -> 540x180.
        assert_eq!(once.ink_count(), 540 * 180);
        let twice = normalize_default(once.canvas()).unwrap();
        assert_eq!(twice.canvas(), once.canvas());
        assert!(!twice.is_fallback());
    }

    #[test]
    fn from_canvas_rejects_wrong_size() {
        assert!(NormalizedSignature::from_canvas(RasterImage::filled(10, 10, 0).unwrap()).is_err());
    }
}
