//! Thresholding, morphology and small smoothing filters.
//!
//! Binary masks use `255` for foreground (ink) and `0` for background. Rect
//! structuring elements are applied separably; samples outside the image are
//! ignored rather than padded, so erosion never eats ink touching a border.

use crate::image::{ImageView, RasterImage};
use crate::util::SigMatchResult;

/// Foreground value in binary masks.
pub const INK: u8 = 255;

/// Computes Otsu's global threshold.
///
/// Returns `t` such that samples `<= t` form the darker class, or `None` when
/// the image holds a single intensity and no split exists.
pub fn otsu_threshold(img: ImageView<'_, u8>) -> Option<u8> {
    let mut hist = [0u64; 256];
    for y in 0..img.height() {
        for &v in img.row(y)? {
            hist[v as usize] += 1;
        }
    }
    if hist.iter().filter(|&&c| c > 0).count() < 2 {
        return None;
    }

    let total: u64 = hist.iter().sum();
    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(v, &c)| v as f64 * c as f64)
        .sum();

    let mut best_t = 0u8;
    let mut best_between = -1.0f64;
    let mut weight_bg = 0u64;
    let mut sum_bg = 0.0f64;
    for (t, &count) in hist.iter().enumerate() {
        weight_bg += count;
        if weight_bg == 0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0 {
            break;
        }
        sum_bg += t as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg as f64;
        let mean_fg = (sum_all - sum_bg) / weight_fg as f64;
        let between = weight_bg as f64 * weight_fg as f64 * (mean_bg - mean_fg).powi(2);
        if between > best_between {
            best_between = between;
            best_t = t as u8;
        }
    }
    Some(best_t)
}

/// Binarizes with Otsu's threshold, dark samples becoming ink.
///
/// Samples at or below the threshold map to `INK` regardless of how much of
/// the image they cover. Single-intensity images carry no ink and yield an
/// empty mask.
pub fn binarize_ink(img: ImageView<'_, u8>) -> SigMatchResult<RasterImage> {
    let Some(t) = otsu_threshold(img) else {
        return RasterImage::filled(img.width(), img.height(), 0);
    };
    let mut data = Vec::with_capacity(img.width() * img.height());
    for y in 0..img.height() {
        if let Some(row) = img.row(y) {
            data.extend(row.iter().map(|&v| if v <= t { INK } else { 0 }));
        }
    }
    RasterImage::new(data, img.width(), img.height())
}

/// Fixed-level binarization: samples strictly above `t` become foreground.
pub fn threshold(img: ImageView<'_, u8>, t: u8) -> SigMatchResult<RasterImage> {
    let mut data = Vec::with_capacity(img.width() * img.height());
    for y in 0..img.height() {
        if let Some(row) = img.row(y) {
            data.extend(row.iter().map(|&v| if v > t { INK } else { 0 }));
        }
    }
    RasterImage::new(data, img.width(), img.height())
}

#[derive(Clone, Copy)]
enum Extremum {
    Max,
    Min,
}

fn rect_pass(
    src: &RasterImage,
    k: usize,
    horizontal: bool,
    op: Extremum,
) -> SigMatchResult<RasterImage> {
    let k = k.max(1);
    let anchor = k / 2;
    let (w, h) = (src.width(), src.height());
    RasterImage::from_fn(w, h, |x, y| {
        let (pos, len) = if horizontal { (x, w) } else { (y, h) };
        let lo = pos.saturating_sub(anchor);
        let hi = (pos + (k - 1 - anchor)).min(len - 1);
        let samples = (lo..=hi).map(|p| if horizontal { src.at(p, y) } else { src.at(x, p) });
        match op {
            Extremum::Max => samples.max().unwrap_or(0),
            Extremum::Min => samples.min().unwrap_or(0),
        }
    })
}

/// Grayscale dilation with a `kw` x `kh` rectangle.
pub fn dilate(src: &RasterImage, kw: usize, kh: usize) -> SigMatchResult<RasterImage> {
    let tmp = rect_pass(src, kw, true, Extremum::Max)?;
    rect_pass(&tmp, kh, false, Extremum::Max)
}

/// Grayscale erosion with a `kw` x `kh` rectangle.
pub fn erode(src: &RasterImage, kw: usize, kh: usize) -> SigMatchResult<RasterImage> {
    let tmp = rect_pass(src, kw, true, Extremum::Min)?;
    rect_pass(&tmp, kh, false, Extremum::Min)
}

/// Morphological closing (dilate then erode); bridges gaps narrower than the kernel.
pub fn close(src: &RasterImage, kw: usize, kh: usize) -> SigMatchResult<RasterImage> {
    erode(&dilate(src, kw, kh)?, kw, kh)
}

/// 3x3 binomial blur (`[1 2 1]` separable) with replicated borders.
pub fn blur3(src: &RasterImage) -> SigMatchResult<RasterImage> {
    let (w, h) = (src.width(), src.height());
    let tap = |a: u8, b: u8, c: u8| (u16::from(a) + 2 * u16::from(b) + u16::from(c) + 2) / 4;
    let horiz = RasterImage::from_fn(w, h, |x, y| {
        let l = src.at(x.saturating_sub(1), y);
        let r = src.at((x + 1).min(w - 1), y);
        tap(l, src.at(x, y), r) as u8
    })?;
    RasterImage::from_fn(w, h, |x, y| {
        let u = horiz.at(x, y.saturating_sub(1));
        let d = horiz.at(x, (y + 1).min(h - 1));
        tap(u, horiz.at(x, y), d) as u8
    })
}

/// Linearly stretches intensities so the darkest sample maps to 0 and the
/// brightest to 255. Flat images are returned unchanged.
pub fn stretch_contrast(src: &RasterImage) -> SigMatchResult<RasterImage> {
    let lo = src.data().iter().copied().min().unwrap_or(0);
    let hi = src.data().iter().copied().max().unwrap_or(0);
    if hi <= lo {
        return Ok(src.clone());
    }
    let span = f32::from(hi - lo);
    let data = src
        .data()
        .iter()
        .map(|&v| ((f32::from(v - lo) * 255.0) / span).round() as u8)
        .collect();
    RasterImage::new(data, src.width(), src.height())
}

#[cfg(test)]
mod tests {
    use super::{binarize_ink, close, dilate, erode, otsu_threshold, stretch_contrast, INK};
    use crate::image::RasterImage;

    #[test]
    fn otsu_splits_bimodal_histogram() {
        let img = RasterImage::from_fn(10, 10, |x, _| if x < 3 { 20 } else { 230 }).unwrap();
        let t = otsu_threshold(img.view()).unwrap();
        assert!((20..230).contains(&t));
        assert_eq!(otsu_threshold(RasterImage::filled(4, 4, 9).unwrap().view()), None);
    }

    #[test]
    fn binarize_maps_dark_samples_to_ink() {
        let thin = RasterImage::from_fn(10, 10, |x, _| if x == 4 { 10 } else { 250 }).unwrap();
        let mask = binarize_ink(thin.view()).unwrap();
        assert_eq!(mask.count_nonzero(), 10);
        assert_eq!(mask.at(4, 0), INK);

        // Ink covering most of the image is still ink.
        let dense = thin.inverted();
        let mask = binarize_ink(dense.view()).unwrap();
        assert_eq!(mask.count_nonzero(), 90);
        assert_eq!(mask.at(4, 0), 0);
        assert_eq!(mask.at(0, 0), INK);
    }

    #[test]
    fn closing_bridges_narrow_gap() {
        let img = RasterImage::from_fn(20, 5, |x, y| {
            if y == 2 && x != 10 && (4..16).contains(&x) {
                INK
            } else {
                0
            }
        })
        .unwrap();
        let closed = close(&img, 5, 3).unwrap();
        assert_eq!(closed.at(10, 2), INK);
        assert_eq!(closed.at(2, 2), 0);
        assert_eq!(closed.count_nonzero(), 12);
    }

    #[test]
    fn dilate_then_erode_restores_isolated_block() {
        let img = RasterImage::from_fn(12, 12, |x, y| {
            if (4..8).contains(&x) && (4..8).contains(&y) {
                INK
            } else {
                0
            }
        })
        .unwrap();
        assert_eq!(erode(&dilate(&img, 3, 3).unwrap(), 3, 3).unwrap(), img);
    }

    #[test]
    fn stretch_contrast_spans_full_range() {
        let img = RasterImage::new(vec![100, 150, 200], 3, 1).unwrap();
        assert_eq!(stretch_contrast(&img).unwrap().data(), &[0, 128, 255]);
    }
}
