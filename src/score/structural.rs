//! Mean structural similarity (SSIM) over sliding square windows.

use crate::image::resize::resize_image;
use crate::image::RasterImage;
use crate::normalize::NormalizedSignature;
use crate::util::SigMatchResult;

/// Side of the uniform averaging window.
pub const SSIM_WINDOW: usize = 7;
const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DYNAMIC_RANGE: f64 = 255.0;

/// Structural similarity in `[0, 100]` after resampling both canvases to `size`.
///
/// A canvas without ink has no structure to compare and scores 0.
pub fn structural_similarity(
    query: &NormalizedSignature,
    item: &NormalizedSignature,
    size: (usize, usize),
) -> SigMatchResult<f32> {
    if query.ink_count() == 0 || item.ink_count() == 0 {
        return Ok(0.0);
    }
    let a = resize_image(query.canvas(), size.0, size.1)?;
    let b = resize_image(item.canvas(), size.0, size.1)?;
    Ok((mean_ssim(&a, &b).clamp(0.0, 1.0) * 100.0) as f32)
}

/// Summed-area table with one extra leading row and column of zeros.
struct Integral {
    width: usize,
    sums: Vec<f64>,
}

impl Integral {
    fn build(width: usize, height: usize, value: impl Fn(usize, usize) -> f64) -> Self {
        let stride = width + 1;
        let mut sums = vec![0.0f64; stride * (height + 1)];
        for y in 0..height {
            let mut row_sum = 0.0;
            for x in 0..width {
                row_sum += value(x, y);
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }
        Self { width, sums }
    }

    fn window(&self, x: usize, y: usize, side: usize) -> f64 {
        let stride = self.width + 1;
        let (x1, y1) = (x + side, y + side);
        self.sums[y1 * stride + x1] - self.sums[y * stride + x1] - self.sums[y1 * stride + x]
            + self.sums[y * stride + x]
    }
}

/// Mean SSIM of two equally sized images; may be negative.
pub(crate) fn mean_ssim(a: &RasterImage, b: &RasterImage) -> f64 {
    let (w, h) = (a.width().min(b.width()), a.height().min(b.height()));
    let side = SSIM_WINDOW.min(w).min(h);
    let n = (side * side) as f64;
    let c1 = (K1 * DYNAMIC_RANGE).powi(2);
    let c2 = (K2 * DYNAMIC_RANGE).powi(2);

    let fa = |x: usize, y: usize| f64::from(a.at(x, y));
    let fb = |x: usize, y: usize| f64::from(b.at(x, y));
    let sa = Integral::build(w, h, fa);
    let sb = Integral::build(w, h, fb);
    let saa = Integral::build(w, h, |x, y| fa(x, y) * fa(x, y));
    let sbb = Integral::build(w, h, |x, y| fb(x, y) * fb(x, y));
    let sab = Integral::build(w, h, |x, y| fa(x, y) * fb(x, y));

    let mut total = 0.0f64;
    let mut windows = 0usize;
    for y in 0..=h - side {
        for x in 0..=w - side {
            let mu_a = sa.window(x, y, side) / n;
            let mu_b = sb.window(x, y, side) / n;
            let var_a = saa.window(x, y, side) / n - mu_a * mu_a;
            let var_b = sbb.window(x, y, side) / n - mu_b * mu_b;
            let cov = sab.window(x, y, side) / n - mu_a * mu_b;
            let num = (2.0 * mu_a * mu_b + c1) * (2.0 * cov + c2);
            let den = (mu_a * mu_a + mu_b * mu_b + c1) * (var_a + var_b + c2);
            total += num / den;
            windows += 1;
        }
    }
    if windows == 0 {
        return 0.0;
    }
    total / windows as f64
}
