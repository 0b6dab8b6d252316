//! Scalar ZNCC evaluation.
//!
//! For a placement `(x, y)` the score is
//! `sum(t' * I) / sqrt(var_t * var_i)`, where `t'` is the zero-mean template
//! and `var_i` the window's total squared deviation. Scores lie in `[-1, 1]`.

use crate::image::ImageView;
use crate::template::{TemplatePlan, MIN_VARIANCE};
use crate::util::{SigMatchError, SigMatchResult};

/// Best placement of a template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    pub x: usize,
    pub y: usize,
    pub score: f32,
}

/// ZNCC at one placement, or `None` when the window is flat or out of range.
pub fn zncc_at(image: ImageView<'_, u8>, tpl: &TemplatePlan, x: usize, y: usize) -> Option<f32> {
    let (tpl_width, tpl_height) = (tpl.width(), tpl.height());
    if x + tpl_width > image.width() || y + tpl_height > image.height() {
        return None;
    }
    let t_prime = tpl.zero_mean();
    let n = (tpl_width * tpl_height) as f64;

    // Whole-canvas windows hold tens of thousands of samples; accumulate in f64.
    let mut dot = 0.0f64;
    let mut sum_i = 0.0f64;
    let mut sum_i2 = 0.0f64;
    for ty in 0..tpl_height {
        let img_row = image.row(y + ty)?;
        let base = ty * tpl_width;
        for tx in 0..tpl_width {
            let value = f64::from(img_row[x + tx]);
            dot += f64::from(t_prime[base + tx]) * value;
            sum_i += value;
            sum_i2 += value * value;
        }
    }

    let var_i = sum_i2 - (sum_i * sum_i) / n;
    if var_i <= f64::from(MIN_VARIANCE) {
        return None;
    }
    let score = (dot / (f64::from(tpl.var_t()) * var_i).sqrt()) as f32;
    score.is_finite().then_some(score.clamp(-1.0, 1.0))
}

/// Scans every valid placement and returns the best-scoring one.
///
/// Ties resolve to the first placement in raster order. Returns `Ok(None)`
/// when every window is flat.
pub fn zncc_scan_best(
    image: ImageView<'_, u8>,
    tpl: &TemplatePlan,
) -> SigMatchResult<Option<Peak>> {
    if image.width() < tpl.width() || image.height() < tpl.height() {
        return Err(SigMatchError::RoiOutOfBounds {
            x: 0,
            y: 0,
            width: tpl.width(),
            height: tpl.height(),
            img_width: image.width(),
            img_height: image.height(),
        });
    }

    let max_x = image.width() - tpl.width();
    let max_y = image.height() - tpl.height();
    let mut best: Option<Peak> = None;
    for y in 0..=max_y {
        for x in 0..=max_x {
            let Some(score) = zncc_at(image, tpl, x, y) else {
                continue;
            };
            if best.map_or(true, |b| score > b.score) {
                best = Some(Peak { x, y, score });
            }
        }
    }
    Ok(best)
}
