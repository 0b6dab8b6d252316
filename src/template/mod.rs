//! Correlation template planning.
//!
//! A plan precomputes the zero-mean template and its total squared deviation
//! so each placement only needs one pass over the image window.

use crate::image::ImageView;
use crate::util::{SigMatchError, SigMatchResult};

/// Total squared deviation below which a template is considered flat.
pub(crate) const MIN_VARIANCE: f32 = 1e-6;

/// Precomputed statistics and zero-mean buffer for ZNCC.
pub struct TemplatePlan {
    width: usize,
    height: usize,
    mean: f32,
    var_t: f32,
    zero_mean: Vec<f32>,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    ///
    /// Flat templates (a blank glyph, an empty canvas) are rejected with
    /// [`SigMatchError::DegenerateTemplate`].
    pub fn from_view(tpl: ImageView<'_, u8>) -> SigMatchResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width * height;

        let mut sum = 0.0f64;
        for y in 0..height {
            let row = tpl.row(y).ok_or(SigMatchError::InvalidDimensions { width, height })?;
            sum += row.iter().map(|&v| f64::from(v)).sum::<f64>();
        }
        let mean = sum / count as f64;

        let mut zero_mean = Vec::with_capacity(count);
        let mut var_t = 0.0f64;
        for y in 0..height {
            let row = tpl.row(y).ok_or(SigMatchError::InvalidDimensions { width, height })?;
            for &value in row {
                let d = f64::from(value) - mean;
                var_t += d * d;
                zero_mean.push(d as f32);
            }
        }
        if var_t <= f64::from(MIN_VARIANCE) {
            return Err(SigMatchError::DegenerateTemplate {
                reason: "zero variance",
            });
        }

        Ok(Self {
            width,
            height,
            mean: mean as f32,
            var_t: var_t as f32,
            zero_mean,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the mean intensity of the template.
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Sum of squared deviations from the mean.
    pub fn var_t(&self) -> f32 {
        self.var_t
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn zero_mean(&self) -> &[f32] {
        &self.zero_mean
    }
}
