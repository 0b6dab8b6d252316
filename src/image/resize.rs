//! Bilinear resampling.
//!
//! Sample centres are aligned (`src = (dst + 0.5) * scale - 0.5`), so resizing
//! to the source size is the identity and downscaled images are not shifted.

use crate::image::{ImageView, RasterImage};
use crate::util::SigMatchResult;

/// Resamples `src` to exactly `width` x `height` with bilinear interpolation.
pub fn resize_bilinear(
    src: ImageView<'_, u8>,
    width: usize,
    height: usize,
) -> SigMatchResult<RasterImage> {
    if src.width() == width && src.height() == height {
        return Ok(src.to_owned_image());
    }

    let scale_x = src.width() as f32 / width.max(1) as f32;
    let scale_y = src.height() as f32 / height.max(1) as f32;
    let max_x = src.width() - 1;
    let max_y = src.height() - 1;

    let x_taps: Vec<(usize, usize, f32)> = (0..width)
        .map(|x| axis_tap(x, scale_x, max_x))
        .collect();
    let y_taps: Vec<(usize, usize, f32)> = (0..height)
        .map(|y| axis_tap(y, scale_y, max_y))
        .collect();

    let mut data = Vec::with_capacity(width * height);
    for &(y0, y1, fy) in &y_taps {
        let (Some(row0), Some(row1)) = (src.row(y0), src.row(y1)) else {
            data.resize(data.len() + width, 0);
            continue;
        };
        for &(x0, x1, fx) in &x_taps {
            let top = row0[x0] as f32 * (1.0 - fx) + row0[x1] as f32 * fx;
            let bottom = row1[x0] as f32 * (1.0 - fx) + row1[x1] as f32 * fx;
            let value = top * (1.0 - fy) + bottom * fy;
            data.push(value.round().clamp(0.0, 255.0) as u8);
        }
    }
    RasterImage::new(data, width, height)
}

/// Convenience wrapper for owned images.
pub fn resize_image(src: &RasterImage, width: usize, height: usize) -> SigMatchResult<RasterImage> {
    resize_bilinear(src.view(), width, height)
}

fn axis_tap(dst: usize, scale: f32, max_src: usize) -> (usize, usize, f32) {
    let pos = ((dst as f32 + 0.5) * scale - 0.5).max(0.0);
    let i0 = (pos.floor() as usize).min(max_src);
    let i1 = (i0 + 1).min(max_src);
    (i0, i1, pos - i0 as f32)
}
