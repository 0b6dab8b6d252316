//! Grayscale raster buffers and the image operations the pipeline needs.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride,
//! so glyph crops and bounding-box regions are zero-copy until a stage needs
//! to own them. `RasterImage` is the owned, contiguous counterpart every stage
//! produces. Samples are single-channel `u8`.

use crate::util::{SigMatchError, SigMatchResult};

#[cfg(feature = "image-io")]
pub mod io;
pub mod morph;
pub mod pyramid;
pub mod region;
pub mod resize;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> SigMatchResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> SigMatchResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(SigMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> SigMatchResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(SigMatchError::InvalidDimensions { width, height });
        }
        let out_of_bounds = SigMatchError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or(out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or(out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = y * self.stride + x;
        let data = self
            .data
            .get(start..)
            .ok_or(SigMatchError::BufferTooSmall {
                needed: start + 1,
                got: self.data.len(),
            })?;
        ImageView::new(data, width, height, self.stride)
    }
}

impl ImageView<'_, u8> {
    /// Copies the view into a contiguous owned raster.
    pub fn to_owned_image(&self) -> RasterImage {
        let mut data = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            let start = y * self.stride;
            data.extend_from_slice(&self.data[start..start + self.width]);
        }
        RasterImage {
            data,
            width: self.width,
            height: self.height,
        }
    }

    /// Counts samples that differ from the zero background.
    pub fn count_nonzero(&self) -> usize {
        (0..self.height)
            .filter_map(|y| self.row(y))
            .map(|row| row.iter().filter(|&&v| v != 0).count())
            .sum()
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> SigMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(SigMatchError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(SigMatchError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(SigMatchError::InvalidDimensions { width, height })
}

/// Owned contiguous grayscale raster.
///
/// Immutable once built; every pipeline stage returns a fresh one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl RasterImage {
    /// Wraps a row-major buffer of exactly `width * height` samples.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> SigMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(SigMatchError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(SigMatchError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(SigMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(SigMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates an image with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> SigMatchResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(SigMatchError::InvalidDimensions { width, height })?;
        Self::new(vec![value; len], width, height)
    }

    /// Builds an image by evaluating `f(x, y)` for every sample.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> u8,
    ) -> SigMatchResult<Self> {
        let mut data = Vec::with_capacity(width.saturating_mul(height));
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(data, width, height)
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the row-major sample buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the sample at `(x, y)`; panics when out of bounds.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Counts samples that differ from the zero background.
    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Returns the photometric negative.
    pub fn inverted(&self) -> RasterImage {
        RasterImage {
            data: self.data.iter().map(|&v| 255 - v).collect(),
            width: self.width,
            height: self.height,
        }
    }
}
