//! Decoding helpers built on the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Colour inputs are
//! converted to luma here, upstream of the normalizer.

use crate::image::RasterImage;
use crate::util::{SigMatchError, SigMatchResult};
use std::path::Path;

/// Creates an owned raster from a grayscale image buffer.
pub fn raster_from_gray_image(img: &image::GrayImage) -> SigMatchResult<RasterImage> {
    RasterImage::new(img.as_raw().clone(), img.width() as usize, img.height() as usize)
}

/// Converts any decoded image to a grayscale raster.
pub fn raster_from_dynamic_image(img: &image::DynamicImage) -> SigMatchResult<RasterImage> {
    raster_from_gray_image(&img.to_luma8())
}

/// Decodes PNG/JPEG bytes into a grayscale raster.
pub fn decode_gray(bytes: &[u8]) -> SigMatchResult<RasterImage> {
    let img = image::load_from_memory(bytes).map_err(|err| SigMatchError::Decode {
        reason: err.to_string(),
    })?;
    raster_from_dynamic_image(&img)
}

/// Loads an image from disk and converts it to a grayscale raster.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> SigMatchResult<RasterImage> {
    let bytes = std::fs::read(path.as_ref()).map_err(|err| SigMatchError::ImageIo {
        reason: format!("{}: {err}", path.as_ref().display()),
    })?;
    decode_gray(&bytes)
}

/// Encodes a raster as PNG, e.g. for handing to an external OCR process.
pub fn encode_png(img: &RasterImage) -> SigMatchResult<Vec<u8>> {
    let buffer =
        image::GrayImage::from_raw(img.width() as u32, img.height() as u32, img.data().to_vec())
            .ok_or(SigMatchError::InvalidDimensions {
                width: img.width(),
                height: img.height(),
            })?;
    let mut out = std::io::Cursor::new(Vec::new());
    buffer
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|err| SigMatchError::ImageIo {
            reason: err.to_string(),
        })?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::{decode_gray, encode_png};
    use crate::image::RasterImage;
    use crate::util::SigMatchError;

    #[test]
    fn png_roundtrip_preserves_samples() {
        let img = RasterImage::from_fn(9, 4, |x, y| (x * 20 + y) as u8).unwrap();
        let bytes = encode_png(&img).unwrap();
        assert_eq!(decode_gray(&bytes).unwrap(), img);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = decode_gray(b"definitely not an image").unwrap_err();
        assert!(matches!(err, SigMatchError::Decode { .. }));
    }
}
