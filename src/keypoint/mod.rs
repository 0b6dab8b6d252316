//! Oriented binary keypoint descriptors.
//!
//! Detection runs FAST-9 on every level of a 2x image pyramid, keeps local
//! maxima of the corner response, orients each corner by its intensity
//! centroid, and samples a rotated binary test pattern on a smoothed copy of
//! the level. Descriptors are 256 bits wide and compared by Hamming distance.

mod brief;
mod fast;
mod matcher;

pub use matcher::{cross_checked_matches, hamming, DescriptorMatch};

use crate::image::pyramid::ImagePyramid;
use crate::image::RasterImage;
use crate::trace::trace_event;
use crate::util::{SigMatchError, SigMatchResult};

/// Width of one binary descriptor in bytes.
pub const DESCRIPTOR_BYTES: usize = 32;
/// Descriptor count a signature needs before it is considered matchable.
pub const MIN_DESCRIPTORS_EXCLUSIVE: usize = 20;
/// Hamming distance below which a cross-checked match counts as good.
pub const GOOD_MATCH_DISTANCE: u32 = 50;

/// One fixed-width binary feature vector.
pub type Descriptor = [u8; DESCRIPTOR_BYTES];

/// Detector and descriptor parameters.
#[derive(Clone, Debug)]
pub struct OrbConfig {
    /// FAST intensity threshold.
    pub fast_threshold: u8,
    /// Maximum number of keypoints kept across all levels.
    pub max_features: usize,
    /// Number of pyramid levels to search.
    pub levels: usize,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            fast_threshold: 20,
            max_features: 500,
            levels: 3,
        }
    }
}

/// Detected keypoint in base-level coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Orientation in radians.
    pub angle: f32,
    /// FAST corner response.
    pub response: f32,
    /// Pyramid level the corner was found on.
    pub level: usize,
}

/// Variable-length set of descriptors extracted from one image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DescriptorSet {
    descriptors: Vec<Descriptor>,
}

impl DescriptorSet {
    pub fn new(descriptors: Vec<Descriptor>) -> Self {
        Self { descriptors }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// True iff the set holds more than [`MIN_DESCRIPTORS_EXCLUSIVE`] vectors.
    pub fn quality_ok(&self) -> bool {
        self.descriptors.len() > MIN_DESCRIPTORS_EXCLUSIVE
    }

    /// Serializes as a raw concatenation of fixed-width vectors, no header.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.descriptors.iter().flatten().copied().collect()
    }

    /// Parses a blob written by [`DescriptorSet::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> SigMatchResult<Self> {
        if bytes.len() % DESCRIPTOR_BYTES != 0 {
            return Err(SigMatchError::DescriptorBlob {
                len: bytes.len(),
                width: DESCRIPTOR_BYTES,
            });
        }
        let descriptors = bytes
            .chunks_exact(DESCRIPTOR_BYTES)
            .map(|chunk| {
                let mut d = [0u8; DESCRIPTOR_BYTES];
                d.copy_from_slice(chunk);
                d
            })
            .collect();
        Ok(Self { descriptors })
    }
}

/// Detects keypoints and computes their descriptors.
///
/// Images too small to hold a descriptor patch yield an empty set.
pub fn extract(
    img: &RasterImage,
    cfg: &OrbConfig,
) -> SigMatchResult<(Vec<Keypoint>, DescriptorSet)> {
    let min_side = 2 * brief::PATCH_BORDER + 1;
    if img.width() < min_side || img.height() < min_side {
        return Ok((Vec::new(), DescriptorSet::default()));
    }

    let pyramid = ImagePyramid::build(img, cfg.levels, min_side)?;
    let mut found: Vec<(Keypoint, Descriptor)> = Vec::new();
    for (level, level_img) in pyramid.levels().iter().enumerate() {
        let corners = fast::detect(level_img, cfg.fast_threshold, brief::PATCH_BORDER);
        if corners.is_empty() {
            continue;
        }
        let smoothed = brief::smooth(level_img)?;
        let scale = ImagePyramid::scale_of(level);
        for corner in corners {
            let angle = brief::orientation(level_img, corner.x, corner.y);
            let descriptor = brief::describe(&smoothed, corner.x, corner.y, angle);
            let keypoint = Keypoint {
                x: corner.x as f32 * scale,
                y: corner.y as f32 * scale,
                angle,
                response: corner.response,
                level,
            };
            found.push((keypoint, descriptor));
        }
    }

    found.sort_by(|(a, _), (b, _)| {
        b.response
            .total_cmp(&a.response)
            .then_with(|| a.level.cmp(&b.level))
            .then_with(|| a.y.total_cmp(&b.y))
            .then_with(|| a.x.total_cmp(&b.x))
    });
    found.truncate(cfg.max_features);

    trace_event!("keypoints_extracted", count = found.len());
    let (keypoints, descriptors) = found.into_iter().unzip();
    Ok((keypoints, DescriptorSet::new(descriptors)))
}

/// Extracts descriptors only.
pub fn extract_descriptors(img: &RasterImage, cfg: &OrbConfig) -> SigMatchResult<DescriptorSet> {
    Ok(extract(img, cfg)?.1)
}

#[cfg(test)]
mod tests {
    use super::{extract, DescriptorSet, OrbConfig, DESCRIPTOR_BYTES};
    use crate::image::RasterImage;
    use crate::util::SigMatchError;

    fn scattered_squares(side: usize) -> RasterImage {
        RasterImage::from_fn(160, 120, |x, y| {
            let in_square = |v: usize| v >= 20 && (v - 20) % 24 < side;
            if in_square(x) && in_square(y) && x < 140 && y < 104 {
                30
            } else {
                220
            }
        })
        .unwrap()
    }

    #[test]
    fn flat_image_has_no_keypoints() {
        let img = RasterImage::filled(200, 100, 255).unwrap();
        let (kps, set) = extract(&img, &OrbConfig::default()).unwrap();
        assert!(kps.is_empty());
        assert!(set.is_empty());
        assert!(!set.quality_ok());
    }

    #[test]
    fn textured_image_yields_enough_descriptors() {
        let (kps, set) = extract(&scattered_squares(10), &OrbConfig::default()).unwrap();
        assert_eq!(kps.len(), set.len());
        assert!(set.quality_ok(), "only {} descriptors", set.len());
        assert!(set.len() <= OrbConfig::default().max_features);
    }

    #[test]
    fn extraction_is_deterministic() {
        let img = scattered_squares(8);
        let a = extract(&img, &OrbConfig::default()).unwrap().1;
        let b = extract(&img, &OrbConfig::default()).unwrap().1;
        assert_eq!(a, b);
    }

    #[test]
    fn tiny_image_yields_empty_set() {
        let img = RasterImage::filled(20, 20, 0).unwrap();
        assert!(extract(&img, &OrbConfig::default()).unwrap().1.is_empty());
    }

    #[test]
    fn blob_roundtrip_and_rejection() {
        let set = DescriptorSet::new(vec![[7u8; DESCRIPTOR_BYTES], [9u8; DESCRIPTOR_BYTES]]);
        let bytes = set.to_bytes();
        assert_eq!(bytes.len(), 2 * DESCRIPTOR_BYTES);
        assert_eq!(DescriptorSet::from_bytes(&bytes).unwrap(), set);
        assert_eq!(
            DescriptorSet::from_bytes(&bytes[..33]).unwrap_err(),
            SigMatchError::DescriptorBlob {
                len: 33,
                width: DESCRIPTOR_BYTES
            }
        );
    }
}
