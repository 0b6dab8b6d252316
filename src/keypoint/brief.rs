//! Steered binary intensity tests.

use std::sync::OnceLock;

use crate::image::morph::blur3;
use crate::image::RasterImage;
use crate::keypoint::{Descriptor, DESCRIPTOR_BYTES};
use crate::util::SigMatchResult;

/// Minimum distance between a keypoint and the image edge.
pub(crate) const PATCH_BORDER: usize = 16;
/// Radius of the disc used for the intensity centroid.
const ORIENTATION_RADIUS: isize = 15;
/// Radius of the disc the test pattern is drawn from; stays inside
/// `PATCH_BORDER` after rotation and rounding.
const PATTERN_RADIUS: i32 = 13;
const PATTERN_SEED: u64 = 0x5167_4d61_7463_6821;

type TestPair = [(i32, i32); 2];

fn pattern() -> &'static [TestPair] {
    static PATTERN: OnceLock<Vec<TestPair>> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let mut state = PATTERN_SEED;
        let mut point = || loop {
            let dx = (splitmix64(&mut state) % (2 * PATTERN_RADIUS as u64 + 1)) as i32
                - PATTERN_RADIUS;
            let dy = (splitmix64(&mut state) % (2 * PATTERN_RADIUS as u64 + 1)) as i32
                - PATTERN_RADIUS;
            if dx * dx + dy * dy <= PATTERN_RADIUS * PATTERN_RADIUS {
                return (dx, dy);
            }
        };
        (0..DESCRIPTOR_BYTES * 8)
            .map(|_| {
                let a = point();
                let mut b = point();
                while b == a {
                    b = point();
                }
                [a, b]
            })
            .collect()
    })
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Smoothing applied before sampling tests; two binomial passes.
pub(crate) fn smooth(img: &RasterImage) -> SigMatchResult<RasterImage> {
    blur3(&blur3(img)?)
}

/// Orientation of the intensity centroid around `(x, y)`, in radians.
pub(crate) fn orientation(img: &RasterImage, x: usize, y: usize) -> f32 {
    let r = ORIENTATION_RADIUS;
    let mut m01 = 0i64;
    let mut m10 = 0i64;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let px = x as isize + dx;
            let py = y as isize + dy;
            if px < 0 || py < 0 || px as usize >= img.width() || py as usize >= img.height() {
                continue;
            }
            let v = i64::from(img.at(px as usize, py as usize));
            m10 += dx as i64 * v;
            m01 += dy as i64 * v;
        }
    }
    (m01 as f32).atan2(m10 as f32)
}

/// Computes the rotated descriptor at `(x, y)` on a smoothed level image.
pub(crate) fn describe(smoothed: &RasterImage, x: usize, y: usize, angle: f32) -> Descriptor {
    let (sin, cos) = angle.sin_cos();
    let sample = |(dx, dy): (i32, i32)| -> u8 {
        let rx = (cos * dx as f32 - sin * dy as f32).round() as isize;
        let ry = (sin * dx as f32 + cos * dy as f32).round() as isize;
        let px = (x as isize + rx).clamp(0, smoothed.width() as isize - 1) as usize;
        let py = (y as isize + ry).clamp(0, smoothed.height() as isize - 1) as usize;
        smoothed.at(px, py)
    };

    let mut out = [0u8; DESCRIPTOR_BYTES];
    for (bit, pair) in pattern().iter().enumerate() {
        if sample(pair[0]) < sample(pair[1]) {
            out[bit / 8] |= 1 << (bit % 8);
        }
    }
    out
}
