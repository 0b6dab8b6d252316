//! FAST-9 corner detection with 3x3 non-maximum suppression.

use crate::image::RasterImage;

/// Bresenham circle of radius 3, clockwise from twelve o'clock.
const CIRCLE: [(isize, isize); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

/// Contiguous arc length required for a corner.
const ARC: usize = 9;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Corner {
    pub x: usize,
    pub y: usize,
    pub response: f32,
}

/// Detects corners at least `border` pixels away from every image edge.
pub(crate) fn detect(img: &RasterImage, threshold: u8, border: usize) -> Vec<Corner> {
    let (w, h) = (img.width(), img.height());
    if w <= 2 * border || h <= 2 * border {
        return Vec::new();
    }

    let mut responses = vec![0.0f32; w * h];
    for y in border..h - border {
        for x in border..w - border {
            responses[y * w + x] = corner_response(img, x, y, threshold);
        }
    }

    let mut corners = Vec::new();
    for y in border..h - border {
        for x in border..w - border {
            let idx = y * w + x;
            let score = responses[idx];
            if score <= 0.0 {
                continue;
            }
            let mut is_max = true;
            'nbr: for ny in y - 1..=y + 1 {
                for nx in x - 1..=x + 1 {
                    let n = ny * w + nx;
                    if n == idx {
                        continue;
                    }
                    let other = responses[n];
                    if other > score || (other == score && n < idx) {
                        is_max = false;
                        break 'nbr;
                    }
                }
            }
            if is_max {
                corners.push(Corner {
                    x,
                    y,
                    response: score,
                });
            }
        }
    }
    corners
}

/// Returns the summed excess contrast if `(x, y)` is a FAST-9 corner, else 0.
fn corner_response(img: &RasterImage, x: usize, y: usize, threshold: u8) -> f32 {
    let center = i32::from(img.at(x, y));
    let t = i32::from(threshold);
    let mut ring = [0i32; 16];
    for (slot, &(dx, dy)) in ring.iter_mut().zip(CIRCLE.iter()) {
        let px = (x as isize + dx) as usize;
        let py = (y as isize + dy) as usize;
        *slot = i32::from(img.at(px, py)) - center;
    }

    let brighter = longest_arc(&ring, |d| d > t);
    let darker = longest_arc(&ring, |d| d < -t);
    if brighter < ARC && darker < ARC {
        return 0.0;
    }

    let excess: i32 = if brighter >= ARC {
        ring.iter().filter(|&&d| d > t).map(|&d| d - t).sum()
    } else {
        ring.iter().filter(|&&d| d < -t).map(|&d| -d - t).sum()
    };
    excess as f32
}

/// Longest run of consecutive ring samples satisfying `pred`, with wrap-around.
fn longest_arc(ring: &[i32; 16], pred: impl Fn(i32) -> bool) -> usize {
    let mut best = 0usize;
    let mut run = 0usize;
    for i in 0..32 {
        if pred(ring[i % 16]) {
            run += 1;
            best = best.max(run.min(16));
        } else {
            run = 0;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::{detect, longest_arc};
    use crate::image::RasterImage;

    #[test]
    fn arc_wraps_around_the_ring() {
        let mut ring = [0i32; 16];
        for i in [13usize, 14, 15, 0, 1, 2, 3, 4, 5] {
            ring[i] = 100;
        }
        assert_eq!(longest_arc(&ring, |d| d > 20), 9);
    }

    #[test]
    fn square_corner_is_detected_once() {
        let img = RasterImage::from_fn(40, 40, |x, y| {
            if (20..34).contains(&x) && (20..34).contains(&y) {
                20
            } else {
                230
            }
        })
        .unwrap();
        let corners = detect(&img, 20, 4);
        assert!(corners
            .iter()
            .any(|c| c.x.abs_diff(20) <= 1 && c.y.abs_diff(20) <= 1));
        let near_top_left = corners
            .iter()
            .filter(|c| c.x.abs_diff(20) <= 1 && c.y.abs_diff(20) <= 1)
            .count();
        assert_eq!(near_top_left, 1);
    }

    #[test]
    fn straight_edge_is_not_a_corner() {
        let img = RasterImage::from_fn(40, 40, |x, _| if x < 20 { 20 } else { 230 }).unwrap();
        assert!(detect(&img, 20, 4).is_empty());
    }
}
