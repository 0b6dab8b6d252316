//! Outer ink regions of a binary mask.
//!
//! A region is one 8-connected foreground blob with its enclosed holes filled
//! in, which is exactly the area bounded by one outer contour. Blobs nested in
//! another blob's hole are absorbed by the enclosing region instead of being
//! reported separately. Background connectivity is 4-way so the two
//! connectivities stay topologically consistent.

use crate::image::{ImageView, RasterImage};

/// Axis-aligned bounding box of an outer region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl BoundingBox {
    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = (self.x + self.width).max(other.x + other.width);
        let y1 = (self.y + self.height).max(other.y + other.height);
        BoundingBox {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}

/// One outer region: its bounding box and filled pixel area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub bbox: BoundingBox,
    pub area: usize,
}

/// Extracts outer regions from a mask where non-zero samples are foreground.
///
/// Regions are returned in raster order of their first pixel (top-to-bottom,
/// then left-to-right), which keeps the enumeration deterministic.
pub fn outer_regions(mask: ImageView<'_, u8>) -> Vec<Region> {
    let (w, h) = (mask.width(), mask.height());
    let filled = fill_holes(mask);
    let mut visited = vec![false; w * h];
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    for start in 0..w * h {
        if !filled[start] || visited[start] {
            continue;
        }
        visited[start] = true;
        stack.push(start);
        let (mut x0, mut y0, mut x1, mut y1) = (w, h, 0usize, 0usize);
        let mut area = 0usize;

        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % w, idx / w);
            area += 1;
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
            for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    let n = ny * w + nx;
                    if filled[n] && !visited[n] {
                        visited[n] = true;
                        stack.push(n);
                    }
                }
            }
        }

        regions.push(Region {
            bbox: BoundingBox {
                x: x0,
                y: y0,
                width: x1 - x0 + 1,
                height: y1 - y0 + 1,
            },
            area,
        });
    }
    regions
}

/// Bounding box of the union of all outer regions, if any ink exists.
pub fn ink_bounds(mask: ImageView<'_, u8>) -> Option<BoundingBox> {
    outer_regions(mask)
        .into_iter()
        .map(|r| r.bbox)
        .reduce(|acc, b| acc.union(&b))
}

/// Crops `bbox` out of `img` into an owned raster.
pub fn crop(img: &RasterImage, bbox: BoundingBox) -> Option<RasterImage> {
    img.view()
        .roi(bbox.x, bbox.y, bbox.width, bbox.height)
        .ok()
        .map(|roi| roi.to_owned_image())
}

/// Marks foreground plus every background pixel not 4-connected to the border.
fn fill_holes(mask: ImageView<'_, u8>) -> Vec<bool> {
    let (w, h) = (mask.width(), mask.height());
    let mut fg = vec![false; w * h];
    for y in 0..h {
        if let Some(row) = mask.row(y) {
            for (x, &v) in row.iter().enumerate() {
                fg[y * w + x] = v != 0;
            }
        }
    }

    let mut outside = vec![false; w * h];
    let mut stack = Vec::new();
    let seed = |idx: usize, stack: &mut Vec<usize>, outside: &mut [bool]| {
        if !fg[idx] && !outside[idx] {
            outside[idx] = true;
            stack.push(idx);
        }
    };
    for x in 0..w {
        seed(x, &mut stack, &mut outside);
        seed((h - 1) * w + x, &mut stack, &mut outside);
    }
    for y in 0..h {
        seed(y * w, &mut stack, &mut outside);
        seed(y * w + w - 1, &mut stack, &mut outside);
    }

    while let Some(idx) = stack.pop() {
        let (x, y) = (idx % w, idx / w);
        let mut neighbours = [None; 4];
        if x > 0 {
            neighbours[0] = Some(idx - 1);
        }
        if x + 1 < w {
            neighbours[1] = Some(idx + 1);
        }
        if y > 0 {
            neighbours[2] = Some(idx - w);
        }
        if y + 1 < h {
            neighbours[3] = Some(idx + w);
        }
        for n in neighbours.into_iter().flatten() {
            if !fg[n] && !outside[n] {
                outside[n] = true;
                stack.push(n);
            }
        }
    }

    outside.into_iter().map(|o| !o).collect()
}
