//! Normalized cross-correlation scorers: whole canvas and letter-by-letter.

use crate::image::resize::resize_image;
use crate::image::RasterImage;
use crate::kernel::{zncc_at, zncc_scan_best};
use crate::normalize::NormalizedSignature;
use crate::segment::Glyph;
use crate::template::TemplatePlan;
use crate::util::SigMatchResult;

/// Best ZNCC of `template` over `image`, clamped to `[0, 1]`.
///
/// Flat inputs have no defined correlation and score 0.
fn best_correlation(image: &RasterImage, template: &RasterImage) -> SigMatchResult<f32> {
    let Ok(plan) = TemplatePlan::from_view(template.view()) else {
        return Ok(0.0);
    };
    let peak = zncc_scan_best(image.view(), &plan)?;
    Ok(peak.map_or(0.0, |p| p.score.max(0.0)))
}

/// Whole-canvas template correlation in `[0, 100]`.
///
/// Both canvases are resampled to `size` first, so the scan has a single
/// placement and the result is the plain correlation coefficient.
pub fn template_similarity(
    query: &NormalizedSignature,
    item: &NormalizedSignature,
    size: (usize, usize),
) -> SigMatchResult<f32> {
    let a = resize_image(query.canvas(), size.0, size.1)?;
    let b = resize_image(item.canvas(), size.0, size.1)?;
    Ok(best_correlation(&a, &b)? * 100.0)
}

/// Letter-by-letter correlation in `[0, 100]`, rounded to two decimals.
///
/// The first `min(len)` glyphs are paired by position, not by letter
/// identity, so differing glyph counts or orderings pair unrelated letters.
/// An empty sequence on either side scores 0.
pub fn letterwise_similarity(
    query: &[Glyph],
    item: &[Glyph],
    glyph_size: (usize, usize),
) -> SigMatchResult<f32> {
    let pairs = query.len().min(item.len());
    if pairs == 0 {
        return Ok(0.0);
    }

    let mut total = 0.0f32;
    for (qg, ig) in query.iter().zip(item.iter()) {
        let a = resize_image(&qg.image, glyph_size.0, glyph_size.1)?;
        let b = resize_image(&ig.image, glyph_size.0, glyph_size.1)?;
        let Ok(plan) = TemplatePlan::from_view(b.view()) else {
            continue;
        };
        total += zncc_at(a.view(), &plan, 0, 0).map_or(0.0, |s| s.max(0.0));
    }

    let mean = (total / pairs as f32 * 100.0).clamp(0.0, 100.0);
    Ok((mean * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::{letterwise_similarity, template_similarity};
    use crate::image::region::BoundingBox;
    use crate::image::RasterImage;
    use crate::normalize::{NormalizedSignature, CANVAS_HEIGHT, CANVAS_WIDTH};
    use crate::segment::Glyph;

    fn glyph(ordinal: usize, f: impl Fn(usize, usize) -> bool) -> Glyph {
        let image = RasterImage::from_fn(20, 30, |x, y| if f(x, y) { 255 } else { 0 }).unwrap();
        Glyph {
            ordinal,
            bbox: BoundingBox {
                x: ordinal * 40,
                y: 0,
                width: 20,
                height: 30,
            },
            image,
        }
    }

    fn ring_glyph(ordinal: usize) -> Glyph {
        glyph(ordinal, |x, y| x < 4 || x >= 16 || y < 4 || y >= 26)
    }

    fn ell_glyph(ordinal: usize) -> Glyph {
        glyph(ordinal, |x, y| x < 5 || y >= 25)
    }

    fn canvas(f: impl Fn(usize, usize) -> bool) -> NormalizedSignature {
        let img = RasterImage::from_fn(CANVAS_WIDTH, CANVAS_HEIGHT, |x, y| {
            if f(x, y) {
                255
            } else {
                0
            }
        })
        .unwrap();
        NormalizedSignature::from_canvas(img).unwrap()
    }

    #[test]
    fn identical_canvases_score_full_marks() {
        let sig = canvas(|x, y| (x / 7 + y / 5) % 3 == 0);
        let score = template_similarity(&sig, &sig, (300, 90)).unwrap();
        assert!(score > 99.5, "score {score}");
    }

    #[test]
    fn blank_canvas_scores_zero() {
        let sig = canvas(|x, y| (x / 7 + y / 5) % 3 == 0);
        let blank = canvas(|_, _| false);
        assert_eq!(template_similarity(&sig, &blank, (300, 90)).unwrap(), 0.0);
        assert_eq!(template_similarity(&blank, &sig, (300, 90)).unwrap(), 0.0);
    }

    #[test]
    fn letterwise_pairs_by_position() {
        let a = vec![ring_glyph(0), ell_glyph(1)];
        let same = letterwise_similarity(&a, &a, (40, 40)).unwrap();
        assert_eq!(same, 100.0);

        let swapped = vec![ell_glyph(0), ring_glyph(1)];
        let score = letterwise_similarity(&a, &swapped, (40, 40)).unwrap();
        assert!(score < 90.0, "score {score}");
        assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn letterwise_empty_sequence_scores_zero() {
        assert_eq!(letterwise_similarity(&[], &[ring_glyph(0)], (40, 40)).unwrap(), 0.0);
    }

    #[test]
    fn letterwise_uses_shorter_sequence() {
        let long = vec![ring_glyph(0), ell_glyph(1), ring_glyph(2)];
        let short = vec![ring_glyph(0), ell_glyph(1)];
        assert_eq!(letterwise_similarity(&long, &short, (40, 40)).unwrap(), 100.0);
    }
}
