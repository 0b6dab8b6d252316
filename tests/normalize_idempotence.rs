mod common;

use common::{block, cursive, BLOCK_A, CURSIVE_A, CURSIVE_C};
use sigmatch::normalize::{normalize_default, CANVAS_HEIGHT, CANVAS_WIDTH};
use sigmatch::RasterImage;

/// Fraction of samples that differ between two equally sized rasters.
fn mismatch(a: &RasterImage, b: &RasterImage) -> f32 {
    let differing = a
        .data()
        .iter()
        .zip(b.data())
        .filter(|(x, y)| x != y)
        .count();
    differing as f32 / a.data().len() as f32
}

#[test]
fn renormalizing_a_canvas_is_stable() {
    for page in [cursive(CURSIVE_A), cursive(CURSIVE_C), block(&BLOCK_A)] {
        let once = normalize_default(&page).unwrap();
        let twice = normalize_default(once.canvas()).unwrap();
        assert_eq!(
            (twice.canvas().width(), twice.canvas().height()),
            (CANVAS_WIDTH, CANVAS_HEIGHT)
        );
        let drift = mismatch(once.canvas(), twice.canvas());
        assert!(drift < 0.02, "drift {drift}");
        let ink_ratio = twice.ink_count() as f32 / once.ink_count() as f32;
        assert!((0.95..=1.05).contains(&ink_ratio), "ink ratio {ink_ratio}");
    }
}

#[test]
fn canvas_is_binary_with_ink_high() {
    let norm = normalize_default(&cursive(CURSIVE_A)).unwrap();
    assert!(norm.canvas().data().iter().all(|&v| v == 0 || v == 255));
    assert!(norm.ink_count() > 0);
    // Paper dominates the canvas.
    assert!(norm.ink_count() < CANVAS_WIDTH * CANVAS_HEIGHT / 2);
}

#[test]
fn scaled_copies_normalize_alike() {
    let small = cursive(CURSIVE_A);
    let large = RasterImage::from_fn(small.width() * 2, small.height() * 2, |x, y| {
        small.at(x / 2, y / 2)
    })
    .unwrap();
    let a = normalize_default(&small).unwrap();
    let b = normalize_default(&large).unwrap();
    let drift = mismatch(a.canvas(), b.canvas());
    assert!(drift < 0.05, "drift {drift}");
}
