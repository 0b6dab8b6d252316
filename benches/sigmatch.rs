use criterion::{criterion_group, criterion_main, Criterion};
use sigmatch::keypoint::{extract_descriptors, OrbConfig};
use sigmatch::normalize::normalize_default;
use sigmatch::{Corpus, FeatureConfig, MatchConfig, Matcher, NameIndex, RasterImage, Scorer, Signature};
use std::hint::black_box;

/// A wavy stroke with an underline on light paper.
fn make_signature(width: usize, height: usize, period: f32, phase: f32) -> RasterImage {
    RasterImage::from_fn(width, height, |x, y| {
        let t = x as f32 * std::f32::consts::TAU / period + phase;
        let centre = height as f32 * 0.4 + height as f32 * 0.2 * t.sin();
        let stroke = x > 20 && x < width - 20 && (y as f32 - centre).abs() <= 3.5;
        let underline = x > 40 && x < width - 40 && y >= height * 4 / 5 && y < height * 4 / 5 + 4;
        if stroke || underline {
            20
        } else {
            240
        }
    })
    .unwrap()
}

fn bench_stages(c: &mut Criterion) {
    let page = make_signature(480, 160, 90.0, 0.0);
    let other = make_signature(480, 160, 130.0, 1.1);
    let features = FeatureConfig::default();

    c.bench_function("normalize_480x160", |b| {
        b.iter(|| normalize_default(black_box(&page)).unwrap())
    });

    c.bench_function("orb_extract_480x160", |b| {
        b.iter(|| extract_descriptors(black_box(&page), &OrbConfig::default()).unwrap())
    });

    let query = Signature::new(page.clone());
    let item = Signature::new(other.clone());
    query.normalized(&features).unwrap();
    item.normalized(&features).unwrap();
    for scorer in [
        Scorer::template(),
        Scorer::structural_compact(),
        Scorer::structural_canonical(),
    ] {
        c.bench_function(&format!("score_{}", scorer.method().as_str()), |b| {
            b.iter(|| scorer.score(black_box(&query), black_box(&item), &features).unwrap())
        });
    }
}

fn bench_identify(c: &mut Criterion) {
    let query = make_signature(480, 160, 90.0, 0.0);
    let corpus: Corpus = (0..16)
        .map(|i| {
            let period = 70.0 + 8.0 * i as f32;
            (format!("sig_{i:02}.png"), make_signature(480, 160, period, 0.3 * i as f32))
        })
        .collect();
    let names = NameIndex::new();

    let sequential = Matcher::new();
    c.bench_function("identify_16_sequential", |b| {
        b.iter(|| {
            sequential
                .identify(black_box(&query), &corpus, &names)
                .unwrap()
        })
    });

    let parallel = Matcher::new().with_config(MatchConfig {
        parallel: true,
        ..MatchConfig::default()
    });
    c.bench_function("identify_16_parallel", |b| {
        b.iter(|| parallel.identify(black_box(&query), &corpus, &names).unwrap())
    });
}

criterion_group!(benches, bench_stages, bench_identify);
criterion_main!(benches);
