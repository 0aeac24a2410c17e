use corrpeaks::{
    deduplicate, extract_topk, score_field, ImageView, MatchConfig, Matcher, Method, ScoreField,
    TemplateSize,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn make_image(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = ((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF;
            data.push(value as u8);
        }
    }
    data
}

fn extract_patch(
    image: &[u8],
    img_width: usize,
    x0: usize,
    y0: usize,
    width: usize,
    height: usize,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = (y0 + y) * img_width;
        out.extend_from_slice(&image[row + x0..row + x0 + width]);
    }
    out
}

fn make_field(width: usize, height: usize) -> ScoreField {
    let data = (0..width * height)
        .map(|i| {
            let (x, y) = ((i % width) as f32, (i / width) as f32);
            (x * 0.05).sin() * (y * 0.07).cos()
        })
        .collect();
    ScoreField::new(data, width, height).unwrap()
}

fn bench_extraction(c: &mut Criterion) {
    let field = make_field(640, 480);
    let tpl = TemplateSize::new(32, 32).unwrap();

    c.bench_function("extract_topk_k50", |b| {
        b.iter(|| black_box(extract_topk(&field, Method::CcoeffNormed, tpl, 50, 0.0).unwrap()));
    });

    let raw = extract_topk(&field, Method::CcoeffNormed, tpl, 50, 0.0).unwrap();
    c.bench_function("deduplicate_50", |b| {
        b.iter(|| black_box(deduplicate(&raw, 0.3, 5).unwrap()));
    });
}

fn bench_matcher(c: &mut Criterion) {
    let img_width = 256;
    let img_height = 192;
    let image = make_image(img_width, img_height);
    let view = ImageView::from_slice(&image, img_width, img_height).unwrap();
    let tpl = extract_patch(&image, img_width, 90, 60, 24, 24);
    let tpl_view = ImageView::from_slice(&tpl, 24, 24).unwrap();

    c.bench_function("score_field_ccoeff", |b| {
        b.iter(|| black_box(score_field(view, tpl_view, Method::CcoeffNormed).unwrap()));
    });

    let matcher = Matcher::new(Method::CcoeffNormed).with_config(MatchConfig {
        parallel: cfg!(feature = "rayon"),
        ..MatchConfig::default()
    });
    c.bench_function("match_image_ccoeff", |b| {
        b.iter(|| black_box(matcher.match_image(view, tpl_view, None).unwrap()));
    });
}

criterion_group!(benches, bench_extraction, bench_matcher);
criterion_main!(benches);
