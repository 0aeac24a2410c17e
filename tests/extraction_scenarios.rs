//! Behavioural checks for top-K extraction and greedy NMS on synthetic fields.

use corrpeaks::{
    deduplicate, extract_topk, find_best, Candidate, MatchConfig, Matcher, Method, Roi,
    ScoreField, TemplateSize,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn tpl10() -> TemplateSize {
    TemplateSize::new(10, 10).unwrap()
}

fn origins(cands: &[Candidate]) -> Vec<(usize, usize)> {
    cands.iter().map(|c| (c.bbox.x, c.bbox.y)).collect()
}

fn random_field(rng: &mut StdRng, width: usize, height: usize) -> ScoreField {
    let data = (0..width * height).map(|_| rng.random::<f32>()).collect();
    ScoreField::new(data, width, height).unwrap()
}

#[test]
fn sharp_minimum_on_flat_background() {
    let mut field = ScoreField::filled(60, 50, 1.0).unwrap();
    field.set(31, 17, 0.0);

    let hits = extract_topk(&field, Method::SqdiffNormed, tpl10(), 3, 0.5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(origins(&hits), vec![(31, 17)]);
    assert!((hits[0].confidence - 1.0).abs() < 1e-6);
    assert_eq!((hits[0].bbox.width, hits[0].bbox.height), (10, 10));
}

#[test]
fn two_separated_maxima_survive_nms() {
    let mut field = ScoreField::filled(100, 40, 0.1).unwrap();
    field.set(20, 20, 0.95);
    field.set(70, 20, 0.95);

    let raw = extract_topk(&field, Method::CcorrNormed, tpl10(), 5, 0.0).unwrap();
    assert!(raw.len() <= 5);
    assert_eq!(&origins(&raw)[..2], &[(20, 20), (70, 20)]);

    let kept = deduplicate(&raw, 0.3, 5).unwrap();
    assert_eq!(&origins(&kept)[..2], &[(20, 20), (70, 20)]);
    assert!(kept[0].bbox.iou(&kept[1].bbox) < 1e-6);
}

#[test]
fn overlapping_maxima_collapse_to_the_stronger() {
    let mut field = ScoreField::filled(100, 40, 0.1).unwrap();
    field.set(20, 20, 0.9);
    field.set(23, 20, 0.95);

    let raw = extract_topk(&field, Method::CcorrNormed, tpl10(), 5, 0.5).unwrap();
    assert_eq!(origins(&raw), vec![(23, 20), (20, 20)]);

    let kept = deduplicate(&raw, 0.3, 5).unwrap();
    assert_eq!(origins(&kept), vec![(23, 20)]);
}

#[test]
fn roi_offset_is_applied_to_every_match() {
    let mut field = ScoreField::filled(80, 60, -0.5).unwrap();
    field.set(5, 8, 0.95);
    field.set(50, 40, 0.9);
    let roi = Roi::new(20, 15, 89, 69);

    let matcher = Matcher::new(Method::CcoeffNormed).with_config(MatchConfig {
        min_confidence: 0.8,
        ..MatchConfig::default()
    });
    let local = matcher.match_field(&field, tpl10(), None).unwrap();
    let scene = matcher.match_field(&field, tpl10(), Some(&roi)).unwrap();

    assert_eq!(origins(&local), vec![(5, 8), (50, 40)]);
    assert_eq!(local.len(), scene.len());
    for (l, s) in local.iter().zip(scene.iter()) {
        assert_eq!((s.bbox.x, s.bbox.y), (l.bbox.x + 20, l.bbox.y + 15));
        assert_eq!(s.confidence, l.confidence);
        assert_eq!(s.raw_score, l.raw_score);
    }
}

#[test]
fn below_threshold_field_is_an_empty_success() {
    let field = ScoreField::filled(30, 30, 0.2).unwrap();
    let matcher = Matcher::new(Method::CcorrNormed);
    let matches = matcher.match_field(&field, tpl10(), None).unwrap();
    assert!(matches.is_empty());
}

#[test]
fn best_agrees_with_first_extracted_candidate() {
    let mut rng = StdRng::seed_from_u64(11);
    let field = random_field(&mut rng, 40, 30);
    for method in Method::ALL {
        let best = find_best(&field, method, tpl10()).unwrap();
        let hits = extract_topk(&field, method, tpl10(), 1, 0.0).unwrap();
        assert_eq!(hits, vec![best]);
    }
}

#[test]
fn random_fields_satisfy_extraction_and_nms_properties() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..40 {
        let width = rng.random_range(1..60);
        let height = rng.random_range(1..60);
        let field = random_field(&mut rng, width, height);
        let method = Method::ALL[rng.random_range(0..3)];
        let tpl = TemplateSize::new(rng.random_range(1..20), rng.random_range(1..20)).unwrap();
        let k = rng.random_range(1..40);
        let min_confidence = rng.random_range(0.0..0.9);
        let iou_threshold = rng.random_range(0.0..=1.0);
        let max_keep = rng.random_range(1..10);

        let before = field.clone();
        let raw = extract_topk(&field, method, tpl, k, min_confidence).unwrap();
        assert_eq!(field, before);
        assert!(raw.len() <= k);
        assert!(raw.iter().all(|c| c.confidence >= min_confidence));
        assert!(raw.iter().all(|c| (0.0..=1.0).contains(&c.confidence)));
        let mut seen = origins(&raw);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), raw.len());

        let kept = deduplicate(&raw, iou_threshold, max_keep).unwrap();
        assert!(kept.len() <= max_keep);
        assert!(kept.len() <= raw.len());
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                assert!(a.bbox.iou(&b.bbox) < iou_threshold);
            }
        }
        assert!(kept.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    }
}

#[test]
fn pipeline_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(99);
    let field = random_field(&mut rng, 64, 48);
    let matcher = Matcher::new(Method::CcoeffNormed).with_config(MatchConfig {
        max_results: 8,
        min_confidence: 0.5,
        ..MatchConfig::default()
    });
    let first = matcher.match_field(&field, tpl10(), None).unwrap();
    let second = matcher.match_field(&field, tpl10(), None).unwrap();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.bbox, b.bbox);
        assert_eq!(a.raw_score.to_bits(), b.raw_score.to_bits());
        assert_eq!(a.confidence.to_bits(), b.confidence.to_bits());
    }
}
