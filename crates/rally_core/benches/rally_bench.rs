//! Criterion benchmarks for the rally pipeline
//!
//! Covers: segmentation alone, full rally analysis, and the single-shot
//! query path, across rally lengths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rally_core::engine::{RallyAnalyzer, RallyInput, SequentialIdGenerator, ShotSegmenter};
use rally_core::models::TrajectoryPoint;
use rally_core::EngineConfig;

/// Shuttle bouncing between the baselines, one crossing per `shot_ms`.
fn make_rally(shots: usize, samples_per_shot: usize) -> Vec<TrajectoryPoint> {
    let shot_ms = 900.0;
    let mut points = Vec::with_capacity(shots * samples_per_shot);
    for s in 0..shots {
        let (from, to) = if s % 2 == 0 { (0.1, 0.9) } else { (0.9, 0.1) };
        let x = 0.2 + 0.6 * ((s * 7) % 5) as f64 / 4.0;
        for k in 0..samples_per_shot {
            let t = k as f64 / samples_per_shot as f64;
            points.push(TrajectoryPoint::new(
                x,
                from + (to - from) * t,
                s as f64 * shot_ms + t * shot_ms,
            ));
        }
    }
    points
}

fn bench_segmentation(c: &mut Criterion) {
    let config = EngineConfig::default();
    let segmenter = ShotSegmenter::new(&config.segmentation);
    let mut group = c.benchmark_group("segmentation");
    for shots in [5usize, 20, 80] {
        let rally = make_rally(shots, 12);
        group.bench_with_input(BenchmarkId::from_parameter(shots), &rally, |b, rally| {
            b.iter(|| black_box(segmenter.segment_shots(black_box(rally), None)));
        });
    }
    group.finish();
}

fn bench_analyze_rally(c: &mut Criterion) {
    let analyzer = RallyAnalyzer::default();
    let mut group = c.benchmark_group("analyze_rally");
    for shots in [5usize, 20, 80] {
        let rally = make_rally(shots, 12);
        group.bench_with_input(BenchmarkId::from_parameter(shots), &rally, |b, rally| {
            let mut ids = SequentialIdGenerator::new("bench");
            b.iter(|| {
                let input = RallyInput::new("bench", black_box(rally));
                black_box(analyzer.analyze_rally(&input, &mut ids))
            });
        });
    }
    group.finish();
}

fn bench_single_shot(c: &mut Criterion) {
    let analyzer = RallyAnalyzer::default();
    let rally = make_rally(20, 12);

    c.bench_function("recommendations_for_shot", |b| {
        let mut ids = SequentialIdGenerator::new("bench");
        b.iter(|| {
            black_box(analyzer.generate_recommendations_for_shot(
                black_box(&rally),
                10,
                Some((0.5, 0.8)),
                &mut ids,
            ))
        });
    });
}

criterion_group!(benches, bench_segmentation, bench_analyze_rally, bench_single_shot);
criterion_main!(benches);
