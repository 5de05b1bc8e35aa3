//! Criterion benchmarks for per-request strategy cost.
//!
//! Benchmarks:
//! 1. Full pipeline per strategy on one year of daily closes
//! 2. Random forest fit alone across history lengths

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pricelab_core::domain::PriceSeries;
use pricelab_core::models::{ForestConfig, ModelKind, RandomForest, Regressor};
use pricelab_core::pipeline::Predictor;
use pricelab_core::rng::SeedHierarchy;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + i as f64 * 0.15 + (i as f64 * 0.1).sin() * 10.0)
        .collect()
}

fn make_series(n: usize) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    PriceSeries::from_closes(start, &make_closes(n)).unwrap()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_pipeline(c: &mut Criterion) {
    let series = make_series(252);
    let predictor = Predictor::default();
    let mut group = c.benchmark_group("pipeline_252");
    group.sample_size(10);

    for kind in ModelKind::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(kind), &kind, |b, &kind| {
            b.iter(|| predictor.predict_with("BENCH", black_box(&series), kind))
        });
    }
    group.finish();
}

fn bench_forest_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest_fit");
    group.sample_size(10);

    for n in [126usize, 252, 1260] {
        let closes = make_closes(n + 1);
        let (x, y) = (closes[..n].to_vec(), closes[1..].to_vec());
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let mut forest = RandomForest::new(ForestConfig::default(), SeedHierarchy::default());
                forest.fit(black_box(&x), black_box(&y)).map(|_| forest.n_trees())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_forest_fit);
criterion_main!(benches);
