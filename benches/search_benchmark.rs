//! Benchmark for coarse and fine feature count searches
//!
//! Run with: cargo bench --bench search_benchmark

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use polars::prelude::*;
use rand::prelude::*;
use rand::SeedableRng;

use featkeep::pipeline::{
    DataSplit, FeatureCountSearch, ImportanceKind, LogisticEvaluator, SearchConfig,
};

/// Synthetic classification data: the first `n_signal` features carry the label
fn generate_split(n_rows: usize, n_features: usize, n_signal: usize, seed: u64) -> DataSplit {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let labels: Vec<f64> = (0..n_rows).map(|i| (i % 2) as f64).collect();
    let columns: Vec<Column> = (0..n_features)
        .map(|i| {
            let values: Vec<f64> = labels
                .iter()
                .map(|&y| {
                    let noise = rng.gen::<f64>() * 2.0;
                    if i < n_signal {
                        y + noise
                    } else {
                        noise
                    }
                })
                .collect();
            Column::new(format!("feature_{}", i).into(), values)
        })
        .collect();

    let features = DataFrame::new(columns).expect("Failed to create DataFrame");
    DataSplit::partition(&features, &labels, 0.25, seed).expect("Failed to partition")
}

fn generate_importance(n_features: usize) -> HashMap<ImportanceKind, HashMap<String, f64>> {
    let gain = (0..n_features)
        .map(|i| (format!("feature_{}", i), (n_features - i) as f64))
        .collect();
    HashMap::from([(ImportanceKind::Gain, gain)])
}

fn config(workers: Option<usize>) -> SearchConfig {
    SearchConfig {
        workers,
        seed: 42,
        show_progress: false,
    }
}

/// Coarse sweep cost as the ranking grows
fn benchmark_broad_by_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("broad_search_by_features");
    group.sample_size(10);

    let evaluator = LogisticEvaluator::default();

    for n_features in [20, 50, 100] {
        let split = generate_split(2_000, n_features, 5, 42);
        let importances = generate_importance(n_features);

        group.bench_with_input(
            BenchmarkId::from_parameter(n_features),
            &n_features,
            |b, _| {
                let search = FeatureCountSearch::new(&importances, &evaluator, &split)
                    .with_config(config(None));
                b.iter(|| {
                    black_box(
                        search
                            .automated_broad_search(0.7, ImportanceKind::Gain, 0.99, 5)
                            .unwrap(),
                    )
                })
            },
        );
    }

    group.finish();
}

/// Fine sweep with a single worker vs the global pool
fn benchmark_precise_by_workers(c: &mut Criterion) {
    let mut group = c.benchmark_group("precise_search_by_workers");
    group.sample_size(10);

    let evaluator = LogisticEvaluator::default();
    let split = generate_split(2_000, 50, 5, 7);
    let importances = generate_importance(50);

    for (label, workers) in [("single", Some(1)), ("global", None)] {
        group.bench_function(label, |b| {
            let search = FeatureCountSearch::new(&importances, &evaluator, &split)
                .with_config(config(workers));
            b.iter(|| {
                black_box(
                    search
                        .automated_precise_search(25, 0.7, ImportanceKind::Gain, 0.99, 5)
                        .unwrap(),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_broad_by_features, benchmark_precise_by_workers);
criterion_main!(benches);
