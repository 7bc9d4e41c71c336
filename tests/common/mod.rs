//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use featkeep::pipeline::{DataSplit, ImportanceKind};
use polars::prelude::*;
use tempfile::TempDir;

/// Feature name for rank position `i` (0 = most important)
pub fn feature_name(i: usize) -> String {
    format!("f{:03}", i)
}

/// A split with `n_features` constant columns and a few rows.
///
/// The values never matter to synthetic evaluators; only the projected
/// column set does.
pub fn synthetic_split(n_features: usize) -> DataSplit {
    let columns: Vec<Column> = (0..n_features)
        .map(|i| Column::new(feature_name(i).into(), vec![i as f64; 4]))
        .collect();
    let train = DataFrame::new(columns.clone()).unwrap();
    let test = DataFrame::new(columns).unwrap();
    DataSplit::new(train, vec![0.0, 1.0, 0.0, 1.0], test, vec![0.0, 1.0, 0.0, 1.0]).unwrap()
}

/// Importances where feature `i` has importance `n_features - i`,
/// so the ranking is f000, f001, ...
pub fn linear_importance(n_features: usize) -> HashMap<ImportanceKind, HashMap<String, f64>> {
    let gain: HashMap<String, f64> = (0..n_features)
        .map(|i| (feature_name(i), (n_features - i) as f64))
        .collect();
    let mut provider = HashMap::new();
    provider.insert(ImportanceKind::Gain, gain);
    provider
}

/// Evaluator returning a fixed score per retained-feature count
pub struct TableEvaluator {
    pub scores: HashMap<usize, f64>,
    pub default: f64,
    pub calls: AtomicUsize,
}

impl TableEvaluator {
    pub fn new(pairs: &[(usize, f64)], default: f64) -> Self {
        Self {
            scores: pairs.iter().copied().collect(),
            default,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl featkeep::pipeline::Evaluator for TableEvaluator {
    fn evaluate(&self, view: &DataSplit, _seed: u64) -> anyhow::Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        // Every candidate must see exactly the top-n features, in rank order
        let names = view.feature_names();
        let expected: Vec<String> = (0..names.len()).map(feature_name).collect();
        anyhow::ensure!(names == expected, "unexpected subset {:?}", names);

        Ok(self
            .scores
            .get(&view.n_features())
            .copied()
            .unwrap_or(self.default))
    }
}

/// Scores from the reference coarse sweep over 70 features
pub fn reference_coarse_scores() -> Vec<(usize, f64)> {
    vec![
        (53, 0.984),
        (48, 0.9836),
        (43, 0.9831),
        (38, 0.9829),
        (33, 0.9817),
        (28, 0.9804),
        (23, 0.9778),
        (18, 0.9739),
    ]
}

/// A classification dataset where `signal_*` columns carry the label and
/// `noise_*` columns do not
pub fn create_signal_dataframe(rows: usize, signal: usize, noise: usize) -> DataFrame {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(17);

    let target: Vec<i32> = (0..rows).map(|i| (i % 2) as i32).collect();
    let mut columns: Vec<Column> = Vec::with_capacity(signal + noise + 1);
    columns.push(Column::new("target".into(), target.clone()));

    for s in 0..signal {
        let values: Vec<f64> = target
            .iter()
            .map(|&y| y as f64 * (2.0 + s as f64) + rng.gen::<f64>())
            .collect();
        columns.push(Column::new(format!("signal_{}", s).into(), values));
    }

    for n in 0..noise {
        let values: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>()).collect();
        columns.push(Column::new(format!("noise_{}", n).into(), values));
    }

    DataFrame::new(columns).unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Write an importance JSON file next to other fixtures in `dir`
pub fn write_importance_file(dir: &TempDir, json: &str) -> PathBuf {
    let path = dir.path().join("importance.json");
    std::fs::write(&path, json).unwrap();
    path
}
