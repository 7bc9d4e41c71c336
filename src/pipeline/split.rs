//! Train/test partitioning and read-only feature projection

use std::sync::Arc;

use anyhow::{Context, Result};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A frozen train/test pair of feature frames with their binary labels.
///
/// Candidates never mutate a split. `project` derives a new view holding
/// only the requested columns; the base split stays untouched.
#[derive(Debug, Clone)]
pub struct DataSplit {
    train: DataFrame,
    train_labels: Arc<[f64]>,
    test: DataFrame,
    test_labels: Arc<[f64]>,
}

impl DataSplit {
    /// Build a split from already partitioned frames.
    ///
    /// Both frames must hold the same feature columns and one label per row.
    pub fn new(
        train: DataFrame,
        train_labels: Vec<f64>,
        test: DataFrame,
        test_labels: Vec<f64>,
    ) -> Result<Self> {
        if train.height() != train_labels.len() {
            anyhow::bail!(
                "Train frame has {} rows but {} labels were given",
                train.height(),
                train_labels.len()
            );
        }
        if test.height() != test_labels.len() {
            anyhow::bail!(
                "Test frame has {} rows but {} labels were given",
                test.height(),
                test_labels.len()
            );
        }
        if train.get_column_names() != test.get_column_names() {
            anyhow::bail!("Train and test frames must have the same feature columns");
        }

        Ok(Self {
            train,
            train_labels: train_labels.into(),
            test,
            test_labels: test_labels.into(),
        })
    }

    /// Partition `features` into train and test sets, stratified by label.
    ///
    /// Each class contributes `round(class_rows * test_size)` rows to the test
    /// set, at least one and never all of them. The shuffle is seeded so the
    /// same inputs always give the same partition.
    pub fn partition(features: &DataFrame, labels: &[f64], test_size: f64, seed: u64) -> Result<Self> {
        if !(test_size > 0.0 && test_size < 1.0) {
            anyhow::bail!("Test size must be between 0 and 1 (exclusive), got {}", test_size);
        }
        if features.height() != labels.len() {
            anyhow::bail!(
                "Feature frame has {} rows but {} labels were given",
                features.height(),
                labels.len()
            );
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut train_idx: Vec<IdxSize> = Vec::new();
        let mut test_idx: Vec<IdxSize> = Vec::new();

        for class in [0.0, 1.0] {
            let mut rows: Vec<IdxSize> = labels
                .iter()
                .enumerate()
                .filter(|(_, y)| **y == class)
                .map(|(i, _)| i as IdxSize)
                .collect();

            if rows.len() < 2 {
                anyhow::bail!(
                    "Class {} has {} row(s); at least 2 are needed to fill both train and test sets",
                    class,
                    rows.len()
                );
            }

            rows.shuffle(&mut rng);
            let n_test = ((rows.len() as f64 * test_size).round() as usize).clamp(1, rows.len() - 1);
            test_idx.extend_from_slice(&rows[..n_test]);
            train_idx.extend_from_slice(&rows[n_test..]);
        }

        // Keep source row order within each side
        train_idx.sort_unstable();
        test_idx.sort_unstable();

        let take = |idx: &[IdxSize]| -> Result<(DataFrame, Vec<f64>)> {
            let ca = IdxCa::from_vec("idx".into(), idx.to_vec());
            let frame = features.take(&ca).context("Failed to select partition rows")?;
            let y = idx.iter().map(|&i| labels[i as usize]).collect();
            Ok((frame, y))
        };

        let (train, train_labels) = take(&train_idx)?;
        let (test, test_labels) = take(&test_idx)?;

        Self::new(train, train_labels, test, test_labels)
    }

    /// Derive a view holding only `subset`, in the given order
    pub fn project(&self, subset: &[String]) -> Result<Self> {
        let train = self
            .train
            .select(subset.iter().map(|s| s.as_str()))
            .context("Failed to project train features")?;
        let test = self
            .test
            .select(subset.iter().map(|s| s.as_str()))
            .context("Failed to project test features")?;

        Ok(Self {
            train,
            train_labels: Arc::clone(&self.train_labels),
            test,
            test_labels: Arc::clone(&self.test_labels),
        })
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.train
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn n_features(&self) -> usize {
        self.train.width()
    }

    pub fn has_feature(&self, name: &str) -> bool {
        self.train.get_column_index(name).is_some()
    }

    pub fn train(&self) -> &DataFrame {
        &self.train
    }

    pub fn test(&self) -> &DataFrame {
        &self.test
    }

    pub fn train_labels(&self) -> &[f64] {
        &self.train_labels
    }

    pub fn test_labels(&self) -> &[f64] {
        &self.test_labels
    }
}
