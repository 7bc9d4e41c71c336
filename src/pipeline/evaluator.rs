//! Candidate evaluation: train on a feature subset, score on held-out rows

use anyhow::{Context, Result};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::metrics::roc_auc;
use super::split::DataSplit;

/// Trains a classifier on a projected split and returns its test score.
///
/// `view` holds exactly the candidate's features. Implementations must be
/// deterministic for a fixed view and `seed`.
pub trait Evaluator: Sync {
    fn evaluate(&self, view: &DataSplit, seed: u64) -> Result<f64>;
}

impl<F> Evaluator for F
where
    F: Fn(&DataSplit, u64) -> Result<f64> + Sync,
{
    fn evaluate(&self, view: &DataSplit, seed: u64) -> Result<f64> {
        self(view, seed)
    }
}

/// L2-regularized logistic regression fitted with mini-batch SGD, scored by
/// ROC AUC on the test rows.
///
/// Features are standardized with train statistics; missing values are
/// imputed with the train mean.
#[derive(Debug, Clone)]
pub struct LogisticEvaluator {
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
    pub batch_size: usize,
}

impl Default for LogisticEvaluator {
    fn default() -> Self {
        Self {
            epochs: 50,
            learning_rate: 0.1,
            l2: 1e-4,
            batch_size: 32,
        }
    }
}

impl Evaluator for LogisticEvaluator {
    fn evaluate(&self, view: &DataSplit, seed: u64) -> Result<f64> {
        let train_cols = numeric_columns(view.train()).context("Invalid train features")?;
        let test_cols = numeric_columns(view.test()).context("Invalid test features")?;

        let scalers: Vec<Standardizer> = train_cols.iter().map(|c| Standardizer::fit(c)).collect();
        let x_train = to_rows(&train_cols, &scalers, view.train().height());
        let x_test = to_rows(&test_cols, &scalers, view.test().height());

        let (weights, bias) = self.fit(&x_train, view.train_labels(), seed);

        let scores: Vec<f64> = x_test
            .iter()
            .map(|row| linear(row, &weights, bias))
            .collect();

        Ok(roc_auc(&scores, view.test_labels()))
    }
}

impl LogisticEvaluator {
    fn fit(&self, x: &[Vec<f64>], y: &[f64], seed: u64) -> (Vec<f64>, f64) {
        let n_features = x.first().map(|r| r.len()).unwrap_or(0);
        let mut weights = vec![0.0; n_features];
        let mut bias = 0.0;

        if x.is_empty() {
            return (weights, bias);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut order: Vec<usize> = (0..x.len()).collect();
        let batch_size = self.batch_size.max(1);

        for _ in 0..self.epochs {
            order.shuffle(&mut rng);

            for batch in order.chunks(batch_size) {
                let mut grad_w = vec![0.0; n_features];
                let mut grad_b = 0.0;

                for &i in batch {
                    let err = sigmoid(linear(&x[i], &weights, bias)) - y[i];
                    for (g, v) in grad_w.iter_mut().zip(x[i].iter()) {
                        *g += err * v;
                    }
                    grad_b += err;
                }

                let scale = self.learning_rate / batch.len() as f64;
                for (w, g) in weights.iter_mut().zip(grad_w.iter()) {
                    *w -= scale * g + self.learning_rate * self.l2 * *w;
                }
                bias -= scale * grad_b;
            }
        }

        (weights, bias)
    }
}

/// Mean/scale pair fitted on train values, ignoring missing entries
struct Standardizer {
    mean: f64,
    std: f64,
}

impl Standardizer {
    fn fit(values: &[f64]) -> Self {
        let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if present.is_empty() {
            return Self { mean: 0.0, std: 1.0 };
        }

        let n = present.len() as f64;
        let mean = present.iter().sum::<f64>() / n;
        let var = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = if var > 0.0 { var.sqrt() } else { 1.0 };

        Self { mean, std }
    }

    fn transform(&self, value: f64) -> f64 {
        if value.is_nan() {
            0.0
        } else {
            (value - self.mean) / self.std
        }
    }
}

/// Extract every column as f64, with nulls as NaN
fn numeric_columns(df: &DataFrame) -> Result<Vec<Vec<f64>>> {
    df.get_columns()
        .iter()
        .map(|col| {
            if !col.dtype().is_primitive_numeric() && !col.dtype().is_bool() {
                anyhow::bail!(
                    "Feature '{}' has non-numeric type {}; the built-in evaluator needs numeric features",
                    col.name(),
                    col.dtype()
                );
            }
            let float_col = col
                .cast(&DataType::Float64)
                .with_context(|| format!("Failed to cast '{}' to Float64", col.name()))?;
            Ok(float_col
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect())
        })
        .collect()
}

fn to_rows(columns: &[Vec<f64>], scalers: &[Standardizer], height: usize) -> Vec<Vec<f64>> {
    (0..height)
        .map(|i| {
            columns
                .iter()
                .zip(scalers.iter())
                .map(|(col, s)| s.transform(col[i]))
                .collect()
        })
        .collect()
}

#[inline]
fn linear(row: &[f64], weights: &[f64], bias: f64) -> f64 {
    row.iter().zip(weights.iter()).map(|(x, w)| x * w).sum::<f64>() + bias
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
