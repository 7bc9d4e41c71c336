//! Confidence-adjusted acceptance threshold

use super::error::{Result, SearchError};

/// Pass/fail cutoff derived from a target score and a confidence level.
///
/// `threshold = auc_limit * (ci - (1 - ci) / 2)`. At `ci = 1` the
/// threshold equals `auc_limit` exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptanceThreshold {
    auc_limit: f64,
    ci: f64,
    value: f64,
}

impl AcceptanceThreshold {
    pub fn new(auc_limit: f64, ci: f64) -> Result<Self> {
        if !auc_limit.is_finite() {
            return Err(SearchError::InvalidScoreLimit(auc_limit));
        }
        if !(ci > 0.0 && ci <= 1.0) {
            return Err(SearchError::InvalidConfidence(ci));
        }

        Ok(Self {
            auc_limit,
            ci,
            value: auc_limit * z_factor(ci),
        })
    }

    pub fn auc_limit(&self) -> f64 {
        self.auc_limit
    }

    pub fn ci(&self) -> f64 {
        self.ci
    }

    /// The cutoff a candidate score must meet or exceed
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn passes(&self, score: f64) -> bool {
        score >= self.value
    }
}

/// Discount applied to the target score for a confidence level
#[inline]
pub fn z_factor(ci: f64) -> f64 {
    ci - (1.0 - ci) / 2.0
}
