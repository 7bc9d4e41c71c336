//! Error and warning types for the feature count search.
//!
//! Fatal conditions are `SearchError` variants and abort the search.
//! Recoverable conditions are reported as `SearchWarning`s on the outcome.

use thiserror::Error;

/// Result type for search operations
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that abort a feature count search
#[derive(Error, Debug)]
pub enum SearchError {
    /// Importance kind is not one of the recognized set
    #[error(
        "Unknown importance type: '{0}'. Use 'gain', 'weight', 'cover', 'total_gain', or 'total_cover'."
    )]
    InvalidImportanceType(String),

    /// The importance provider returned no features
    #[error("Importance table is empty - no features to rank")]
    EmptyImportance,

    /// An importance value is negative, NaN or infinite
    #[error("Feature '{feature}' has invalid importance {value}. Importances must be finite and non-negative.")]
    InvalidImportanceValue { feature: String, value: f64 },

    /// A ranked feature does not exist in the dataset
    #[error("Feature '{0}' has an importance score but is not present in the dataset")]
    UnknownFeature(String),

    /// Confidence level outside (0, 1]
    #[error("Confidence level must be in (0, 1], got {0}")]
    InvalidConfidence(f64),

    /// Target score is not a finite number
    #[error("Score limit must be a finite number, got {0}")]
    InvalidScoreLimit(f64),

    /// Step or span of zero
    #[error("{name} must be a positive integer, got {value}")]
    InvalidStep { name: &'static str, value: usize },

    /// Fine search start count is not a valid retained-feature count
    #[error("Start count {start} is out of range: must be between 1 and {total}")]
    StartCountOutOfRange { start: usize, total: usize },

    /// The importance provider failed
    #[error("Failed to obtain {kind} importance: {source}")]
    Importance {
        kind: String,
        #[source]
        source: anyhow::Error,
    },

    /// Projecting the split onto a candidate subset failed
    #[error("Failed to select top {count} features: {source}")]
    Projection {
        count: usize,
        #[source]
        source: anyhow::Error,
    },

    /// The evaluator failed to train or score a candidate
    #[error("Evaluation failed for {count} retained features: {source}")]
    Evaluation {
        count: usize,
        #[source]
        source: anyhow::Error,
    },

    /// The bounded worker pool could not be created
    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Non-fatal conditions recovered locally during a search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchWarning {
    /// No scanned candidate reached the threshold.
    /// `fallback` is the count returned by automated searches, if any.
    EmptyAcceptance {
        threshold: f64,
        fallback: Option<usize>,
    },
    /// The requested candidate range was clamped into `[1, total]`
    /// or collapsed to a single candidate. Bounds are `(high, low)`.
    DegenerateRange {
        requested: (i64, i64),
        scanned: (usize, usize),
    },
}

impl std::fmt::Display for SearchWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchWarning::EmptyAcceptance {
                threshold,
                fallback: Some(count),
            } => write!(
                f,
                "No candidate reached the threshold {:.5}; falling back to {} features",
                threshold, count
            ),
            SearchWarning::EmptyAcceptance {
                threshold,
                fallback: None,
            } => write!(f, "No candidate reached the threshold {:.5}", threshold),
            SearchWarning::DegenerateRange { requested, scanned } => write!(
                f,
                "Candidate range [{}, {}] adjusted to [{}, {}]",
                requested.1, requested.0, scanned.1, scanned.0
            ),
        }
    }
}
