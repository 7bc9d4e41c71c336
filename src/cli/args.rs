//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

/// How the search is run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// Coarse sweep, report every accepted candidate
    Broad,
    /// Fine sweep around --start-count, report every accepted candidate
    Precise,
    /// Coarse sweep, decide a single count
    AutoBroad,
    /// Fine sweep around --start-count, decide a single count
    AutoPrecise,
    /// Automated coarse sweep, then automated fine sweep around its result
    #[default]
    TwoPhase,
}

impl SearchMode {
    /// Whether the mode needs --start-count
    pub fn needs_start_count(&self) -> bool {
        matches!(self, SearchMode::Precise | SearchMode::AutoPrecise)
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::Broad => write!(f, "broad"),
            SearchMode::Precise => write!(f, "precise"),
            SearchMode::AutoBroad => write!(f, "auto-broad"),
            SearchMode::AutoPrecise => write!(f, "auto-precise"),
            SearchMode::TwoPhase => write!(f, "two-phase"),
        }
    }
}

impl std::str::FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "broad" => Ok(SearchMode::Broad),
            "precise" => Ok(SearchMode::Precise),
            "auto-broad" | "auto_broad" => Ok(SearchMode::AutoBroad),
            "auto-precise" | "auto_precise" => Ok(SearchMode::AutoPrecise),
            "two-phase" | "two_phase" | "auto" => Ok(SearchMode::TwoPhase),
            _ => Err(format!(
                "Unknown search mode: '{}'. Use 'broad', 'precise', 'auto-broad', 'auto-precise', or 'two-phase'.",
                s
            )),
        }
    }
}

/// featkeep - Find how many importance-ranked features a classifier needs
#[derive(Parser, Debug)]
#[command(name = "featkeep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Target column name (binary 0/1 unless a mapping is given)
    #[arg(short, long)]
    pub target: String,

    /// JSON file with feature importances of the trained model, keyed by
    /// importance type (e.g. {"gain": {"age": 1.2, ...}})
    #[arg(long)]
    pub importance: PathBuf,

    /// Target score (ROC AUC) the reduced model must reach
    #[arg(long, value_parser = validate_auc_limit)]
    pub auc_limit: f64,

    /// Importance type used to rank features.
    /// Options: gain (default), weight, cover, total_gain, total_cover
    #[arg(long, default_value = "gain")]
    pub importance_type: String,

    /// Confidence level in (0, 1]. The acceptance threshold is
    /// auc_limit * (ci - (1 - ci) / 2)
    #[arg(long, default_value = "0.99", value_parser = validate_ci)]
    pub ci: f64,

    /// Step size of the coarse sweep
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    pub steps: u64,

    /// Half-width of the fine sweep around the start count
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    pub span: u64,

    /// Search mode: broad, precise, auto-broad, auto-precise, or two-phase (default)
    #[arg(long, default_value = "two-phase")]
    pub mode: String,

    /// Retained-feature count to search around (precise and auto-precise modes)
    #[arg(long)]
    pub start_count: Option<usize>,

    /// Fraction of rows held out for scoring
    #[arg(long, default_value = "0.25", value_parser = validate_test_size)]
    pub test_size: f64,

    /// Seed for the train/test partition and per-candidate training
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Worker threads for candidate evaluation (default: all cores)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Value in target column that represents EVENT (maps to 1).
    /// Required with --non-event-value when target is not binary 0/1.
    #[arg(long, requires = "non_event_value")]
    pub event_value: Option<String>,

    /// Value in target column that represents NON-EVENT (maps to 0).
    /// Required with --event-value when target is not binary 0/1.
    #[arg(long, requires = "event_value")]
    pub non_event_value: Option<String>,

    /// Columns to drop before processing (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub drop_columns: Vec<String>,

    /// Skip the confirmation prompt between coarse and fine search
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

/// Validator for auc_limit parameter
fn validate_auc_limit(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(0.0..=1.0).contains(&value) {
        Err(format!("auc_limit must be between 0.0 and 1.0, got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for ci parameter
fn validate_ci(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(value > 0.0 && value <= 1.0) {
        Err(format!("ci must be in (0, 1], got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for test_size parameter
fn validate_test_size(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(value > 0.0 && value < 1.0) {
        Err(format!("test_size must be between 0 and 1 (exclusive), got {}", value))
    } else {
        Ok(value)
    }
}
