//! Coarse-then-fine search for the number of top-ranked features to retain
//!
//! A coarse sweep scans retained-feature counts between the 75th and 25th
//! importance percentiles with a large step. A fine sweep then scans every
//! count within `span` of a chosen start. Each candidate trains the evaluator
//! on the top-`n` features of a read-only projection of the base split and is
//! accepted when its score reaches the confidence-adjusted threshold.
//!
//! Both sweeps support two result policies:
//! - exploratory: every accepted `(score, count)` in scan order
//! - automated: the last accepted count in scan order, with a fallback when
//!   nothing is accepted

use rayon::prelude::*;

use super::error::{Result, SearchError, SearchWarning};
use super::evaluator::Evaluator;
use super::importance::{ImportanceKind, ImportanceProvider, ImportanceTable};
use super::split::DataSplit;
use super::threshold::AcceptanceThreshold;
use crate::utils::{create_candidate_bar, finish_with_success, finish_with_warning};

/// Upper importance percentile bounding the coarse sweep
pub const UPPER_PERCENTILE: f64 = 75.0;
/// Lower importance percentile bounding the coarse sweep
pub const LOWER_PERCENTILE: f64 = 25.0;

pub const DEFAULT_CI: f64 = 0.99;
pub const DEFAULT_STEPS: usize = 5;
pub const DEFAULT_SPAN: usize = 5;
pub const DEFAULT_SEED: u64 = 42;

/// Runtime options for candidate evaluation
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Worker threads for candidate evaluation. `None` uses rayon's global pool.
    pub workers: Option<usize>,
    /// Base seed; each candidate gets `derive_seed(seed, count)`
    pub seed: u64,
    /// Show a progress bar while candidates are evaluated
    pub show_progress: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            workers: None,
            seed: DEFAULT_SEED,
            show_progress: true,
        }
    }
}

/// Which sweep produced an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Coarse,
    Fine,
}

impl std::fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchPhase::Coarse => write!(f, "coarse"),
            SearchPhase::Fine => write!(f, "fine"),
        }
    }
}

/// An accepted candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub score: f64,
    pub count: usize,
}

/// A scanned candidate with its acceptance decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannedCandidate {
    pub count: usize,
    pub score: f64,
    pub passed: bool,
}

/// Candidate counts to scan, in scan order (descending)
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRange {
    pub counts: Vec<usize>,
    pub warning: Option<SearchWarning>,
}

/// Result of a search together with everything needed to explain it
#[derive(Debug, Clone)]
pub struct SearchOutcome<T> {
    pub value: T,
    pub phase: SearchPhase,
    pub threshold: AcceptanceThreshold,
    pub scanned: Vec<ScannedCandidate>,
    pub total_features: usize,
    pub warnings: Vec<SearchWarning>,
}

impl<T> SearchOutcome<T> {
    /// True when no scanned candidate reached the threshold
    pub fn threshold_unmet(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, SearchWarning::EmptyAcceptance { .. }))
    }

    /// Highest and lowest scanned counts
    pub fn scanned_bounds(&self) -> Option<(usize, usize)> {
        let high = self.scanned.first()?.count;
        let low = self.scanned.last()?.count;
        Some((high, low))
    }
}

/// Counts for the coarse sweep: from the count at or below the 75th
/// importance percentile down to the count at or below the 25th, by `steps`.
pub fn coarse_range(table: &ImportanceTable, steps: usize) -> Result<CandidateRange> {
    if steps == 0 {
        return Err(SearchError::InvalidStep {
            name: "steps",
            value: steps,
        });
    }
    if table.is_empty() {
        return Err(SearchError::EmptyImportance);
    }

    let high = table.count_at_or_below_percentile(UPPER_PERCENTILE).max(1);
    let low = table
        .count_at_or_below_percentile(LOWER_PERCENTILE)
        .clamp(1, high);

    let counts: Vec<usize> = (low..=high).rev().step_by(steps).collect();
    let warning = (counts.len() == 1).then(|| SearchWarning::DegenerateRange {
        requested: (high as i64, low as i64),
        scanned: (high, high),
    });

    Ok(CandidateRange { counts, warning })
}

/// Counts for the fine sweep: `start + span` down to `start - span`,
/// clamped into `[1, total]`.
pub fn fine_range(total: usize, start: usize, span: usize) -> Result<CandidateRange> {
    if span == 0 {
        return Err(SearchError::InvalidStep {
            name: "span",
            value: span,
        });
    }
    if start == 0 || start > total {
        return Err(SearchError::StartCountOutOfRange { start, total });
    }

    let reach = i64::try_from(span).unwrap_or(i64::MAX);
    let requested_high = (start as i64).saturating_add(reach);
    let requested_low = (start as i64).saturating_sub(reach);
    let high = start.saturating_add(span).min(total);
    let low = start.saturating_sub(span).max(1);

    let counts: Vec<usize> = (low..=high).rev().collect();
    let clamped = requested_high != high as i64 || requested_low != low as i64;
    let warning = (clamped || counts.len() == 1).then(|| SearchWarning::DegenerateRange {
        requested: (requested_high, requested_low),
        scanned: (high, low),
    });

    Ok(CandidateRange { counts, warning })
}

/// Per-candidate seed, so results do not depend on scheduling
pub fn derive_seed(base: u64, count: usize) -> u64 {
    // splitmix64 finalizer
    let mut z = base ^ (count as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Evaluate every count in `counts` on its own projection of `split`.
///
/// Candidates run in parallel; the returned vector keeps the order of
/// `counts`. When candidates fail, the error of the earliest one in scan
/// order is returned, whatever the scheduling.
pub fn scan<E>(
    split: &DataSplit,
    table: &ImportanceTable,
    counts: &[usize],
    evaluator: &E,
    threshold: &AcceptanceThreshold,
    config: &SearchConfig,
) -> Result<Vec<ScannedCandidate>>
where
    E: Evaluator + ?Sized,
{
    let pb = create_candidate_bar(counts.len() as u64, "Evaluating", config.show_progress);

    let evaluate_all = || -> Vec<Result<ScannedCandidate>> {
        counts
            .par_iter()
            .map(|&count| -> Result<ScannedCandidate> {
                let subset = table.top(count);
                let view = split
                    .project(&subset)
                    .map_err(|source| SearchError::Projection { count, source })?;
                let score = evaluator
                    .evaluate(&view, derive_seed(config.seed, count))
                    .map_err(|source| SearchError::Evaluation { count, source })?;

                pb.inc(1);

                Ok(ScannedCandidate {
                    count,
                    score,
                    passed: threshold.passes(score),
                })
            })
            .collect()
    };

    let results = match config.workers {
        Some(workers) => rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?
            .install(evaluate_all),
        None => evaluate_all(),
    };
    let scanned = results.into_iter().collect::<Result<Vec<_>>>()?;

    let accepted = scanned.iter().filter(|c| c.passed).count();
    let message = format!(
        "Evaluated {} candidate(s), {} accepted",
        scanned.len(),
        accepted
    );
    if accepted == 0 {
        finish_with_warning(&pb, &message);
    } else {
        finish_with_success(&pb, &message);
    }

    Ok(scanned)
}

/// Every accepted candidate, in scan order
pub fn select_accepted(scanned: &[ScannedCandidate]) -> Vec<CandidateScore> {
    scanned
        .iter()
        .filter(|c| c.passed)
        .map(|c| CandidateScore {
            score: c.score,
            count: c.count,
        })
        .collect()
}

/// The last accepted count in scan order.
///
/// Scans run from larger to smaller counts, so this is the smallest accepted
/// count among those scanned. Later failures do not undo an acceptance.
pub fn select_last_accepted(scanned: &[ScannedCandidate]) -> Option<usize> {
    let mut chosen = None;
    for candidate in scanned {
        if candidate.passed {
            chosen = Some(candidate.count);
        }
    }
    chosen
}

enum Sweep {
    Coarse { steps: usize },
    Fine { start: usize, span: usize },
}

struct SweepResult {
    phase: SearchPhase,
    threshold: AcceptanceThreshold,
    scanned: Vec<ScannedCandidate>,
    total_features: usize,
    warnings: Vec<SearchWarning>,
}

impl SweepResult {
    fn into_outcome<T>(self, value: T) -> SearchOutcome<T> {
        SearchOutcome {
            value,
            phase: self.phase,
            threshold: self.threshold,
            scanned: self.scanned,
            total_features: self.total_features,
            warnings: self.warnings,
        }
    }
}

/// Feature count search over a trained model's importance ranking.
///
/// `provider` supplies the importances of the trained model, `evaluator`
/// retrains and scores candidates, `split` is the frozen train/test data.
pub struct FeatureCountSearch<'a, P: ?Sized, E: ?Sized> {
    provider: &'a P,
    evaluator: &'a E,
    split: &'a DataSplit,
    config: SearchConfig,
}

impl<'a, P, E> FeatureCountSearch<'a, P, E>
where
    P: ImportanceProvider + ?Sized,
    E: Evaluator + ?Sized,
{
    pub fn new(provider: &'a P, evaluator: &'a E, split: &'a DataSplit) -> Self {
        Self {
            provider,
            evaluator,
            split,
            config: SearchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Rank the model's features by `kind`, checking each is in the split
    pub fn ranking(&self, kind: ImportanceKind) -> Result<ImportanceTable> {
        let table = ImportanceTable::from_provider(self.provider, kind)?;
        if let Some(missing) = table
            .features()
            .iter()
            .find(|f| !self.split.has_feature(&f.name))
        {
            return Err(SearchError::UnknownFeature(missing.name.clone()));
        }
        Ok(table)
    }

    /// Coarse sweep returning every accepted `(score, count)` in scan order
    pub fn broad_search(
        &self,
        auc_limit: f64,
        kind: ImportanceKind,
        ci: f64,
        steps: usize,
    ) -> Result<SearchOutcome<Vec<CandidateScore>>> {
        let sweep = self.sweep(Sweep::Coarse { steps }, auc_limit, kind, ci)?;
        Ok(explore(sweep))
    }

    /// Fine sweep around `start_count` returning every accepted `(score, count)`
    pub fn precise_search(
        &self,
        start_count: usize,
        auc_limit: f64,
        kind: ImportanceKind,
        ci: f64,
        span: usize,
    ) -> Result<SearchOutcome<Vec<CandidateScore>>> {
        let sweep = self.sweep(
            Sweep::Fine {
                start: start_count,
                span,
            },
            auc_limit,
            kind,
            ci,
        )?;
        Ok(explore(sweep))
    }

    /// Coarse sweep returning a single count; keeps all features when
    /// nothing is accepted.
    pub fn automated_broad_search(
        &self,
        auc_limit: f64,
        kind: ImportanceKind,
        ci: f64,
        steps: usize,
    ) -> Result<SearchOutcome<usize>> {
        let sweep = self.sweep(Sweep::Coarse { steps }, auc_limit, kind, ci)?;
        let fallback = sweep.total_features;
        Ok(decide(sweep, fallback))
    }

    /// Fine sweep returning a single count; keeps `start_count` when
    /// nothing is accepted.
    pub fn automated_precise_search(
        &self,
        start_count: usize,
        auc_limit: f64,
        kind: ImportanceKind,
        ci: f64,
        span: usize,
    ) -> Result<SearchOutcome<usize>> {
        let sweep = self.sweep(
            Sweep::Fine {
                start: start_count,
                span,
            },
            auc_limit,
            kind,
            ci,
        )?;
        Ok(decide(sweep, start_count))
    }

    fn sweep(
        &self,
        sweep: Sweep,
        auc_limit: f64,
        kind: ImportanceKind,
        ci: f64,
    ) -> Result<SweepResult> {
        let threshold = AcceptanceThreshold::new(auc_limit, ci)?;
        let table = self.ranking(kind)?;

        let (phase, range) = match sweep {
            Sweep::Coarse { steps } => (SearchPhase::Coarse, coarse_range(&table, steps)?),
            Sweep::Fine { start, span } => {
                (SearchPhase::Fine, fine_range(table.len(), start, span)?)
            }
        };

        let scanned = scan(
            self.split,
            &table,
            &range.counts,
            self.evaluator,
            &threshold,
            &self.config,
        )?;

        Ok(SweepResult {
            phase,
            threshold,
            scanned,
            total_features: table.len(),
            warnings: range.warning.into_iter().collect(),
        })
    }
}

fn explore(mut sweep: SweepResult) -> SearchOutcome<Vec<CandidateScore>> {
    let accepted = select_accepted(&sweep.scanned);
    if accepted.is_empty() {
        sweep.warnings.push(SearchWarning::EmptyAcceptance {
            threshold: sweep.threshold.value(),
            fallback: None,
        });
    }
    sweep.into_outcome(accepted)
}

fn decide(mut sweep: SweepResult, fallback: usize) -> SearchOutcome<usize> {
    let count = match select_last_accepted(&sweep.scanned) {
        Some(count) => count,
        None => {
            sweep.warnings.push(SearchWarning::EmptyAcceptance {
                threshold: sweep.threshold.value(),
                fallback: Some(fallback),
            });
            fallback
        }
    };
    sweep.into_outcome(count)
}
