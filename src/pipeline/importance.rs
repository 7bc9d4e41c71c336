//! Feature importance kinds, providers and ranking

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use super::error::{Result, SearchError};

/// Importance measure reported by a tree-ensemble model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ImportanceKind {
    /// Average gain of splits using the feature
    #[default]
    Gain,
    /// Number of splits using the feature
    Weight,
    /// Average coverage of splits using the feature
    Cover,
    /// Total gain of splits using the feature
    TotalGain,
    /// Total coverage of splits using the feature
    TotalCover,
}

impl ImportanceKind {
    pub const ALL: [ImportanceKind; 5] = [
        ImportanceKind::Gain,
        ImportanceKind::Weight,
        ImportanceKind::Cover,
        ImportanceKind::TotalGain,
        ImportanceKind::TotalCover,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportanceKind::Gain => "gain",
            ImportanceKind::Weight => "weight",
            ImportanceKind::Cover => "cover",
            ImportanceKind::TotalGain => "total_gain",
            ImportanceKind::TotalCover => "total_cover",
        }
    }
}

impl std::fmt::Display for ImportanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ImportanceKind {
    type Err = SearchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gain" => Ok(ImportanceKind::Gain),
            "weight" => Ok(ImportanceKind::Weight),
            "cover" => Ok(ImportanceKind::Cover),
            "total_gain" => Ok(ImportanceKind::TotalGain),
            "total_cover" => Ok(ImportanceKind::TotalCover),
            _ => Err(SearchError::InvalidImportanceType(s.to_string())),
        }
    }
}

/// Source of per-feature importance scores for a trained model
pub trait ImportanceProvider {
    fn importance(&self, kind: ImportanceKind) -> anyhow::Result<HashMap<String, f64>>;
}

impl ImportanceProvider for HashMap<ImportanceKind, HashMap<String, f64>> {
    fn importance(&self, kind: ImportanceKind) -> anyhow::Result<HashMap<String, f64>> {
        self.get(&kind)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No '{}' importance available", kind))
    }
}

/// Importance scores exported from a trained model as JSON.
///
/// The file is an object keyed by importance kind, each holding a
/// feature-to-score object:
///
/// ```json
/// { "gain": { "age": 12.5, "income": 3.1 }, "weight": { "age": 40, "income": 12 } }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ImportanceFile {
    scores: HashMap<String, HashMap<String, f64>>,
}

impl ImportanceFile {
    /// Load an importance file from disk
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read importance file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse importance file: {}", path.display()))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let file: ImportanceFile = serde_json::from_str(content)?;
        Ok(file)
    }

    /// Importance kinds present in the file, in canonical order
    pub fn available_kinds(&self) -> Vec<ImportanceKind> {
        ImportanceKind::ALL
            .into_iter()
            .filter(|kind| self.scores.contains_key(kind.as_str()))
            .collect()
    }
}

impl ImportanceProvider for ImportanceFile {
    fn importance(&self, kind: ImportanceKind) -> anyhow::Result<HashMap<String, f64>> {
        self.scores.get(kind.as_str()).cloned().ok_or_else(|| {
            anyhow::anyhow!(
                "Importance file has no '{}' section. Available: {:?}",
                kind,
                self.available_kinds()
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
            )
        })
    }
}

/// A feature with its importance and 1-based rank (1 = most important)
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFeature {
    pub name: String,
    pub importance: f64,
    pub rank: usize,
}

/// Features ordered by importance, descending.
///
/// Equal scores are ordered by feature name so the ranking is reproducible.
#[derive(Debug, Clone)]
pub struct ImportanceTable {
    kind: ImportanceKind,
    features: Vec<RankedFeature>,
}

impl ImportanceTable {
    /// Query `provider` for `kind` and rank the result
    pub fn from_provider<P>(provider: &P, kind: ImportanceKind) -> Result<Self>
    where
        P: ImportanceProvider + ?Sized,
    {
        let scores = provider
            .importance(kind)
            .map_err(|source| SearchError::Importance {
                kind: kind.to_string(),
                source,
            })?;
        Self::from_scores(kind, scores)
    }

    pub fn from_scores(kind: ImportanceKind, scores: HashMap<String, f64>) -> Result<Self> {
        if scores.is_empty() {
            return Err(SearchError::EmptyImportance);
        }

        if let Some((feature, &value)) = scores
            .iter()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(SearchError::InvalidImportanceValue {
                feature: feature.clone(),
                value,
            });
        }

        let mut features: Vec<RankedFeature> = scores
            .into_iter()
            .map(|(name, importance)| RankedFeature {
                name,
                importance,
                rank: 0,
            })
            .collect();

        features.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });

        for (i, feature) in features.iter_mut().enumerate() {
            feature.rank = i + 1;
        }

        Ok(Self { kind, features })
    }

    pub fn kind(&self) -> ImportanceKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[RankedFeature] {
        &self.features
    }

    /// Feature names in rank order
    pub fn names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.name.clone()).collect()
    }

    /// Names of the `n` most important features
    pub fn top(&self, n: usize) -> Vec<String> {
        self.features
            .iter()
            .take(n)
            .map(|f| f.name.clone())
            .collect()
    }

    /// Number of features whose importance is at or below the given
    /// percentile (0-100) of the importance distribution.
    ///
    /// Uses the nearest-rank percentile: the `ceil(p/100 * n)`-th smallest
    /// importance. Ties at the cutoff are all counted.
    pub fn count_at_or_below_percentile(&self, percentile: f64) -> usize {
        let n = self.features.len();
        if n == 0 {
            return 0;
        }

        let rank = ((percentile / 100.0) * n as f64).ceil() as usize;
        let rank = rank.clamp(1, n);

        // features are sorted descending, so the rank-th smallest sits at n - rank
        let cutoff = self.features[n - rank].importance;
        self.features
            .iter()
            .filter(|f| f.importance <= cutoff)
            .count()
    }
}
