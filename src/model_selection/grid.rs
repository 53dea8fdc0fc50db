use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ValidationConfig;
use crate::error::{RecommenderError, Result};
use crate::evaluate::Scorer;
use crate::model_selection::{cross_val_score, CrossValScores};
use crate::neighbors::{DistanceMetric, IndexKind};
use crate::recommender::BagEstimator;
use crate::Bag;

/// One hyperparameter value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Int(usize),
    Metric(DistanceMetric),
    Index(IndexKind),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Metric(m) => write!(f, "{m}"),
            ParamValue::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Int(v)
    }
}

impl From<DistanceMetric> for ParamValue {
    fn from(m: DistanceMetric) -> Self {
        ParamValue::Metric(m)
    }
}

impl From<IndexKind> for ParamValue {
    fn from(i: IndexKind) -> Self {
        ParamValue::Index(i)
    }
}

/// One grid candidate, parameter name to value, names in sorted order
pub type ParamSet = IndexMap<String, ParamValue>;

/// Candidate values per parameter name.
///
/// Names are kept sorted; [`ParamGrid::candidates`] enumerates the
/// Cartesian product with the last name varying fastest.
///
/// ```
/// use labo_recommender::model_selection::ParamGrid;
/// use labo_recommender::DistanceMetric;
///
/// let grid = ParamGrid::new()
///     .with("metric", [DistanceMetric::Jaccard, DistanceMetric::Cosine])
///     .with("k", [5usize, 10]);
/// assert_eq!(grid.len(), 4);
/// let first = &grid.candidates()[0];
/// assert_eq!(first.keys().collect::<Vec<_>>(), vec!["k", "metric"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    values: IndexMap<String, Vec<ParamValue>>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the candidate values of `name`, replacing earlier ones
    pub fn with<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.insert(name, values);
        self
    }

    pub fn insert<I, V>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.values
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self.values.sort_keys();
    }

    /// Number of parameter names
    pub fn n_params(&self) -> usize {
        self.values.len()
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        self.values.values().map(Vec::len).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every combination of values; none when a name has no values
    pub fn candidates(&self) -> Vec<ParamSet> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut out: Vec<ParamSet> = vec![ParamSet::new()];
        for (name, values) in &self.values {
            out = out
                .into_iter()
                .flat_map(|partial| {
                    values.iter().map(move |value| {
                        let mut next = partial.clone();
                        next.insert(name.clone(), *value);
                        next
                    })
                })
                .collect();
        }
        out
    }
}

/// Outcome of [`grid_search`], aligned by candidate position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSearchResult {
    pub params: Vec<ParamSet>,
    pub raw_results: Vec<CrossValScores>,
    pub mean_results: Vec<f64>,
    pub best_params: ParamSet,
    pub best_raw_result: CrossValScores,
    pub best_mean_result: f64,
    pub best_index: usize,
}

/// Cross-validate `estimator` once per grid candidate and keep the candidate
/// with the highest mean score; on ties the earliest candidate wins.
/// The estimator is left configured with the last candidate tried.
pub fn grid_search<E, S>(
    grid: &ParamGrid,
    estimator: &mut E,
    corpus: &[Bag],
    scoring: &S,
    config: &ValidationConfig,
) -> Result<GridSearchResult>
where
    E: BagEstimator + ?Sized,
    S: Scorer + ?Sized,
{
    let candidates = grid.candidates();
    if candidates.is_empty() {
        return Err(RecommenderError::invalid("param_grid", "no candidates"));
    }

    let mut raw_results = Vec::with_capacity(candidates.len());
    let mut mean_results = Vec::with_capacity(candidates.len());
    let mut best_index = 0;
    for (i, params) in candidates.iter().enumerate() {
        estimator.apply_params(params)?;
        let scores = cross_val_score(estimator, corpus, scoring, config)?;
        let mean = scores.mean();
        debug!(candidate = i, params = ?params, mean, "evaluated grid candidate");
        if mean > mean_results.get(best_index).copied().unwrap_or(f64::NEG_INFINITY) {
            best_index = i;
        }
        raw_results.push(scores);
        mean_results.push(mean);
    }

    info!(
        candidates = candidates.len(),
        best = best_index,
        best_mean = mean_results[best_index],
        "grid search finished"
    );
    Ok(GridSearchResult {
        best_params: candidates[best_index].clone(),
        best_raw_result: raw_results[best_index].clone(),
        best_mean_result: mean_results[best_index],
        best_index,
        params: candidates,
        raw_results,
        mean_results,
    })
}
