//! Hyperparameters and evaluation settings.
//!
//! Settings can be built in code, read from JSON, or overridden from the
//! environment:
//!
//! | variable      | field                            |
//! |---------------|----------------------------------|
//! | `LABO_K`      | `recommender.k`                  |
//! | `LABO_METRIC` | `recommender.metric`             |
//! | `LABO_INDEX`  | `recommender.index`              |
//! | `LABO_CV`     | `validation.n_splits`            |
//! | `LABO_N`      | `validation.n_recommendations`   |

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RecommenderError, Result};
use crate::neighbors::{DistanceMetric, IndexKind};

/// Recommender hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderParams {
    /// Neighbor bags aggregated per query
    pub k: usize,
    pub metric: DistanceMetric,
    pub index: IndexKind,
}

impl Default for RecommenderParams {
    fn default() -> Self {
        Self {
            k: 10,
            metric: DistanceMetric::Jaccard,
            index: IndexKind::BruteForce,
        }
    }
}

impl RecommenderParams {
    pub fn new(k: usize, metric: DistanceMetric) -> Self {
        Self { k, metric, ..Default::default() }
    }

    pub fn with_index(mut self, index: IndexKind) -> Self {
        self.index = index;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(RecommenderError::invalid("k", self.k));
        }
        self.metric.validate()
    }
}

/// Cross-validation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Number of folds
    pub n_splits: usize,
    /// Recommendations requested per held-out query
    pub n_recommendations: usize,
    /// Cap held-out pairs at the training-fold size
    pub truncate_to_train_size: bool,
    /// Shuffle bag order before assigning folds
    pub shuffle: bool,
    pub random_state: Option<u64>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            n_splits: 5,
            n_recommendations: 5,
            truncate_to_train_size: true,
            shuffle: false,
            random_state: None,
        }
    }
}

impl ValidationConfig {
    pub fn new(n_splits: usize, n_recommendations: usize) -> Self {
        Self { n_splits, n_recommendations, ..Default::default() }
    }

    pub fn with_truncation(mut self, truncate: bool) -> Self {
        self.truncate_to_train_size = truncate;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.random_state = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_splits < 2 {
            return Err(RecommenderError::invalid("n_splits", self.n_splits));
        }
        if self.n_recommendations == 0 {
            return Err(RecommenderError::invalid("n_recommendations", self.n_recommendations));
        }
        Ok(())
    }
}

/// Combined configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaboConfig {
    pub recommender: RecommenderParams,
    pub validation: ValidationConfig,
}

impl LaboConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Defaults overridden by `LABO_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `LABO_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(k) = lookup("LABO_K") {
            self.recommender.k = parse_usize("LABO_K", &k)?;
        }
        if let Some(metric) = lookup("LABO_METRIC") {
            self.recommender.metric = metric.parse()?;
        }
        if let Some(index) = lookup("LABO_INDEX") {
            self.recommender.index = index.parse()?;
        }
        if let Some(cv) = lookup("LABO_CV") {
            self.validation.n_splits = parse_usize("LABO_CV", &cv)?;
        }
        if let Some(n) = lookup("LABO_N") {
            self.validation.n_recommendations = parse_usize("LABO_N", &n)?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        self.recommender.validate()?;
        self.validation.validate()
    }
}

fn parse_usize(name: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| RecommenderError::invalid(name, value))
}
