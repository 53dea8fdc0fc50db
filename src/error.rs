//! Error types for the recommender and its evaluation framework.

use thiserror::Error;

/// Result type alias using `RecommenderError`.
pub type Result<T> = std::result::Result<T, RecommenderError>;

/// Errors raised while fitting, querying or evaluating a recommender.
#[derive(Debug, Error)]
pub enum RecommenderError {
    /// The training corpus contains no items, so no vocabulary can be built.
    #[error("corpus contains no items, cannot build a vocabulary")]
    EmptyCorpus,

    /// An operation that needs a fitted component was called before `fit`.
    #[error("{component} is not fitted yet, call fit first")]
    NotFitted {
        /// Name of the component that was queried.
        component: &'static str,
    },

    /// More neighbors were requested than there are fitted bags.
    #[error("k={k} exceeds the number of fitted bags ({available})")]
    InvalidK {
        /// Requested neighbor count.
        k: usize,
        /// Bags available in the index.
        available: usize,
    },

    /// Precision or recall evaluated with a zero denominator.
    #[error("{metric} is undefined: {reason}")]
    DegenerateMetric {
        /// Metric name.
        metric: &'static str,
        /// Which count was zero.
        reason: &'static str,
    },

    /// A held-out fold produced no aligned (query, label) pairs.
    #[error("fold {fold} produced no held-out query/label pairs")]
    FoldSizeMismatch {
        /// Zero-based fold number.
        fold: usize,
    },

    /// Two sequences that must be aligned have different lengths.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length of the reference sequence.
        expected: usize,
        /// Length of the offending sequence.
        actual: usize,
    },

    /// A hyperparameter or configuration value is out of range.
    #[error("invalid value for {name}: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Offending value.
        value: String,
    },

    /// A parameter grid names a parameter the estimator does not know.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// The fold count cannot partition the corpus.
    #[error("cannot split {n_samples} bags into {n_splits} folds")]
    InvalidFolds {
        /// Requested fold count.
        n_splits: usize,
        /// Corpus size.
        n_samples: usize,
    },

    /// I/O error while reading or writing a dataset.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CBOR (de)serialization error.
    #[error("CBOR error: {0}")]
    Cbor(#[from] serde_cbor::Error),
}

impl RecommenderError {
    pub(crate) fn invalid(name: impl Into<String>, value: impl ToString) -> Self {
        RecommenderError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
        }
    }
}
