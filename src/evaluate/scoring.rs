use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RecommenderError, Result};
use crate::evaluate::{mean_average_f1, mean_average_f_beta, mean_average_precision, mean_average_recall};
use crate::Bag;

/// Scores a batch of predictions against the true bags, higher is better
pub trait Scorer {
    fn score(&self, y_true: &[Bag], y_pred: &[Bag]) -> Result<f64>;
}

impl<F> Scorer for F
where
    F: Fn(&[Bag], &[Bag]) -> Result<f64>,
{
    fn score(&self, y_true: &[Bag], y_pred: &[Bag]) -> Result<f64> {
        self(y_true, y_pred)
    }
}

/// Built-in scorers
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Scoring {
    #[default]
    MeanAveragePrecision,
    MeanAverageRecall,
    MeanAverageF1,
    MeanAverageFBeta(f64),
}

impl Scorer for Scoring {
    fn score(&self, y_true: &[Bag], y_pred: &[Bag]) -> Result<f64> {
        match *self {
            Scoring::MeanAveragePrecision => mean_average_precision(y_true, y_pred),
            Scoring::MeanAverageRecall => mean_average_recall(y_true, y_pred),
            Scoring::MeanAverageF1 => mean_average_f1(y_true, y_pred),
            Scoring::MeanAverageFBeta(beta) => mean_average_f_beta(y_true, y_pred, beta),
        }
    }
}

impl fmt::Display for Scoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scoring::MeanAveragePrecision => write!(f, "map"),
            Scoring::MeanAverageRecall => write!(f, "mar"),
            Scoring::MeanAverageF1 => write!(f, "f1"),
            Scoring::MeanAverageFBeta(beta) => write!(f, "fbeta:{beta}"),
        }
    }
}

impl FromStr for Scoring {
    type Err = RecommenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "map" | "precision" => Ok(Scoring::MeanAveragePrecision),
            "mar" | "recall" => Ok(Scoring::MeanAverageRecall),
            "f1" => Ok(Scoring::MeanAverageF1),
            other => match other.strip_prefix("fbeta:").map(str::parse::<f64>) {
                Some(Ok(beta)) if beta > 0.0 => Ok(Scoring::MeanAverageFBeta(beta)),
                _ => Err(RecommenderError::invalid("scoring", s)),
            },
        }
    }
}
