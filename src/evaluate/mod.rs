//! Ranking metrics for recommendation lists.
//!
//! A prediction is a ranked list of items; the truth is the bag of items
//! that were actually requested. Relevance is plain membership, position
//! only matters through the cut-offs used by [`average_metric`].
//!
//! Degenerate inputs:
//! - [`precision`] with no predictions and [`recall`] with no true items
//!   return `DegenerateMetric`
//! - [`average_metric`] over an empty prediction list is 0.0
//! - F-beta is 0.0 when both precision and recall are 0

pub mod scoring;

use std::collections::HashSet;

use crate::error::{RecommenderError, Result};

pub use scoring::{Scorer, Scoring};

/// `(n_predicted, n_relevant, n_true)` for one query.
/// `n_relevant` counts predicted items that also occur in `truth`.
///
/// ```
/// use labo_recommender::evaluate::confusion_counts;
/// assert_eq!(confusion_counts(&["a", "b", "c", "d"], &["b", "c", "d", "e"]), (4, 3, 4));
/// ```
pub fn confusion_counts<T: AsRef<str>>(truth: &[T], predicted: &[T]) -> (usize, usize, usize) {
    let truth_set: HashSet<&str> = truth.iter().map(|t| t.as_ref()).collect();
    let relevant = predicted
        .iter()
        .filter(|p| truth_set.contains(p.as_ref()))
        .count();
    (predicted.len(), relevant, truth.len())
}

/// Share of predicted items that are relevant
pub fn precision<T: AsRef<str>>(truth: &[T], predicted: &[T]) -> Result<f64> {
    let (n_predicted, n_relevant, _) = confusion_counts(truth, predicted);
    if n_predicted == 0 {
        return Err(RecommenderError::DegenerateMetric {
            metric: "precision",
            reason: "no predicted items",
        });
    }
    Ok(n_relevant as f64 / n_predicted as f64)
}

/// Share of true items that were predicted
pub fn recall<T: AsRef<str>>(truth: &[T], predicted: &[T]) -> Result<f64> {
    let (_, n_relevant, n_true) = confusion_counts(truth, predicted);
    if n_true == 0 {
        return Err(RecommenderError::DegenerateMetric {
            metric: "recall",
            reason: "no true items",
        });
    }
    Ok(n_relevant as f64 / n_true as f64)
}

/// Mean of `metric(truth, predicted[..k])` for k = 1..=len(predicted).
/// An empty prediction list scores 0.0.
pub fn average_metric<T, M>(truth: &[T], predicted: &[T], metric: M) -> Result<f64>
where
    T: AsRef<str>,
    M: Fn(&[T], &[T]) -> Result<f64>,
{
    if predicted.is_empty() {
        return Ok(0.0);
    }
    let mut sum = 0.0;
    for k in 1..=predicted.len() {
        sum += metric(truth, &predicted[..k])?;
    }
    Ok(sum / predicted.len() as f64)
}

/// Mean of [`average_metric`] over aligned (truth, predicted) pairs
pub fn mean_average_metric<B, T, M>(y_true: &[B], y_pred: &[B], metric: M) -> Result<f64>
where
    B: AsRef<[T]>,
    T: AsRef<str>,
    M: Fn(&[T], &[T]) -> Result<f64>,
{
    if y_true.len() != y_pred.len() {
        return Err(RecommenderError::LengthMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(RecommenderError::DegenerateMetric {
            metric: "mean average",
            reason: "no queries",
        });
    }
    let mut sum = 0.0;
    for (truth, predicted) in y_true.iter().zip(y_pred) {
        sum += average_metric(truth.as_ref(), predicted.as_ref(), &metric)?;
    }
    Ok(sum / y_true.len() as f64)
}

pub fn mean_average_precision<B, T>(y_true: &[B], y_pred: &[B]) -> Result<f64>
where
    B: AsRef<[T]>,
    T: AsRef<str>,
{
    mean_average_metric(y_true, y_pred, precision::<T>)
}

pub fn mean_average_recall<B, T>(y_true: &[B], y_pred: &[B]) -> Result<f64>
where
    B: AsRef<[T]>,
    T: AsRef<str>,
{
    mean_average_metric(y_true, y_pred, recall::<T>)
}

/// (1 + β²)·P·R / (β²·P + R) of mean average precision and recall
pub fn mean_average_f_beta<B, T>(y_true: &[B], y_pred: &[B], beta: f64) -> Result<f64>
where
    B: AsRef<[T]>,
    T: AsRef<str>,
{
    let p = mean_average_precision(y_true, y_pred)?;
    let r = mean_average_recall(y_true, y_pred)?;
    Ok(f_beta(p, r, beta))
}

pub fn mean_average_f1<B, T>(y_true: &[B], y_pred: &[B]) -> Result<f64>
where
    B: AsRef<[T]>,
    T: AsRef<str>,
{
    mean_average_f_beta(y_true, y_pred, 1.0)
}

/// F-beta of a precision/recall pair, 0.0 when the denominator vanishes
#[inline]
pub fn f_beta(precision: f64, recall: f64, beta: f64) -> f64 {
    let b2 = beta * beta;
    let denom = b2 * precision + recall;
    if denom == 0.0 {
        0.0
    } else {
        (1.0 + b2) * precision * recall / denom
    }
}

/// 1.0 when any of the first `k` predictions is a true item
pub fn hit_at_k<T: AsRef<str>>(truth: &[T], predicted: &[T], k: usize) -> f64 {
    let truth_set: HashSet<&str> = truth.iter().map(|t| t.as_ref()).collect();
    if predicted.iter().take(k).any(|p| truth_set.contains(p.as_ref())) {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn counts() {
        assert_eq!(confusion_counts(&["a", "b", "c", "d"], &["b", "c", "d", "e"]), (4, 3, 4));
        assert_eq!(confusion_counts::<&str>(&[], &[]), (0, 0, 0));
    }

    #[test]
    fn precision_and_recall() {
        let truth = ["a", "b", "c", "d"];
        assert!((precision(&truth, &["b", "c", "d", "e"]).unwrap() - 0.75).abs() < EPS);
        assert!((recall(&truth, &["b", "e"]).unwrap() - 0.25).abs() < EPS);
    }

    #[test]
    fn degenerate_denominators() {
        assert!(matches!(
            precision(&["a"], &[]),
            Err(RecommenderError::DegenerateMetric { metric: "precision", .. })
        ));
        assert!(matches!(
            recall(&[], &["a"]),
            Err(RecommenderError::DegenerateMetric { metric: "recall", .. })
        ));
    }

    #[test]
    fn average_over_cutoffs() {
        // precision@1 = 1, @2 = 1/2, @3 = 2/3
        let avg = average_metric(&["a", "c"], &["a", "b", "c"], precision).unwrap();
        assert!((avg - (1.0 + 0.5 + 2.0 / 3.0) / 3.0).abs() < EPS);
        // recall@1 = 1/2, @2 = 1/2, @3 = 1
        let avg = average_metric(&["a", "c"], &["a", "b", "c"], recall).unwrap();
        assert!((avg - 2.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn empty_prediction_scores_zero() {
        assert_eq!(average_metric(&["a", "b"], &[], precision).unwrap(), 0.0);
        assert_eq!(average_metric::<&str, _>(&[], &[], recall).unwrap(), 0.0);
    }

    #[test]
    fn mean_average_over_queries() {
        let y_true = vec![vec!["a"], vec!["b", "c"]];
        let y_pred = vec![vec!["a"], vec!["x"]];
        let map = mean_average_precision(&y_true, &y_pred).unwrap();
        assert!((map - 0.5).abs() < EPS);
        let mar = mean_average_recall(&y_true, &y_pred).unwrap();
        assert!((mar - 0.5).abs() < EPS);
        let f1 = mean_average_f1(&y_true, &y_pred).unwrap();
        assert!((f1 - 0.5).abs() < EPS);
    }

    #[test]
    fn mean_average_guards() {
        let y_true = vec![vec!["a"]];
        let y_pred: Vec<Vec<&str>> = vec![];
        assert!(matches!(
            mean_average_precision(&y_true, &y_pred),
            Err(RecommenderError::LengthMismatch { expected: 1, actual: 0 })
        ));
        let empty: Vec<Vec<&str>> = vec![];
        assert!(mean_average_recall(&empty, &empty).is_err());
    }

    #[test]
    fn f_beta_weights_recall() {
        assert_eq!(f_beta(0.0, 0.0, 1.0), 0.0);
        assert!((f_beta(0.5, 0.5, 1.0) - 0.5).abs() < EPS);
        let f2 = f_beta(0.2, 0.8, 2.0);
        assert!((f2 - 5.0 * 0.16 / (0.8 + 0.8)).abs() < EPS);
        assert!(f2 > f_beta(0.2, 0.8, 1.0));
    }

    #[test]
    fn hits() {
        assert_eq!(hit_at_k(&["c"], &["a", "b", "c"], 2), 0.0);
        assert_eq!(hit_at_k(&["c"], &["a", "b", "c"], 3), 1.0);
    }
}
