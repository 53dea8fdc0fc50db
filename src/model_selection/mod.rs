//! Cross-validation and hyperparameter search over bag corpora.
//!
//! Folds are taken over whole bags; the held-out bags of each fold are cut
//! into (prefix, suffix) pairs with [`make_supervised_dataset`] and the
//! estimator is scored on how well it recovers the suffixes.

pub mod grid;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ValidationConfig;
use crate::dataset::make_supervised_dataset;
use crate::error::{RecommenderError, Result};
use crate::evaluate::Scorer;
use crate::recommender::BagEstimator;
use crate::Bag;

pub use grid::{grid_search, GridSearchResult, ParamGrid, ParamSet, ParamValue};

/// K-fold splitter over sample positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    random_state: Option<u64>,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits, shuffle: false, random_state: None }
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Seeded shuffle, implies `with_shuffle(true)`
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self.shuffle = true;
        self
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        Self {
            n_splits: config.n_splits,
            shuffle: config.shuffle,
            random_state: config.random_state,
        }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// `(train, test)` positions for each fold.
    /// Without shuffling folds are contiguous; the first `n_samples % n_splits`
    /// folds hold one extra sample.
    pub fn split(&self, n_samples: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.n_splits < 2 || self.n_splits > n_samples {
            return Err(RecommenderError::InvalidFolds {
                n_splits: self.n_splits,
                n_samples,
            });
        }
        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            let mut rng = match self.random_state {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            indices.shuffle(&mut rng);
        }

        let fold_size = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;
        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for fold in 0..self.n_splits {
            let end = start + fold_size + usize::from(fold < remainder);
            let test = indices[start..end].to_vec();
            let mut train = Vec::with_capacity(n_samples - test.len());
            train.extend_from_slice(&indices[..start]);
            train.extend_from_slice(&indices[end..]);
            folds.push((train, test));
            start = end;
        }
        Ok(folds)
    }
}

/// Per-fold scores of one cross-validation run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CrossValScores {
    pub scores: Vec<f64>,
}

impl CrossValScores {
    pub fn mean(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().sum::<f64>() / self.scores.len() as f64
    }

    /// Population standard deviation
    pub fn std(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .scores
            .iter()
            .map(|s| (s - mean).powi(2))
            .sum::<f64>()
            / self.scores.len() as f64;
        variance.sqrt()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// K-fold cross-validation of `estimator` on `corpus`.
///
/// For every fold the estimator is refitted on the training bags, asked for
/// `config.n_recommendations` items per held-out prefix, and scored against
/// the matching suffixes. With `truncate_to_train_size` the held-out pairs
/// are capped at the number of training bags.
pub fn cross_val_score<E, S>(
    estimator: &mut E,
    corpus: &[Bag],
    scoring: &S,
    config: &ValidationConfig,
) -> Result<CrossValScores>
where
    E: BagEstimator + ?Sized,
    S: Scorer + ?Sized,
{
    config.validate()?;
    let folds = KFold::from_config(config).split(corpus.len())?;

    let mut scores = Vec::with_capacity(folds.len());
    for (fold, (train_idx, test_idx)) in folds.into_iter().enumerate() {
        let train: Vec<Bag> = train_idx.iter().map(|&i| corpus[i].clone()).collect();
        let held_out: Vec<&Bag> = test_idx.iter().map(|&i| &corpus[i]).collect();
        let (mut queries, mut labels): (Vec<Bag>, Vec<Bag>) = make_supervised_dataset(&held_out);

        if config.truncate_to_train_size && queries.len() > train.len() {
            warn!(
                fold,
                pairs = queries.len(),
                kept = train.len(),
                "truncating held-out pairs to training fold size"
            );
            queries.truncate(train.len());
            labels.truncate(train.len());
        }
        if queries.is_empty() {
            return Err(RecommenderError::FoldSizeMismatch { fold });
        }

        estimator.fit_corpus(&train)?;
        let predicted = estimator.recommend(&queries, config.n_recommendations)?;
        let score = scoring.score(&labels, &predicted)?;
        debug!(fold, train = train.len(), pairs = queries.len(), score, "scored fold");
        scores.push(score);
    }

    let result = CrossValScores { scores };
    info!(
        folds = result.len(),
        mean = result.mean(),
        std = result.std(),
        "cross-validation finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::Scoring;
    use crate::recommender::{BagRecommender, PopularityRecommender};
    use crate::neighbors::DistanceMetric;
    use proptest::prelude::*;

    fn corpus() -> Vec<Bag> {
        let groups: [&[&str]; 3] = [
            &["glucose", "sodium", "potassium", "chloride"],
            &["hemoglobin", "platelets", "wbc"],
            &["alt", "ast", "bilirubin"],
        ];
        (0..12)
            .map(|i| {
                let group = groups[i % 3];
                let take = group.len() - (i / 3) % 2;
                group[..take].iter().map(|s| s.to_string()).collect()
            })
            .collect()
    }

    #[test]
    fn contiguous_folds() {
        let folds = KFold::new(3).split(7).unwrap();
        let tests: Vec<Vec<usize>> = folds.iter().map(|(_, t)| t.clone()).collect();
        assert_eq!(tests, vec![vec![0, 1, 2], vec![3, 4], vec![5, 6]]);
        assert_eq!(folds[1].0, vec![0, 1, 2, 5, 6]);
    }

    #[test]
    fn seeded_folds_repeat() {
        let a = KFold::new(4).with_random_state(9).split(20).unwrap();
        let b = KFold::new(4).with_random_state(9).split(20).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fold_count_must_fit() {
        assert!(matches!(
            KFold::new(5).split(3),
            Err(RecommenderError::InvalidFolds { n_splits: 5, n_samples: 3 })
        ));
        assert!(KFold::new(1).split(3).is_err());
    }

    #[test]
    fn scores_summary() {
        let scores = CrossValScores { scores: vec![0.2, 0.4, 0.6] };
        assert!((scores.mean() - 0.4).abs() < 1e-12);
        assert!((scores.std() - (0.08f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(CrossValScores::default().mean(), 0.0);
    }

    #[test]
    fn cross_validates_recommender() {
        let corpus = corpus();
        let mut rec = BagRecommender::new();
        rec.set_params(2, DistanceMetric::Jaccard);
        let config = ValidationConfig::new(3, 3);
        let scores =
            cross_val_score(&mut rec, &corpus, &Scoring::MeanAveragePrecision, &config).unwrap();
        assert_eq!(scores.len(), 3);
        for s in &scores.scores {
            assert!((0.0..=1.0).contains(s));
        }
        // groups never mix, so neighbors always come from the query's group
        assert!(scores.mean() > 0.5);
    }

    #[test]
    fn scorer_sees_truncated_pairs() {
        let corpus = corpus();
        let mut rec = PopularityRecommender::new();
        let seen = std::cell::RefCell::new(Vec::new());
        let recorder = |y_true: &[Bag], y_pred: &[Bag]| -> Result<f64> {
            seen.borrow_mut().push((y_true.len(), y_pred.len()));
            Ok(0.0)
        };
        let config = ValidationConfig::new(2, 2);
        cross_val_score(&mut rec, &corpus, &recorder, &config).unwrap();
        // 6 held-out bags give 11 pairs, capped at the 6 training bags
        assert_eq!(*seen.borrow(), vec![(6, 6), (6, 6)]);

        seen.borrow_mut().clear();
        let config = config.with_truncation(false);
        cross_val_score(&mut rec, &corpus, &recorder, &config).unwrap();
        assert_eq!(*seen.borrow(), vec![(11, 11), (11, 11)]);
    }

    #[test]
    fn singleton_fold_has_no_pairs() {
        let corpus: Vec<Bag> = vec![
            vec!["a".into()],
            vec!["b".into(), "c".into()],
            vec!["a".into(), "c".into()],
        ];
        let mut rec = PopularityRecommender::new();
        let err = cross_val_score(&mut rec, &corpus, &Scoring::MeanAverageRecall, &ValidationConfig::new(3, 1))
            .unwrap_err();
        assert!(matches!(err, RecommenderError::FoldSizeMismatch { fold: 0 }));
    }

    fn check_partition(folds: &[(Vec<usize>, Vec<usize>)], n: usize, k: usize) -> std::result::Result<(), TestCaseError> {
        prop_assert_eq!(folds.len(), k);
        let mut seen: Vec<usize> = folds.iter().flat_map(|(_, t)| t.iter().copied()).collect();
        seen.sort();
        prop_assert_eq!(seen, (0..n).collect::<Vec<_>>());
        for (train, test) in folds {
            prop_assert_eq!(train.len() + test.len(), n);
            prop_assert!(test.iter().all(|t| !train.contains(t)));
            prop_assert!(test.len() >= n / k && test.len() <= n / k + 1);
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn shuffled_folds_partition_samples(n in 2usize..60, k in 2usize..10, seed in any::<u64>()) {
            prop_assume!(k <= n);
            let folds = KFold::new(k).with_random_state(seed).split(n).unwrap();
            check_partition(&folds, n, k)?;
        }

        #[test]
        fn contiguous_folds_partition_samples(n in 5usize..80, k in 2usize..10) {
            prop_assume!(k <= n);
            let folds = KFold::new(k).split(n).unwrap();
            check_partition(&folds, n, k)?;
            // held-out blocks are consecutive and in order
            let starts: Vec<usize> = folds.iter().map(|(_, t)| t[0]).collect();
            prop_assert!(starts.windows(2).all(|w| w[0] < w[1]));
            for (_, test) in &folds {
                prop_assert!(test.windows(2).all(|w| w[1] == w[0] + 1));
            }
        }

        #[test]
        fn five_fold_default_partition(n in 5usize..120) {
            let folds = KFold::from_config(&ValidationConfig::default()).split(n).unwrap();
            check_partition(&folds, n, 5)?;
        }
    }
}
