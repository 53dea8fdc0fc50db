//! Bag corpora: supervised splitting, train/test partitioning and storage.

pub mod events;
pub mod io;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RecommenderError, Result};
use crate::Bag;

/// Every non-trivial (prefix, suffix) split of `bag`, in split order.
/// Split `i` (1-based) keeps the first `i` items as the query and the rest
/// as the items still to come. Bags with fewer than two items yield nothing.
///
/// ```
/// use labo_recommender::dataset::cut_bag;
/// let (x, y) = cut_bag(&["a", "b", "c"]);
/// assert_eq!(x, vec![vec!["a"], vec!["a", "b"]]);
/// assert_eq!(y, vec![vec!["b", "c"], vec!["c"]]);
/// ```
pub fn cut_bag<T: Clone>(bag: &[T]) -> (Vec<Vec<T>>, Vec<Vec<T>>) {
    let splits = bag.len().saturating_sub(1);
    let mut prefixes = Vec::with_capacity(splits);
    let mut suffixes = Vec::with_capacity(splits);
    for cut in 1..bag.len() {
        prefixes.push(bag[..cut].to_vec());
        suffixes.push(bag[cut..].to_vec());
    }
    (prefixes, suffixes)
}

/// Apply [`cut_bag`] to every bag and concatenate the pairs in bag order
pub fn make_supervised_dataset<B, T>(corpus: &[B]) -> (Vec<Vec<T>>, Vec<Vec<T>>)
where
    B: AsRef<[T]>,
    T: Clone,
{
    let mut queries = Vec::new();
    let mut labels = Vec::new();
    for bag in corpus {
        let (x, y) = cut_bag(bag.as_ref());
        queries.extend(x);
        labels.extend(y);
    }
    (queries, labels)
}

/// Shuffle and split a corpus into `(train, test)`.
/// The test part holds `ceil(test_size * len)` bags; a fixed `random_state`
/// makes the split reproducible.
pub fn train_test_split<T: Clone>(
    corpus: &[T],
    test_size: f64,
    random_state: Option<u64>,
) -> Result<(Vec<T>, Vec<T>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(RecommenderError::invalid("test_size", test_size));
    }
    let n = corpus.len();
    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(RecommenderError::invalid(
            "test_size",
            format!("{test_size} leaves an empty partition of {n} bags"),
        ));
    }
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = match random_state {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    indices.shuffle(&mut rng);
    let test = indices[..n_test].iter().map(|&i| corpus[i].clone()).collect();
    let train = indices[n_test..].iter().map(|&i| corpus[i].clone()).collect();
    Ok((train, test))
}

/// Persisted training corpus plus held-out supervised pairs
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BagDataset {
    pub train_bags: Vec<Bag>,
    /// held-out queries (bag prefixes)
    pub test_bags_x: Vec<Bag>,
    /// items still to come for each query
    pub test_bags_y: Vec<Bag>,
}

impl BagDataset {
    /// Split `corpus` and cut the held-out bags into supervised pairs
    pub fn from_corpus(corpus: &[Bag], test_size: f64, random_state: Option<u64>) -> Result<Self> {
        let (train_bags, test_bags) = train_test_split(corpus, test_size, random_state)?;
        let (test_bags_x, test_bags_y) = make_supervised_dataset(&test_bags);
        debug!(
            train = train_bags.len(),
            test = test_bags.len(),
            pairs = test_bags_x.len(),
            "built bag dataset"
        );
        Ok(Self { train_bags, test_bags_x, test_bags_y })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn degenerate_bags_do_not_split() {
        let (x, y) = cut_bag::<&str>(&[]);
        assert!(x.is_empty() && y.is_empty());
        let (x, y) = cut_bag(&["only"]);
        assert!(x.is_empty() && y.is_empty());
    }

    #[test]
    fn supervised_pairs_stay_aligned() {
        let corpus = vec![vec!["a", "b", "c"], vec!["z"], vec!["d", "e"]];
        let (x, y) = make_supervised_dataset(&corpus);
        assert_eq!(x, vec![vec!["a"], vec!["a", "b"], vec!["d"]]);
        assert_eq!(y, vec![vec!["b", "c"], vec!["c"], vec!["e"]]);
    }

    #[test]
    fn split_sizes_and_reproducibility() {
        let corpus: Vec<usize> = (0..10).collect();
        let (train, test) = train_test_split(&corpus, 0.25, Some(11)).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 7);
        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort();
        assert_eq!(all, corpus);

        let again = train_test_split(&corpus, 0.25, Some(11)).unwrap();
        assert_eq!(again, (train, test));
    }

    #[test]
    fn split_rejects_bad_sizes() {
        let corpus = vec![1, 2, 3];
        assert!(train_test_split(&corpus, 0.0, None).is_err());
        assert!(train_test_split(&corpus, 1.0, None).is_err());
        assert!(train_test_split(&[1], 0.5, None).is_err());
    }

    #[test]
    fn dataset_from_corpus() {
        let corpus: Vec<Bag> = (0..8)
            .map(|i| vec![format!("t{i}"), format!("t{}", i + 1), format!("t{}", i + 2)])
            .collect();
        let dataset = BagDataset::from_corpus(&corpus, 0.25, Some(3)).unwrap();
        assert_eq!(dataset.train_bags.len(), 6);
        assert_eq!(dataset.test_bags_x.len(), 4);
        assert_eq!(dataset.test_bags_x.len(), dataset.test_bags_y.len());
    }

    proptest! {
        #[test]
        fn cut_reconstructs_bag(len in 0usize..12) {
            let bag: Vec<usize> = (0..len).collect();
            let (x, y) = cut_bag(&bag);
            prop_assert_eq!(x.len(), len.saturating_sub(1));
            prop_assert_eq!(y.len(), x.len());
            for (i, (prefix, suffix)) in x.iter().zip(&y).enumerate() {
                prop_assert_eq!(prefix.len(), i + 1);
                let mut joined = prefix.clone();
                joined.extend(suffix.iter().copied());
                prop_assert_eq!(&joined, &bag);
            }
        }
    }
}
