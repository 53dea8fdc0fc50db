pub mod feature;
pub mod frequency;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RecommenderError, Result};
use crate::vectorizer::{feature::FeatureVector, frequency::ItemFrequency};

/// Bags Vectorizer
/// Learns the vocabulary of a corpus of bags and encodes bags as binary
/// presence vectors over it.
///
/// The vocabulary is ordered by descending item frequency, ties broken by
/// first occurrence. Items unseen at fit time are silently ignored by
/// [`BagsVectorizer::transform`].
///
/// # Examples
/// ```
/// use labo_recommender::BagsVectorizer;
/// let bags = vec![vec!["a", "b", "c"], vec!["d", "e", "f"]];
/// let mut vectorizer = BagsVectorizer::new();
/// let rows = vectorizer.fit_transform(&bags).unwrap();
/// assert_eq!(rows[0].to_dense::<f64>(), vec![1., 1., 1., 0., 0., 0.]);
/// assert_eq!(rows[1].to_dense::<f64>(), vec![0., 0., 0., 1., 1., 1.]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BagsVectorizer {
    /// Vocabulary, index == feature position
    vocabulary: Option<IndexSet<String>>,
}

impl BagsVectorizer {
    pub fn new() -> Self {
        Self { vocabulary: None }
    }

    /// Learn the vocabulary from `corpus`.
    /// Fails with `EmptyCorpus` when the corpus holds no item at all.
    pub fn fit<B, S>(&mut self, corpus: &[B]) -> Result<&mut Self>
    where
        B: AsRef<[S]>,
        S: AsRef<str>,
    {
        let freq = ItemFrequency::from_bags(corpus);
        if freq.is_empty() {
            return Err(RecommenderError::EmptyCorpus);
        }
        let vocabulary: IndexSet<String> = freq
            .most_common()
            .into_iter()
            .map(|(item, _)| item.to_string())
            .collect();
        debug!(bags = corpus.len(), features = vocabulary.len(), "fitted bag vocabulary");
        self.vocabulary = Some(vocabulary);
        Ok(self)
    }

    /// Encode every bag as a presence vector over the fitted vocabulary
    pub fn transform<B, S>(&self, bags: &[B]) -> Result<Vec<FeatureVector>>
    where
        B: AsRef<[S]>,
        S: AsRef<str>,
    {
        let vocabulary = self.vocabulary()?;
        Ok(bags
            .iter()
            .map(|bag| Self::encode(vocabulary, bag.as_ref()))
            .collect())
    }

    /// Encode a single bag
    pub fn transform_one<S>(&self, bag: &[S]) -> Result<FeatureVector>
    where
        S: AsRef<str>,
    {
        Ok(Self::encode(self.vocabulary()?, bag))
    }

    pub fn fit_transform<B, S>(&mut self, corpus: &[B]) -> Result<Vec<FeatureVector>>
    where
        B: AsRef<[S]>,
        S: AsRef<str>,
    {
        self.fit(corpus)?;
        self.transform(corpus)
    }

    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    /// Vocabulary size
    pub fn n_features(&self) -> Result<usize> {
        Ok(self.vocabulary()?.len())
    }

    /// Vocabulary in feature order
    pub fn feature_names(&self) -> Result<Vec<&str>> {
        Ok(self.vocabulary()?.iter().map(|s| s.as_str()).collect())
    }

    /// Feature position of `item`, `None` when out of vocabulary or not fitted
    #[inline]
    pub fn index_of(&self, item: &str) -> Option<usize> {
        self.vocabulary.as_ref()?.get_index_of(item)
    }

    /// Item at feature position `index`
    #[inline]
    pub fn feature_name(&self, index: usize) -> Option<&str> {
        self.vocabulary.as_ref()?.get_index(index).map(|s| s.as_str())
    }

    fn vocabulary(&self) -> Result<&IndexSet<String>> {
        self.vocabulary.as_ref().ok_or(RecommenderError::NotFitted {
            component: "BagsVectorizer",
        })
    }

    fn encode<S: AsRef<str>>(vocabulary: &IndexSet<String>, bag: &[S]) -> FeatureVector {
        let present = bag
            .iter()
            .filter_map(|item| vocabulary.get_index_of(item.as_ref()))
            .collect();
        FeatureVector::new(vocabulary.len(), present)
    }
}
