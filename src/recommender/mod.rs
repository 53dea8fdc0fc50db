//! Bag recommenders.
//!
//! [`BagRecommender`] holds hyperparameters and, once fitted, an immutable
//! [`FittedRecommender`]. Every `fit` replaces the fitted model wholesale;
//! a fitted model is `Sync` and can serve concurrent read-only queries.

pub mod popularity;

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::debug;

use crate::config::RecommenderParams;
use crate::error::{RecommenderError, Result};
use crate::model_selection::grid::{ParamSet, ParamValue};
use crate::neighbors::{DistanceMetric, NeighborIndex};
use crate::vectorizer::BagsVectorizer;
use crate::Bag;

pub use popularity::PopularityRecommender;

/// Common shape of every recommender driven by cross-validation and grid search
pub trait BagEstimator {
    /// Apply one grid-search candidate; unknown names are an error
    fn apply_params(&mut self, params: &ParamSet) -> Result<()>;

    /// Train on `bags`, discarding any previous fit
    fn fit_corpus(&mut self, bags: &[Bag]) -> Result<()>;

    /// Up to `n` recommendations per query bag
    fn recommend(&self, queries: &[Bag], n: usize) -> Result<Vec<Bag>>;
}

/// Nearest-bag recommender
///
/// # Examples
/// ```
/// use labo_recommender::{BagRecommender, DistanceMetric};
///
/// let bags = vec![
///     vec!["glucose", "sodium", "potassium"],
///     vec!["glucose", "sodium", "chloride"],
///     vec!["hemoglobin", "platelets"],
/// ];
/// let mut recommender = BagRecommender::new();
/// recommender.set_params(2, DistanceMetric::Jaccard);
/// recommender.fit(&bags).unwrap();
///
/// let recommended = recommender.predict(&[vec!["glucose", "sodium"]], 5).unwrap();
/// assert_eq!(recommended[0], vec!["potassium", "chloride"]);
/// ```
#[derive(Debug, Default)]
pub struct BagRecommender {
    params: RecommenderParams,
    model: Option<FittedRecommender>,
}

impl BagRecommender {
    /// k = 10, Jaccard distance, brute-force index
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: RecommenderParams) -> Self {
        Self { params, model: None }
    }

    /// Change hyperparameters for the next `fit`.
    /// An already fitted model keeps answering with its old parameters.
    pub fn set_params(&mut self, k: usize, metric: DistanceMetric) -> &mut Self {
        self.params.k = k;
        self.params.metric = metric;
        self
    }

    pub fn params(&self) -> &RecommenderParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut RecommenderParams {
        &mut self.params
    }

    pub fn fit<B, S>(&mut self, bags: &[B]) -> Result<&mut Self>
    where
        B: AsRef<[S]>,
        S: AsRef<str>,
    {
        // a failed refit leaves the recommender unfitted
        self.model = None;
        self.model = Some(FittedRecommender::fit(bags, self.params)?);
        Ok(self)
    }

    pub fn predict<B, S>(&self, queries: &[B], n: usize) -> Result<Vec<Bag>>
    where
        B: AsRef<[S]> + Sync,
        S: AsRef<str> + Sync,
    {
        self.fitted()?.predict(queries, n)
    }

    /// The current fitted model
    pub fn fitted(&self) -> Result<&FittedRecommender> {
        self.model
            .as_ref()
            .ok_or(RecommenderError::NotFitted { component: "BagRecommender" })
    }

    /// Take the fitted model out, leaving the recommender unfitted
    pub fn into_fitted(self) -> Result<FittedRecommender> {
        self.model
            .ok_or(RecommenderError::NotFitted { component: "BagRecommender" })
    }
}

impl BagEstimator for BagRecommender {
    fn apply_params(&mut self, params: &ParamSet) -> Result<()> {
        for (name, value) in params {
            match (name.as_str(), value) {
                ("k", ParamValue::Int(k)) => self.params.k = *k,
                ("metric", ParamValue::Metric(metric)) => self.params.metric = *metric,
                ("index", ParamValue::Index(index)) => self.params.index = *index,
                ("k" | "metric" | "index", other) => {
                    return Err(RecommenderError::invalid(name.as_str(), other))
                }
                _ => return Err(RecommenderError::UnknownParameter(name.clone())),
            }
        }
        Ok(())
    }

    fn fit_corpus(&mut self, bags: &[Bag]) -> Result<()> {
        self.fit(bags).map(|_| ())
    }

    fn recommend(&self, queries: &[Bag], n: usize) -> Result<Vec<Bag>> {
        self.predict(queries, n)
    }
}

/// Trained nearest-bag model.
/// Owns the vocabulary, the neighbor index and a copy of the training bags;
/// recommendations are read back from the bags, not from the vectors.
#[derive(Debug)]
pub struct FittedRecommender {
    params: RecommenderParams,
    vectorizer: BagsVectorizer,
    index: Box<dyn NeighborIndex>,
    bags: Vec<Bag>,
}

impl FittedRecommender {
    pub fn fit<B, S>(bags: &[B], params: RecommenderParams) -> Result<Self>
    where
        B: AsRef<[S]>,
        S: AsRef<str>,
    {
        params.validate()?;
        let mut vectorizer = BagsVectorizer::new();
        let vectors = vectorizer.fit_transform(bags)?;
        let mut index = params.index.build(params.metric)?;
        index.fit(vectors)?;
        let bags: Vec<Bag> = bags
            .iter()
            .map(|bag| bag.as_ref().iter().map(|s| s.as_ref().to_string()).collect())
            .collect();
        debug!(
            bags = bags.len(),
            k = params.k,
            metric = %params.metric,
            index = %params.index,
            "fitted nearest-bag recommender"
        );
        Ok(Self { params, vectorizer, index, bags })
    }

    /// Recommendations for every query bag, in query order
    pub fn predict<B, S>(&self, queries: &[B], n: usize) -> Result<Vec<Bag>>
    where
        B: AsRef<[S]> + Sync,
        S: AsRef<str> + Sync,
    {
        queries
            .par_iter()
            .map(|query| self.recommend_one(query.as_ref(), n))
            .collect()
    }

    /// Rank the items of the `k` nearest training bags by how many of them
    /// contain each item (ties by vocabulary order), drop the items already
    /// in `query`, keep the first `n`.
    pub fn recommend_one<S>(&self, query: &[S], n: usize) -> Result<Bag>
    where
        S: AsRef<str>,
    {
        let vector = self.vectorizer.transform_one(query)?;
        let neighbors = self.index.kneighbors_with_distance(&vector, self.params.k)?;

        let mut counts = vec![0u32; vector.len()];
        for &(bag, _) in &neighbors.list {
            for item in &self.bags[bag] {
                if let Some(feature) = self.vectorizer.index_of(item) {
                    counts[feature] += 1;
                }
            }
        }
        let mut ranked: Vec<usize> = (0..counts.len()).filter(|&f| counts[f] > 0).collect();
        // stable: equal counts stay in vocabulary order
        ranked.sort_by(|a, b| counts[*b].cmp(&counts[*a]));

        let known: HashSet<&str> = query.iter().map(|s| s.as_ref()).collect();
        Ok(ranked
            .into_iter()
            .filter_map(|f| self.vectorizer.feature_name(f))
            .filter(|item| !known.contains(item))
            .take(n)
            .map(str::to_string)
            .collect())
    }

    pub fn params(&self) -> &RecommenderParams {
        &self.params
    }

    pub fn vectorizer(&self) -> &BagsVectorizer {
        &self.vectorizer
    }

    /// Training bags, in fit order
    pub fn bags(&self) -> &[Bag] {
        &self.bags
    }

    /// Neighbor indices for each query, as the index returns them
    pub fn neighbors<B, S>(&self, queries: &[B]) -> Result<Vec<Vec<usize>>>
    where
        B: AsRef<[S]>,
        S: AsRef<str>,
    {
        let vectors = self.vectorizer.transform(queries)?;
        self.index.kneighbors(&vectors, self.params.k)
    }
}
