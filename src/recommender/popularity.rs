use std::collections::HashSet;

use crate::error::{RecommenderError, Result};
use crate::model_selection::grid::ParamSet;
use crate::recommender::BagEstimator;
use crate::vectorizer::BagsVectorizer;
use crate::Bag;

/// Baseline that ignores the query's neighborhood and always recommends the
/// most frequent training items the query does not already contain.
/// Useful as a floor when reading cross-validation scores.
#[derive(Debug, Clone, Default)]
pub struct PopularityRecommender {
    vectorizer: BagsVectorizer,
}

impl PopularityRecommender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit<B, S>(&mut self, bags: &[B]) -> Result<&mut Self>
    where
        B: AsRef<[S]>,
        S: AsRef<str>,
    {
        self.vectorizer = BagsVectorizer::new();
        self.vectorizer.fit(bags)?;
        Ok(self)
    }

    pub fn predict<B, S>(&self, queries: &[B], n: usize) -> Result<Vec<Bag>>
    where
        B: AsRef<[S]>,
        S: AsRef<str>,
    {
        let ranked = self.vectorizer.feature_names()?;
        Ok(queries
            .iter()
            .map(|query| {
                let known: HashSet<&str> = query.as_ref().iter().map(|s| s.as_ref()).collect();
                ranked
                    .iter()
                    .filter(|item| !known.contains(*item))
                    .take(n)
                    .map(|item| item.to_string())
                    .collect()
            })
            .collect())
    }
}

impl BagEstimator for PopularityRecommender {
    /// No tunable parameters
    fn apply_params(&mut self, params: &ParamSet) -> Result<()> {
        match params.keys().next() {
            Some(name) => Err(RecommenderError::UnknownParameter(name.clone())),
            None => Ok(()),
        }
    }

    fn fit_corpus(&mut self, bags: &[Bag]) -> Result<()> {
        self.fit(bags).map(|_| ())
    }

    fn recommend(&self, queries: &[Bag], n: usize) -> Result<Vec<Bag>> {
        self.predict(queries, n)
    }
}
