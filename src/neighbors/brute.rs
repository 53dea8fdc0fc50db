use rayon::prelude::*;

use crate::error::{RecommenderError, Result};
use crate::neighbors::{check_k, compare::DistanceMetric, NeighborIndex, Neighbors};
use crate::vectorizer::feature::FeatureVector;

/// Exact neighbor search: every query is compared with every fitted vector.
/// Distances are computed in parallel; the result does not depend on the
/// thread count because collection keeps fit-time order.
#[derive(Debug, Clone)]
pub struct BruteForceIndex {
    metric: DistanceMetric,
    vectors: Option<Vec<FeatureVector>>,
}

impl BruteForceIndex {
    pub fn new(metric: DistanceMetric) -> Result<Self> {
        metric.validate()?;
        Ok(Self { metric, vectors: None })
    }

    fn vectors(&self) -> Result<&[FeatureVector]> {
        self.vectors
            .as_deref()
            .ok_or(RecommenderError::NotFitted { component: "BruteForceIndex" })
    }
}

impl NeighborIndex for BruteForceIndex {
    fn fit(&mut self, vectors: Vec<FeatureVector>) -> Result<()> {
        self.vectors = Some(vectors);
        Ok(())
    }

    fn n_fitted(&self) -> usize {
        self.vectors.as_ref().map_or(0, |v| v.len())
    }

    fn metric(&self) -> DistanceMetric {
        self.metric
    }

    fn kneighbors_with_distance(&self, query: &FeatureVector, k: usize) -> Result<Neighbors> {
        let vectors = self.vectors()?;
        check_k(k, vectors.len())?;
        let distances: Vec<(usize, f64)> = vectors
            .par_iter()
            .enumerate()
            .map(|(i, v)| (i, self.metric.distance(query, v)))
            .collect();
        Ok(Neighbors::new(distances).nearest(k))
    }
}
