use crate::error::{RecommenderError, Result};
use crate::neighbors::{check_k, compare::{jaccard, DistanceMetric}, NeighborIndex, Neighbors};
use crate::vectorizer::feature::FeatureVector;

/// Jaccard neighbor search through a reverse index.
/// For every feature the index keeps the bags containing it, so a query
/// only touches the posting lists of its own items to count intersections.
/// Bags sharing nothing with the query get distance 1 (0 when both are empty),
/// exactly as [`super::BruteForceIndex`] computes them.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    /// feature position -> fit-time bag indices
    postings: Vec<Vec<usize>>,
    /// items per fitted bag
    bag_sizes: Vec<usize>,
    fitted: bool,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bags containing feature `feature`
    pub fn posting(&self, feature: usize) -> &[usize] {
        self.postings.get(feature).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl NeighborIndex for InvertedIndex {
    fn fit(&mut self, vectors: Vec<FeatureVector>) -> Result<()> {
        let dim = vectors.iter().map(|v| v.len()).max().unwrap_or(0);
        let mut postings = vec![Vec::new(); dim];
        let mut bag_sizes = Vec::with_capacity(vectors.len());
        for (bag, vector) in vectors.iter().enumerate() {
            for &feature in vector.indices() {
                postings[feature].push(bag);
            }
            bag_sizes.push(vector.count_ones());
        }
        self.postings = postings;
        self.bag_sizes = bag_sizes;
        self.fitted = true;
        Ok(())
    }

    fn n_fitted(&self) -> usize {
        self.bag_sizes.len()
    }

    fn metric(&self) -> DistanceMetric {
        DistanceMetric::Jaccard
    }

    fn kneighbors_with_distance(&self, query: &FeatureVector, k: usize) -> Result<Neighbors> {
        if !self.fitted {
            return Err(RecommenderError::NotFitted { component: "InvertedIndex" });
        }
        check_k(k, self.bag_sizes.len())?;
        let mut intersections = vec![0usize; self.bag_sizes.len()];
        for &feature in query.indices() {
            for &bag in self.posting(feature) {
                intersections[bag] += 1;
            }
        }
        let query_size = query.count_ones();
        let distances = self
            .bag_sizes
            .iter()
            .zip(intersections)
            .enumerate()
            .map(|(bag, (&size, inter))| (bag, jaccard(inter, query_size + size - inter)))
            .collect();
        Ok(Neighbors::new(distances).nearest(k))
    }
}
