//! k-nearest-neighbor search over vectorized bags.
//!
//! [`NeighborIndex`] is the capability the recommender depends on: "given
//! fitted vectors and a metric, return the k nearest". Two implementations
//! are provided and selected through [`IndexKind`]:
//! - [`BruteForceIndex`]: exact scan, any [`DistanceMetric`]
//! - [`InvertedIndex`]: item → bag posting lists, Jaccard only

pub mod brute;
pub mod compare;
pub mod inverted;

use std::{cmp::Ordering, fmt::{self, Debug}, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{RecommenderError, Result};
use crate::vectorizer::feature::FeatureVector;

pub use brute::BruteForceIndex;
pub use compare::DistanceMetric;
pub use inverted::InvertedIndex;

/// Search capability over a fitted set of feature vectors
pub trait NeighborIndex: Send + Sync + Debug {
    /// Replace the indexed vectors
    fn fit(&mut self, vectors: Vec<FeatureVector>) -> Result<()>;

    /// Number of fitted vectors
    fn n_fitted(&self) -> usize;

    /// Metric used to rank neighbors
    fn metric(&self) -> DistanceMetric;

    /// The `k` nearest fitted vectors to `query`,
    /// ascending distance, ties by ascending fit-time index
    fn kneighbors_with_distance(&self, query: &FeatureVector, k: usize) -> Result<Neighbors>;

    /// Neighbor indices for every query row
    fn kneighbors(&self, queries: &[FeatureVector], k: usize) -> Result<Vec<Vec<usize>>> {
        queries
            .iter()
            .map(|q| Ok(self.kneighbors_with_distance(q, k)?.indices()))
            .collect()
    }
}

/// Which [`NeighborIndex`] implementation to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IndexKind {
    #[default]
    BruteForce,
    Inverted,
}

impl IndexKind {
    /// Build an empty index of this kind for `metric`
    pub fn build(&self, metric: DistanceMetric) -> Result<Box<dyn NeighborIndex>> {
        Ok(match self {
            IndexKind::BruteForce => Box::new(BruteForceIndex::new(metric)?),
            IndexKind::Inverted => {
                if metric != DistanceMetric::Jaccard {
                    return Err(RecommenderError::invalid(
                        "metric",
                        format!("{metric} (inverted index supports jaccard only)"),
                    ));
                }
                Box::new(InvertedIndex::new())
            }
        })
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::BruteForce => write!(f, "brute"),
            IndexKind::Inverted => write!(f, "inverted"),
        }
    }
}

impl FromStr for IndexKind {
    type Err = RecommenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brute" | "brute_force" | "bruteforce" => Ok(IndexKind::BruteForce),
            "inverted" => Ok(IndexKind::Inverted),
            _ => Err(RecommenderError::invalid("index", s)),
        }
    }
}

/// Neighbor search result
pub struct Neighbors {
    /// (fit-time index, distance)
    pub list: Vec<(usize, f64)>,
}

impl Neighbors {
    pub fn new(list: Vec<(usize, f64)>) -> Self {
        Neighbors { list }
    }

    /// Keep the `k` closest entries, ascending distance then index
    pub fn nearest(mut self, k: usize) -> Self {
        if k < self.list.len() {
            if k == 0 {
                self.list.clear();
                return self;
            }
            self.list.select_nth_unstable_by(k - 1, by_distance);
            self.list.truncate(k);
        }
        self.list.sort_by(by_distance);
        self
    }

    pub fn indices(&self) -> Vec<usize> {
        self.list.iter().map(|(i, _)| *i).collect()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl Debug for Neighbors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Neighbors [")?;
            for (index, distance) in &self.list {
                writeln!(f, "    #{}: {:.6}", index, distance)?;
            }
            write!(f, "]")
        } else {
            f.debug_list().entries(&self.list).finish()
        }
    }
}

/// Shared argument checks for `kneighbors_with_distance`
pub(crate) fn check_k(k: usize, available: usize) -> Result<()> {
    if k == 0 {
        return Err(RecommenderError::invalid("k", k));
    }
    if k > available {
        return Err(RecommenderError::InvalidK { k, available });
    }
    Ok(())
}

pub(crate) fn by_distance(a: &(usize, f64), b: &(usize, f64)) -> Ordering {
    a.1.total_cmp(&b.1).then(a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_orders_by_distance_then_index() {
        let n = Neighbors::new(vec![(4, 0.5), (0, 0.5), (2, 0.1), (3, 1.0), (1, 0.5)]).nearest(3);
        assert_eq!(n.list, vec![(2, 0.1), (0, 0.5), (1, 0.5)]);
    }

    #[test]
    fn nearest_with_large_k_sorts_all() {
        let n = Neighbors::new(vec![(1, 1.0), (0, 1.0)]).nearest(10);
        assert_eq!(n.indices(), vec![0, 1]);
        assert_eq!(format!("{:?}", n), "[(0, 1.0), (1, 1.0)]");
    }

    #[test]
    fn inverted_requires_jaccard() {
        assert!(IndexKind::Inverted.build(DistanceMetric::Euclidean).is_err());
        assert!(IndexKind::Inverted.build(DistanceMetric::Jaccard).is_ok());
        assert!(IndexKind::BruteForce.build(DistanceMetric::Minkowski(0.0)).is_err());
    }

    #[test]
    fn index_kind_round_trips_through_str() {
        for kind in [IndexKind::BruteForce, IndexKind::Inverted] {
            assert_eq!(kind.to_string().parse::<IndexKind>().unwrap(), kind);
        }
    }
}
