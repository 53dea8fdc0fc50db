use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{RecommenderError, Result};
use crate::vectorizer::feature::FeatureVector;

/// Set distance used to rank neighbor bags
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum DistanceMetric {
    /// 1 - |A∩B| / |A∪B|
    #[default]
    Jaccard,
    /// sqrt(Σ(a_i - b_i)^2)
    Euclidean,
    /// Σ|a_i - b_i|
    Manhattan,
    /// (Σ|a_i - b_i|^p)^(1/p), p >= 1
    Minkowski(f64),
    /// max|a_i - b_i|
    Chebyshev,
    /// 1 - A・B / (|A||B|)
    Cosine,
}

/// Overlap of two binary vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Overlap {
    /// positions set in both
    pub both: usize,
    /// positions set only in the left vector
    pub only_a: usize,
    /// positions set only in the right vector
    pub only_b: usize,
}

impl Overlap {
    /// Merge-walk both sorted position lists
    pub fn of(a: &FeatureVector, b: &FeatureVector) -> Self {
        let mut a_it = a.indices().iter().fuse();
        let mut b_it = b.indices().iter().fuse();
        let mut a_next = a_it.next();
        let mut b_next = b_it.next();
        let mut overlap = Overlap::default();
        while let (Some(ia), Some(ib)) = (a_next, b_next) {
            match ia.cmp(ib) {
                Ordering::Equal => {
                    overlap.both += 1;
                    a_next = a_it.next();
                    b_next = b_it.next();
                }
                Ordering::Less => {
                    overlap.only_a += 1;
                    a_next = a_it.next();
                }
                Ordering::Greater => {
                    overlap.only_b += 1;
                    b_next = b_it.next();
                }
            }
        }
        // remaining positions on either side
        overlap.only_a += a_next.into_iter().count() + a_it.count();
        overlap.only_b += b_next.into_iter().count() + b_it.count();
        overlap
    }

    #[inline]
    pub fn union(&self) -> usize {
        self.both + self.only_a + self.only_b
    }

    /// Size of the symmetric difference
    #[inline]
    pub fn differing(&self) -> usize {
        self.only_a + self.only_b
    }
}

impl DistanceMetric {
    /// Reject parameters the metric cannot work with
    pub fn validate(&self) -> Result<()> {
        match self {
            DistanceMetric::Minkowski(p) if !p.is_finite() || *p < 1.0 => {
                Err(RecommenderError::invalid("metric", self))
            }
            _ => Ok(()),
        }
    }

    /// Distance between two binary vectors.
    /// Two all-zero vectors are identical under every metric (distance 0),
    /// which keeps Jaccard defined for empty bags.
    pub fn distance(&self, a: &FeatureVector, b: &FeatureVector) -> f64 {
        self.distance_from_overlap(&Overlap::of(a, b))
    }

    pub fn distance_from_overlap(&self, overlap: &Overlap) -> f64 {
        let diff = overlap.differing() as f64;
        match self {
            DistanceMetric::Jaccard => jaccard(overlap.both, overlap.union()),
            DistanceMetric::Euclidean => diff.sqrt(),
            DistanceMetric::Manhattan => diff,
            DistanceMetric::Minkowski(p) => diff.powf(1.0 / p),
            DistanceMetric::Chebyshev => {
                if overlap.differing() > 0 { 1.0 } else { 0.0 }
            }
            DistanceMetric::Cosine => {
                let norm_a = (overlap.both + overlap.only_a) as f64;
                let norm_b = (overlap.both + overlap.only_b) as f64;
                if norm_a == 0.0 && norm_b == 0.0 {
                    0.0
                } else if norm_a == 0.0 || norm_b == 0.0 {
                    1.0
                } else {
                    1.0 - overlap.both as f64 / (norm_a * norm_b).sqrt()
                }
            }
        }
    }
}

/// Jaccard distance from intersection and union sizes.
/// The inverted index computes its distances through this same function.
#[inline]
pub(crate) fn jaccard(intersection: usize, union: usize) -> f64 {
    if union == 0 {
        0.0
    } else {
        (union - intersection) as f64 / union as f64
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Jaccard => write!(f, "jaccard"),
            DistanceMetric::Euclidean => write!(f, "euclidean"),
            DistanceMetric::Manhattan => write!(f, "manhattan"),
            DistanceMetric::Minkowski(p) if *p == 2.0 => write!(f, "minkowski"),
            DistanceMetric::Minkowski(p) => write!(f, "minkowski:{p}"),
            DistanceMetric::Chebyshev => write!(f, "chebyshev"),
            DistanceMetric::Cosine => write!(f, "cosine"),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = RecommenderError;

    /// Accepts `jaccard`, `euclidean`, `manhattan`, `chebyshev`, `cosine`,
    /// `minkowski` (p = 2) and `minkowski:<p>`
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let metric = match lower.as_str() {
            "jaccard" => DistanceMetric::Jaccard,
            "euclidean" => DistanceMetric::Euclidean,
            "manhattan" | "cityblock" => DistanceMetric::Manhattan,
            "minkowski" => DistanceMetric::Minkowski(2.0),
            "chebyshev" => DistanceMetric::Chebyshev,
            "cosine" => DistanceMetric::Cosine,
            other => match other.strip_prefix("minkowski:") {
                Some(p) => DistanceMetric::Minkowski(
                    p.parse().map_err(|_| RecommenderError::invalid("metric", s))?,
                ),
                None => return Err(RecommenderError::invalid("metric", s)),
            },
        };
        metric.validate()?;
        Ok(metric)
    }
}
