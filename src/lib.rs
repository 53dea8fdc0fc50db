//! This crate recommends laboratory tests from the bags of tests requested together,
//! and evaluates recommenders with ranking metrics and cross-validation.
//!
//! ```
//! use labo_recommender::{BagRecommender, DistanceMetric};
//!
//! let bags = vec![vec!["sodium", "potassium"], vec!["sodium", "chloride"], vec!["pt", "inr"]];
//! let mut recommender = BagRecommender::new();
//! recommender.set_params(1, DistanceMetric::Jaccard).fit(&bags).unwrap();
//! assert_eq!(recommender.predict(&[vec!["pt"]], 3).unwrap(), vec![vec!["inr"]]);
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod model_selection;
pub mod neighbors;
pub mod recommender;
pub mod vectorizer;

/// A single test name
pub type Item = String;

/// An unordered group of tests requested together.
/// Order is kept as given; supervised splitting cuts bags by position.
pub type Bag = Vec<Item>;

/// Bags Vectorizer
/// Learns the vocabulary of a bag corpus and encodes bags as binary presence
/// vectors over it.
///
/// The vocabulary is ordered by descending item frequency, ties broken by
/// first occurrence, so feature positions are stable for a given corpus.
/// Items unseen at fit time are ignored when transforming.
///
/// # Serialization
/// Supported.
pub use vectorizer::BagsVectorizer;

/// Item Frequency structure
/// Counts every occurrence of each item across the bags, plus the total
/// number of occurrences. The vocabulary is built from these counts, and
/// they can also be used directly for corpus analysis.
///
/// # Serialization
/// Supported.
pub use vectorizer::frequency::ItemFrequency;

/// Binary presence vector
/// Holds the sorted feature positions set to 1 and the vector dimension.
pub use vectorizer::feature::FeatureVector;

/// Distance between two presence vectors
/// Jaccard (default), Euclidean, Manhattan, Minkowski(p), Chebyshev and Cosine.
pub use neighbors::DistanceMetric;

/// Neighbor search
/// `NeighborIndex` is the seam between the recommender and the search strategy.
/// `IndexKind` selects between an exhaustive scan and a posting-list index
/// (Jaccard only); both return identical neighbors.
pub use neighbors::{IndexKind, NeighborIndex};

/// Nearest-bag recommender
/// `BagRecommender` holds hyperparameters and swaps in a new
/// `FittedRecommender` on every fit. A fitted model is read-only and answers
/// queries in parallel.
///
/// `PopularityRecommender` is a frequency baseline sharing the same
/// `BagEstimator` interface, so both can be cross-validated and grid searched.
pub use recommender::{BagEstimator, BagRecommender, FittedRecommender, PopularityRecommender};

/// Hyperparameters and evaluation settings, loadable from JSON or `LABO_*`
/// environment variables
pub use config::{LaboConfig, RecommenderParams, ValidationConfig};

/// Error type and result alias
pub use error::{RecommenderError, Result};
