use num::Num;
use serde::{Deserialize, Serialize};

/// Binary presence vector over a fitted vocabulary.
/// Only the positions holding a 1 are stored, sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureVector {
    dim: usize,
    present: Vec<usize>,
}

impl FeatureVector {
    /// Build from the set positions; out-of-range positions are dropped.
    pub fn new(dim: usize, mut present: Vec<usize>) -> Self {
        present.retain(|&i| i < dim);
        present.sort_unstable();
        present.dedup();
        Self { dim, present }
    }

    pub fn zeros(dim: usize) -> Self {
        Self { dim, present: Vec::new() }
    }

    /// Vector length (vocabulary size)
    #[inline]
    pub fn len(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dim == 0
    }

    /// Number of positions set to 1
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.present.len()
    }

    /// True when no position is set
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.present.is_empty()
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.present.binary_search(&index).is_ok()
    }

    /// Set positions, ascending
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.present
    }

    /// Dense row of `N::one()` / `N::zero()`
    pub fn to_dense<N>(&self) -> Vec<N>
    where
        N: Num + Copy,
    {
        let mut row = vec![N::zero(); self.dim];
        for &i in &self.present {
            row[i] = N::one();
        }
        row
    }
}
