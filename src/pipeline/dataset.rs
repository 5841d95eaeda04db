//! Random input generation.

use std::num::NonZeroU32;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Integers drawn uniformly from `[0, bound)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericDataset {
    values: Vec<u32>,
}

impl NumericDataset {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Up to the first `n` values, for log previews.
    pub fn head(&self, n: usize) -> &[u32] {
        &self.values[..n.min(self.values.len())]
    }

    pub fn into_values(self) -> Vec<u32> {
        self.values
    }
}

impl From<Vec<u32>> for NumericDataset {
    fn from(values: Vec<u32>) -> Self {
        Self { values }
    }
}

/// Produces datasets from its own random source.
#[derive(Debug, Clone)]
pub struct DatasetGenerator<R = StdRng> {
    rng: R,
}

impl DatasetGenerator<StdRng> {
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Same seed, same sequence of datasets.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> DatasetGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate(&mut self, size: usize, bound: NonZeroU32) -> NumericDataset {
        let values = (0..size)
            .map(|_| self.rng.gen_range(0..bound.get()))
            .collect();
        NumericDataset { values }
    }
}
