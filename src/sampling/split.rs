//! Calibration/validation splitting on top of a Kennard-Stone ordering.
//!
//! The first `train` samples of the ordering form the calibration set; all
//! remaining samples form the validation set.

use fixedbitset::FixedBitSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SamplingError, SamplingResult};

use super::distance::DistanceProvider;
use super::greedy::GreedySampler;

/// Smallest calibration set a split may produce.
pub const MIN_TRAIN_SIZE: usize = 2;

/// How large the validation (test) part of a split should be.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSize {
    /// Fraction of all samples, in `[0, 1)`. `0.0` keeps every sample for
    /// calibration.
    Fraction(f64),
    /// Absolute number of samples.
    Count(usize),
}

impl SplitSize {
    /// Number of calibration samples this split leaves out of `n_sample`.
    ///
    /// Fractions round half to even: 10 samples at `Fraction(0.25)` keep
    /// `round(7.5) = 8` for calibration, 6 samples keep `round(4.5) = 4`.
    pub fn train_size(&self, n_sample: usize) -> SamplingResult<usize> {
        let train = match *self {
            SplitSize::Fraction(f) => {
                if !(0.0..1.0).contains(&f) {
                    return Err(SamplingError::invalid(format!(
                        "test fraction must lie in [0, 1), got {}",
                        f
                    )));
                }
                (n_sample as f64 * (1.0 - f)).round_ties_even() as usize
            }
            SplitSize::Count(k) => n_sample.checked_sub(k).ok_or_else(|| {
                SamplingError::invalid(format!(
                    "test size {} exceeds the number of samples ({})",
                    k, n_sample
                ))
            })?,
        };

        if train < MIN_TRAIN_SIZE {
            return Err(SamplingError::invalid(format!(
                "train sample size should be at least {}, got {}",
                MIN_TRAIN_SIZE, train
            )));
        }
        Ok(train)
    }
}

/// Result of a Kennard-Stone split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// Calibration indices in selection order.
    pub train: Vec<usize>,
    /// Validation indices in ascending order.
    pub test: Vec<usize>,
    /// Coverage distances of the calibration selection.
    pub coverage: Vec<f32>,
}

impl Split {
    /// Fraction of samples that went to the validation set.
    pub fn test_ratio(&self) -> f64 {
        let total = self.train.len() + self.test.len();
        if total == 0 {
            return 0.0;
        }
        self.test.len() as f64 / total as f64
    }
}

impl GreedySampler {
    /// Splits the samples of `provider` into calibration and validation sets.
    ///
    /// `seed` follows the same rules as [`GreedySampler::select`].
    pub fn split<P>(
        &self,
        provider: &P,
        seed: Option<&[usize]>,
        test_size: SplitSize,
    ) -> SamplingResult<Split>
    where
        P: DistanceProvider + ?Sized,
    {
        let n_sample = provider.n_samples();
        let n_train = test_size.train_size(n_sample)?;
        let selection = self.select(provider, seed, Some(n_train))?;

        let mut in_train = FixedBitSet::with_capacity(n_sample);
        for &i in &selection.indices {
            in_train.insert(i);
        }
        let test: Vec<usize> = (0..n_sample).filter(|&i| !in_train.contains(i)).collect();

        let split = Split {
            train: selection.indices,
            test,
            coverage: selection.coverage,
        };
        debug!(
            train = split.train.len(),
            test = split.test.len(),
            test_ratio = split.test_ratio(),
            "Kennard-Stone split complete"
        );
        Ok(split)
    }
}

/// Splits a matrix-backed provider, deriving the seed automatically.
pub fn train_test_split<P>(provider: &P, test_size: SplitSize) -> SamplingResult<Split>
where
    P: DistanceProvider + ?Sized,
{
    GreedySampler::default().split(provider, None, test_size)
}

/// Splits starting from an explicit seed; works for any provider.
pub fn train_test_split_with_seed<P>(
    provider: &P,
    seed: &[usize],
    test_size: SplitSize,
) -> SamplingResult<Split>
where
    P: DistanceProvider + ?Sized,
{
    GreedySampler::default().split(provider, Some(seed), test_size)
}
