//! Automatic seed selection: the globally farthest pair of samples.

use ndarray::ArrayView2;
use rayon::prelude::*;
use tracing::debug;

use crate::config::DEFAULT_MIN_PARALLEL_LEN;
use crate::error::{SamplingError, SamplingResult};

use super::argmax::ArgMax;
use super::distance::DistanceProvider;

/// The two samples with the largest mutual distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedPair {
    /// Lower index of the pair.
    pub first: usize,
    /// Higher index of the pair.
    pub second: usize,
    /// Distance between `first` and `second`.
    pub distance: f32,
}

impl SeedPair {
    /// The pair as a two-element seed, lower index first.
    pub fn indices(&self) -> [usize; 2] {
        [self.first, self.second]
    }
}

/// Finds the farthest pair in a square distance matrix.
///
/// Only the upper triangle is scanned. When several pairs share the
/// maximum, the first one in row-major order is returned.
///
/// # Errors
///
/// Returns [`SamplingError::InvalidArgument`] if the matrix is not square
/// or has fewer than two samples.
pub fn compute_seed(matrix: ArrayView2<'_, f32>) -> SamplingResult<SeedPair> {
    farthest_pair(matrix, DEFAULT_MIN_PARALLEL_LEN)
}

/// Finds the farthest pair through a provider.
///
/// # Errors
///
/// Returns [`SamplingError::InvalidArgument`] if the provider is not backed
/// by a distance matrix; feature-backed selections need an explicit seed.
pub fn compute_seed_from_provider<P>(provider: &P) -> SamplingResult<SeedPair>
where
    P: DistanceProvider + ?Sized,
{
    seed_from_provider(provider, DEFAULT_MIN_PARALLEL_LEN)
}

pub(crate) fn seed_from_provider<P>(
    provider: &P,
    min_parallel_len: usize,
) -> SamplingResult<SeedPair>
where
    P: DistanceProvider + ?Sized,
{
    let matrix = provider.as_matrix().ok_or_else(|| {
        SamplingError::invalid(
            "automatic seed selection requires a distance matrix; pass an explicit seed",
        )
    })?;
    farthest_pair(matrix, min_parallel_len)
}

pub(crate) fn farthest_pair(
    matrix: ArrayView2<'_, f32>,
    min_parallel_len: usize,
) -> SamplingResult<SeedPair> {
    let (n, cols) = matrix.dim();
    if n != cols {
        return Err(SamplingError::invalid(format!(
            "distance matrix must be square, got {}x{}",
            n, cols
        )));
    }
    if n < 2 {
        return Err(SamplingError::invalid(format!(
            "automatic seed selection needs at least 2 samples, got {}",
            n
        )));
    }

    let row_best = |i: usize| {
        let row = matrix.row(i);
        ((i + 1)..n).fold(ArgMax::NONE, |acc, j| {
            acc.combine(ArgMax::new(row[j], i * n + j))
        })
    };

    let best = if n.saturating_mul(n) < min_parallel_len {
        (0..n - 1).map(row_best).fold(ArgMax::NONE, ArgMax::combine)
    } else {
        (0..n - 1)
            .into_par_iter()
            .map(row_best)
            .reduce(|| ArgMax::NONE, ArgMax::combine)
    };

    let pair = SeedPair {
        first: best.index / n,
        second: best.index % n,
        distance: best.value,
    };
    debug!(
        first = pair.first,
        second = pair.second,
        distance = pair.distance,
        "Selected farthest pair as seed"
    );
    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::distance::{
        pairwise_euclidean_distance, FeatureDistance, MatrixDistance,
    };
    use ndarray::{array, Array2};

    #[test]
    fn test_compute_seed_line() {
        let features = array![[0.0f32], [1.0], [2.0], [10.0]];
        let matrix = pairwise_euclidean_distance(features.view());

        let seed = compute_seed(matrix.view()).expect("valid matrix");
        assert_eq!(seed.indices(), [0, 3]);
        assert_eq!(seed.distance, 10.0);
    }

    #[test]
    fn test_compute_seed_tie_first_row_major() {
        let matrix = array![
            [0.0f32, 5.0, 1.0, 5.0],
            [5.0, 0.0, 5.0, 1.0],
            [1.0, 5.0, 0.0, 1.0],
            [5.0, 1.0, 1.0, 0.0]
        ];
        let seed = compute_seed(matrix.view()).expect("valid matrix");
        assert_eq!((seed.first, seed.second), (0, 1));
    }

    #[test]
    fn test_compute_seed_parallel_matches_sequential() {
        let features = Array2::from_shape_fn((60, 3), |(i, j)| ((i * 7 + j * 13) % 23) as f32);
        let matrix = pairwise_euclidean_distance(features.view());

        let sequential = farthest_pair(matrix.view(), usize::MAX).expect("valid");
        let parallel = farthest_pair(matrix.view(), 0).expect("valid");
        assert_eq!(sequential, parallel);
        assert!(sequential.first < sequential.second);
    }

    #[test]
    fn test_compute_seed_all_zero() {
        let matrix = Array2::<f32>::zeros((3, 3));
        let seed = compute_seed(matrix.view()).expect("valid matrix");
        assert_eq!(seed.indices(), [0, 1]);
        assert_eq!(seed.distance, 0.0);
    }

    #[test]
    fn test_compute_seed_too_small() {
        let matrix = Array2::<f32>::zeros((1, 1));
        assert!(matches!(
            compute_seed(matrix.view()),
            Err(SamplingError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_compute_seed_non_square() {
        let matrix = Array2::<f32>::zeros((2, 3));
        assert!(compute_seed(matrix.view()).is_err());
    }

    #[test]
    fn test_seed_from_provider() {
        let features = array![[0.0f32, 0.0], [2.0, 0.0], [-3.0, 5.0]];
        let matrix = pairwise_euclidean_distance(features.view());

        let provider = MatrixDistance::new(matrix.view()).expect("square");
        let seed = compute_seed_from_provider(&provider).expect("matrix provider");
        assert_eq!(seed.indices(), [1, 2]);

        let provider = FeatureDistance::new(features.view()).expect("features");
        let err = compute_seed_from_provider(&provider).unwrap_err();
        assert!(matches!(err, SamplingError::InvalidArgument(_)));
    }
}
