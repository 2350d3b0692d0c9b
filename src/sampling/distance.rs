//! Distance sources for the greedy sampler.
//!
//! A [`DistanceProvider`] answers "how far apart are samples `i` and `j`"
//! either from a precomputed matrix or by computing Euclidean distance
//! between feature rows on demand. Both borrow caller-owned buffers for
//! the lifetime of a selection and never mutate them.

use ndarray::{Array2, ArrayView1, ArrayView2, Zip};

use crate::error::{SamplingError, SamplingResult};

/// Source of pairwise distances between sample indices.
///
/// Implementations must be symmetric with `distance(i, i) == 0`. Indexing
/// is bounds-checked; an index `>= n_samples()` panics. The public
/// selection entry points validate every index before calling into a
/// provider.
pub trait DistanceProvider: Sync {
    /// Number of samples addressed by this provider.
    fn n_samples(&self) -> usize;

    /// Distance between samples `i` and `j`.
    fn distance(&self, i: usize, j: usize) -> f32;

    /// The full distance matrix, when this provider is backed by one.
    ///
    /// Automatic seed selection is only available when this returns `Some`.
    fn as_matrix(&self) -> Option<ArrayView2<'_, f32>> {
        None
    }
}

/// Distance lookup into a precomputed `n × n` matrix.
///
/// The matrix can hold any metric (plain or squared Euclidean are
/// typical); the sampler only compares values.
#[derive(Debug, Clone, Copy)]
pub struct MatrixDistance<'a> {
    matrix: ArrayView2<'a, f32>,
}

impl<'a> MatrixDistance<'a> {
    /// Wraps a square distance matrix.
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError::InvalidArgument`] if the matrix is not square.
    pub fn new(matrix: ArrayView2<'a, f32>) -> SamplingResult<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols {
            return Err(SamplingError::invalid(format!(
                "distance matrix must be square, got {}x{}",
                rows, cols
            )));
        }
        Ok(Self { matrix })
    }
}

impl DistanceProvider for MatrixDistance<'_> {
    fn n_samples(&self) -> usize {
        self.matrix.nrows()
    }

    #[inline]
    fn distance(&self, i: usize, j: usize) -> f32 {
        self.matrix[[i, j]]
    }

    fn as_matrix(&self) -> Option<ArrayView2<'_, f32>> {
        Some(self.matrix)
    }
}

/// Euclidean distance computed from an `n × d` feature matrix.
///
/// Costs `O(d)` per lookup but needs no `n × n` buffer.
#[derive(Debug, Clone, Copy)]
pub struct FeatureDistance<'a> {
    features: ArrayView2<'a, f32>,
}

impl<'a> FeatureDistance<'a> {
    /// Wraps a row-major feature matrix (one sample per row).
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError::InvalidArgument`] if there are samples but
    /// no feature columns.
    pub fn new(features: ArrayView2<'a, f32>) -> SamplingResult<Self> {
        if features.nrows() > 0 && features.ncols() == 0 {
            return Err(SamplingError::invalid(
                "feature matrix has samples but no feature columns",
            ));
        }
        Ok(Self { features })
    }

    /// Number of feature columns.
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }
}

impl DistanceProvider for FeatureDistance<'_> {
    fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    #[inline]
    fn distance(&self, i: usize, j: usize) -> f32 {
        euclidean_distance(self.features.row(i), self.features.row(j))
    }
}

/// Euclidean (L2) distance between two vectors.
///
/// # Panics
///
/// Panics if vectors have different lengths.
pub fn euclidean_distance(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    assert_eq!(
        a.len(),
        b.len(),
        "Vectors must have the same length for Euclidean distance"
    );

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

/// Computes the pairwise Euclidean distance matrix of a feature matrix.
///
/// Uses the same arithmetic as [`FeatureDistance`], so selections run on
/// the returned matrix match feature-backed selections exactly.
pub fn pairwise_euclidean_distance(features: ArrayView2<'_, f32>) -> Array2<f32> {
    let n = features.nrows();
    let mut distance_matrix = Array2::zeros((n, n));

    Zip::indexed(&mut distance_matrix).par_for_each(|(i, j), dist| {
        if i != j {
            *dist = euclidean_distance(features.row(i), features.row(j));
        }
    });

    distance_matrix
}
