//! ks-sampling: Kennard-Stone farthest-point sampling.
//!
//! This library selects representative, space-filling subsets of a sample
//! population from either a precomputed distance matrix or raw feature
//! vectors, and splits data into calibration/validation sets.

pub mod config;
pub mod error;
pub mod sampling;

pub use config::{CancelFlag, SamplerConfig};
pub use error::{SamplingError, SamplingResult};
pub use sampling::{
    compute_seed, kennard_stone_features, kennard_stone_matrix, pairwise_euclidean_distance,
    select_farthest_points, train_test_split, DistanceProvider, FeatureDistance, GreedySampler,
    MatrixDistance, Selection, Split, SplitSize,
};
