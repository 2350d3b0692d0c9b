//! Kennard-Stone farthest-point sampling.
//!
//! Kennard-Stone picks an ordered subset of samples that spreads over the
//! data as evenly as possible: every new pick is the sample farthest from
//! everything chosen so far. The ordering is typically cut into a
//! calibration set (the first picks) and a validation set (the rest).
//!
//! This module provides four main components:
//!
//! 1. **Distance** - Matrix lookup or on-demand Euclidean distance behind
//!    one [`DistanceProvider`] trait
//! 2. **Argmax** - Deterministic parallel `(value, index)` reduction
//! 3. **Seed** - Farthest-pair search used when no seed is supplied
//! 4. **Greedy** - The max-min selection loop itself, plus splitting helpers
//!
//! # Usage
//!
//! ```rust
//! use ks_sampling::sampling::{kennard_stone_matrix, pairwise_euclidean_distance};
//! use ndarray::array;
//!
//! let points = array![[0.0f32], [1.0], [2.0], [10.0]];
//! let distances = pairwise_euclidean_distance(points.view());
//!
//! let selection = kennard_stone_matrix(distances.view(), None, None)?;
//! assert_eq!(selection.indices, vec![0, 3, 2, 1]);
//! assert_eq!(selection.coverage, vec![10.0, 2.0, 1.0]);
//! # Ok::<(), ks_sampling::SamplingError>(())
//! ```
//!
//! # Determinism
//!
//! Ties between equally distant candidates always go to the lowest sample
//! index, so results do not depend on the number of worker threads.

pub mod argmax;
pub mod distance;
pub mod greedy;
pub mod seed;
pub mod split;

// Re-export main types for convenience
pub use argmax::{argmax_unselected, parallel_argmax_by, ArgMax};
pub use distance::{
    euclidean_distance, pairwise_euclidean_distance, DistanceProvider, FeatureDistance,
    MatrixDistance,
};
pub use greedy::{
    kennard_stone_features, kennard_stone_matrix, select_farthest_points, GreedySampler,
    Selection,
};
pub use seed::{compute_seed, compute_seed_from_provider, SeedPair};
pub use split::{train_test_split, train_test_split_with_seed, Split, SplitSize, MIN_TRAIN_SIZE};
