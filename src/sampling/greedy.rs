//! Greedy max-min (Kennard-Stone) selection loop.
//!
//! Algorithm:
//! 1. Start from the seed (supplied, or the farthest pair of the matrix)
//! 2. Track, for every unselected sample, its distance to the nearest
//!    selected sample
//! 3. Repeatedly select the sample whose nearest-selected distance is
//!    largest, then relax the tracked distances against it
//!
//! Each iteration runs two data-parallel phases (argmax scan, then the
//! min-distance sweep). Iterations are strictly sequential.

use std::sync::Arc;

use fixedbitset::FixedBitSet;
use ndarray::ArrayView2;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::SamplerConfig;
use crate::error::{SamplingError, SamplingResult};

use super::argmax::argmax_unselected;
use super::distance::{DistanceProvider, FeatureDistance, MatrixDistance};
use super::seed::seed_from_provider;

/// Ordered output of a Kennard-Stone selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Selected sample indices in pick order; starts with the seed.
    pub indices: Vec<usize>,
    /// `coverage[k]` is the distance from `indices[k + 1]` to the nearest of
    /// `indices[..=k]` at the time it was added. One shorter than `indices`.
    pub coverage: Vec<f32>,
}

impl Selection {
    /// Number of selected samples.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Coverage distance reached by the last pick, if any.
    pub fn final_coverage(&self) -> Option<f32> {
        self.coverage.last().copied()
    }
}

/// Kennard-Stone sampler over any [`DistanceProvider`].
#[derive(Debug, Clone)]
pub struct GreedySampler {
    config: SamplerConfig,
    pool: Option<Arc<ThreadPool>>,
}

impl Default for GreedySampler {
    fn default() -> Self {
        Self {
            config: SamplerConfig::default(),
            pool: None,
        }
    }
}

impl GreedySampler {
    /// Creates a sampler, building a dedicated thread pool when
    /// `config.num_threads` is set.
    pub fn new(config: SamplerConfig) -> SamplingResult<Self> {
        config.validate()?;
        let pool = match config.num_threads {
            Some(threads) => Some(Arc::new(
                ThreadPoolBuilder::new().num_threads(threads).build()?,
            )),
            None => None,
        };
        Ok(Self { config, pool })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Selects up to `n_result` samples by farthest-point sampling.
    ///
    /// # Arguments
    ///
    /// * `provider` - Source of pairwise distances.
    /// * `seed` - Initial selection, kept as the output prefix. `None`
    ///   derives the farthest pair, which needs a matrix-backed provider.
    /// * `n_result` - Samples to select. `None` falls back to
    ///   `config.default_n_result`, then to every sample.
    ///
    /// # Errors
    ///
    /// All arguments are validated before any work starts:
    /// [`SamplingError::OutOfRange`] for seed indices past the sample
    /// count, [`SamplingError::InvalidArgument`] for bad sizes, empty or
    /// duplicated seeds, and seed-less calls on feature-backed providers.
    pub fn select<P>(
        &self,
        provider: &P,
        seed: Option<&[usize]>,
        n_result: Option<usize>,
    ) -> SamplingResult<Selection>
    where
        P: DistanceProvider + ?Sized,
    {
        match &self.pool {
            Some(pool) => pool.install(|| self.run(provider, seed, n_result)),
            None => self.run(provider, seed, n_result),
        }
    }

    fn run<P>(
        &self,
        provider: &P,
        seed: Option<&[usize]>,
        n_result: Option<usize>,
    ) -> SamplingResult<Selection>
    where
        P: DistanceProvider + ?Sized,
    {
        let n_sample = provider.n_samples();
        let n_result = n_result
            .or(self.config.default_n_result)
            .unwrap_or(n_sample);

        if n_result == 0 {
            return Err(SamplingError::invalid("n_result must be at least 1"));
        }
        if n_result > n_sample {
            return Err(SamplingError::invalid(format!(
                "n_result ({}) exceeds the number of samples ({})",
                n_result, n_sample
            )));
        }
        if seed.is_none() && n_result < 2 {
            return Err(SamplingError::invalid(format!(
                "the automatic seed is a pair of samples but only {} was requested",
                n_result
            )));
        }

        let seed: Vec<usize> = match seed {
            Some(seed) => {
                validate_seed(seed, n_sample)?;
                seed.to_vec()
            }
            None => seed_from_provider(provider, self.config.min_parallel_len)?
                .indices()
                .to_vec(),
        };
        if seed.len() > n_result {
            return Err(SamplingError::invalid(format!(
                "seed has {} samples but only {} were requested",
                seed.len(),
                n_result
            )));
        }

        debug!(
            n_sample,
            n_seed = seed.len(),
            n_result,
            "Starting Kennard-Stone selection"
        );

        let mut state = SelectionState::allocate(n_sample, n_result)?;
        state.start(provider, seed[0], self.config.min_parallel_len);
        for &s in &seed[1..] {
            let distance = state.min_vals[s];
            state.add(provider, s, distance, n_result, self.config.min_parallel_len);
        }

        while state.indices.len() < n_result {
            if self.config.is_cancelled() {
                debug!(selected = state.indices.len(), "Selection cancelled");
                return Err(SamplingError::Cancelled {
                    selected: state.indices.len(),
                });
            }

            let best = argmax_unselected(
                &state.min_vals,
                &state.selected,
                self.config.min_parallel_len,
            )
            .ok_or_else(|| SamplingError::invalid("no unselected samples remain"))?;

            trace!(
                step = state.indices.len(),
                index = best.index,
                distance = best.value,
                "Selected sample"
            );
            state.add(
                provider,
                best.index,
                best.value,
                n_result,
                self.config.min_parallel_len,
            );
        }

        let selection = Selection {
            indices: state.indices,
            coverage: state.coverage,
        };
        debug!(
            selected = selection.len(),
            final_coverage = ?selection.final_coverage(),
            "Kennard-Stone selection complete"
        );
        Ok(selection)
    }
}

/// Scratch and output buffers for one selection call.
struct SelectionState {
    selected: FixedBitSet,
    min_vals: Vec<f32>,
    indices: Vec<usize>,
    coverage: Vec<f32>,
}

impl SelectionState {
    fn allocate(n_sample: usize, n_result: usize) -> SamplingResult<Self> {
        let mut min_vals = Vec::new();
        min_vals.try_reserve_exact(n_sample)?;
        min_vals.resize(n_sample, 0.0);

        let mut indices = Vec::new();
        indices.try_reserve_exact(n_result)?;
        let mut coverage = Vec::new();
        coverage.try_reserve_exact(n_result.saturating_sub(1))?;

        Ok(Self {
            selected: FixedBitSet::with_capacity(n_sample),
            min_vals,
            indices,
            coverage,
        })
    }

    /// Selects the first sample and fills `min_vals` with distances to it.
    fn start<P>(&mut self, provider: &P, first: usize, min_parallel_len: usize)
    where
        P: DistanceProvider + ?Sized,
    {
        let fill = |(i, v): (usize, &mut f32)| *v = provider.distance(first, i);
        if self.min_vals.len() < min_parallel_len {
            self.min_vals.iter_mut().enumerate().for_each(fill);
        } else {
            self.min_vals.par_iter_mut().enumerate().for_each(fill);
        }
        self.selected.insert(first);
        self.indices.push(first);
    }

    /// Appends `index` and relaxes the remaining distances against it.
    fn add<P>(
        &mut self,
        provider: &P,
        index: usize,
        distance: f32,
        n_result: usize,
        min_parallel_len: usize,
    ) where
        P: DistanceProvider + ?Sized,
    {
        self.coverage.push(distance);
        self.selected.insert(index);
        self.indices.push(index);

        if self.indices.len() < n_result {
            relax_min_distances(
                provider,
                &mut self.min_vals,
                &self.selected,
                index,
                min_parallel_len,
            );
        }
    }
}

/// `min_vals[i] = min(min_vals[i], distance(pivot, i))` for unselected `i`.
fn relax_min_distances<P>(
    provider: &P,
    min_vals: &mut [f32],
    selected: &FixedBitSet,
    pivot: usize,
    min_parallel_len: usize,
) where
    P: DistanceProvider + ?Sized,
{
    let update = |(i, v): (usize, &mut f32)| {
        if !selected.contains(i) {
            let d = provider.distance(pivot, i);
            if d < *v {
                *v = d;
            }
        }
    };

    if min_vals.len() < min_parallel_len {
        min_vals.iter_mut().enumerate().for_each(update);
    } else {
        min_vals.par_iter_mut().enumerate().for_each(update);
    }
}

fn validate_seed(seed: &[usize], n_sample: usize) -> SamplingResult<()> {
    if seed.is_empty() {
        return Err(SamplingError::invalid("seed must contain at least one sample"));
    }
    if seed.len() > n_sample {
        return Err(SamplingError::invalid(format!(
            "seed has {} samples but there are only {}",
            seed.len(),
            n_sample
        )));
    }

    let mut seen = FixedBitSet::with_capacity(n_sample);
    for &index in seed {
        if index >= n_sample {
            return Err(SamplingError::OutOfRange {
                index,
                n_samples: n_sample,
            });
        }
        if seen.put(index) {
            return Err(SamplingError::invalid(format!(
                "seed contains sample {} more than once",
                index
            )));
        }
    }
    Ok(())
}

/// Runs a selection with the default configuration.
///
/// See [`GreedySampler::select`] for argument and error semantics.
pub fn select_farthest_points<P>(
    provider: &P,
    seed: Option<&[usize]>,
    n_result: Option<usize>,
) -> SamplingResult<Selection>
where
    P: DistanceProvider + ?Sized,
{
    GreedySampler::default().select(provider, seed, n_result)
}

/// Kennard-Stone selection over a precomputed `n × n` distance matrix.
pub fn kennard_stone_matrix(
    matrix: ArrayView2<'_, f32>,
    seed: Option<&[usize]>,
    n_result: Option<usize>,
) -> SamplingResult<Selection> {
    let provider = MatrixDistance::new(matrix)?;
    select_farthest_points(&provider, seed, n_result)
}

/// Kennard-Stone selection over an `n × d` feature matrix with Euclidean
/// distance. A non-empty seed is required.
pub fn kennard_stone_features(
    features: ArrayView2<'_, f32>,
    seed: &[usize],
    n_result: Option<usize>,
) -> SamplingResult<Selection> {
    let provider = FeatureDistance::new(features)?;
    select_farthest_points(&provider, Some(seed), n_result)
}
