//! Parallel argmax reduction over eligible entries.
//!
//! Partial results are `(value, index)` accumulators merged with
//! [`ArgMax::combine`]. The combine is associative and commutative, and
//! exact ties go to the lowest index, so the winner does not depend on how
//! rayon splits the work or how many threads run it.

use std::cmp::Ordering;

use fixedbitset::FixedBitSet;
use rayon::prelude::*;

/// Running maximum of a reduction: the best value seen and where it was.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArgMax {
    /// Best value found so far.
    pub value: f32,
    /// Index of `value`; `usize::MAX` for the empty accumulator.
    pub index: usize,
}

impl ArgMax {
    /// Identity element: loses against any real candidate.
    pub const NONE: ArgMax = ArgMax {
        value: f32::NEG_INFINITY,
        index: usize::MAX,
    };

    /// Creates a candidate accumulator.
    pub fn new(value: f32, index: usize) -> Self {
        Self { value, index }
    }

    /// Returns true for the identity element.
    pub fn is_none(&self) -> bool {
        self.index == usize::MAX
    }

    /// Merges two partial results.
    ///
    /// Larger value wins; NaN ranks below every number; equal values go to
    /// the lower index.
    pub fn combine(self, other: ArgMax) -> ArgMax {
        if self.is_none() {
            return other;
        }
        if other.is_none() {
            return self;
        }
        match rank(self.value, other.value) {
            Ordering::Greater => self,
            Ordering::Less => other,
            Ordering::Equal => {
                if self.index <= other.index {
                    self
                } else {
                    other
                }
            }
        }
    }

    fn into_option(self) -> Option<ArgMax> {
        if self.is_none() {
            None
        } else {
            Some(self)
        }
    }
}

fn rank(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Finds the maximum of `values` over indices accepted by `eligible`.
///
/// Inputs shorter than `min_parallel_len` are scanned on the calling
/// thread. Returns `None` when no index is eligible.
pub fn parallel_argmax_by<F>(
    values: &[f32],
    eligible: F,
    min_parallel_len: usize,
) -> Option<ArgMax>
where
    F: Fn(usize) -> bool + Sync,
{
    let best = if values.len() < min_parallel_len {
        values
            .iter()
            .enumerate()
            .filter(|(i, _)| eligible(*i))
            .fold(ArgMax::NONE, |acc, (i, &v)| acc.combine(ArgMax::new(v, i)))
    } else {
        values
            .par_iter()
            .enumerate()
            .filter(|(i, _)| eligible(*i))
            .fold(|| ArgMax::NONE, |acc, (i, &v)| acc.combine(ArgMax::new(v, i)))
            .reduce(|| ArgMax::NONE, ArgMax::combine)
    };

    best.into_option()
}

/// Finds the maximum of `values` over indices not set in `selected`.
pub fn argmax_unselected(
    values: &[f32],
    selected: &FixedBitSet,
    min_parallel_len: usize,
) -> Option<ArgMax> {
    parallel_argmax_by(values, |i| !selected.contains(i), min_parallel_len)
}
