//! Error types for Kennard-Stone sampling.
//!
//! Every precondition is checked before any selection work starts, so a
//! returned error never leaves a partially filled selection behind.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that can occur while configuring or running a selection.
#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Sample index {index} out of range for {n_samples} samples")]
    OutOfRange { index: usize, n_samples: usize },

    #[error("Failed to allocate scratch buffer: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Selection cancelled after {selected} samples")]
    Cancelled { selected: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SamplingError {
    /// Shorthand for building an [`SamplingError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns true for errors caused by malformed caller input.
    pub fn is_argument_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::OutOfRange { .. })
    }
}

/// Result type for sampling operations.
pub type SamplingResult<T> = Result<T, SamplingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = SamplingError::OutOfRange {
            index: 7,
            n_samples: 4,
        };
        assert_eq!(
            err.to_string(),
            "Sample index 7 out of range for 4 samples"
        );
        assert!(err.is_argument_error());
    }

    #[test]
    fn test_invalid_helper() {
        let err = SamplingError::invalid("n_result must be at least 1");
        assert!(matches!(err, SamplingError::InvalidArgument(ref m) if m.contains("n_result")));
    }

    #[test]
    fn test_allocation_from_try_reserve() {
        let mut buf: Vec<u8> = Vec::new();
        let reserve = buf
            .try_reserve_exact(usize::MAX)
            .expect_err("reserving usize::MAX bytes must fail");
        let err: SamplingError = reserve.into();
        assert!(matches!(err, SamplingError::Allocation(_)));
        assert!(!err.is_argument_error());
    }

    #[test]
    fn test_cancelled_message() {
        let err = SamplingError::Cancelled { selected: 3 };
        assert_eq!(err.to_string(), "Selection cancelled after 3 samples");
    }
}
