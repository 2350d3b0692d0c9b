//! Runtime configuration for the sampler.
//!
//! Configuration can be built in code with the `with_*` setters or loaded
//! from a JSON/YAML document. The cancellation flag is runtime-only and
//! never serialized.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SamplingError, SamplingResult};

/// Below this many samples the argmax scan and min-update sweep run
/// sequentially.
pub const DEFAULT_MIN_PARALLEL_LEN: usize = 4096;

/// Shared flag checked between selection iterations.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a new, unraised flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of any selection observing this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once [`CancelFlag::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Configuration for a [`crate::GreedySampler`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Worker threads for the parallel phases. `None` uses the global rayon pool.
    pub num_threads: Option<usize>,
    /// Result size used when a call does not pass one. `None` ranks every sample.
    pub default_n_result: Option<usize>,
    /// Minimum sample count before work is split across threads. Default: 4096.
    pub min_parallel_len: usize,
    /// Cooperative cancellation, checked once per iteration.
    #[serde(skip)]
    pub cancel: Option<CancelFlag>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            default_n_result: None,
            min_parallel_len: DEFAULT_MIN_PARALLEL_LEN,
            cancel: None,
        }
    }
}

impl SamplerConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the parallel phases on a dedicated pool of `threads` workers.
    pub fn with_num_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Set the result size used when a call passes `None`.
    pub fn with_default_n_result(mut self, n_result: usize) -> Self {
        self.default_n_result = Some(n_result);
        self
    }

    /// Set the sequential cutoff for the parallel phases.
    pub fn with_min_parallel_len(mut self, len: usize) -> Self {
        self.min_parallel_len = len;
        self
    }

    /// Attach a cancellation flag.
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Checks the configuration for values that can never be satisfied.
    pub fn validate(&self) -> SamplingResult<()> {
        if self.num_threads == Some(0) {
            return Err(SamplingError::invalid("num_threads must be at least 1"));
        }
        if self.default_n_result == Some(0) {
            return Err(SamplingError::invalid(
                "default_n_result must be at least 1",
            ));
        }
        if let Some(threads) = self.num_threads {
            let available = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1);
            if threads > available {
                warn!(
                    threads,
                    available, "Configured thread count exceeds available parallelism"
                );
            }
        }
        Ok(())
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }

    /// Parses a configuration from JSON.
    pub fn from_json_str(content: &str) -> SamplingResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration from YAML.
    pub fn from_yaml_str(content: &str) -> SamplingResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file, picking the format from its extension
    /// (`.json`, `.yaml` or `.yml`).
    pub fn load_from_file(path: impl AsRef<Path>) -> SamplingResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            other => Err(SamplingError::invalid(format!(
                "unsupported config extension {:?} for '{}'",
                other,
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = SamplerConfig::default();
        assert!(config.num_threads.is_none());
        assert!(config.default_n_result.is_none());
        assert_eq!(config.min_parallel_len, DEFAULT_MIN_PARALLEL_LEN);
        assert!(!config.is_cancelled());
    }

    #[test]
    fn test_config_builder() {
        let config = SamplerConfig::new()
            .with_num_threads(2)
            .with_default_n_result(10)
            .with_min_parallel_len(1);

        assert_eq!(config.num_threads, Some(2));
        assert_eq!(config.default_n_result, Some(10));
        assert_eq!(config.min_parallel_len, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_threads() {
        let config = SamplerConfig::new().with_num_threads(0);
        assert!(matches!(
            config.validate(),
            Err(SamplingError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_result() {
        let config = SamplerConfig::new().with_default_n_result(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cancel_flag_shared() {
        let flag = CancelFlag::new();
        let config = SamplerConfig::new().with_cancel_flag(flag.clone());
        assert!(!config.is_cancelled());
        flag.cancel();
        assert!(config.is_cancelled());
    }

    #[test]
    fn test_from_json_partial() {
        let config = SamplerConfig::from_json_str(r#"{"num_threads": 3}"#)
            .expect("partial JSON should fill defaults");
        assert_eq!(config.num_threads, Some(3));
        assert_eq!(config.min_parallel_len, DEFAULT_MIN_PARALLEL_LEN);
    }

    #[test]
    fn test_from_yaml() {
        let yaml = "default_n_result: 25\nmin_parallel_len: 64\n";
        let config = SamplerConfig::from_yaml_str(yaml).expect("valid YAML");
        assert_eq!(config.default_n_result, Some(25));
        assert_eq!(config.min_parallel_len, 64);
    }

    #[test]
    fn test_from_json_invalid_values() {
        let err = SamplerConfig::from_json_str(r#"{"num_threads": 0}"#).unwrap_err();
        assert!(matches!(err, SamplingError::InvalidArgument(_)));

        let err = SamplerConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, SamplingError::Json(_)));
    }

    #[test]
    fn test_json_roundtrip_skips_cancel() {
        let config = SamplerConfig::new()
            .with_default_n_result(5)
            .with_cancel_flag(CancelFlag::new());
        let json = serde_json::to_string(&config).expect("serialize");
        assert!(!json.contains("cancel"));

        let parsed = SamplerConfig::from_json_str(&json).expect("deserialize");
        assert_eq!(parsed.default_n_result, Some(5));
        assert!(parsed.cancel.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");

        let json_path = dir.path().join("sampler.json");
        let mut file = fs::File::create(&json_path).expect("create json");
        writeln!(file, r#"{{"num_threads": 2, "min_parallel_len": 8}}"#).expect("write");
        let config = SamplerConfig::load_from_file(&json_path).expect("load json");
        assert_eq!(config.num_threads, Some(2));
        assert_eq!(config.min_parallel_len, 8);

        let yaml_path = dir.path().join("sampler.yml");
        fs::write(&yaml_path, "default_n_result: 4\n").expect("write yaml");
        let config = SamplerConfig::load_from_file(&yaml_path).expect("load yaml");
        assert_eq!(config.default_n_result, Some(4));
    }

    #[test]
    fn test_load_from_file_errors() {
        let dir = tempfile::tempdir().expect("tempdir");

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            SamplerConfig::load_from_file(&missing),
            Err(SamplingError::Io(_))
        ));

        let toml_path = dir.path().join("sampler.toml");
        fs::write(&toml_path, "num_threads = 2\n").expect("write toml");
        assert!(matches!(
            SamplerConfig::load_from_file(&toml_path),
            Err(SamplingError::InvalidArgument(_))
        ));
    }
}
