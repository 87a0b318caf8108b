// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Solver configuration.
//!
//! Load the solver configuration from TOML to control the time budget,
//! parallelism and progress logging without code changes.
//!
//! # Examples
//!
//! ```
//! use rota_solver::config::SolverConfig;
//! use std::time::Duration;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     time_limit_seconds = 2.5
//!     threads = 4
//! "#).unwrap();
//!
//! assert_eq!(config.time_limit(), Duration::from_millis(2500));
//! assert_eq!(config.threads, 4);
//! assert!(!config.log_progress);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Solver configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SolverConfig {
    /// Wall-clock budget for one solve, in seconds.
    pub time_limit_seconds: f64,

    /// Number of worker threads. `0` uses the available parallelism.
    pub threads: usize,

    /// The clock is read when `(steps & clock_check_mask) == 0`.
    pub clock_check_mask: u64,

    /// Emit periodic progress events from every search job.
    pub log_progress: bool,

    /// Minimum time between two progress events, in seconds.
    pub log_interval_seconds: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_seconds: 10.0,
            threads: 1,
            clock_check_mask: 0x3FFF,
            log_progress: false,
            log_interval_seconds: 1.0,
        }
    }
}

impl SolverConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, contains invalid TOML, or
    /// holds out-of-range values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every duration is finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_seconds("time_limit_seconds", self.time_limit_seconds)?;
        check_seconds("log_interval_seconds", self.log_interval_seconds)?;
        Ok(())
    }

    /// Sets the time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_seconds = limit.as_secs_f64();
        self
    }

    /// Sets the number of threads. `0` uses the available parallelism.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Enables progress logging with the given interval.
    pub fn with_progress_log(mut self, interval: Duration) -> Self {
        self.log_progress = true;
        self.log_interval_seconds = interval.as_secs_f64();
        self
    }

    /// Returns the time limit. An invalid value yields a zero budget.
    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit_seconds).unwrap_or(Duration::ZERO)
    }

    /// Returns the interval between progress events.
    pub fn log_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.log_interval_seconds).unwrap_or(Duration::ZERO)
    }

    /// Returns the number of threads to spawn, resolving `0`.
    pub fn resolved_threads(&self) -> usize {
        match self.threads {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        }
    }
}

fn check_seconds(name: &str, seconds: f64) -> Result<(), ConfigError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ConfigError::Invalid(format!(
            "{name} must be a finite, non-negative number of seconds, got {seconds}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.time_limit(), Duration::from_secs(10));
        assert_eq!(config.threads, 1);
        assert_eq!(config.clock_check_mask, 0x3FFF);
        assert!(!config.log_progress);
        assert_eq!(config.log_interval(), Duration::from_secs(1));
        assert_eq!(config.resolved_threads(), 1);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SolverConfig::from_toml_str("threads = 0\nlog_progress = true").unwrap();
        assert_eq!(config.threads, 0);
        assert!(config.log_progress);
        assert_eq!(config.time_limit_seconds, 10.0);
        assert!(config.resolved_threads() >= 1);
    }

    #[test]
    fn test_negative_time_limit_is_invalid() {
        let err = SolverConfig::from_toml_str("time_limit_seconds = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("time_limit_seconds"));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let err = SolverConfig::from_toml_str("threads = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = SolverConfig::load("/nonexistent/rota/solver.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("rota-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "time_limit_seconds = 0.5\nclock_check_mask = 255").unwrap();
        drop(file);

        let config = SolverConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.time_limit(), Duration::from_millis(500));
        assert_eq!(config.clock_check_mask, 255);
    }

    #[test]
    fn test_builder_helpers() {
        let config = SolverConfig::new()
            .with_time_limit(Duration::from_secs(3))
            .with_threads(8)
            .with_progress_log(Duration::from_millis(250));
        assert_eq!(config.time_limit(), Duration::from_secs(3));
        assert_eq!(config.threads, 8);
        assert!(config.log_progress);
        assert_eq!(config.log_interval(), Duration::from_millis(250));
        assert!(config.validate().is_ok());
    }
}
