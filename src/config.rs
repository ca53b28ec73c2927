//! Configuration loading using Figment
//!
//! Configuration is loaded from:
//! 1. a TOML file (base configuration, optional)
//! 2. environment variables prefixed with `WAVEKIT_`, nested keys separated
//!    by a double underscore
//!
//! Every field has a default, so an empty or missing file yields a usable
//! configuration.
//!
//! # Example
//! ```no_run
//! use wavekit::config::WaveConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // WAVEKIT_POOL__SIZE=32 overrides [pool] size
//! let config = WaveConfig::load()?;
//! config.validate()?;
//! println!("Application: {}", config.application.name);
//! # Ok(())
//! # }
//! ```

use crate::error::{AppResult, ConfigError};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use wave_core::{AccessHint, BufferHints};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/wavekit.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "WAVEKIT_";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Application settings
    pub application: ApplicationConfig,
    /// Default access hints for new waveforms
    pub buffers: BufferConfig,
    /// Acquisition pool sizing
    pub pool: PoolConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Access hints applied to newly created waveforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// CPU hint for sample buffers
    #[serde(default = "likely")]
    pub sample_cpu_hint: AccessHint,
    /// GPU hint for sample buffers
    #[serde(default = "likely")]
    pub sample_gpu_hint: AccessHint,
    /// CPU hint for timestamp buffers
    #[serde(default = "likely")]
    pub timestamp_cpu_hint: AccessHint,
    /// GPU hint for timestamp buffers
    #[serde(default = "unlikely")]
    pub timestamp_gpu_hint: AccessHint,
}

/// Acquisition pool configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Waveforms preallocated per channel
    #[serde(default = "default_pool_size")]
    pub size: usize,
    /// How long a driver waits for a free waveform before growing or dropping
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_ms: u64,
}

// Default value functions
fn default_name() -> String {
    "wavekit".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn likely() -> AccessHint {
    AccessHint::Likely
}

fn unlikely() -> AccessHint {
    AccessHint::Unlikely
}

fn default_pool_size() -> usize {
    16
}

fn default_acquire_timeout() -> u64 {
    100
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        BufferConfig::from(BufferHints::default())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: default_pool_size(),
            acquire_timeout_ms: default_acquire_timeout(),
        }
    }
}

impl From<BufferHints> for BufferConfig {
    fn from(hints: BufferHints) -> Self {
        Self {
            sample_cpu_hint: hints.sample_cpu,
            sample_gpu_hint: hints.sample_gpu,
            timestamp_cpu_hint: hints.timestamp_cpu,
            timestamp_gpu_hint: hints.timestamp_gpu,
        }
    }
}

impl From<BufferConfig> for BufferHints {
    fn from(config: BufferConfig) -> Self {
        Self {
            sample_cpu: config.sample_cpu_hint,
            sample_gpu: config.sample_gpu_hint,
            timestamp_cpu: config.timestamp_cpu_hint,
            timestamp_gpu: config.timestamp_gpu_hint,
        }
    }
}

impl PoolConfig {
    /// Acquire timeout as a `Duration`.
    #[must_use]
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

impl WaveConfig {
    /// Load from [`DEFAULT_CONFIG_PATH`] and environment variables.
    ///
    /// Example: `WAVEKIT_APPLICATION__LOG_LEVEL=debug`
    pub fn load() -> AppResult<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load from a specific file path merged with environment variables.
    ///
    /// A missing file is not an error; defaults and the environment apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config: Self = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        debug!(
            path = %path.as_ref().display(),
            pool_size = config.pool.size,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> AppResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level = self.application.log_level.to_lowercase();
        if !valid_levels.contains(&level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.pool.size == 0 {
            return Err(ConfigError::Validation(
                "pool.size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Buffer hints for newly created waveforms.
    #[must_use]
    pub fn buffer_hints(&self) -> BufferHints {
        self.buffers.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tracing_test::traced_test;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_missing_file_yields_defaults() {
        let config = WaveConfig::load_from("/nonexistent/wavekit.toml").unwrap();
        assert_eq!(config, WaveConfig::default());
        assert_eq!(config.buffer_hints(), BufferHints::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    #[traced_test]
    fn test_load_from_toml() {
        let file = write_config(
            r#"
            [application]
            name = "bench scope"
            log_level = "debug"

            [buffers]
            sample_gpu_hint = "unlikely"

            [pool]
            size = 4
            "#,
        );

        let config = WaveConfig::load_from(file.path()).unwrap();
        assert_eq!(config.application.name, "bench scope");
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.buffers.sample_gpu_hint, AccessHint::Unlikely);
        assert_eq!(config.buffers.sample_cpu_hint, AccessHint::Likely);
        assert_eq!(config.pool.size, 4);
        assert_eq!(config.pool.acquire_timeout(), Duration::from_millis(100));
        assert!(logs_contain("configuration loaded"));
        assert!(logs_contain("pool_size=4"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let file = write_config("[pool]\nsize = 4\n");
        std::env::set_var("WAVEKIT_POOL__SIZE", "64");
        std::env::set_var("WAVEKIT_APPLICATION__LOG_LEVEL", "warn");

        let result = WaveConfig::load_from(file.path());

        std::env::remove_var("WAVEKIT_POOL__SIZE");
        std::env::remove_var("WAVEKIT_APPLICATION__LOG_LEVEL");

        let config = result.unwrap();
        assert_eq!(config.pool.size, 64);
        assert_eq!(config.application.log_level, "warn");
    }

    #[test]
    #[serial]
    fn test_bad_hint_is_a_load_error() {
        let file = write_config("[buffers]\nsample_cpu_hint = \"sometimes\"\n");
        assert!(matches!(
            WaveConfig::load_from(file.path()),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = WaveConfig::default();
        config.application.log_level = "verbose".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("verbose")
        ));
    }

    #[test]
    fn test_empty_pool_rejected() {
        let mut config = WaveConfig::default();
        config.pool.size = 0;
        assert!(config.validate().is_err());
    }
}
