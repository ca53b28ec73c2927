//! Error types for the facade layer.
//!
//! The waveform model reports validation failures through
//! [`wave_core::WaveformError`]. This module covers what the facade adds on
//! top: loading configuration and installing the tracing subscriber.
//!
//! - **`Load`**: wraps `figment::Error`, i.e. unreadable TOML, a type mismatch,
//!   or a malformed environment override.
//! - **`Validation`**: the configuration parsed but holds a value that makes no
//!   sense (unknown log level, empty pool).
//! - **`Tracing`**: the subscriber could not be installed for a reason other
//!   than one already being present.

use thiserror::Error;

/// Convenience alias for results using the facade error type.
pub type AppResult<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading configuration or initialising logging.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Parsing or extraction failed.
    #[error("Configuration error: {0}")]
    Load(#[from] Box<figment::Error>),

    /// Semantic validation failed.
    #[error("Configuration validation error: {0}")]
    Validation(String),

    /// Subscriber installation failed.
    #[error("Failed to initialize tracing: {0}")]
    Tracing(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        let err = ConfigError::Validation("pool.size must be greater than 0".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration validation error: pool.size must be greater than 0"
        );
    }

    #[test]
    fn test_from_figment_error() {
        let err: ConfigError = figment::Error::from("missing field `name`".to_string()).into();
        assert!(matches!(err, ConfigError::Load(_)));
        assert!(err.to_string().contains("missing field"));
    }
}
