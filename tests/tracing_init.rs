//! Subscriber installation. Kept in its own binary: the unit tests install a
//! capturing global subscriber through `#[traced_test]`.

use tracing::Level;
use wavekit::config::WaveConfig;
use wavekit::tracing_init::{self, OutputFormat, TracingConfig};

#[test]
fn test_init_is_idempotent() {
    let config = TracingConfig::new(Level::INFO).with_format(OutputFormat::Compact);
    assert!(tracing_init::init(config.clone()).is_ok());
    assert!(tracing_init::init(config).is_ok());
    assert!(tracing_init::init_from_config(&WaveConfig::default()).is_ok());
}

#[test]
fn test_init_from_config_rejects_bad_level() {
    let mut config = WaveConfig::default();
    config.application.log_level = "loud".to_string();
    assert!(tracing_init::init_from_config(&config).is_err());
}
