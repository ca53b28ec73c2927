//! # wavekit
//!
//! Waveform data model for instrument acquisition pipelines, with explicit
//! host/device coherence and revision-based cache invalidation.
//!
//! ## Crate layout
//!
//! - [`wave_accel`]: dual-residency buffers, residency state machine, access
//!   hints and the recycling pool
//! - [`wave_core`]: metadata, timestamps, typed waveforms, validation,
//!   revision cache, presentation hooks
//! - [`config`]: Figment-based configuration (`config/wavekit.toml` + `WAVEKIT_` env)
//! - [`tracing_init`]: subscriber setup for applications
//!
//! ## Typical acquisition flow
//!
//! ```no_run
//! use wavekit::{config::WaveConfig, tracing_init, waveform_pool};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WaveConfig::load()?;
//! config.validate()?;
//! tracing_init::init_from_config(&config)?;
//!
//! let pool = waveform_pool::<f32>(config.pool.size, config.buffer_hints());
//! let mut slot = pool.acquire().await;
//! slot.metadata.timescale = 1_000_000;
//! slot.resize(1024);
//! slot.fill_dense_timestamps();
//! slot.mark_samples_modified_from_cpu();
//! slot.bump_revision();
//!
//! let wfm = slot.detach(); // hand off to the processing stage
//! # let _ = wfm;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod tracing_init;

pub use error::{AppResult, ConfigError};

pub use wave_accel;
pub use wave_core;

pub use wave_core::{
    waveform_pool, AccessHint, AnalogWaveform, AnyWaveform, BufferHints, CacheKey, Color,
    DigitalBusWaveform, DigitalWaveform, DualResidencyBuffer, MemoryPlacement, Residency,
    RevisionCache, Sample, SampleSpan, StandardColor, TimestampMode, Timestamps, Waveform,
    WaveformError, WaveformFlags, WaveformId, WaveformKind, WaveformMetadata, WaveformPool,
};
