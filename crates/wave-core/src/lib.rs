//! Waveform data model for instrument acquisition pipelines.
//!
//! A waveform is one channel's captured time series: acquisition metadata,
//! a pair of timestamp buffers (offset and duration per sample) and one
//! sample buffer. All three buffers are [`wave_accel::AcceleratorBuffer`]s,
//! so filters can run on either the host or an accelerator as long as they
//! bracket their access with `prepare_for_*_access` / `mark_*_modified_from_*`.
//!
//! # Modules
//!
//! - [`metadata`]: timescale, trigger phase, start time, flags, revision
//! - [`timestamps`]: the offset/duration pair and dense vs sparse timing
//! - [`waveform`]: [`Waveform<S>`] and the digital/analog/bus aliases
//! - [`any`]: [`AnyWaveform`] for mixed-kind channel lists
//! - [`runs`]: dense ↔ run-length conversion
//! - [`cache`]: [`RevisionCache`] keyed by `(id, revision)`
//! - [`pool`]: recycling acquisition pools
//! - [`validate`]: timestamp well-formedness checks
//! - [`presentation`]: text/colour hooks and the standard palette

pub mod any;
pub mod cache;
pub mod error;
pub mod metadata;
pub mod pool;
pub mod presentation;
pub mod runs;
pub mod sample;
pub mod timestamps;
pub mod validate;
pub mod waveform;

pub use any::AnyWaveform;
pub use cache::RevisionCache;
pub use error::{Result, WaveformError};
pub use metadata::{CacheKey, WaveformFlags, WaveformId, WaveformMetadata, FS_PER_SECOND};
pub use pool::{waveform_pool, WaveformPool};
pub use presentation::{Color, StandardColor, PLACEHOLDER_TEXT};
pub use runs::MAX_DENSE_EXPANSION;
pub use sample::{Sample, WaveformKind};
pub use timestamps::{SampleSpan, TimestampMode, Timestamps};
pub use validate::validate_timestamps;
pub use waveform::{AnalogWaveform, BufferHints, DigitalBusWaveform, DigitalWaveform, Waveform};

pub use wave_accel::{
    AccessHint, AcceleratorBuffer, DualResidencyBuffer, MemoryPlacement, Residency, TransferStats,
};
