//! Type-erased waveform for heterogeneous channel lists.
//!
//! Filter graphs route waveforms of different kinds through the same ports.
//! `AnyWaveform` is the closed sum over the built-in sample types; the
//! kind-independent operations dispatch to the typed waveform inside.

use crate::error::Result;
use crate::metadata::{CacheKey, WaveformId, WaveformMetadata};
use crate::presentation::Color;
use crate::sample::WaveformKind;
use crate::timestamps::Timestamps;
use crate::waveform::{AnalogWaveform, DigitalBusWaveform, DigitalWaveform};

/// A waveform of any built-in kind.
#[derive(Debug)]
pub enum AnyWaveform {
    /// Logic-level samples
    Digital(DigitalWaveform),
    /// Real-valued samples
    Analog(AnalogWaveform),
    /// Multi-lane logic samples
    DigitalBus(DigitalBusWaveform),
}

macro_rules! dispatch {
    ($self:expr, $wfm:ident => $body:expr) => {
        match $self {
            AnyWaveform::Digital($wfm) => $body,
            AnyWaveform::Analog($wfm) => $body,
            AnyWaveform::DigitalBus($wfm) => $body,
        }
    };
}

impl AnyWaveform {
    /// Empty waveform of the given kind with default hints.
    #[must_use]
    pub fn new(kind: WaveformKind) -> Self {
        match kind {
            WaveformKind::Digital => AnyWaveform::Digital(DigitalWaveform::new()),
            WaveformKind::Analog => AnyWaveform::Analog(AnalogWaveform::new()),
            WaveformKind::DigitalBus => AnyWaveform::DigitalBus(DigitalBusWaveform::new()),
        }
    }

    /// Channel kind.
    #[must_use]
    pub fn kind(&self) -> WaveformKind {
        dispatch!(self, w => w.kind())
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        dispatch!(self, w => w.len())
    }

    /// True if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identity of the inner waveform.
    #[must_use]
    pub fn id(&self) -> WaveformId {
        dispatch!(self, w => w.id())
    }

    /// `(id, revision)` of the inner waveform.
    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        dispatch!(self, w => w.cache_key())
    }

    /// Acquisition scalars.
    #[must_use]
    pub fn metadata(&self) -> &WaveformMetadata {
        dispatch!(self, w => &w.metadata)
    }

    /// Acquisition scalars for writing.
    pub fn metadata_mut(&mut self) -> &mut WaveformMetadata {
        dispatch!(self, w => &mut w.metadata)
    }

    /// Timestamp pair.
    #[must_use]
    pub fn timestamps(&self) -> &Timestamps {
        dispatch!(self, w => w.timestamps())
    }

    /// See [`crate::Waveform::resize`].
    pub fn resize(&mut self, len: usize) {
        dispatch!(self, w => w.resize(len))
    }

    /// See [`crate::Waveform::clear`].
    pub fn clear(&mut self) {
        dispatch!(self, w => w.clear())
    }

    /// Increment the revision and return the new value.
    pub fn bump_revision(&mut self) -> u64 {
        dispatch!(self, w => w.bump_revision())
    }

    /// Write dense timestamps and set `dense_packed`.
    pub fn fill_dense_timestamps(&mut self) {
        dispatch!(self, w => w.fill_dense_timestamps())
    }

    /// Make every buffer valid on the host.
    pub fn prepare_for_cpu_access(&mut self) {
        dispatch!(self, w => w.prepare_for_cpu_access())
    }

    /// Make every buffer valid on the device.
    pub fn prepare_for_gpu_access(&mut self) {
        dispatch!(self, w => w.prepare_for_gpu_access())
    }

    /// Samples were written on the host.
    pub fn mark_samples_modified_from_cpu(&mut self) {
        dispatch!(self, w => w.mark_samples_modified_from_cpu())
    }

    /// Samples were written on the device.
    pub fn mark_samples_modified_from_gpu(&mut self) {
        dispatch!(self, w => w.mark_samples_modified_from_gpu())
    }

    /// Timestamps were written on the host.
    pub fn mark_timestamps_modified_from_cpu(&mut self) {
        dispatch!(self, w => w.mark_timestamps_modified_from_cpu())
    }

    /// Timestamps were written on the device.
    pub fn mark_timestamps_modified_from_gpu(&mut self) {
        dispatch!(self, w => w.mark_timestamps_modified_from_gpu())
    }

    /// Copy offsets and durations from another waveform of any kind.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn copy_timestamps(&mut self, source: &AnyWaveform) {
        dispatch!(self, dst => dispatch!(source, src => dst.copy_timestamps(src)))
    }

    /// See [`crate::Waveform::validate`].
    pub fn validate(&self) -> Result<()> {
        dispatch!(self, w => w.validate())
    }

    /// Text for sample `i`.
    #[must_use]
    pub fn get_text(&self, i: usize) -> String {
        dispatch!(self, w => w.get_text(i))
    }

    /// Display colour for sample `i`.
    #[must_use]
    pub fn get_color(&self, i: usize) -> Color {
        dispatch!(self, w => w.get_color(i))
    }

    /// Inner digital waveform, if this is one.
    #[must_use]
    pub fn as_digital(&self) -> Option<&DigitalWaveform> {
        match self {
            AnyWaveform::Digital(w) => Some(w),
            _ => None,
        }
    }

    /// Inner analog waveform, if this is one.
    #[must_use]
    pub fn as_analog(&self) -> Option<&AnalogWaveform> {
        match self {
            AnyWaveform::Analog(w) => Some(w),
            _ => None,
        }
    }

    /// Inner bus waveform, if this is one.
    #[must_use]
    pub fn as_digital_bus(&self) -> Option<&DigitalBusWaveform> {
        match self {
            AnyWaveform::DigitalBus(w) => Some(w),
            _ => None,
        }
    }

    /// Mutable inner digital waveform.
    pub fn as_digital_mut(&mut self) -> Option<&mut DigitalWaveform> {
        match self {
            AnyWaveform::Digital(w) => Some(w),
            _ => None,
        }
    }

    /// Mutable inner analog waveform.
    pub fn as_analog_mut(&mut self) -> Option<&mut AnalogWaveform> {
        match self {
            AnyWaveform::Analog(w) => Some(w),
            _ => None,
        }
    }

    /// Mutable inner bus waveform.
    pub fn as_digital_bus_mut(&mut self) -> Option<&mut DigitalBusWaveform> {
        match self {
            AnyWaveform::DigitalBus(w) => Some(w),
            _ => None,
        }
    }
}

impl From<DigitalWaveform> for AnyWaveform {
    fn from(wfm: DigitalWaveform) -> Self {
        AnyWaveform::Digital(wfm)
    }
}

impl From<AnalogWaveform> for AnyWaveform {
    fn from(wfm: AnalogWaveform) -> Self {
        AnyWaveform::Analog(wfm)
    }
}

impl From<DigitalBusWaveform> for AnyWaveform {
    fn from(wfm: DigitalBusWaveform) -> Self {
        AnyWaveform::DigitalBus(wfm)
    }
}
