//! Typed waveforms: metadata + timestamps + one sample buffer.
//!
//! # Lifecycle
//!
//! A waveform is created empty, resized (or pushed into) as data arrives,
//! cleared for reuse and dropped by its last owner. Ownership moves between
//! pipeline stages by value; nothing here clones sample data implicitly.
//!
//! # Coherence
//!
//! The three buffers track residency independently. The waveform-level
//! `prepare_*` calls fan out to all of them; `mark_samples_*` and
//! `mark_timestamps_*` touch only their own buffers so a stage that rewrote
//! samples does not invalidate timestamps it never changed.
//!
//! `metadata.revision` is the coarse summary. Producers bump it after any
//! change downstream caches should see; it is never derived from residency.
//!
//! # Example
//!
//! ```
//! use wave_core::AnalogWaveform;
//!
//! let mut wfm = AnalogWaveform::new();
//! wfm.metadata.timescale = 1_000_000; // 1 ns per timestep
//! wfm.resize(3);
//! wfm.samples_mut().copy_from_slice(&[1.0, 2.0, 3.0]);
//! wfm.fill_dense_timestamps();
//! wfm.mark_samples_modified_from_cpu();
//! wfm.bump_revision();
//!
//! assert_eq!(wfm.offset_scaled(2), 2_000_000);
//! assert!(wfm.validate().is_ok());
//! ```

use crate::error::{Result, WaveformError};
use crate::metadata::{CacheKey, WaveformId, WaveformMetadata};
use crate::presentation::{Color, StandardColor, PLACEHOLDER_TEXT};
use crate::sample::{Sample, WaveformKind};
use crate::timestamps::{SampleSpan, TimestampMode, Timestamps};
use serde::{Deserialize, Serialize};
use wave_accel::{AccessHint, AcceleratorBuffer, DualResidencyBuffer};

/// Access hints for a waveform's buffers.
///
/// The default marks samples as likely touched from both sides (pinned,
/// shared memory) and timestamps as host-side data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferHints {
    /// CPU hint for the sample buffer
    pub sample_cpu: AccessHint,
    /// GPU hint for the sample buffer
    pub sample_gpu: AccessHint,
    /// CPU hint for offsets and durations
    pub timestamp_cpu: AccessHint,
    /// GPU hint for offsets and durations
    pub timestamp_gpu: AccessHint,
}

impl Default for BufferHints {
    fn default() -> Self {
        Self {
            sample_cpu: AccessHint::Likely,
            sample_gpu: AccessHint::Likely,
            timestamp_cpu: AccessHint::Likely,
            timestamp_gpu: AccessHint::Unlikely,
        }
    }
}

impl BufferHints {
    /// Apply these hints to an existing waveform. Contents are unaffected.
    pub fn apply<S: Sample>(&self, wfm: &mut Waveform<S>) {
        wfm.samples.set_cpu_access_hint(self.sample_cpu);
        wfm.samples.set_gpu_access_hint(self.sample_gpu);
        wfm.timestamps
            .set_access_hints(self.timestamp_cpu, self.timestamp_gpu);
    }
}

/// One channel's captured time series.
#[derive(Debug)]
pub struct Waveform<S: Sample> {
    id: WaveformId,
    /// Acquisition scalars. Plain data; no validation on write.
    pub metadata: WaveformMetadata,
    timestamps: Timestamps,
    samples: AcceleratorBuffer<S>,
}

/// Logic-level waveform.
pub type DigitalWaveform = Waveform<bool>;
/// Real-valued waveform.
pub type AnalogWaveform = Waveform<f32>;
/// Multi-lane logic waveform.
pub type DigitalBusWaveform = Waveform<Vec<bool>>;

impl<S: Sample> Waveform<S> {
    /// Empty waveform with zeroed metadata and default [`BufferHints`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_hints(BufferHints::default())
    }

    /// Empty waveform with explicit buffer hints.
    #[must_use]
    pub fn with_hints(hints: BufferHints) -> Self {
        Self {
            id: WaveformId::next(),
            metadata: WaveformMetadata::default(),
            timestamps: Timestamps::with_hints(hints.timestamp_cpu, hints.timestamp_gpu),
            samples: AcceleratorBuffer::with_hints(hints.sample_cpu, hints.sample_gpu),
        }
    }

    /// Identity of this waveform.
    #[must_use]
    pub fn id(&self) -> WaveformId {
        self.id
    }

    /// Current `(id, revision)`.
    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            id: self.id,
            revision: self.metadata.revision,
        }
    }

    /// Channel kind of the payload.
    #[must_use]
    pub fn kind(&self) -> WaveformKind {
        S::KIND
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Timing mode selected by `metadata.dense_packed`.
    #[must_use]
    pub fn timestamp_mode(&self) -> TimestampMode {
        TimestampMode::from_dense_packed(self.metadata.dense_packed)
    }

    /// Set offsets, durations and samples to `len` elements together.
    ///
    /// `metadata.dense_packed` is left as is.
    pub fn resize(&mut self, len: usize) {
        self.timestamps.resize(len);
        self.samples.resize(len);
    }

    /// Empty all three buffers. Metadata is left as is.
    pub fn clear(&mut self) {
        self.timestamps.clear();
        self.samples.clear();
    }

    /// Empty all buffers and reset metadata; the revision still increases.
    pub fn reset(&mut self) {
        self.clear();
        self.metadata.reset();
    }

    /// Increment `metadata.revision` and return the new value.
    pub fn bump_revision(&mut self) -> u64 {
        self.metadata.bump_revision()
    }

    /// Append one sample with explicit timing.
    ///
    /// # Panics
    ///
    /// Panics if any buffer is stale on the host. Nothing is appended then.
    pub fn push(&mut self, offset: i64, duration: i64, sample: S) {
        let (offsets, durations) = self.timestamps.residency();
        assert!(
            offsets.host_valid() && durations.host_valid() && self.samples.residency().host_valid(),
            "push while a buffer is stale on the host: call prepare_for_cpu_access first"
        );
        self.timestamps.push(offset, duration);
        self.samples.push(sample);
    }

    /// Write dense timestamps (`0..N`, all durations 1) and set `dense_packed`.
    ///
    /// Marks the timestamps modified from the CPU.
    pub fn fill_dense_timestamps(&mut self) {
        self.timestamps.fill_dense();
        self.metadata.dense_packed = true;
    }

    /// Timestamp pair.
    #[must_use]
    pub fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    /// Timestamp pair for writing contents, residency and hints.
    ///
    /// Lengths can only change through the waveform.
    pub fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }

    /// Sample buffer.
    #[must_use]
    pub fn samples(&self) -> &AcceleratorBuffer<S> {
        &self.samples
    }

    /// Host view of the samples for writing.
    ///
    /// # Panics
    ///
    /// Panics if the sample buffer is stale on the host.
    pub fn samples_mut(&mut self) -> &mut [S] {
        self.samples.host_slice_mut()
    }

    /// Device view of the samples for writing.
    ///
    /// # Panics
    ///
    /// Panics if the sample buffer is stale on the device.
    pub fn device_samples_mut(&mut self) -> &mut [S] {
        self.samples.device_slice_mut()
    }

    /// Override the sample buffer's access hints.
    pub fn set_sample_hints(&mut self, cpu: AccessHint, gpu: AccessHint) {
        self.samples.set_cpu_access_hint(cpu);
        self.samples.set_gpu_access_hint(gpu);
    }

    /// Sample `i` from the host copy.
    #[must_use]
    pub fn sample(&self, i: usize) -> &S {
        &self.samples.host_slice()[i]
    }

    /// Offset of sample `i` in timesteps. Dense waveforms skip the buffers.
    #[must_use]
    pub fn offset(&self, i: usize) -> i64 {
        self.timestamps.offset(i, self.timestamp_mode())
    }

    /// Duration of sample `i` in timesteps.
    #[must_use]
    pub fn duration(&self, i: usize) -> i64 {
        self.timestamps.duration(i, self.timestamp_mode())
    }

    /// Offset and duration of sample `i`.
    #[must_use]
    pub fn span(&self, i: usize) -> SampleSpan {
        self.timestamps.span(i, self.timestamp_mode())
    }

    /// Start of sample `i` in femtoseconds from the trigger.
    ///
    /// `offset * timescale + trigger_phase`, saturating at the `i64` range
    /// (about 2.5 hours at femtosecond resolution).
    #[must_use]
    pub fn offset_scaled(&self, i: usize) -> i64 {
        self.offset(i)
            .saturating_mul(self.metadata.timescale)
            .saturating_add(self.metadata.trigger_phase)
    }

    /// Duration of sample `i` in femtoseconds, saturating at the `i64` range.
    #[must_use]
    pub fn duration_scaled(&self, i: usize) -> i64 {
        self.duration(i).saturating_mul(self.metadata.timescale)
    }

    /// Iterate `(span, sample)` pairs from host memory.
    ///
    /// # Panics
    ///
    /// Panics if the sample buffer (or, for sparse waveforms, a timestamp
    /// buffer) is stale on the host.
    pub fn iter(&self) -> impl Iterator<Item = (SampleSpan, &S)> + '_ {
        let samples = self.samples.host_slice();
        let mode = self.timestamp_mode();
        samples
            .iter()
            .enumerate()
            .map(move |(i, sample)| (self.timestamps.span(i, mode), sample))
    }

    /// Copy offsets and durations from another waveform of equal length.
    ///
    /// Samples are untouched. `dense_packed` is not copied.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ: the destination must be resized first.
    pub fn copy_timestamps<T: Sample>(&mut self, source: &Waveform<T>) {
        assert_eq!(
            self.timestamps.len(),
            source.timestamps.len(),
            "copy_timestamps: destination must be resized to the source length first"
        );
        self.timestamps.copy_from(&source.timestamps);
    }

    /// [`Waveform::copy_timestamps`] with the length check as an error.
    pub fn try_copy_timestamps<T: Sample>(&mut self, source: &Waveform<T>) -> Result<()> {
        if self.timestamps.len() != source.timestamps.len() {
            return Err(WaveformError::TimestampLengthMismatch {
                destination_len: self.timestamps.len(),
                source_len: source.timestamps.len(),
            });
        }
        self.timestamps.copy_from(&source.timestamps);
        Ok(())
    }

    /// Make every buffer valid on the host.
    pub fn prepare_for_cpu_access(&mut self) {
        self.timestamps.prepare_for_cpu_access();
        self.samples.prepare_for_cpu_access();
    }

    /// Make every buffer valid on the device.
    pub fn prepare_for_gpu_access(&mut self) {
        self.timestamps.prepare_for_gpu_access();
        self.samples.prepare_for_gpu_access();
    }

    /// Samples were written on the host.
    pub fn mark_samples_modified_from_cpu(&mut self) {
        self.samples.mark_modified_from_cpu();
    }

    /// Samples were written on the device.
    pub fn mark_samples_modified_from_gpu(&mut self) {
        self.samples.mark_modified_from_gpu();
    }

    /// Offsets and durations were written on the host.
    pub fn mark_timestamps_modified_from_cpu(&mut self) {
        self.timestamps.mark_modified_from_cpu();
    }

    /// Offsets and durations were written on the device.
    pub fn mark_timestamps_modified_from_gpu(&mut self) {
        self.timestamps.mark_modified_from_gpu();
    }

    /// Check lengths, metadata ranges and timestamp ordering.
    ///
    /// Reads host memory; prepare for CPU access first.
    pub fn validate(&self) -> Result<()> {
        let (offsets, durations, samples) = (
            self.timestamps.offsets().len(),
            self.timestamps.durations().len(),
            self.samples.len(),
        );
        if offsets != samples || durations != samples {
            return Err(WaveformError::LengthMismatch {
                offsets,
                durations,
                samples,
            });
        }
        self.metadata.validate()?;
        self.timestamps.validate(self.metadata.dense_packed)
    }

    /// Text for sample `i`. Built-in kinds have no formatter.
    #[must_use]
    pub fn get_text(&self, _i: usize) -> String {
        PLACEHOLDER_TEXT.to_string()
    }

    /// Display colour for sample `i`. Built-in kinds use the error colour.
    #[must_use]
    pub fn get_color(&self, _i: usize) -> Color {
        StandardColor::Error.color()
    }
}

impl<S: Sample> Default for Waveform<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wave_accel::{MemoryPlacement, Residency};

    fn analog(values: &[f32]) -> AnalogWaveform {
        let mut wfm = AnalogWaveform::new();
        wfm.resize(values.len());
        wfm.samples_mut().copy_from_slice(values);
        wfm.mark_samples_modified_from_cpu();
        wfm.fill_dense_timestamps();
        wfm
    }

    #[test]
    fn test_new_waveform_is_empty_and_zeroed() {
        let wfm = DigitalWaveform::new();
        assert!(wfm.is_empty());
        assert_eq!(wfm.metadata, WaveformMetadata::default());
        assert_eq!(wfm.kind(), WaveformKind::Digital);
    }

    #[test]
    fn test_default_hints() {
        let wfm = AnalogWaveform::new();
        assert_eq!(wfm.samples().placement(), MemoryPlacement::Pinned);
        assert_eq!(wfm.timestamps().offsets().placement(), MemoryPlacement::HostLocal);
    }

    #[test]
    fn test_resize_moves_all_buffers_together() {
        let mut wfm = DigitalBusWaveform::new();
        wfm.resize(5);
        assert_eq!(wfm.len(), 5);
        assert_eq!(wfm.timestamps().offsets().len(), 5);
        assert_eq!(wfm.timestamps().durations().len(), 5);
        assert!(!wfm.metadata.dense_packed);

        wfm.resize(2);
        assert_eq!(wfm.timestamps().len(), 2);
    }

    #[test]
    fn test_clear_keeps_metadata() {
        let mut wfm = analog(&[1.0, 2.0]);
        wfm.metadata.timescale = 500;
        wfm.bump_revision();
        let before = wfm.metadata.clone();

        wfm.clear();
        assert!(wfm.is_empty());
        assert!(wfm.timestamps().is_empty());
        assert_eq!(wfm.metadata, before);
    }

    #[test]
    fn test_reset_clears_metadata_but_advances_revision() {
        let mut wfm = analog(&[1.0]);
        wfm.metadata.timescale = 500;
        wfm.bump_revision();
        let key = wfm.cache_key();

        wfm.reset();
        assert!(wfm.is_empty());
        assert_eq!(wfm.metadata.timescale, 0);
        assert_ne!(wfm.cache_key(), key);
    }

    #[test]
    fn test_scaled_times_include_trigger_phase() {
        let mut wfm = analog(&[0.0, 0.0, 0.0]);
        wfm.metadata.timescale = 1_000;
        wfm.metadata.trigger_phase = -250;
        assert_eq!(wfm.offset_scaled(2), 1_750);
        assert_eq!(wfm.duration_scaled(2), 1_000);
    }

    #[test]
    fn test_scaled_times_saturate() {
        let mut wfm = DigitalWaveform::new();
        wfm.push(0, 1, false);
        wfm.push(1 << 40, i64::MAX >> 1, true);
        wfm.metadata.timescale = 1 << 30;
        wfm.metadata.trigger_phase = 5;

        assert_eq!(wfm.offset_scaled(0), 5);
        assert_eq!(wfm.offset_scaled(1), i64::MAX);
        assert_eq!(wfm.duration_scaled(1), i64::MAX);
    }

    #[test]
    fn test_push_onto_stale_samples_leaves_lengths_equal() {
        let mut wfm = AnalogWaveform::new();
        wfm.set_sample_hints(AccessHint::Likely, AccessHint::Unlikely);
        wfm.push(0, 1, 1.0);
        wfm.prepare_for_gpu_access();
        wfm.mark_samples_modified_from_gpu();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            wfm.push(1, 1, 2.0);
        }));
        assert!(result.is_err());
        assert_eq!(wfm.timestamps().len(), 1);
        assert_eq!(wfm.len(), 1);
    }

    #[test]
    #[should_panic(expected = "push while a buffer is stale")]
    fn test_push_requires_host_residency() {
        let mut wfm = DigitalWaveform::new();
        wfm.set_sample_hints(AccessHint::Unlikely, AccessHint::Likely);
        wfm.prepare_for_gpu_access();
        wfm.mark_samples_modified_from_gpu();
        wfm.push(0, 1, true);
    }

    #[test]
    fn test_sparse_push_and_iter() {
        let mut wfm = DigitalWaveform::new();
        wfm.push(0, 5, false);
        wfm.push(5, 15, true);
        wfm.push(20, 3, false);
        wfm.mark_samples_modified_from_cpu();
        wfm.mark_timestamps_modified_from_cpu();

        let collected: Vec<_> = wfm.iter().map(|(span, &v)| (span.offset, span.duration, v)).collect();
        assert_eq!(collected, vec![(0, 5, false), (5, 15, true), (20, 3, false)]);
        assert!(wfm.validate().is_ok());
    }

    #[test]
    fn test_copy_timestamps_leaves_samples() {
        let mut src = DigitalWaveform::new();
        src.push(0, 2, true);
        src.push(2, 8, false);

        let mut dst = analog(&[7.0, 8.0]);
        dst.copy_timestamps(&src);

        assert_eq!(dst.timestamps().offsets().host_slice(), &[0, 2]);
        assert_eq!(dst.timestamps().durations().host_slice(), &[2, 8]);
        assert_eq!(dst.samples().host_slice(), &[7.0, 8.0]);
    }

    #[test]
    #[should_panic(expected = "destination must be resized")]
    fn test_copy_timestamps_requires_matching_length() {
        let src = analog(&[1.0, 2.0, 3.0]);
        let mut dst = analog(&[1.0]);
        dst.copy_timestamps(&src);
    }

    #[test]
    fn test_try_copy_timestamps_reports_mismatch() {
        let src = analog(&[1.0, 2.0, 3.0]);
        let mut dst = DigitalWaveform::new();
        assert_eq!(
            dst.try_copy_timestamps(&src),
            Err(WaveformError::TimestampLengthMismatch {
                destination_len: 0,
                source_len: 3,
            })
        );
    }

    #[test]
    fn test_sample_and_timestamp_marks_are_independent() {
        let mut wfm = analog(&[1.0, 2.0]);
        wfm.set_sample_hints(AccessHint::Likely, AccessHint::Unlikely);
        wfm.prepare_for_gpu_access();

        wfm.device_samples_mut()[0] = 10.0;
        wfm.mark_samples_modified_from_gpu();

        assert_eq!(wfm.samples().residency(), Residency::DeviceValid);
        assert_eq!(
            wfm.timestamps().residency(),
            (Residency::BothValid, Residency::BothValid)
        );

        wfm.prepare_for_cpu_access();
        assert_eq!(wfm.sample(0), &10.0);
    }

    #[test]
    fn test_placeholder_presentation() {
        let wfm = analog(&[1.0]);
        assert_eq!(wfm.get_text(0), "(unimplemented)");
        assert_eq!(wfm.get_color(0), StandardColor::Error.color());
    }

    #[test]
    fn test_validate_rejects_dense_flag_over_sparse_data() {
        let mut wfm = DigitalWaveform::new();
        wfm.push(0, 4, true);
        wfm.push(4, 4, false);
        wfm.metadata.dense_packed = true;
        assert!(matches!(
            wfm.validate(),
            Err(WaveformError::DenseMismatch { index: 0, .. })
        ));
    }
}
