//! Per-sample timing: parallel offset and duration buffers.
//!
//! Two modes share one storage shape:
//!
//! - **Dense** ([`TimestampMode::Dense`]): sample `i` starts at `i` and lasts
//!   one timestep. The buffers are never read; [`Timestamps::offset`] and
//!   friends compute the answer from the index.
//! - **Sparse** ([`TimestampMode::Sparse`]): run-length style data where a
//!   sample may cover many timesteps. Every lookup reads the buffers.
//!
//! Length-changing operations are crate-private so that the offset, duration
//! and sample buffers of a waveform can only grow or shrink together.

use crate::error::Result;
use crate::validate::validate_timestamps;
use serde::{Deserialize, Serialize};
use wave_accel::{AccessHint, AcceleratorBuffer, DualResidencyBuffer, Residency};

/// How sample times are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampMode {
    /// Offsets are `0..N`, durations are all 1.
    Dense,
    /// Offsets and durations are read from the buffers.
    Sparse,
}

impl TimestampMode {
    /// Mode selected by a `dense_packed` flag.
    #[must_use]
    pub fn from_dense_packed(dense_packed: bool) -> Self {
        if dense_packed {
            TimestampMode::Dense
        } else {
            TimestampMode::Sparse
        }
    }
}

/// Start and length of one sample, in timesteps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleSpan {
    /// Start relative to the acquisition start.
    pub offset: i64,
    /// Number of timesteps covered.
    pub duration: i64,
}

impl SampleSpan {
    /// First timestep after this sample.
    #[must_use]
    pub fn end(&self) -> i64 {
        self.offset.saturating_add(self.duration)
    }
}

/// Offset and duration buffers, always the same length.
#[derive(Debug)]
pub struct Timestamps {
    offsets: AcceleratorBuffer<i64>,
    durations: AcceleratorBuffer<i64>,
}

impl Timestamps {
    /// Empty pair with the default (host-side) access hints.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hints(AccessHint::Likely, AccessHint::Unlikely)
    }

    /// Empty pair with explicit access hints for both buffers.
    #[must_use]
    pub fn with_hints(cpu: AccessHint, gpu: AccessHint) -> Self {
        Self {
            offsets: AcceleratorBuffer::with_hints(cpu, gpu),
            durations: AcceleratorBuffer::with_hints(cpu, gpu),
        }
    }

    /// Number of samples described.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// True if no samples are described.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset buffer.
    #[must_use]
    pub fn offsets(&self) -> &AcceleratorBuffer<i64> {
        &self.offsets
    }

    /// Duration buffer.
    #[must_use]
    pub fn durations(&self) -> &AcceleratorBuffer<i64> {
        &self.durations
    }

    /// Host views of `(offsets, durations)` for writing.
    ///
    /// Call [`Timestamps::mark_modified_from_cpu`] afterwards.
    ///
    /// # Panics
    ///
    /// Panics if either buffer is stale on the host.
    pub fn host_mut(&mut self) -> (&mut [i64], &mut [i64]) {
        (self.offsets.host_slice_mut(), self.durations.host_slice_mut())
    }

    /// Device views of `(offsets, durations)` for writing.
    ///
    /// Call [`Timestamps::mark_modified_from_gpu`] afterwards.
    ///
    /// # Panics
    ///
    /// Panics if either buffer is stale on the device.
    pub fn device_mut(&mut self) -> (&mut [i64], &mut [i64]) {
        (
            self.offsets.device_slice_mut(),
            self.durations.device_slice_mut(),
        )
    }

    /// Offset of sample `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range, or (sparse only) the host copy is stale.
    #[must_use]
    pub fn offset(&self, i: usize, mode: TimestampMode) -> i64 {
        match mode {
            TimestampMode::Dense => {
                self.assert_index(i);
                i as i64
            }
            TimestampMode::Sparse => self.offsets.host_slice()[i],
        }
    }

    /// Duration of sample `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range, or (sparse only) the host copy is stale.
    #[must_use]
    pub fn duration(&self, i: usize, mode: TimestampMode) -> i64 {
        match mode {
            TimestampMode::Dense => {
                self.assert_index(i);
                1
            }
            TimestampMode::Sparse => self.durations.host_slice()[i],
        }
    }

    /// Offset and duration of sample `i`.
    #[must_use]
    pub fn span(&self, i: usize, mode: TimestampMode) -> SampleSpan {
        SampleSpan {
            offset: self.offset(i, mode),
            duration: self.duration(i, mode),
        }
    }

    /// Make both buffers valid on the host.
    pub fn prepare_for_cpu_access(&mut self) {
        self.offsets.prepare_for_cpu_access();
        self.durations.prepare_for_cpu_access();
    }

    /// Make both buffers valid on the device.
    pub fn prepare_for_gpu_access(&mut self) {
        self.offsets.prepare_for_gpu_access();
        self.durations.prepare_for_gpu_access();
    }

    /// Declare both buffers written on the host.
    pub fn mark_modified_from_cpu(&mut self) {
        self.offsets.mark_modified_from_cpu();
        self.durations.mark_modified_from_cpu();
    }

    /// Declare both buffers written on the device.
    pub fn mark_modified_from_gpu(&mut self) {
        self.offsets.mark_modified_from_gpu();
        self.durations.mark_modified_from_gpu();
    }

    /// Residency of `(offsets, durations)`.
    #[must_use]
    pub fn residency(&self) -> (Residency, Residency) {
        (self.offsets.residency(), self.durations.residency())
    }

    /// Apply access hints to both buffers.
    pub fn set_access_hints(&mut self, cpu: AccessHint, gpu: AccessHint) {
        for buf in [&mut self.offsets, &mut self.durations] {
            buf.set_cpu_access_hint(cpu);
            buf.set_gpu_access_hint(gpu);
        }
    }

    /// Check ordering, overlap and (if `dense_packed`) dense conformance.
    ///
    /// # Panics
    ///
    /// Panics if the host copies are stale.
    pub fn validate(&self, dense_packed: bool) -> Result<()> {
        validate_timestamps(
            self.offsets.host_slice(),
            self.durations.host_slice(),
            dense_packed,
        )
    }

    pub(crate) fn resize(&mut self, len: usize) {
        self.offsets.resize(len);
        self.durations.resize(len);
    }

    pub(crate) fn clear(&mut self) {
        self.offsets.clear();
        self.durations.clear();
    }

    pub(crate) fn push(&mut self, offset: i64, duration: i64) {
        self.offsets.push(offset);
        self.durations.push(duration);
    }

    /// Element-wise copy of both buffers.
    ///
    /// Caller checks lengths.
    pub(crate) fn copy_from(&mut self, other: &Timestamps) {
        self.offsets.copy_from(&other.offsets);
        self.durations.copy_from(&other.durations);
    }

    /// Write `0..N` / `1` on the host.
    pub(crate) fn fill_dense(&mut self) {
        let (offsets, durations) = self.host_mut();
        for (i, offset) in offsets.iter_mut().enumerate() {
            *offset = i as i64;
        }
        durations.fill(1);
        self.mark_modified_from_cpu();
    }

    fn assert_index(&self, i: usize) {
        assert!(
            i < self.len(),
            "sample index {} out of range for {} samples",
            i,
            self.len()
        );
    }
}

impl Default for Timestamps {
    fn default() -> Self {
        Self::new()
    }
}
