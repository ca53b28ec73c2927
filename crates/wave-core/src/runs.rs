//! Conversion between dense and run-length (sparse) representations.
//!
//! Instruments with hardware compression deliver long constant stretches as
//! a single sample with a large duration. These helpers build one form from
//! the other so consumers can pick whichever their algorithm prefers.

use crate::error::{Result, WaveformError};
use crate::metadata::WaveformMetadata;
use crate::sample::Sample;
use crate::waveform::Waveform;

/// Largest number of timesteps [`Waveform::expand_dense`] will materialise.
pub const MAX_DENSE_EXPANSION: usize = 1 << 28;

impl<S: Sample> Waveform<S> {
    /// Merge runs of equal, contiguous samples into single long samples.
    ///
    /// The result is a new waveform (fresh id, revision 1) carrying this
    /// waveform's metadata scalars. Samples separated by a gap are never
    /// merged. The result stays dense-packed only if nothing merged.
    ///
    /// # Panics
    ///
    /// Panics if the data is stale on the host.
    #[must_use]
    pub fn compress_runs(&self) -> Waveform<S> {
        let mut out = Waveform::new();
        let mut current: Option<(i64, i64, &S)> = None;

        for (span, sample) in self.iter() {
            let merged = match current {
                Some((offset, duration, value))
                    if value == sample && offset.checked_add(duration) == Some(span.offset) =>
                {
                    // A run longer than i64::MAX timesteps is split instead.
                    duration
                        .checked_add(span.duration)
                        .map(|total| (offset, total, value))
                }
                _ => None,
            };
            match merged {
                Some(run) => current = Some(run),
                None => {
                    if let Some((offset, duration, value)) = current {
                        out.push(offset, duration, value.clone());
                    }
                    current = Some((span.offset, span.duration, sample));
                }
            }
        }
        if let Some((offset, duration, value)) = current {
            out.push(offset, duration, value.clone());
        }

        out.mark_timestamps_modified_from_cpu();
        out.mark_samples_modified_from_cpu();
        out.metadata = self.metadata.clone();
        out.metadata.dense_packed = self.metadata.dense_packed && out.len() == self.len();
        out.metadata.revision = 1;
        out
    }

    /// Expand into a dense-packed waveform with one sample per timestep.
    ///
    /// Timestep `t` takes the value of the sample covering it. Gaps between
    /// samples hold the previous value (the default value before the first
    /// sample). The result starts at timestep 0 and ends at the last sample's
    /// end; it is a new waveform (fresh id, revision 1).
    ///
    /// # Errors
    ///
    /// Returns the validation error if the timestamps are malformed, or
    /// [`WaveformError::ExpansionTooLarge`] if the result would exceed
    /// [`MAX_DENSE_EXPANSION`] samples.
    pub fn expand_dense(&self) -> Result<Waveform<S>> {
        self.validate()?;

        let end = if self.is_empty() {
            0
        } else {
            self.span(self.len() - 1).end().max(0)
        };
        let total = usize::try_from(end)
            .ok()
            .filter(|&n| n <= MAX_DENSE_EXPANSION)
            .ok_or(WaveformError::ExpansionTooLarge {
                timesteps: end,
                limit: MAX_DENSE_EXPANSION,
            })?;

        let mut out = Waveform::new();
        out.resize(total);
        {
            let dst = out.samples_mut();
            let mut cursor = 0usize;
            let mut held = S::default();
            for (span, sample) in self.iter() {
                let start = span.offset.max(0) as usize;
                let end = (span.end().max(0) as usize).min(total);
                if start > cursor {
                    dst[cursor..start].fill(held.clone());
                }
                if end > start {
                    dst[start..end].fill(sample.clone());
                }
                held = sample.clone();
                cursor = cursor.max(end);
            }
        }
        out.fill_dense_timestamps();
        out.mark_samples_modified_from_cpu();

        out.metadata = WaveformMetadata {
            dense_packed: true,
            revision: 1,
            ..self.metadata.clone()
        };
        Ok(out)
    }
}
