//! Error types for the waveform validation layer.
//!
//! The waveform core treats broken preconditions (mismatched lengths passed to
//! `copy_timestamps`, touching a stale buffer side) as programming errors and
//! panics. `WaveformError` exists for the layer built on top: checking data
//! that arrived from an instrument or a file before trusting it.
//!
//! ## Variants
//!
//! - **`LengthMismatch`**: offsets, durations and samples disagree on length.
//! - **`TimestampLengthMismatch`**: `try_copy_timestamps` destination not sized to the source.
//! - **`NegativeTimescale`** / **`StartFemtosecondsOutOfRange`**: metadata scalars out of range.
//! - **`NegativeDuration`**, **`NonMonotonicOffsets`**, **`OverlappingSamples`**:
//!   sparse timestamp ordering violations.
//! - **`DenseMismatch`**: a waveform flagged dense-packed whose explicit
//!   timestamps disagree with the implied `offset = i`, `duration = 1`.
//! - **`ExpansionTooLarge`**: `expand_dense` would allocate past its limit.

use thiserror::Error;

/// Convenience alias for results using [`WaveformError`].
pub type Result<T> = std::result::Result<T, WaveformError>;

/// Invalid waveform contents detected by validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaveformError {
    /// Buffer lengths disagree.
    #[error("buffer lengths disagree: offsets={offsets}, durations={durations}, samples={samples}")]
    LengthMismatch {
        /// Length of the offset buffer
        offsets: usize,
        /// Length of the duration buffer
        durations: usize,
        /// Length of the sample buffer
        samples: usize,
    },

    /// Timestamp copy between waveforms of different lengths.
    #[error("cannot copy {source_len} timestamps into a waveform of length {destination_len}")]
    TimestampLengthMismatch {
        /// Length of the waveform being written
        destination_len: usize,
        /// Length of the waveform being read
        source_len: usize,
    },

    /// Timescale below zero.
    #[error("timescale must be non-negative, got {0} fs")]
    NegativeTimescale(i64),

    /// Fractional start time outside one second.
    #[error("start_femtoseconds must be in [0, 1e15), got {0}")]
    StartFemtosecondsOutOfRange(i64),

    /// A sample with negative duration.
    #[error("sample {index} has negative duration {duration}")]
    NegativeDuration {
        /// Sample index
        index: usize,
        /// Offending duration
        duration: i64,
    },

    /// Offsets decrease.
    #[error("offset {offset} of sample {index} precedes previous offset {previous}")]
    NonMonotonicOffsets {
        /// Sample index
        index: usize,
        /// Offset of sample `index - 1`
        previous: i64,
        /// Offset of sample `index`
        offset: i64,
    },

    /// A sample extends past the start of the next one.
    #[error("sample {index} ends at {end}, past the next offset {next}")]
    OverlappingSamples {
        /// Sample index
        index: usize,
        /// `offsets[index] + durations[index]`
        end: i64,
        /// `offsets[index + 1]`
        next: i64,
    },

    /// Dense-packed flag set but explicit timestamps are irregular.
    #[error("dense-packed waveform has offset {offset}, duration {duration} at sample {index}")]
    DenseMismatch {
        /// Sample index
        index: usize,
        /// Explicit offset
        offset: i64,
        /// Explicit duration
        duration: i64,
    },

    /// Dense expansion would materialise more samples than allowed.
    #[error("dense expansion needs {timesteps} timesteps, limit is {limit}")]
    ExpansionTooLarge {
        /// End of the last sample, in timesteps
        timesteps: i64,
        /// Maximum samples a dense expansion may produce
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_sample() {
        let err = WaveformError::NonMonotonicOffsets {
            index: 2,
            previous: 3,
            offset: 2,
        };
        assert_eq!(err.to_string(), "offset 2 of sample 2 precedes previous offset 3");

        let err = WaveformError::TimestampLengthMismatch {
            destination_len: 4,
            source_len: 5,
        };
        assert!(err.to_string().contains("5 timestamps"));
    }
}
