//! Timestamp validation.
//!
//! Checks run in a fixed order and stop at the first failure:
//! lengths, negative durations, offset ordering, overlap, dense conformance.

use crate::error::{Result, WaveformError};

/// Check a pair of timestamp slices.
///
/// When `dense_packed` is set the explicit values must equal the implied
/// `offset = i`, `duration = 1`.
pub fn validate_timestamps(offsets: &[i64], durations: &[i64], dense_packed: bool) -> Result<()> {
    if offsets.len() != durations.len() {
        return Err(WaveformError::LengthMismatch {
            offsets: offsets.len(),
            durations: durations.len(),
            samples: offsets.len(),
        });
    }

    if let Some((index, &duration)) = durations.iter().enumerate().find(|&(_, &d)| d < 0) {
        return Err(WaveformError::NegativeDuration { index, duration });
    }

    for (index, pair) in offsets.windows(2).enumerate() {
        let (previous, offset) = (pair[0], pair[1]);
        if offset < previous {
            return Err(WaveformError::NonMonotonicOffsets {
                index: index + 1,
                previous,
                offset,
            });
        }
        let end = previous.saturating_add(durations[index]);
        if end > offset {
            return Err(WaveformError::OverlappingSamples {
                index,
                end,
                next: offset,
            });
        }
    }

    if dense_packed {
        let irregular = offsets
            .iter()
            .zip(durations)
            .enumerate()
            .find(|&(i, (&offset, &duration))| offset != i as i64 || duration != 1);
        if let Some((index, (&offset, &duration))) = irregular {
            return Err(WaveformError::DenseMismatch {
                index,
                offset,
                duration,
            });
        }
    }

    Ok(())
}
