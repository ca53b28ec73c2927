//! Acquisition-level metadata shared by every waveform.
//!
//! [`WaveformMetadata`] is plain data: no validation happens on construction
//! or assignment. Writers keep it consistent; [`WaveformMetadata::validate`]
//! is available for data of uncertain origin.

use crate::error::{Result, WaveformError};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Femtoseconds in one second.
pub const FS_PER_SECOND: i64 = 1_000_000_000_000_000;

const FS_PER_NANOSECOND: i64 = 1_000_000;

/// Per-waveform status flags.
///
/// Serialised as the instrument bitfield (`u8`), bit 0 = clipping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct WaveformFlags {
    /// Instrument reported the input clipped during this acquisition.
    pub clipping: bool,
}

impl WaveformFlags {
    /// Bit for [`WaveformFlags::clipping`].
    pub const CLIPPING: u8 = 0x01;

    /// Encode as the instrument bitfield.
    #[must_use]
    pub fn bits(self) -> u8 {
        if self.clipping {
            Self::CLIPPING
        } else {
            0
        }
    }

    /// Decode from the instrument bitfield. Unknown bits are ignored.
    #[must_use]
    pub fn from_bits(bits: u8) -> Self {
        Self {
            clipping: bits & Self::CLIPPING != 0,
        }
    }
}

impl From<u8> for WaveformFlags {
    fn from(bits: u8) -> Self {
        Self::from_bits(bits)
    }
}

impl From<WaveformFlags> for u8 {
    fn from(flags: WaveformFlags) -> Self {
        flags.bits()
    }
}

/// Acquisition scalars carried by every waveform regardless of sample type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveformMetadata {
    /// Femtoseconds per timestep. 0 means unset.
    pub timescale: i64,

    /// Acquisition start, whole seconds since the Unix epoch.
    pub start_timestamp: i64,

    /// Fractional acquisition start in femtoseconds, `0..FS_PER_SECOND`.
    pub start_femtoseconds: i64,

    /// Femtoseconds from the trigger to the sampling clock.
    ///
    /// Usually a time-to-digital converter reading within one sample, but it
    /// can be negative: some instruments start digital channels well before
    /// the analog ones.
    pub trigger_phase: i64,

    /// Every duration is 1 and offset `i` equals `i`.
    ///
    /// Consumers may skip the timestamp buffers entirely when set. `resize`
    /// never touches this flag.
    pub dense_packed: bool,

    /// Instrument status bits.
    pub flags: WaveformFlags,

    /// Incremented by the producer whenever sample or timestamp contents change.
    pub revision: u64,
}

impl WaveformMetadata {
    /// All scalars zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the revision and return the new value.
    pub fn bump_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    /// Zero every scalar except `revision`, which is incremented.
    ///
    /// A recycled waveform keeps its identity, so its revision must keep
    /// growing or stale cache entries would match new data.
    pub fn reset(&mut self) {
        let revision = self.revision + 1;
        *self = Self {
            revision,
            ..Self::default()
        };
    }

    /// Acquisition start as a UTC instant, truncated to nanoseconds.
    ///
    /// Returns `None` if the fields do not describe a representable instant.
    #[must_use]
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        if !(0..FS_PER_SECOND).contains(&self.start_femtoseconds) {
            return None;
        }
        let nanos = u32::try_from(self.start_femtoseconds / FS_PER_NANOSECOND).ok()?;
        Utc.timestamp_opt(self.start_timestamp, nanos).single()
    }

    /// Set the acquisition start from a UTC instant.
    pub fn set_start_time(&mut self, start: DateTime<Utc>) {
        // Leap-second instants report up to 2e9 ns; fold them into the same second.
        let nanos = start.timestamp_subsec_nanos().min(999_999_999);
        self.start_timestamp = start.timestamp();
        self.start_femtoseconds = i64::from(nanos) * FS_PER_NANOSECOND;
    }

    /// Check scalar ranges.
    pub fn validate(&self) -> Result<()> {
        if self.timescale < 0 {
            return Err(WaveformError::NegativeTimescale(self.timescale));
        }
        if !(0..FS_PER_SECOND).contains(&self.start_femtoseconds) {
            return Err(WaveformError::StartFemtosecondsOutOfRange(
                self.start_femtoseconds,
            ));
        }
        Ok(())
    }
}

/// Process-unique waveform identity.
///
/// Stands in for object identity: two waveforms never share an id, and an id
/// never changes for the lifetime of its waveform (including pool reuse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaveformId(u64);

impl WaveformId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WaveformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wfm#{}", self.0)
    }
}

/// `(identity, revision)`: equal keys mean the data has not changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Waveform identity.
    pub id: WaveformId,
    /// Revision at the time the key was taken.
    pub revision: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all_zero() {
        let meta = WaveformMetadata::new();
        assert_eq!(meta.timescale, 0);
        assert_eq!(meta.start_timestamp, 0);
        assert_eq!(meta.start_femtoseconds, 0);
        assert_eq!(meta.trigger_phase, 0);
        assert!(!meta.dense_packed);
        assert_eq!(meta.flags.bits(), 0);
        assert_eq!(meta.revision, 0);
    }

    #[test]
    fn test_reset_keeps_revision_growing() {
        let mut meta = WaveformMetadata {
            timescale: 1000,
            trigger_phase: -150_000_000,
            dense_packed: true,
            revision: 7,
            ..WaveformMetadata::default()
        };
        meta.reset();
        assert_eq!(meta.timescale, 0);
        assert_eq!(meta.trigger_phase, 0);
        assert!(!meta.dense_packed);
        assert_eq!(meta.revision, 8);
    }

    #[test]
    fn test_flags_bitfield() {
        assert_eq!(WaveformFlags::from_bits(0x01), WaveformFlags { clipping: true });
        assert_eq!(WaveformFlags::from_bits(0xFE), WaveformFlags { clipping: false });
        assert_eq!(WaveformFlags { clipping: true }.bits(), WaveformFlags::CLIPPING);
    }

    #[test]
    fn test_flags_serialize_as_bits() {
        let meta = WaveformMetadata {
            flags: WaveformFlags { clipping: true },
            ..WaveformMetadata::default()
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["flags"], 1);

        let back: WaveformMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_start_time_sub_second() {
        let mut meta = WaveformMetadata::new();
        let start = Utc.timestamp_opt(1_700_000_000, 250_000_000).unwrap();
        meta.set_start_time(start);
        assert_eq!(meta.start_timestamp, 1_700_000_000);
        assert_eq!(meta.start_femtoseconds, 250_000_000_000_000);
        assert_eq!(meta.start_time(), Some(start));
    }

    #[test]
    fn test_start_time_rejects_out_of_range_fraction() {
        let meta = WaveformMetadata {
            start_femtoseconds: FS_PER_SECOND,
            ..WaveformMetadata::default()
        };
        assert_eq!(meta.start_time(), None);
        assert_eq!(
            meta.validate(),
            Err(WaveformError::StartFemtosecondsOutOfRange(FS_PER_SECOND))
        );
    }

    #[test]
    fn test_negative_trigger_phase_is_valid() {
        let meta = WaveformMetadata {
            timescale: 1_000_000,
            trigger_phase: -150_000_000_000,
            ..WaveformMetadata::default()
        };
        assert!(meta.validate().is_ok());
    }

    #[test]
    fn test_negative_timescale_rejected() {
        let meta = WaveformMetadata {
            timescale: -1,
            ..WaveformMetadata::default()
        };
        assert_eq!(meta.validate(), Err(WaveformError::NegativeTimescale(-1)));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = WaveformId::next();
        let b = WaveformId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }
}
