//! The closed set of sample payload types.

use serde::{Deserialize, Serialize};
use std::fmt;

mod sealed {
    pub trait Sealed {}

    impl Sealed for bool {}
    impl Sealed for f32 {}
    impl Sealed for Vec<bool> {}
}

/// Physical channel kind a waveform belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveformKind {
    /// One logic level per sample.
    Digital,
    /// One real-valued sample.
    Analog,
    /// One multi-lane logic vector per sample (e.g. an 8-bit parallel bus).
    DigitalBus,
}

impl fmt::Display for WaveformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WaveformKind::Digital => "digital",
            WaveformKind::Analog => "analog",
            WaveformKind::DigitalBus => "digital_bus",
        };
        write!(f, "{}", label)
    }
}

/// Sample payload type. Implemented for `bool`, `f32` and `Vec<bool>` only.
pub trait Sample:
    sealed::Sealed + Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// Channel kind for this payload.
    const KIND: WaveformKind;
}

impl Sample for bool {
    const KIND: WaveformKind = WaveformKind::Digital;
}

impl Sample for f32 {
    const KIND: WaveformKind = WaveformKind::Analog;
}

impl Sample for Vec<bool> {
    const KIND: WaveformKind = WaveformKind::DigitalBus;
}
