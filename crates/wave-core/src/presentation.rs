//! Display hooks.
//!
//! Rendering belongs to the UI layer. Waveforms only answer "what text and
//! colour for sample `i`", and every built-in kind answers with a visible
//! placeholder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Text returned by [`crate::Waveform::get_text`] for kinds without a formatter.
pub const PLACEHOLDER_TEXT: &str = "(unimplemented)";

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Color {
    /// Construct from components.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Standard palette for protocol and status rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardColor {
    /// Payload data
    Data,
    /// Control fields
    Control,
    /// Addresses
    Address,
    /// Preambles and sync
    Preamble,
    /// Checksum that verified
    ChecksumOk,
    /// Checksum that failed
    ChecksumBad,
    /// Errors and unsupported content
    Error,
    /// Idle bus
    Idle,
}

impl StandardColor {
    /// RGB value.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            StandardColor::Data => Color::rgb(0x33, 0x66, 0x99),
            StandardColor::Control => Color::rgb(0xc0, 0x00, 0xa0),
            StandardColor::Address => Color::rgb(0xff, 0xff, 0x00),
            StandardColor::Preamble => Color::rgb(0x80, 0x80, 0x80),
            StandardColor::ChecksumOk => Color::rgb(0x00, 0xff, 0x00),
            StandardColor::ChecksumBad | StandardColor::Error => Color::rgb(0xff, 0x00, 0x00),
            StandardColor::Idle => Color::rgb(0x40, 0x40, 0x40),
        }
    }
}
