//! Decoded color value

use serde::{Deserialize, Serialize};
use std::fmt;

/// RGB color carried by a vendor advertisement.
///
/// Channels are full 8-bit values; the type cannot represent anything outside
/// `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DecodedColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl DecodedColor {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Channels as an `[r, g, b]` array
    pub const fn to_array(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }

    /// Channels normalized to `0.0..=1.0`, the form most UI toolkits expect.
    pub fn to_unit_rgb(self) -> [f32; 3] {
        [self.red as f32 / 255.0, self.green as f32 / 255.0, self.blue as f32 / 255.0]
    }
}

impl From<[u8; 3]> for DecodedColor {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self { red, green, blue }
    }
}

impl fmt::Display for DecodedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}
