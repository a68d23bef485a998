//! RGBW color values as the device packs them.
//!
//! Two encodings are supported:
//!
//! - a packed `u32` with red in the lowest byte, then green, blue, and
//!   white in the highest byte (used in profile effect colors);
//! - a fixed-width decimal string, three digits per channel in R-G-B(-W)
//!   order, e.g. `"255000128"` or `"255000128064"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const CHANNEL_WIDTH: usize = 3;
const RGB_LEN: usize = CHANNEL_WIDTH * 3;
const RGBW_LEN: usize = CHANNEL_WIDTH * 4;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {channel} channel {value:?}: expected three digits between 000 and 255")]
pub struct ColorParseError {
    pub channel: &'static str,
    pub value: String,
}

/// A four-channel light color. White defaults to fully on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    #[serde(default = "full_white")]
    pub white: u8,
}

fn full_white() -> u8 {
    u8::MAX
}

impl RgbColor {
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// RGB color with the white channel fully on.
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self::with_white(red, green, blue, u8::MAX)
    }

    pub const fn with_white(red: u8, green: u8, blue: u8, white: u8) -> Self {
        Self {
            red,
            green,
            blue,
            white,
        }
    }

    /// Unpack from the device's `0xWWBBGGRR` layout.
    pub const fn from_hex(hex: u32) -> Self {
        let [red, green, blue, white] = hex.to_le_bytes();
        Self::with_white(red, green, blue, white)
    }

    /// Pack into the device's `0xWWBBGGRR` layout.
    pub const fn to_hex(self) -> u32 {
        u32::from_le_bytes([self.red, self.green, self.blue, self.white])
    }
}

impl Default for RgbColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<u32> for RgbColor {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl From<RgbColor> for u32 {
    fn from(color: RgbColor) -> Self {
        color.to_hex()
    }
}

impl FromStr for RgbColor {
    type Err = ColorParseError;

    /// Parse the decimal triplet form.
    ///
    /// Inputs shorter than nine characters decode to all channels zero,
    /// white included. Without a fourth triplet white is 255. Anything
    /// past the fourth triplet is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < RGB_LEN {
            return Ok(Self::with_white(0, 0, 0, 0));
        }

        let red = channel(s, 0, "red")?;
        let green = channel(s, 1, "green")?;
        let blue = channel(s, 2, "blue")?;
        let white = if s.len() >= RGBW_LEN {
            channel(s, 3, "white")?
        } else {
            u8::MAX
        };

        Ok(Self::with_white(red, green, blue, white))
    }
}

fn channel(s: &str, slot: usize, name: &'static str) -> Result<u8, ColorParseError> {
    let start = slot * CHANNEL_WIDTH;
    let invalid = || ColorParseError {
        channel: name,
        value: s.get(start..).unwrap_or(s).chars().take(CHANNEL_WIDTH).collect(),
    };

    let digits = s.get(start..start + CHANNEL_WIDTH).ok_or_else(invalid)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    digits.parse().map_err(|_| invalid())
}

impl fmt::Display for RgbColor {
    /// Nine-digit RGB form. White is not included.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}{:03}{:03}", self.red, self.green, self.blue)
    }
}
