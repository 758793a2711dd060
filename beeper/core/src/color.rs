//! Fade Colors
//!
//! Linear interpolation between two hex colors. Notifications are drawn in
//! a color that slides from a bright "just arrived" tone to a neutral
//! "settled" tone over the fade window.
//!
//! Colors are 6 hex digits with an optional leading `#`. Output is always
//! lowercase with the `#` prefix.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Errors from decoding a hex color string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// The string (after stripping `#`) is not exactly six characters
    #[error("invalid hex color format: expected 6 hex digits, got {0:?}")]
    InvalidLength(String),

    /// A two-character channel group is not valid hexadecimal
    #[error("invalid hex digits {group:?} in color {color:?}")]
    InvalidHex { color: String, group: String },
}

/// An 8-bit-per-channel RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decode `"6c67ea"` or `"#6c67ea"` (case-insensitive)
    pub fn parse(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);

        // Byte length, not char count: a multi-byte char can't be hex anyway
        // and slicing below must stay on byte boundaries.
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ColorError::InvalidLength(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            let group = &digits[range];
            let invalid = || ColorError::InvalidHex {
                color: hex.to_string(),
                group: group.to_string(),
            };
            // from_str_radix tolerates a leading '+'
            if !group.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            u8::from_str_radix(group, 16).map_err(|_| invalid())
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Blend towards `other`; `t` is clamped to `[0, 1]`.
    ///
    /// Channels are truncated, not rounded, so a blend that lands on
    /// `107.9` becomes `107`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = clamp_unit(t);
        // a + (b - a) * t is exact when a == b and at both ends of the range
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t) as u8;

        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::parse(s)
    }
}

/// Interpolate between two hex colors.
///
/// `t = 0.0` returns `color_a`, `t = 1.0` returns `color_b`. Out-of-range
/// `t` is clamped. The result is a lowercase `#rrggbb` string.
pub fn interpolate(color_a: &str, color_b: &str, t: f64) -> Result<String, ColorError> {
    let a = Rgb::parse(color_a)?;
    let b = Rgb::parse(color_b)?;
    Ok(a.lerp(b, t).to_string())
}

/// Fraction of the fade window that has elapsed, in `[0, 1]`
pub fn fade_progress(elapsed: Duration, window: Duration) -> f64 {
    if window.is_zero() {
        return 1.0;
    }
    let elapsed = elapsed.min(window);
    elapsed.as_secs_f64() / window.as_secs_f64()
}

fn clamp_unit(t: f64) -> f64 {
    // NaN compares false everywhere; treat it as the start of the fade
    if t.is_nan() {
        return 0.0;
    }
    t.clamp(0.0, 1.0)
}
