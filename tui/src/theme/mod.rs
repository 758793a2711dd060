//! Theme and Colors
//!
//! New notifications start out periwinkle and settle to a soft gray over the
//! fade window. Fade endpoints are kept as hex strings because the blend
//! itself happens in `beeper_core::color`.

use beeper_core::{ColorError, Rgb};
use ratatui::style::Color;

// ============================================================================
// Fade Palette
// ============================================================================

/// Color of a notification the instant it arrives
pub const FADE_NEAR_HEX: &str = "6c67ea";

/// Color a notification settles to once the fade window has passed
pub const FADE_FAR_HEX: &str = "dcdcdc";

/// Used when a fade color can't be decoded
pub const FADE_FALLBACK: Color = Color::Rgb(0xdc, 0xdc, 0xdc);

// ============================================================================
// UI Colors
// ============================================================================

/// Header / status text
pub const HEADER_DIM: Color = Color::Rgb(110, 110, 120);

/// Key hints in the header
pub const HEADER_KEY: Color = Color::Rgb(0x6c, 0x67, 0xea);

/// Decode `"#rrggbb"` / `"rrggbb"` into a terminal color
pub fn hex_color(hex: &str) -> Result<Color, ColorError> {
    let Rgb { r, g, b } = Rgb::parse(hex)?;
    Ok(Color::Rgb(r, g, b))
}
