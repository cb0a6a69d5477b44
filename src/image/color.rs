//! Packed ARGB color helpers.
//!
//! Pixels are stored as `u32` with alpha in the top byte, followed by red,
//! green and blue. Colors compare by exact value.

/// Packs the four channels into an ARGB value.
#[inline]
pub const fn argb(alpha: u8, red: u8, green: u8, blue: u8) -> u32 {
    ((alpha as u32) << 24) | ((red as u32) << 16) | ((green as u32) << 8) | blue as u32
}

/// Packs an opaque RGB color.
#[inline]
pub const fn rgb(red: u8, green: u8, blue: u8) -> u32 {
    argb(0xFF, red, green, blue)
}

#[inline]
pub const fn alpha(color: u32) -> u8 {
    (color >> 24) as u8
}

#[inline]
pub const fn red(color: u32) -> u8 {
    (color >> 16) as u8
}

#[inline]
pub const fn green(color: u32) -> u8 {
    (color >> 8) as u8
}

#[inline]
pub const fn blue(color: u32) -> u8 {
    color as u8
}

/// Returns true when the alpha channel is zero; such pattern pixels are wildcards.
#[inline]
pub const fn is_transparent(color: u32) -> bool {
    alpha(color) == 0
}

/// Fully transparent black.
pub const TRANSPARENT: u32 = 0;
/// Opaque black.
pub const BLACK: u32 = rgb(0, 0, 0);
/// Opaque white.
pub const WHITE: u32 = rgb(0xFF, 0xFF, 0xFF);
