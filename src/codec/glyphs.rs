//! Fixed 14-segment glyph table for ASCII `0x20..=0x7F`.
//!
//! Segment layout (bit values):
//!
//! ```text
//!   0001
//! 0020 0040 0080 0100 0002
//!   2000      0200
//! 0010 1000 0800 0400 0004
//!   0008
//! ```
//!
//! Bit `0x4000` lights the underline and bit `0x8000` the colon.

/// Underline modifier bit.
pub const UNDERLINE_BIT: u16 = 0x4000;
/// Colon modifier bit.
pub const COLON_BIT: u16 = 0x8000;
/// Placeholder stored in the table for characters the display cannot draw.
pub const NO_GLYPH: u16 = 0x3FFF;

const FIRST: u32 = 0x20;

#[rustfmt::skip]
static GLYPHS: [u16; 96] = [
    0x0000, 0x4880, 0x0082, NO_GLYPH, // ' ' ! " #
    0x2AAD, 0x1124, NO_GLYPH, 0x0100, // $ % & '
    NO_GLYPH, NO_GLYPH, 0x3FC0, 0x2A80, // ( ) * +
    0x1000, 0x2200, 0x0010, 0x1100, // , - . /
    0x113F, 0x0106, 0x221B, 0x030D, // 0 1 2 3
    0x2226, 0x2429, 0x223D, 0x1101, // 4 5 6 7
    0x223F, 0x2227, NO_GLYPH, NO_GLYPH, // 8 9 : ;
    0x0500, NO_GLYPH, 0x1040, NO_GLYPH, // < = > ?
    NO_GLYPH, 0x1306, 0x0A8F, 0x0039, // @ A B C
    0x088F, 0x2039, 0x2031, 0x023D, // D E F G
    0x2236, 0x0889, 0x1091, 0x0D80, // H I J K
    0x0038, 0x0176, 0x0476, 0x003F, // L M N O
    0x2233, 0x043F, 0x2633, 0x222D, // P Q R S
    0x0881, 0x003E, 0x1130, 0x1436, // T U V W
    0x1540, 0x0940, 0x1109, NO_GLYPH, // X Y Z [
    0x0440, NO_GLYPH, 0x1400, 0x0008, // \ ] ^ _
    0x0040, 0x1306, 0x0A8F, 0x0039, // ` a b c
    0x088F, 0x2039, 0x2031, 0x023D, // d e f g
    0x2236, 0x0889, 0x1091, 0x0D80, // h i j k
    0x0038, 0x0176, 0x0476, 0x003F, // l m n o
    0x2233, 0x043F, 0x2633, 0x222D, // p q r s
    0x0881, 0x003E, 0x1130, 0x1436, // t u v w
    0x1540, 0x0940, 0x1109, NO_GLYPH, // x y z {
    0x0880, NO_GLYPH, NO_GLYPH, NO_GLYPH, // | } ~ DEL
];

/// Segment mask for `c`, or `None` when the display has no glyph for it.
pub fn glyph(c: char) -> Option<u16> {
    let idx = u32::from(c).checked_sub(FIRST)? as usize;
    match GLYPHS.get(idx) {
        Some(&NO_GLYPH) | None => None,
        Some(&code) => Some(code),
    }
}

pub fn is_printable(c: char) -> bool {
    glyph(c).is_some()
}

pub fn underline(code: u16) -> u16 {
    code | UNDERLINE_BIT
}

pub fn colon(code: u16) -> u16 {
    code | COLON_BIT
}

#[cfg(test)]
#[path = "../../tests/unit/codec/glyphs.rs"]
mod tests;
