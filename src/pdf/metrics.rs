//! Base-14 font metrics.
//!
//! Glyph advance widths (thousandths of the em) for the standard fonts
//! the writer embeds by reference, taken from the Adobe AFM files.
//! Used for centering and line wrapping; Courier is fixed-pitch.

use super::Font;

/// Helvetica widths for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
    584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
    500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold widths for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333,
    584, 584, 584, 611, 975, 722, 722, 722, 722, 667, 611, 778, 722, 278,
    556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Courier is fixed-pitch.
const COURIER_WIDTH: u16 = 600;

/// Fallback for characters outside the tables (Latin-1 accents and
/// anything the WinAnsi encoder downgrades).
const DEFAULT_WIDTH: u16 = 556;

/// Advance width of one character, in thousandths of the em.
pub fn char_width(font: Font, c: char) -> u16 {
    if font == Font::Courier {
        return COURIER_WIDTH;
    }
    let table = match font {
        Font::Helvetica => &HELVETICA,
        Font::HelveticaBold => &HELVETICA_BOLD,
        Font::Courier => unreachable!(),
    };
    let code = c as u32;
    if (32..=126).contains(&code) {
        table[(code - 32) as usize]
    } else {
        DEFAULT_WIDTH
    }
}

/// Width of a text run at the given size, in points.
pub fn text_width(font: Font, text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| char_width(font, c) as u32).sum();
    units as f32 * size / 1000.0
}
