//! Advance widths for the standard Helvetica faces, taken from the Adobe
//! AFM files. Units are 1/1000 em. Only printable ASCII is tabulated; other
//! characters measure as a digit.

use super::StandardFont;

const FIRST_CHAR: u32 = 32;
const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Width tables for one standard font.
pub struct StandardFontMetrics {
    widths: &'static [u16; 95],
}

impl StandardFontMetrics {
    pub fn for_font(font: StandardFont) -> Self {
        let widths = match font {
            StandardFont::Helvetica => &HELVETICA,
            StandardFont::HelveticaBold => &HELVETICA_BOLD,
        };
        Self { widths }
    }

    /// Advance width of one character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let units = (ch as u32)
            .checked_sub(FIRST_CHAR)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(FALLBACK_WIDTH);
        units as f64 * font_size / 1000.0
    }

    pub fn text_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}
