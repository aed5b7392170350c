//! # Font Handling
//!
//! Reports use two of the 14 standard PDF fonts, which never need embedding.
//! This module knows their PDF names, measures text with their AFM widths,
//! and encodes strings for WinAnsi content streams.

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// The standard fonts a report draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Resource name used inside content streams (`/F0`, `/F1`).
    pub fn resource_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "F0",
            Self::HelveticaBold => "F1",
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        StandardFontMetrics::for_font(*self)
    }

    /// Width of `text` in points at `font_size`.
    pub fn text_width(&self, text: &str, font_size: f64) -> f64 {
        self.metrics().text_width(text, font_size)
    }
}

const ELLIPSIS: &str = "...";

/// Shorten `text` so it fits in `max_width`, marking the cut with "...".
/// Text that already fits comes back unchanged.
pub fn truncate_to_width(text: &str, font: StandardFont, font_size: f64, max_width: f64) -> String {
    let metrics = font.metrics();
    if metrics.text_width(text, font_size) <= max_width {
        return text.to_string();
    }

    let budget = max_width - metrics.text_width(ELLIPSIS, font_size);
    if budget <= 0.0 {
        return String::new();
    }

    let mut used = 0.0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = metrics.char_width(ch, font_size);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push_str(ELLIPSIS);
    out
}

/// Encode a string as WinAnsi bytes for a standard-font `Tj` operand.
/// Characters outside the encoding become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch as u32 {
            0x20..=0x7E | 0xA0..=0xFF => ch as u32 as u8,
            _ => match ch {
                '€' => 0x80,
                '‘' => 0x91,
                '’' => 0x92,
                '“' => 0x93,
                '”' => 0x94,
                '•' => 0x95,
                '–' => 0x96,
                '—' => 0x97,
                '…' => 0x85,
                _ => b'?',
            },
        })
        .collect()
}
