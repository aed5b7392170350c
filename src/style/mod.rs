//! # Report Styling
//!
//! Colors, font sizes and row banding for the rendered report. The theme is
//! fixed per document; nothing here changes while a report is being laid out.

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn gray(level: f64) -> Self {
        Self::rgb(level, level, level)
    }

    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0) as f64 / 255.0;
        match hex.len() {
            3 => Self::rgb(
                channel(&hex[0..1].repeat(2)),
                channel(&hex[1..2].repeat(2)),
                channel(&hex[2..3].repeat(2)),
            ),
            6 => Self::rgb(channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])),
            _ => Self::BLACK,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Row banding. Decided by the row's position in the whole report, never
/// by its position on a page, so stripes stay consistent across breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Band {
    Even,
    Odd,
}

impl Band {
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Band::Even
        } else {
            Band::Odd
        }
    }
}

/// Visual settings shared by the header, footer and row renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub title_size: f64,
    pub title_color: Color,

    pub header_size: f64,
    pub header_fill: Color,
    pub header_text: Color,

    pub body_size: f64,
    pub body_text: Color,
    pub even_fill: Color,
    pub odd_fill: Color,

    pub separator: Color,
    pub separator_width: f64,

    pub footer_size: f64,
    pub footer_text: Color,

    /// Horizontal gap between a column's left edge and its text.
    pub cell_inset: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title_size: 18.0,
            title_color: Color::hex("#1f2430"),
            header_size: 11.0,
            header_fill: Color::hex("#2b3a55"),
            header_text: Color::WHITE,
            body_size: 10.0,
            body_text: Color::hex("#222222"),
            even_fill: Color::hex("#f2f4f8"),
            odd_fill: Color::WHITE,
            separator: Color::gray(0.75),
            separator_width: 0.5,
            footer_size: 9.0,
            footer_text: Color::gray(0.4),
            cell_inset: 8.0,
        }
    }
}

impl Theme {
    pub fn band_fill(&self, band: Band) -> Color {
        match band {
            Band::Even => self.even_fill,
            Band::Odd => self.odd_fill,
        }
    }

    /// Font sizes must be finite and positive; the inset and separator
    /// width finite and non-negative. Anything else would reach the content
    /// stream as a mirrored or invalid operator.
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("titleSize", self.title_size),
            ("headerSize", self.header_size),
            ("bodySize", self.body_size),
            ("footerSize", self.footer_size),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(ReportError::Configuration(format!(
                    "{} must be a finite, positive font size (got {})",
                    name, value
                )));
            }
        }
        let spacing = [
            ("cellInset", self.cell_inset),
            ("separatorWidth", self.separator_width),
        ];
        for (name, value) in spacing {
            if !value.is_finite() || value < 0.0 {
                return Err(ReportError::Configuration(format!(
                    "{} must be a finite, non-negative number (got {})",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
