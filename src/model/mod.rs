//! # Report Model
//!
//! The input representation for the layout engine: formatted rows, the
//! column layout they are drawn into, and the fixed page geometry. Rows are
//! produced from domain records (see [`crate::records`]) and never change
//! once built.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::image_loader::LoadedImage;

/// Slack used when comparing accumulated point values.
pub const EPSILON: f64 = 1e-6;

/// A complete report ready for layout.
#[derive(Debug, Clone)]
pub struct Report {
    pub metadata: Metadata,
    pub columns: ColumnSpec,
    pub rows: Vec<ReportRow>,
    /// Pre-rendered chart drawn above the table on the first page.
    pub chart: Option<LoadedImage>,
}

/// Document metadata: drawn in the header/footer and embedded in the PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: String,
    pub author: String,
    pub created_on: NaiveDate,
    #[serde(default)]
    pub subject: Option<String>,
}

/// The value a display cell was formatted from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    Text(String),
    Count(i64),
    Money(f64),
    Week(NaiveDate),
    Month(NaiveDate),
    Day(NaiveDate),
}

impl CellValue {
    /// The display label for this value.
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Count(n) => group_thousands(n.unsigned_abs(), *n < 0),
            CellValue::Money(amount) => format_money(*amount),
            CellValue::Week(d) => d.format("Week of %b %d, %Y").to_string(),
            CellValue::Month(d) => d.format("%B %Y").to_string(),
            CellValue::Day(d) => d.format("%a, %b %d %Y").to_string(),
        }
    }
}

fn group_thousands(n: u64, negative: bool) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Largest amount whose cents an f64 still holds exactly.
const MAX_EXACT_MONEY: f64 = 9.0e13;

fn format_money(amount: f64) -> String {
    if !amount.is_finite() {
        return "n/a".to_string();
    }
    if amount.abs() > MAX_EXACT_MONEY {
        return format!("{}${:.3e}", if amount < 0.0 { "-" } else { "" }, amount.abs());
    }
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, group_thousands(cents / 100, false), cents % 100)
}

/// One formatted table line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// Position of the row in the whole report (drives banding).
    pub index: usize,
    pub cells: Vec<String>,
    pub values: Vec<CellValue>,
}

impl ReportRow {
    pub fn new(index: usize, values: Vec<CellValue>) -> Self {
        let cells = values.iter().map(CellValue::display).collect();
        Self {
            index,
            cells,
            values,
        }
    }

    /// A row of plain strings, with no typed values behind it.
    pub fn from_cells(index: usize, cells: Vec<String>) -> Self {
        let values = cells.iter().cloned().map(CellValue::Text).collect();
        Self {
            index,
            cells,
            values,
        }
    }
}

/// How wide a column is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColumnWidth {
    /// Width in points.
    Fixed(f64),
    /// Share of the content width (0.0 - 1.0).
    Fraction(f64),
    /// Split whatever is left equally with the other auto columns.
    Auto,
}

/// One column: its header label and width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub label: String,
    pub width: ColumnWidth,
}

impl Column {
    pub fn new(label: impl Into<String>, width: ColumnWidth) -> Self {
        Self {
            label: label.into(),
            width,
        }
    }
}

/// The ordered columns of a report table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec(pub Vec<Column>);

impl ColumnSpec {
    pub fn new(columns: Vec<Column>) -> Self {
        Self(columns)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.0.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.0.iter().map(|c| c.label.as_str()).collect()
    }
}

/// Fixed page dimensions and the vertical bands carved out of them.
///
/// ```text
/// margin
/// title_height              every page
/// first_page_lead           page 1 only (chart area)
/// table_header_height       every page
/// rows ...                  down to row_limit()
/// footer_reserve
/// margin
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub row_height: f64,
    pub title_height: f64,
    pub table_header_height: f64,
    pub footer_reserve: f64,
    pub first_page_lead: f64,
}

impl Default for PageGeometry {
    /// US Letter with a 40pt margin.
    fn default() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin: 40.0,
            row_height: 24.0,
            title_height: 40.0,
            table_header_height: 24.0,
            footer_reserve: 24.0,
            first_page_lead: 0.0,
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f64 {
        self.width - self.margin * 2.0
    }

    /// Lowest y (top-down) a row's bottom edge may reach.
    pub fn row_limit(&self) -> f64 {
        self.height - self.margin - self.footer_reserve
    }

    /// Top of the table header on the given 1-based page.
    pub fn table_top(&self, page: usize) -> f64 {
        let lead = if page == 1 { self.first_page_lead } else { 0.0 };
        self.margin + self.title_height + lead
    }

    /// Where the first data row starts on the given 1-based page.
    pub fn rows_top(&self, page: usize) -> f64 {
        self.table_top(page) + self.table_header_height
    }

    /// Vertical space available to data rows on the given 1-based page.
    pub fn usable_span(&self, page: usize) -> f64 {
        self.row_limit() - self.rows_top(page)
    }

    /// Reject geometry that could not produce a finite, non-overlapping
    /// document. Called before any drawing starts.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("width", self.width),
            ("height", self.height),
            ("margin", self.margin),
            ("rowHeight", self.row_height),
            ("titleHeight", self.title_height),
            ("tableHeaderHeight", self.table_header_height),
            ("footerReserve", self.footer_reserve),
            ("firstPageLead", self.first_page_lead),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(config_error(format!(
                    "{} must be a finite, non-negative number (got {})",
                    name, value
                )));
            }
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(config_error("page width and height must be positive"));
        }
        if self.row_height <= 0.0 {
            return Err(config_error("rowHeight must be positive"));
        }
        if self.content_width() <= 0.0 {
            return Err(config_error(format!(
                "margins ({} x 2) leave no content width on a {}pt page",
                self.margin, self.width
            )));
        }
        if self.usable_span(1) < -EPSILON {
            return Err(config_error(format!(
                "first page header bands end at {:.2}pt, below the row limit {:.2}pt",
                self.rows_top(1),
                self.row_limit()
            )));
        }
        if self.row_height > self.usable_span(2) + EPSILON {
            return Err(config_error(format!(
                "rowHeight {} exceeds the {:.2}pt available for rows on a page",
                self.row_height,
                self.usable_span(2)
            )));
        }
        Ok(())
    }
}

fn config_error(msg: impl Into<String>) -> ReportError {
    ReportError::Configuration(msg.into())
}
