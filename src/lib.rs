//! # Salesprint
//!
//! A paginated report engine for sales and earnings tables.
//!
//! A report is an ordered list of formatted rows, a fixed column layout and
//! a fixed page geometry. The engine lays the rows **into** pages: before a
//! row is placed it checks whether the row still fits above the footer,
//! and if not it opens a new page with the title and table header repeated.
//! Rows are never split, dropped or duplicated, and their banding follows
//! their position in the whole report rather than on the page.
//!
//! ## Architecture
//!
//! ```text
//! Records (JSON)
//!       ↓
//!   [records]     domain records → formatted ReportRows
//!       ↓
//!   [layout]      pagination fold, header/footer + row drawing
//!       ↓
//!   [pdf]         serialize to PDF bytes
//!       ↓
//!   [assembler]   page setup per report, write to a temp file
//! ```

pub mod assembler;
pub mod config;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod records;
pub mod style;

pub use assembler::{ReportAssembler, ReportMeta};
pub use config::ReportConfig;
pub use error::{ReportError, Result};
pub use model::{ColumnSpec, PageGeometry, Report, ReportRow};

use layout::LayoutEngine;
use pdf::PdfWriter;

/// Render a report to PDF bytes.
///
/// This is the primary entry point. Geometry and columns are validated
/// before anything is drawn.
pub fn render(report: &Report, config: &ReportConfig) -> Result<Vec<u8>> {
    let engine = LayoutEngine::new(config);
    let pages = engine.layout(report)?;
    let writer = PdfWriter::new();
    Ok(writer.write(&pages, &report.metadata))
}

/// Format typed records and render them with the given configuration.
/// A chart in `meta` reserves its area on the first page.
pub fn render_records<R: records::RecordFormat>(
    records: &[R],
    meta: &ReportMeta,
    config: &ReportConfig,
) -> Result<Vec<u8>> {
    ReportAssembler::new(config.clone()).assemble(records, meta)
}
