//! Table row drawing: the banded data rows and the bold header row that
//! repeats on every page. Text is left-aligned with a fixed inset and cut
//! with an ellipsis when it would spill out of its column.

use crate::font::{truncate_to_width, StandardFont};
use crate::model::{ColumnSpec, PageGeometry, ReportRow};
use crate::style::{Color, Theme};

use super::{baseline_in_band, LayoutElement, PlacedRow};

struct BandStyle {
    fill: Color,
    font: StandardFont,
    size: f64,
    text: Color,
}

/// The column header row with its top edge at `y`.
pub fn draw_table_header(
    columns: &ColumnSpec,
    widths: &[f64],
    y: f64,
    geometry: &PageGeometry,
    theme: &Theme,
) -> Vec<LayoutElement> {
    let style = BandStyle {
        fill: theme.header_fill,
        font: StandardFont::HelveticaBold,
        size: theme.header_size,
        text: theme.header_text,
    };
    draw_band(
        &columns.labels(),
        widths,
        y,
        geometry.table_header_height,
        geometry,
        theme,
        &style,
    )
}

/// One data row at its placed position, shaded by its report-wide band.
pub fn draw_row(
    row: &ReportRow,
    placed: &PlacedRow,
    widths: &[f64],
    geometry: &PageGeometry,
    theme: &Theme,
) -> Vec<LayoutElement> {
    let style = BandStyle {
        fill: theme.band_fill(placed.band),
        font: StandardFont::Helvetica,
        size: theme.body_size,
        text: theme.body_text,
    };
    let cells: Vec<&str> = row.cells.iter().map(String::as_str).collect();
    draw_band(&cells, widths, placed.y, geometry.row_height, geometry, theme, &style)
}

/// Background, per-column text, then separators at interior column edges.
fn draw_band(
    cells: &[&str],
    widths: &[f64],
    y: f64,
    height: f64,
    geometry: &PageGeometry,
    theme: &Theme,
    style: &BandStyle,
) -> Vec<LayoutElement> {
    let mut elements = vec![LayoutElement::rect(
        geometry.margin,
        y,
        geometry.content_width(),
        height,
        style.fill,
    )];

    let baseline = baseline_in_band(y, height, style.size);
    let mut x = geometry.margin;
    for (cell, &width) in cells.iter().zip(widths) {
        let room = width - theme.cell_inset * 2.0;
        let text = truncate_to_width(cell, style.font, style.size, room.max(0.0));
        if !text.is_empty() {
            elements.push(LayoutElement::text(
                x + theme.cell_inset,
                baseline,
                text,
                style.font,
                style.size,
                style.text,
            ));
        }
        x += width;
    }

    let mut edge = geometry.margin;
    for &width in widths.iter().take(widths.len().saturating_sub(1)) {
        edge += width;
        elements.push(LayoutElement::line(
            edge,
            y,
            edge,
            y + height,
            theme.separator_width,
            theme.separator,
        ));
    }

    elements
}
