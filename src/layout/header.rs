//! Header and footer drawing: the centred title band, and the footer with
//! its author/date credit and "Page N of M" marker. Pure functions of their
//! inputs.

use crate::font::{truncate_to_width, StandardFont};
use crate::model::{Metadata, PageGeometry};
use crate::style::Theme;

use super::{baseline_in_band, LayoutElement};

/// "Page 2 of 5"
pub fn page_marker(page: usize, total: usize) -> String {
    format!("Page {} of {}", page, total)
}

/// "Jane Doe | Created on: Mar 04, 2024"
pub fn footer_credit(metadata: &Metadata) -> String {
    format!(
        "{} | Created on: {}",
        metadata.author,
        metadata.created_on.format("%b %d, %Y")
    )
}

/// The report title, centred in the title band at the top of the page.
pub fn draw_title(title: &str, geometry: &PageGeometry, theme: &Theme) -> Vec<LayoutElement> {
    let font = StandardFont::HelveticaBold;
    let size = theme.title_size;
    let content_width = geometry.content_width();
    let text = truncate_to_width(title, font, size, content_width);
    if text.is_empty() {
        return Vec::new();
    }

    let width = font.text_width(&text, size);
    let x = geometry.margin + (content_width - width) / 2.0;
    let baseline = baseline_in_band(geometry.margin, geometry.title_height, size);
    vec![LayoutElement::text(x, baseline, text, font, size, theme.title_color)]
}

/// Footer rule, left-aligned credit and right-aligned page marker.
pub fn draw_footer(
    metadata: &Metadata,
    page: usize,
    total: usize,
    geometry: &PageGeometry,
    theme: &Theme,
) -> Vec<LayoutElement> {
    let font = StandardFont::Helvetica;
    let size = theme.footer_size;
    let top = geometry.row_limit();
    let left = geometry.margin;
    let right = geometry.width - geometry.margin;
    let baseline = baseline_in_band(top, geometry.footer_reserve, size);

    let marker = page_marker(page, total);
    let marker_width = font.text_width(&marker, size);
    let gap = size;
    let credit = truncate_to_width(
        &footer_credit(metadata),
        font,
        size,
        (geometry.content_width() - marker_width - gap).max(0.0),
    );

    let mut elements = vec![LayoutElement::line(
        left,
        top,
        right,
        top,
        theme.separator_width,
        theme.separator,
    )];
    if !credit.is_empty() {
        elements.push(LayoutElement::text(left, baseline, credit, font, size, theme.footer_text));
    }
    elements.push(LayoutElement::text(
        right - marker_width,
        baseline,
        marker,
        font,
        size,
        theme.footer_text,
    ));
    elements
}
