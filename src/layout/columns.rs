//! Column width resolution: turns a [`ColumnSpec`] into concrete point
//! widths that exactly span the content width.

use crate::error::{ReportError, Result};
use crate::model::{ColumnSpec, ColumnWidth};

/// Tolerance for the "widths sum to content width" check.
const WIDTH_TOLERANCE: f64 = 0.01;

/// Resolve each column to a width in points.
///
/// Fixed and fractional widths are used as given; auto columns share the
/// remainder equally. The result must sum to `content_width`.
pub fn resolve_column_widths(columns: &ColumnSpec, content_width: f64) -> Result<Vec<f64>> {
    if columns.is_empty() {
        return Err(ReportError::Configuration(
            "a report table needs at least one column".to_string(),
        ));
    }

    let mut widths = Vec::with_capacity(columns.len());
    let mut remaining = content_width;
    let mut auto_count = 0;

    for column in columns.iter() {
        let w = match column.width {
            ColumnWidth::Fixed(w) => w,
            ColumnWidth::Fraction(f) => content_width * f,
            ColumnWidth::Auto => {
                auto_count += 1;
                widths.push(0.0);
                continue;
            }
        };
        if !w.is_finite() || w < 0.0 {
            return Err(ReportError::Configuration(format!(
                "column '{}' has an invalid width {}",
                column.label, w
            )));
        }
        widths.push(w);
        remaining -= w;
    }

    if auto_count > 0 {
        if remaining < -WIDTH_TOLERANCE {
            return Err(ReportError::Configuration(format!(
                "fixed columns overflow the {:.2}pt content width by {:.2}pt",
                content_width, -remaining
            )));
        }
        let auto_width = remaining.max(0.0) / auto_count as f64;
        for (width, column) in widths.iter_mut().zip(columns.iter()) {
            if matches!(column.width, ColumnWidth::Auto) {
                *width = auto_width;
            }
        }
    }

    let total: f64 = widths.iter().sum();
    if (total - content_width).abs() > WIDTH_TOLERANCE {
        return Err(ReportError::Configuration(format!(
            "column widths sum to {:.2}pt but the content width is {:.2}pt",
            total, content_width
        )));
    }

    Ok(widths)
}
