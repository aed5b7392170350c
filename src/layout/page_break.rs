//! # Page Break Decisions
//!
//! The one decision the paginator makes per row: does the next row still
//! fit above the footer, or does it open a new page? Plus the capacity
//! arithmetic used for the up-front page estimate.

use crate::model::EPSILON;

/// What to do with the next row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// The row fits below the cursor on the current page.
    Place,
    /// The row would cross the row limit; start a new page first.
    NewPage,
}

/// Decide whether a row of `row_height` starting at `cursor` fits above
/// `row_limit`. A row that ends exactly on the limit fits.
pub fn decide_break(cursor: f64, row_height: f64, row_limit: f64) -> BreakDecision {
    if cursor + row_height > row_limit + EPSILON {
        BreakDecision::NewPage
    } else {
        BreakDecision::Place
    }
}

/// How many rows of `row_height` fit in `span` points.
pub fn rows_that_fit(span: f64, row_height: f64) -> usize {
    if row_height <= 0.0 || span <= 0.0 {
        return 0;
    }
    ((span + EPSILON) / row_height).floor() as usize
}

/// Fixed rows-per-page estimate of the page count. Never less than one
/// page, since an empty report still prints its header.
pub fn estimate_page_count(row_count: usize, rows_per_page: usize) -> usize {
    if rows_per_page == 0 {
        return row_count.max(1);
    }
    row_count.div_ceil(rows_per_page).max(1)
}
