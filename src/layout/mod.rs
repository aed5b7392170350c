//! # Page Layout Engine
//!
//! Turns an ordered list of report rows into fixed-size pages.
//!
//! Layout runs in two phases:
//!
//! 1. **Paginate.** A single fold over the rows threads a
//!    [`PaginationState`] (page number, vertical cursor, rows on the page).
//!    Before each row we ask "does it fit above the footer?". If not, the
//!    state moves to a fresh page whose cursor sits below the repeated
//!    title and table header. The output is one [`PagePlan`] per page.
//! 2. **Draw.** Each plan becomes a [`LayoutPage`]: title, footer with the
//!    real "Page N of M" (the total is known after phase 1), the table
//!    header, and one band per placed row.
//!
//! A page is only opened when a row needs it, so a report that exactly
//! fills its last page never gets a trailing blank one. An empty report
//! still gets one page carrying the headers.
//!
//! Coordinates are top-down points from the page's top-left corner; the PDF
//! writer flips them.

pub mod columns;
pub mod header;
pub mod page_break;
pub mod row;

use log::debug;
use serde::Serialize;

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::font::StandardFont;
use crate::image_loader::LoadedImage;
use crate::model::{PageGeometry, Report, ReportRow};
use crate::style::{Band, Color, Theme};

use page_break::{decide_break, estimate_page_count, rows_that_fit, BreakDecision};

/// Cap height of Helvetica as a fraction of the font size.
const CAP_HEIGHT: f64 = 0.718;

/// Baseline that vertically centres capital letters in a band.
pub(crate) fn baseline_in_band(top: f64, height: f64, font_size: f64) -> f64 {
    top + (height + font_size * CAP_HEIGHT) / 2.0
}

/// Where the paginator is within the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaginationState {
    /// 1-based page number. Only ever increases.
    pub page: usize,
    /// Top edge of the next row.
    pub cursor: f64,
    pub rows_on_page: usize,
}

impl PaginationState {
    /// State at the top of the first page's table body.
    pub fn first(geometry: &PageGeometry) -> Self {
        Self {
            page: 1,
            cursor: geometry.rows_top(1),
            rows_on_page: 0,
        }
    }

    /// State at the top of the next page's table body.
    pub fn next_page(self, geometry: &PageGeometry) -> Self {
        let page = self.page + 1;
        Self {
            page,
            cursor: geometry.rows_top(page),
            rows_on_page: 0,
        }
    }

    /// Place one row. Returns the state after the row, the y the row was
    /// drawn at, and whether a page break happened first.
    pub fn place(self, geometry: &PageGeometry) -> (Self, f64, bool) {
        let (state, broke) =
            match decide_break(self.cursor, geometry.row_height, geometry.row_limit()) {
                BreakDecision::Place => (self, false),
                BreakDecision::NewPage => (self.next_page(geometry), true),
            };
        let y = state.cursor;
        let after = Self {
            cursor: y + geometry.row_height,
            rows_on_page: state.rows_on_page + 1,
            ..state
        };
        (after, y, broke)
    }
}

/// A row's position on its page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedRow {
    /// Index of the row in the whole report.
    pub index: usize,
    pub y: f64,
    pub band: Band,
}

/// The rows assigned to one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePlan {
    pub number: usize,
    /// Position in the input slice of this page's first row.
    pub start: usize,
    pub rows: Vec<PlacedRow>,
}

impl PagePlan {
    fn new(number: usize, start: usize) -> Self {
        Self {
            number,
            start,
            rows: Vec::new(),
        }
    }
}

/// Assign every row to a page, in order, without any row crossing the
/// row limit.
pub fn paginate(rows: &[ReportRow], geometry: &PageGeometry) -> Result<Vec<PagePlan>> {
    geometry.validate()?;

    let (_, plans) = rows.iter().enumerate().fold(
        (PaginationState::first(geometry), vec![PagePlan::new(1, 0)]),
        |(state, mut plans), (position, row)| {
            let (state, y, broke) = state.place(geometry);
            if broke {
                debug!("row {} opens page {}", row.index, state.page);
                plans.push(PagePlan::new(state.page, position));
            }
            if let Some(plan) = plans.last_mut() {
                plan.rows.push(PlacedRow {
                    index: row.index,
                    y,
                    band: Band::for_index(row.index),
                });
            }
            (state, plans)
        },
    );

    Ok(plans)
}

/// The fixed rows-per-page guess: rows that fit on a continuation page.
pub fn estimated_page_count(row_count: usize, geometry: &PageGeometry) -> usize {
    let per_page = rows_that_fit(geometry.usable_span(2), geometry.row_height);
    estimate_page_count(row_count, per_page)
}

/// A fully laid-out page ready for PDF serialization.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    /// 1-based page number.
    pub number: usize,
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
    /// The data rows drawn on this page, in order.
    pub rows: Vec<PlacedRow>,
}

/// A positioned drawing primitive.
#[derive(Debug, Clone)]
pub struct LayoutElement {
    /// Top-left corner. For text, `y` is the baseline.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
}

/// What to actually draw for an element.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// A filled rectangle.
    Rect { fill: Color },
    /// A single line of text starting at the element's x/baseline.
    Text {
        content: String,
        font: StandardFont,
        size: f64,
        color: Color,
    },
    /// A stroked segment from the element's origin to (x2, y2).
    Line {
        x2: f64,
        y2: f64,
        width: f64,
        color: Color,
    },
    /// A bitmap scaled into the element's box.
    Image { image: LoadedImage },
}

impl LayoutElement {
    pub fn rect(x: f64, y: f64, width: f64, height: f64, fill: Color) -> Self {
        Self {
            x,
            y,
            width,
            height,
            draw: DrawCommand::Rect { fill },
        }
    }

    pub fn text(
        x: f64,
        baseline: f64,
        content: String,
        font: StandardFont,
        size: f64,
        color: Color,
    ) -> Self {
        let width = font.text_width(&content, size);
        Self {
            x,
            y: baseline,
            width,
            height: size,
            draw: DrawCommand::Text {
                content,
                font,
                size,
                color,
            },
        }
    }

    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64, width: f64, color: Color) -> Self {
        Self {
            x: x1,
            y: y1,
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
            draw: DrawCommand::Line {
                x2,
                y2,
                width,
                color,
            },
        }
    }
}

/// The layout engine: fixed geometry and theme for one report type.
pub struct LayoutEngine {
    geometry: PageGeometry,
    theme: Theme,
}

impl LayoutEngine {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            geometry: config.geometry,
            theme: config.theme.clone(),
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Lay out a report into pages.
    pub fn layout(&self, report: &Report) -> Result<Vec<LayoutPage>> {
        let geometry = &self.geometry;
        geometry.validate()?;
        self.theme.validate()?;
        let widths = columns::resolve_column_widths(&report.columns, geometry.content_width())?;

        if let Some(bad) = report.rows.iter().find(|r| r.cells.len() != widths.len()) {
            return Err(ReportError::Configuration(format!(
                "row {} has {} cells but the table has {} columns",
                bad.index,
                bad.cells.len(),
                widths.len()
            )));
        }

        let plans = paginate(&report.rows, geometry)?;
        let total = plans.len();

        let estimate = estimated_page_count(report.rows.len(), geometry);
        if estimate != total {
            debug!(
                "page estimate {} differs from actual {} for '{}'",
                estimate, total, report.metadata.title
            );
        }

        let pages = plans
            .into_iter()
            .map(|plan| self.draw_page(report, &widths, plan, total))
            .collect();
        Ok(pages)
    }

    fn draw_page(
        &self,
        report: &Report,
        widths: &[f64],
        plan: PagePlan,
        total: usize,
    ) -> LayoutPage {
        let geometry = &self.geometry;
        let theme = &self.theme;
        let mut elements = Vec::new();

        elements.extend(header::draw_title(&report.metadata.title, geometry, theme));

        if plan.number == 1 {
            if let Some(chart) = &report.chart {
                elements.extend(self.draw_chart(chart));
            }
        }

        elements.extend(row::draw_table_header(
            &report.columns,
            widths,
            geometry.table_top(plan.number),
            geometry,
            theme,
        ));

        let data = &report.rows[plan.start..plan.start + plan.rows.len()];
        for (row, placed) in data.iter().zip(&plan.rows) {
            elements.extend(row::draw_row(row, placed, widths, geometry, theme));
        }

        elements.extend(header::draw_footer(
            &report.metadata,
            plan.number,
            total,
            geometry,
            theme,
        ));

        LayoutPage {
            number: plan.number,
            width: geometry.width,
            height: geometry.height,
            elements,
            rows: plan.rows,
        }
    }

    /// Fit the chart into the first-page lead area, centred, keeping its
    /// aspect ratio.
    fn draw_chart(&self, chart: &LoadedImage) -> Option<LayoutElement> {
        let g = &self.geometry;
        if g.first_page_lead <= 0.0 {
            log::warn!("chart supplied but the first page reserves no space for it; skipping");
            return None;
        }
        let box_w = g.content_width();
        let box_h = g.first_page_lead;
        let ratio = chart.aspect_ratio();
        let (w, h) = if box_w / box_h > ratio {
            (box_h * ratio, box_h)
        } else {
            (box_w, box_w / ratio)
        };
        Some(LayoutElement {
            x: g.margin + (box_w - w) / 2.0,
            y: g.margin + g.title_height + (box_h - h) / 2.0,
            width: w,
            height: h,
            draw: DrawCommand::Image {
                image: chart.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<ReportRow> {
        (0..n)
            .map(|i| ReportRow::from_cells(i, vec![format!("Week {}", i + 1), i.to_string()]))
            .collect()
    }

    /// 792pt page, 40pt margin, 20pt footer: rows end at 732.
    /// Page 1 rows start at 170 (60pt lead), later pages at 110.
    fn scenario_geometry() -> PageGeometry {
        PageGeometry {
            width: 612.0,
            height: 792.0,
            margin: 40.0,
            row_height: 30.0,
            title_height: 40.0,
            table_header_height: 30.0,
            footer_reserve: 20.0,
            first_page_lead: 60.0,
        }
    }

    #[test]
    fn state_threads_cursor_and_counter() {
        let g = scenario_geometry();
        let s = PaginationState::first(&g);
        assert_eq!(s.cursor, 170.0);
        let (s, y, broke) = s.place(&g);
        assert_eq!((y, broke), (170.0, false));
        assert_eq!((s.cursor, s.rows_on_page, s.page), (200.0, 1, 1));
    }

    #[test]
    fn break_resets_cursor_and_counter_but_not_page() {
        let g = scenario_geometry();
        let full = PaginationState {
            page: 1,
            cursor: 710.0,
            rows_on_page: 18,
        };
        let (s, y, broke) = full.place(&g);
        assert!(broke);
        assert_eq!(y, 110.0);
        assert_eq!((s.page, s.rows_on_page, s.cursor), (2, 1, 140.0));
    }

    #[test]
    fn forty_five_rows_take_three_pages() {
        let plans = paginate(&rows(45), &scenario_geometry()).unwrap();
        let counts: Vec<usize> = plans.iter().map(|p| p.rows.len()).collect();
        assert_eq!(counts, vec![18, 20, 7]);
        assert_eq!(plans[0].rows[0].band, Band::Even);
        assert_eq!(plans[2].rows.last().unwrap().index, 44);
        assert_eq!(plans[2].rows.last().unwrap().band, Band::Even);
    }

    #[test]
    fn empty_input_gets_one_page() {
        let plans = paginate(&[], &scenario_geometry()).unwrap();
        assert_eq!(plans.len(), 1);
        assert!(plans[0].rows.is_empty());
    }

    #[test]
    fn exact_fill_has_no_trailing_page() {
        let plans = paginate(&rows(18), &scenario_geometry()).unwrap();
        assert_eq!(plans.len(), 1);
        let plans = paginate(&rows(19), &scenario_geometry()).unwrap();
        assert_eq!(plans.len(), 2);
    }

    #[test]
    fn first_page_too_short_for_a_row_moves_rows_to_page_two() {
        let g = PageGeometry {
            first_page_lead: 610.0,
            ..PageGeometry::default()
        };
        let plans = paginate(&rows(5), &g).unwrap();
        let shape: Vec<(usize, usize)> = plans.iter().map(|p| (p.number, p.rows.len())).collect();
        assert_eq!(shape, vec![(1, 0), (2, 5)]);
        assert_eq!(plans[1].start, 0);
        assert_eq!(plans[1].rows[0].band, Band::Even);
    }

    #[test]
    fn degenerate_geometry_is_refused() {
        let g = PageGeometry {
            row_height: 650.0,
            ..scenario_geometry()
        };
        assert!(matches!(
            paginate(&rows(3), &g),
            Err(ReportError::Configuration(_))
        ));
    }

    #[test]
    fn estimate_ignores_first_page_lead() {
        // 20 rows per continuation page: 38 rows estimate 2 pages, need 2 (18 + 20).
        // 39 rows estimate 2 pages but need 3.
        let g = scenario_geometry();
        assert_eq!(estimated_page_count(39, &g), 2);
        assert_eq!(paginate(&rows(39), &g).unwrap().len(), 3);
    }

    #[test]
    fn baseline_centres_caps() {
        let b = baseline_in_band(100.0, 20.0, 10.0);
        assert!((b - 113.59).abs() < 1e-9);
    }
}
