//! Integration tests for the report pipeline.
//!
//! These tests exercise the full path from records to PDF output.
//! They verify:
//! - Every row lands on exactly one page, in order
//! - No row crosses the bottom of the printable area
//! - Page numbering and "Page N of M" use the real page count
//! - Banding follows the report-wide row index
//! - PDF output is structurally valid
//! - Files are written where the assembler says, and failures surface

use chrono::NaiveDate;

use salesprint::config::ReportConfig;
use salesprint::layout::{DrawCommand, LayoutEngine, LayoutPage};
use salesprint::model::*;
use salesprint::records::*;
use salesprint::style::{Band, Theme};
use salesprint::{ReportAssembler, ReportError, ReportMeta};

// ─── Helpers ────────────────────────────────────────────────────

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

fn weekly(n: usize) -> Vec<WeeklySales> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    (0..n)
        .map(|i| WeeklySales {
            week: start + chrono::Duration::weeks(i as i64),
            sales: 100 + i as i64 * 7,
        })
        .collect()
}

/// 792pt page, 40pt margin, 20pt footer reserve, 30pt rows.
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

fn config_with(geometry: PageGeometry) -> ReportConfig {
    ReportConfig {
        geometry,
        theme: Theme::default(),
        chart_height: 300.0,
    }
}

fn report_of(records: &[WeeklySales]) -> Report {
    Report {
        metadata: Metadata {
            title: "Weekly Sales Report".to_string(),
            author: "Course Admin".to_string(),
            created_on: date(),
            subject: None,
        },
        columns: WeeklySales::columns(),
        rows: rows_from_records(records),
        chart: None,
    }
}

fn layout(records: &[WeeklySales], geometry: PageGeometry) -> Vec<LayoutPage> {
    LayoutEngine::new(&config_with(geometry))
        .layout(&report_of(records))
        .unwrap()
}

fn texts(page: &LayoutPage) -> Vec<&str> {
    page.elements
        .iter()
        .filter_map(|e| match &e.draw {
            DrawCommand::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
        .collect()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(bytes.windows(5).any(|w| w == b"%%EOF"), "Missing %%EOF marker");
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(bytes.windows(7).any(|w| w == b"trailer"), "Missing trailer");
}

fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(8, 4, image::Rgba([40, 90, 200, 255]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageOutputFormat::Png)
        .unwrap();
    out
}

// ─── Pagination Properties ──────────────────────────────────────

#[test]
fn test_every_row_appears_once_in_order() {
    for n in [0, 1, 17, 18, 19, 38, 45, 120] {
        let pages = layout(&weekly(n), scenario_geometry());
        let indices: Vec<usize> = pages
            .iter()
            .flat_map(|p| p.rows.iter().map(|r| r.index))
            .collect();
        assert_eq!(indices, (0..n).collect::<Vec<_>>(), "n = {}", n);
    }
}

#[test]
fn test_no_row_crosses_bottom_margin() {
    let g = scenario_geometry();
    for page in layout(&weekly(120), g) {
        for row in &page.rows {
            assert!(row.y + g.row_height <= g.height - g.margin);
            assert!(row.y + g.row_height <= g.row_limit() + 1e-9);
        }
    }
}

#[test]
fn test_pages_are_numbered_consecutively() {
    let pages = layout(&weekly(120), scenario_geometry());
    let numbers: Vec<usize> = pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, (1..=pages.len()).collect::<Vec<_>>());
}

#[test]
fn test_page_total_matches_achieved_rows_per_page() {
    let g = scenario_geometry();
    let pages = layout(&weekly(120), g);
    let first = pages[0].rows.len();
    let per_page = pages[1].rows.len();
    let rest = 120 - first;
    assert_eq!(pages.len(), 1 + rest.div_ceil(per_page));
    for page in &pages[1..pages.len() - 1] {
        assert_eq!(page.rows.len(), per_page);
    }
}

#[test]
fn test_empty_report_has_one_page_with_headers() {
    let pages = layout(&[], scenario_geometry());
    assert_eq!(pages.len(), 1);
    assert!(pages[0].rows.is_empty());

    let labels = texts(&pages[0]);
    assert!(labels.contains(&"Weekly Sales Report"));
    assert!(labels.contains(&"Week"));
    assert!(labels.contains(&"Sales"));
    assert!(labels.contains(&"Page 1 of 1"));

    // Only the table header band is filled: no data row bands.
    let rects = pages[0]
        .elements
        .iter()
        .filter(|e| matches!(e.draw, DrawCommand::Rect { .. }))
        .count();
    assert_eq!(rects, 1);
}

#[test]
fn test_banding_follows_global_index() {
    let theme = Theme::default();
    let pages = layout(&weekly(45), scenario_geometry());
    for page in &pages {
        for row in &page.rows {
            assert_eq!(row.band, Band::for_index(row.index));
        }
    }
    // Page 2 starts at row 18, an even row, even though it is the first on its page.
    assert_eq!(pages[1].rows[0].index, 18);
    assert_eq!(pages[1].rows[0].band, Band::Even);

    // The drawn band colour matches too.
    let fills: Vec<_> = pages[1]
        .elements
        .iter()
        .filter_map(|e| match e.draw {
            DrawCommand::Rect { fill } if e.height == 30.0 && e.y >= 110.0 => Some(fill),
            _ => None,
        })
        .collect();
    assert_eq!(fills[0], theme.even_fill);
    assert_eq!(fills[1], theme.odd_fill);
}

// ─── Scenarios ──────────────────────────────────────────────────

#[test]
fn test_forty_five_rows_make_three_pages() {
    let pages = layout(&weekly(45), scenario_geometry());
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0].rows[0].band, Band::Even);
    let last = pages[2].rows.last().unwrap();
    assert_eq!(last.index, 44);
    assert_eq!(last.band, Band::Even);
}

#[test]
fn test_exactly_full_first_page_has_no_blank_follower() {
    let g = scenario_geometry();
    let capacity = ((g.usable_span(1)) / g.row_height).floor() as usize;
    let pages = layout(&weekly(capacity), g);
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].rows.len(), capacity);
}

#[test]
fn test_footer_uses_actual_total_not_estimate() {
    // 39 rows: a fixed 20-per-page estimate says 2 pages; the 60pt lead
    // on page 1 pushes the layout to 3.
    let pages = layout(&weekly(39), scenario_geometry());
    assert_eq!(pages.len(), 3);
    for page in &pages {
        let marker = format!("Page {} of 3", page.number);
        assert!(texts(page).contains(&marker.as_str()));
    }
}

#[test]
fn test_table_header_repeats_on_every_page() {
    let g = scenario_geometry();
    for page in layout(&weekly(60), g) {
        let labels = texts(&page);
        assert!(labels.contains(&"Week"), "page {}", page.number);
        assert!(labels.contains(&"Weekly Sales Report"), "page {}", page.number);
        let header_band = page
            .elements
            .iter()
            .find(|e| matches!(e.draw, DrawCommand::Rect { .. }))
            .unwrap();
        assert_eq!(header_band.y, g.table_top(page.number));
    }
}

#[test]
fn test_lead_that_leaves_no_room_on_first_page() {
    // Page 1 rows would start at 714 with the row limit at 728: no 24pt row fits.
    let g = PageGeometry {
        first_page_lead: 610.0,
        ..PageGeometry::default()
    };
    assert!(g.usable_span(1) >= 0.0 && g.usable_span(1) < g.row_height);

    let pages = layout(&weekly(5), g);
    assert_eq!(pages.len(), 2);

    assert!(pages[0].rows.is_empty());
    let first = texts(&pages[0]);
    assert!(first.contains(&"Week"));
    assert!(first.contains(&"Page 1 of 2"));

    let second: Vec<usize> = pages[1].rows.iter().map(|r| r.index).collect();
    assert_eq!(second, vec![0, 1, 2, 3, 4]);
    assert_eq!(pages[1].rows[0].band, Band::Even);
    assert_eq!(pages[1].rows[0].y, g.rows_top(2));
    assert!(texts(&pages[1]).contains(&"Page 2 of 2"));
}

// ─── Errors ─────────────────────────────────────────────────────

#[test]
fn test_row_taller_than_page_is_rejected() {
    let g = PageGeometry {
        row_height: 700.0,
        ..scenario_geometry()
    };
    let err = LayoutEngine::new(&config_with(g))
        .layout(&report_of(&weekly(3)))
        .unwrap_err();
    assert!(matches!(err, ReportError::Configuration(_)));
}

#[test]
fn test_row_with_wrong_cell_count_is_rejected() {
    let mut report = report_of(&weekly(2));
    report.rows[1].cells.push("extra".to_string());
    let err = LayoutEngine::new(&config_with(scenario_geometry()))
        .layout(&report)
        .unwrap_err();
    assert!(err.to_string().contains("row 1 has 3 cells"));
}

#[test]
fn test_unusable_theme_is_rejected_before_drawing() {
    let mut config = config_with(scenario_geometry());
    config.theme.body_size = f64::NAN;
    let err = salesprint::render(&report_of(&weekly(3)), &config).unwrap_err();
    assert!(matches!(err, ReportError::Configuration(_)));
}

// ─── PDF Output ─────────────────────────────────────────────────

#[test]
fn test_render_produces_valid_multi_page_pdf() {
    let bytes = salesprint::render(
        &report_of(&weekly(45)),
        &config_with(scenario_geometry()),
    )
    .unwrap();
    assert_valid_pdf(&bytes);
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Count 3"));
    assert!(text.contains("/MediaBox [0 0 612.00 792.00]"));
    assert!(text.contains("/Title (Weekly Sales Report)"));
}

#[test]
fn test_every_report_kind_renders() {
    let d = date();
    let assembler = ReportAssembler::new(ReportConfig::default());
    let meta = |kind| ReportMeta::for_kind(kind, "Admin").with_date(d);

    let outputs = vec![
        assembler.assemble(&weekly(5), &meta(ReportKind::WeeklySales)),
        assembler.assemble(
            &[MonthlySales { month: d, sales: 12 }],
            &meta(ReportKind::MonthlySales),
        ),
        assembler.assemble(
            &[DailySales { date: d, quantity: 3 }],
            &meta(ReportKind::DailySales),
        ),
        assembler.assemble(
            &[MonthlySalesRange { month: d, min: 1, max: 9 }],
            &meta(ReportKind::MonthlyRange),
        ),
        assembler.assemble(
            &[WeeklySalesRange { week: d, min: 2, max: 8 }],
            &meta(ReportKind::WeeklyRange),
        ),
        assembler.assemble(
            &[Earnings { month: d, gross: 1000.0, net: 640.25 }],
            &meta(ReportKind::Earnings),
        ),
    ];
    for bytes in outputs {
        assert_valid_pdf(&bytes.unwrap());
    }
}

// ─── Assembler ──────────────────────────────────────────────────

#[test]
fn test_assembler_writes_named_file() {
    let dir = tempfile::tempdir().unwrap();
    let assembler = ReportAssembler::new(ReportConfig::default()).with_output_dir(dir.path());
    let meta = ReportMeta::for_kind(ReportKind::WeeklySales, "Admin").with_date(date());

    let path = assembler.write(&weekly(30), &meta).unwrap();
    assert_eq!(path, dir.path().join("Weekly_Sales_Report.pdf"));
    assert_valid_pdf(&std::fs::read(&path).unwrap());
}

#[test]
fn test_unwritable_directory_is_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let assembler =
        ReportAssembler::new(ReportConfig::default()).with_output_dir(blocker.join("reports"));
    let meta = ReportMeta::for_kind(ReportKind::DailySales, "Admin");
    let err = assembler.write::<DailySales>(&[], &meta).unwrap_err();
    assert!(matches!(err, ReportError::WriteFailure { .. }));
}

#[test]
fn test_bad_geometry_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ReportConfig::default();
    config.geometry.row_height = 1000.0;
    let assembler = ReportAssembler::new(config).with_output_dir(dir.path());
    let meta = ReportMeta::for_kind(ReportKind::WeeklySales, "Admin");

    assert!(assembler.write(&weekly(3), &meta).is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_chart_reserves_first_page_space() {
    let chart = salesprint::image_loader::decode_image_bytes(&tiny_png()).unwrap();
    let assembler = ReportAssembler::new(ReportConfig::default());
    let meta = ReportMeta::for_kind(ReportKind::MonthlySales, "Admin")
        .with_date(date())
        .with_chart(chart);
    let report = assembler.build_report(&weekly(40), &meta);

    let with_chart = assembler.layout_engine(true).layout(&report).unwrap();
    let without_chart = assembler.layout_engine(false).layout(&report).unwrap();
    assert!(with_chart[0].rows.len() < without_chart[0].rows.len());

    let image = with_chart[0]
        .elements
        .iter()
        .find(|e| matches!(e.draw, DrawCommand::Image { .. }))
        .expect("chart drawn on page 1");
    let engine = assembler.layout_engine(true);
    let g = *engine.geometry();
    assert!(image.y >= g.margin + g.title_height);
    assert!(image.y + image.height <= g.table_top(1) + 1e-9);
    assert!(with_chart[1..]
        .iter()
        .all(|p| p.elements.iter().all(|e| !matches!(e.draw, DrawCommand::Image { .. }))));

    let bytes = assembler.assemble(&weekly(40), &meta).unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("/Subtype /Image"));
}

#[test]
fn test_missing_records_file_renders_empty_report() {
    let records: Vec<WeeklySales> = load_records(std::path::Path::new("/missing/weekly.json"));
    let assembler = ReportAssembler::new(ReportConfig::default());
    let meta = ReportMeta::for_kind(ReportKind::WeeklySales, "Admin");
    let bytes = assembler.assemble(&records, &meta).unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("/Count 1"));
}

#[test]
fn test_render_records_matches_assembler() {
    let meta = ReportMeta::for_kind(ReportKind::WeeklySales, "Admin").with_date(date());
    let config = config_with(scenario_geometry());
    let bytes = salesprint::render_records(&weekly(45), &meta, &config).unwrap();
    assert_valid_pdf(&bytes);
    assert!(String::from_utf8_lossy(&bytes).contains("/Count 3"));
}
