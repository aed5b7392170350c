//! # Sales Records
//!
//! The flat, fixed-field records the reports are built from, and how each
//! one is formatted into a table row. Every record type knows its own
//! columns; the layout engine only ever sees the resulting strings.
//!
//! Record files are JSON arrays with ISO dates:
//!
//! ```json
//! [ { "week": "2024-01-07", "sales": 120 } ]
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{CellValue, Column, ColumnSpec, ColumnWidth, ReportRow};

/// A record that can be drawn as one table row.
pub trait RecordFormat {
    /// The table columns for this record type.
    fn columns() -> ColumnSpec;

    /// Cell values in column order.
    fn values(&self) -> Vec<CellValue>;
}

/// Format records into rows, keeping their input order as the row index.
pub fn rows_from_records<R: RecordFormat>(records: &[R]) -> Vec<ReportRow> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| ReportRow::new(index, record.values()))
        .collect()
}

fn two_columns(first: &str, second: &str) -> ColumnSpec {
    ColumnSpec::new(vec![
        Column::new(first, ColumnWidth::Fraction(0.6)),
        Column::new(second, ColumnWidth::Fraction(0.4)),
    ])
}

fn range_columns(period: &str) -> ColumnSpec {
    ColumnSpec::new(vec![
        Column::new(period, ColumnWidth::Fraction(0.5)),
        Column::new("Min Sales", ColumnWidth::Auto),
        Column::new("Max Sales", ColumnWidth::Auto),
    ])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySales {
    pub week: NaiveDate,
    pub sales: i64,
}

impl RecordFormat for WeeklySales {
    fn columns() -> ColumnSpec {
        two_columns("Week", "Sales")
    }

    fn values(&self) -> Vec<CellValue> {
        vec![CellValue::Week(self.week), CellValue::Count(self.sales)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySales {
    pub month: NaiveDate,
    pub sales: i64,
}

impl RecordFormat for MonthlySales {
    fn columns() -> ColumnSpec {
        two_columns("Month", "Sales")
    }

    fn values(&self) -> Vec<CellValue> {
        vec![CellValue::Month(self.month), CellValue::Count(self.sales)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub quantity: i64,
}

impl RecordFormat for DailySales {
    fn columns() -> ColumnSpec {
        two_columns("Date", "Quantity")
    }

    fn values(&self) -> Vec<CellValue> {
        vec![CellValue::Day(self.date), CellValue::Count(self.quantity)]
    }
}

/// Lowest and highest sales within a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySalesRange {
    pub month: NaiveDate,
    pub min: i64,
    pub max: i64,
}

impl RecordFormat for MonthlySalesRange {
    fn columns() -> ColumnSpec {
        range_columns("Month")
    }

    fn values(&self) -> Vec<CellValue> {
        vec![
            CellValue::Month(self.month),
            CellValue::Count(self.min),
            CellValue::Count(self.max),
        ]
    }
}

/// Lowest and highest sales within a week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySalesRange {
    pub week: NaiveDate,
    pub min: i64,
    pub max: i64,
}

impl RecordFormat for WeeklySalesRange {
    fn columns() -> ColumnSpec {
        range_columns("Week")
    }

    fn values(&self) -> Vec<CellValue> {
        vec![
            CellValue::Week(self.week),
            CellValue::Count(self.min),
            CellValue::Count(self.max),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Earnings {
    pub month: NaiveDate,
    pub gross: f64,
    pub net: f64,
}

impl RecordFormat for Earnings {
    fn columns() -> ColumnSpec {
        ColumnSpec::new(vec![
            Column::new("Month", ColumnWidth::Fraction(0.4)),
            Column::new("Gross Earnings", ColumnWidth::Auto),
            Column::new("Net Earnings", ColumnWidth::Auto),
        ])
    }

    fn values(&self) -> Vec<CellValue> {
        vec![
            CellValue::Month(self.month),
            CellValue::Money(self.gross),
            CellValue::Money(self.net),
        ]
    }
}

/// The report variants, each tied to one record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    WeeklySales,
    MonthlySales,
    DailySales,
    MonthlyRange,
    WeeklyRange,
    Earnings,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        ReportKind::WeeklySales,
        ReportKind::MonthlySales,
        ReportKind::DailySales,
        ReportKind::MonthlyRange,
        ReportKind::WeeklyRange,
        ReportKind::Earnings,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::WeeklySales => "weekly-sales",
            ReportKind::MonthlySales => "monthly-sales",
            ReportKind::DailySales => "daily-sales",
            ReportKind::MonthlyRange => "monthly-range",
            ReportKind::WeeklyRange => "weekly-range",
            ReportKind::Earnings => "earnings",
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            ReportKind::WeeklySales => "Weekly Sales Report",
            ReportKind::MonthlySales => "Monthly Sales Report",
            ReportKind::DailySales => "Daily Sales Report",
            ReportKind::MonthlyRange => "Monthly Sales Range Report",
            ReportKind::WeeklyRange => "Weekly Sales Range Report",
            ReportKind::Earnings => "Earnings Report",
        }
    }

    /// File name (without extension) the report is saved under.
    pub fn file_stem(&self) -> String {
        self.default_title().replace(' ', "_")
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ReportKind::ALL
            .iter()
            .copied()
            .find(|k| k.slug() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = ReportKind::ALL.iter().map(|k| k.slug()).collect();
                format!("unknown report kind '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Parse a JSON array of records.
pub fn parse_records<T: DeserializeOwned>(json: &str) -> Result<Vec<T>> {
    Ok(serde_json::from_str(json)?)
}

/// Load records from a JSON file. A missing or undecodable file is logged
/// and treated as no data.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            warn!("cannot read records from {}: {}", path.display(), e);
            return Vec::new();
        }
    };
    parse_records(&json).unwrap_or_else(|e| {
        warn!("cannot decode records in {}: {}", path.display(), e);
        Vec::new()
    })
}
