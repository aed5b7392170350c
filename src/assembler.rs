//! # Document Assembler
//!
//! Owns the page setup for a report, runs the layout engine over formatted
//! records, and persists the PDF. Files land in a per-process temporary
//! directory by default, named after the report; the caller decides what
//! happens to them next.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::image_loader::LoadedImage;
use crate::layout::LayoutEngine;
use crate::model::{Metadata, Report};
use crate::records::{rows_from_records, RecordFormat, ReportKind};

/// Title, authorship and output name for one report run.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub title: String,
    pub author: String,
    pub created_on: NaiveDate,
    /// File name without extension.
    pub file_stem: String,
    pub chart: Option<LoadedImage>,
}

impl ReportMeta {
    /// Defaults for a report kind, dated today.
    pub fn for_kind(kind: ReportKind, author: impl Into<String>) -> Self {
        Self {
            title: kind.default_title().to_string(),
            author: author.into(),
            created_on: chrono::Local::now().date_naive(),
            file_stem: kind.file_stem(),
            chart: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_date(mut self, created_on: NaiveDate) -> Self {
        self.created_on = created_on;
        self
    }

    pub fn with_chart(mut self, chart: LoadedImage) -> Self {
        self.chart = Some(chart);
        self
    }
}

/// Builds and saves reports with one configuration.
pub struct ReportAssembler {
    config: ReportConfig,
    output_dir: PathBuf,
}

impl ReportAssembler {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            output_dir: default_output_dir(),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Format the records and lay them out into a [`Report`].
    pub fn build_report<R: RecordFormat>(&self, records: &[R], meta: &ReportMeta) -> Report {
        Report {
            metadata: Metadata {
                title: meta.title.clone(),
                author: meta.author.clone(),
                created_on: meta.created_on,
                subject: None,
            },
            columns: R::columns(),
            rows: rows_from_records(records),
            chart: meta.chart.clone(),
        }
    }

    /// The layout engine this assembler's reports run through. A chart
    /// reserves its area on the first page.
    pub fn layout_engine(&self, has_chart: bool) -> LayoutEngine {
        LayoutEngine::new(&self.config_for(has_chart))
    }

    fn config_for(&self, has_chart: bool) -> ReportConfig {
        let mut config = self.config.clone();
        config.geometry = self.config.geometry_for(has_chart);
        config
    }

    /// Render the records to PDF bytes.
    pub fn assemble<R: RecordFormat>(&self, records: &[R], meta: &ReportMeta) -> Result<Vec<u8>> {
        let report = self.build_report(records, meta);
        crate::render(&report, &self.config_for(report.chart.is_some()))
    }

    /// Render the records and write `<output_dir>/<file_stem>.pdf`.
    pub fn write<R: RecordFormat>(&self, records: &[R], meta: &ReportMeta) -> Result<PathBuf> {
        let bytes = self.assemble(records, meta)?;
        let path = self
            .output_dir
            .join(format!("{}.pdf", sanitize_file_stem(&meta.file_stem)));
        write_file(&path, &bytes)?;
        info!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

fn default_output_dir() -> PathBuf {
    std::env::temp_dir().join("salesprint")
}

/// Write bytes, creating the parent directory if needed.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let to_write_failure = |source| ReportError::WriteFailure {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_write_failure)?;
    }
    fs::write(path, bytes).map_err(to_write_failure)
}

/// Keep file names portable: letters, digits, `-`, `_` and `.` survive,
/// everything else becomes `_`.
pub fn sanitize_file_stem(stem: &str) -> String {
    let cleaned: String = stem
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(|c| c == '_' || c == '.').is_empty() {
        "report".to_string()
    } else {
        cleaned
    }
}
