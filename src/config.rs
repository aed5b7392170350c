//! Report configuration: page geometry, theme, and the chart area height.
//! Loaded from JSON; every field is optional and falls back to the US
//! Letter defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::model::PageGeometry;
use crate::style::Theme;

/// Height reserved on the first page when a chart image is supplied.
pub const DEFAULT_CHART_HEIGHT: f64 = 300.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
    pub geometry: PageGeometry,
    pub theme: Theme,
    /// First-page lead used when a chart is embedded.
    pub chart_height: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            theme: Theme::default(),
            chart_height: DEFAULT_CHART_HEIGHT,
        }
    }
}

impl ReportConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ReportConfig = serde_json::from_str(json)?;
        config.geometry.validate()?;
        config.theme.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ReportError::Configuration(format!(
                "cannot read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// The geometry to lay out with, reserving the chart area on page 1
    /// when a chart will be drawn.
    pub fn geometry_for(&self, has_chart: bool) -> PageGeometry {
        let mut geometry = self.geometry;
        if has_chart && geometry.first_page_lead <= 0.0 {
            geometry.first_page_lead = self.chart_height;
        }
        geometry
    }
}
