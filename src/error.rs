//! Structured error types for report generation.
//!
//! Four variants cover the real error sources: bad geometry or columns,
//! failed file writes, unparseable JSON input, and unusable chart images.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// The unified error type returned by all public API functions.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Page geometry or column layout that cannot produce a valid document.
    /// Raised before any drawing begins.
    #[error("Invalid report configuration: {0}")]
    Configuration(String),

    /// The finished document could not be written to disk.
    #[error("Failed to write report to {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON input (records or configuration) failed to parse.
    #[error("Failed to parse input: {source}\n  Hint: {hint}")]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A chart image could not be read or decoded.
    #[error("Image error: {0}")]
    Image(String),
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters."
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected shape. Check field names, types and YYYY-MM-DD dates."
            }
            serde_json::error::Category::Eof => "Unexpected end of input. Is the JSON truncated?",
            serde_json::error::Category::Io => "The input could not be read.",
        };
        ReportError::Parse {
            source: e,
            hint: hint.to_string(),
        }
    }
}
