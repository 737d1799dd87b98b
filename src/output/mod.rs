pub mod console;
pub mod csv;
pub mod json;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaggerError};
use crate::report::Report;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "table" | "text" => Some(Self::Console),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render a report into the specified format.
pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(report)),
        OutputFormat::Csv => Ok(csv::render(report)),
        OutputFormat::Json => json::render(report),
    }
}

/// Write rendered output to `path`, mapping failures to an output error.
pub fn write_to(path: &Path, rendered: &str) -> Result<()> {
    std::fs::write(path, rendered).map_err(|source| TaggerError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
