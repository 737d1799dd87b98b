use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::report::{Report, ReportKind, ReportRow};

#[derive(Serialize)]
struct JsonReport<'a> {
    kind: ReportKind,
    generated_at: DateTime<Utc>,
    headers: Vec<String>,
    rows: &'a [ReportRow],
}

/// Render a report as JSON.
pub fn render(report: &Report) -> Result<String> {
    let json = JsonReport {
        kind: report.kind,
        generated_at: Utc::now(),
        headers: report.headers(),
        rows: &report.rows,
    };
    Ok(serde_json::to_string_pretty(&json)?)
}
