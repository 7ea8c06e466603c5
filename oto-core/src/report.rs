// Report serialization and summaries

use crate::discover::ScriptLog;
use crate::record::{ExtractionRecord, FailureKind, Report};
use oto_scanner::Category;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Error marshalling results to JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Error writing results to file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Pretty JSON array of records, two-space indented.
pub fn render_records(records: &[ExtractionRecord]) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Pretty JSON object of seed -> scripts, keys sorted.
pub fn render_script_log(log: &ScriptLog) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(log)?)
}

pub fn write_file(path: &Path, contents: &str) -> Result<(), ReportError> {
    fs::write(path, contents).map_err(|source| ReportError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Plain-text summary of a finished report
pub fn generate_summary(report: &Report, targets: usize) -> String {
    let mut summary = String::new();
    summary.push_str("# Summary:\n");
    summary.push_str(&format!("  Targets in work set: {}\n", targets));
    summary.push_str(&format!("  Records: {}\n", report.records.len()));

    for kind in [FailureKind::Invalid, FailureKind::FetchFailed, FailureKind::ReadFailed] {
        let count = report.failure_count(kind);
        if count > 0 {
            summary.push_str(&format!("  Dropped ({}): {}\n", kind, count));
        }
    }

    for category in Category::REPORTABLE {
        let total: usize = report.records.iter().map(|r| r.get(category).len()).sum();
        if total > 0 {
            summary.push_str(&format!("  {} findings: {}\n", category, total));
        }
    }

    summary
}
