//! Output module for evaluation reports
//!
//! This module handles:
//! - Writing the CSV and JSON page reports
//! - Summarizing composite scores across pages

mod csv_report;
mod json_report;
pub mod stats;
mod traits;

pub use csv_report::{write_csv, CsvReport};
pub use json_report::{render_json, write_json, JsonReport};
pub use stats::{classification_counts, print_summary, summarize, write_summary, ScoreSummary};
pub use traits::{OutputError, OutputResult, ReportWriter};

use crate::pipeline::EvaluationResult;
use std::path::Path;

/// Writes `report.csv`, `report.json` and `summary.json` into `directory`
///
/// # Returns
///
/// * `Ok(ScoreSummary)` - The summary that was written
/// * `Err(OutputError)` - A report could not be written
pub fn write_reports(results: &[EvaluationResult], directory: &Path) -> OutputResult<ScoreSummary> {
    std::fs::create_dir_all(directory)?;

    let writers: [&dyn ReportWriter; 2] = [&CsvReport, &JsonReport];
    for writer in writers {
        writer.write_to_dir(results, directory)?;
        tracing::info!("Wrote {}", directory.join(writer.file_name()).display());
    }

    let summary = summarize(results);
    write_summary(&summary, &directory.join("summary.json"))?;
    Ok(summary)
}
