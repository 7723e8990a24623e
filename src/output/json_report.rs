//! JSON report: page, metrics and score of every evaluated page

use crate::content::{PageMetadata, PageMetrics};
use crate::output::traits::{ensure_parent, OutputResult, ReportWriter};
use crate::pipeline::EvaluationResult;
use crate::scoring::PageScore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct JsonPage<'a> {
    url: &'a str,
    title: &'a str,
    metadata: &'a PageMetadata,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct JsonEntry<'a> {
    page: JsonPage<'a>,
    metrics: &'a PageMetrics,
    score: &'a PageScore,
}

impl<'a> From<&'a EvaluationResult> for JsonEntry<'a> {
    fn from(result: &'a EvaluationResult) -> Self {
        Self {
            page: JsonPage {
                url: &result.page.url,
                title: &result.page.title,
                metadata: &result.page.metadata,
                fetched_at: result.page.fetched_at,
            },
            metrics: &result.metrics,
            score: &result.score,
        }
    }
}

/// Writes `report.json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReport;

impl ReportWriter for JsonReport {
    fn file_name(&self) -> &'static str {
        "report.json"
    }

    fn write_report(&self, results: &[EvaluationResult], path: &Path) -> OutputResult<()> {
        write_json(results, path)
    }
}

/// Renders the JSON report as a pretty-printed string
pub fn render_json(results: &[EvaluationResult]) -> OutputResult<String> {
    let entries: Vec<JsonEntry<'_>> = results.iter().map(JsonEntry::from).collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

/// Writes the JSON report to `path`
pub fn write_json(results: &[EvaluationResult], path: &Path) -> OutputResult<()> {
    ensure_parent(path)?;
    std::fs::write(path, render_json(results)?)?;
    Ok(())
}
