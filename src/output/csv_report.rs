//! CSV report: one row per evaluated page

use crate::output::traits::{ensure_parent, OutputResult, ReportWriter};
use crate::pipeline::EvaluationResult;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    url: &'a str,
    title: &'a str,
    score: f64,
    classification: &'static str,
    accuracy: f64,
    transparency: f64,
    completeness: f64,
    freshness: f64,
    clarity: f64,
    word_count: usize,
    numeric_tokens: usize,
    has_formula: bool,
    has_table: bool,
    has_list: bool,
    citation_matches: usize,
    actuarial_terms: String,
}

impl<'a> From<&'a EvaluationResult> for CsvRow<'a> {
    fn from(result: &'a EvaluationResult) -> Self {
        let components = &result.score.components;
        Self {
            url: &result.page.url,
            title: &result.page.title,
            score: result.score.composite,
            classification: result.score.classification.as_str(),
            accuracy: components.accuracy,
            transparency: components.transparency,
            completeness: components.completeness,
            freshness: components.freshness,
            clarity: components.clarity,
            word_count: result.metrics.word_count,
            numeric_tokens: result.metrics.numeric_tokens,
            has_formula: result.metrics.has_formula,
            has_table: result.metrics.has_table,
            has_list: result.metrics.has_list,
            citation_matches: result.metrics.citation_matches,
            actuarial_terms: result.metrics.terms_summary(),
        }
    }
}

/// Writes `report.csv`
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReport;

impl ReportWriter for CsvReport {
    fn file_name(&self) -> &'static str {
        "report.csv"
    }

    fn write_report(&self, results: &[EvaluationResult], path: &Path) -> OutputResult<()> {
        write_csv(results, path)
    }
}

/// Writes the CSV report to `path`
pub fn write_csv(results: &[EvaluationResult], path: &Path) -> OutputResult<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for result in results {
        writer.serialize(CsvRow::from(result))?;
    }
    writer.flush()?;
    Ok(())
}
