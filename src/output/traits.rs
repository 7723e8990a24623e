//! Report writer trait and error types

use crate::pipeline::EvaluationResult;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing reports
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A report format written from evaluation results
pub trait ReportWriter {
    /// File name used inside the output directory
    fn file_name(&self) -> &'static str;

    /// Writes `results` to `path`, creating parent directories as needed
    ///
    /// # Arguments
    ///
    /// * `results` - The evaluated pages, in crawl order
    /// * `path` - Destination file
    fn write_report(&self, results: &[EvaluationResult], path: &Path) -> OutputResult<()>;

    /// Writes the report into `directory` under [`ReportWriter::file_name`]
    fn write_to_dir(&self, results: &[EvaluationResult], directory: &Path) -> OutputResult<()> {
        self.write_report(results, &directory.join(self.file_name()))
    }
}

/// Creates the parent directory of `path` if it is missing
pub(crate) fn ensure_parent(path: &Path) -> OutputResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
