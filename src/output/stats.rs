//! Score statistics across evaluated pages

use crate::output::traits::{ensure_parent, OutputResult};
use crate::pipeline::EvaluationResult;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Summary of composite scores
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub count: usize,
    pub average: f64,
    pub minimum: f64,
    pub maximum: f64,
}

/// Computes count, mean, minimum and maximum of the composite scores
///
/// Values are rounded to two decimals; an empty input yields all zeros.
pub fn summarize(results: &[EvaluationResult]) -> ScoreSummary {
    let scores: Vec<f64> = results.iter().map(|r| r.score.composite).collect();
    if scores.is_empty() {
        return ScoreSummary::default();
    }

    let sum: f64 = scores.iter().sum();
    let minimum = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let maximum = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    ScoreSummary {
        count: scores.len(),
        average: round2(sum / scores.len() as f64),
        minimum: round2(minimum),
        maximum: round2(maximum),
    }
}

/// Number of pages in each quality class
pub fn classification_counts(results: &[EvaluationResult]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for result in results {
        *counts.entry(result.score.classification.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Writes the summary as pretty-printed JSON
pub fn write_summary(summary: &ScoreSummary, path: &Path) -> OutputResult<()> {
    ensure_parent(path)?;
    std::fs::write(path, serde_json::to_string_pretty(summary)?)?;
    Ok(())
}

/// Prints a human-readable summary to stdout
pub fn print_summary(summary: &ScoreSummary, results: &[EvaluationResult]) {
    println!("=== Evaluation Summary ===\n");
    println!("  Pages scored: {}", summary.count);
    println!("  Average score: {:.2}", summary.average);
    println!("  Minimum score: {:.2}", summary.minimum);
    println!("  Maximum score: {:.2}", summary.maximum);

    let counts = classification_counts(results);
    if !counts.is_empty() {
        println!();
        println!("By Classification:");
        for (class, count) in counts {
            println!("  {}: {}", class, count);
        }
    }
    println!();
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
