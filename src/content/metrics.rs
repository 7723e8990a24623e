//! Content metrics used by scoring
//!
//! Counts words, numbers, actuarial vocabulary and regulatory citations in a
//! page's text, and detects formulas, tables and lists.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Actuarial vocabulary, matched as lowercase substrings
pub const ACTUARIAL_TERMS: &[&str] = &[
    "solvency",
    "solvency ii",
    "ivass",
    "eiopa",
    "riserva",
    "best estimate",
    "premio",
    "longevità",
    "mortalità",
    "stress test",
    "discount rate",
    "risk margin",
    "scr",
    "bscr",
    "premio puro",
    "var",
    "value at risk",
    "tasso tecnico",
    "attuario",
    "riserva matematica",
];

/// How many numbers are kept in [`PageMetrics::example_values`]
const MAX_EXAMPLE_VALUES: usize = 20;

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w+\b").expect("Invalid word regex pattern"));

static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(?:[.,]\d+)?\b").expect("Invalid number regex pattern"));

static FORMULA_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\\begin\{equation\}",
        r"(?s)\\\[(.*?)\\\]",
        r"[=\u{2260}\u{2264}\u{2265}]",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid formula regex pattern"))
    .collect()
});

static CITATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(?:ivass|eiopa|isvap|solvency\s*ii|european insurance)\b",
        r"(?i)\bregolament[oi]|circolare|normativa\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid citation regex pattern"))
    .collect()
});

/// Metrics extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageMetrics {
    pub word_count: usize,

    /// Occurrences of each vocabulary term present in the text
    pub actuarial_terms: BTreeMap<String, usize>,
    pub numeric_tokens: usize,
    pub has_formula: bool,
    pub has_table: bool,
    pub has_list: bool,

    /// Matches of the regulatory citation patterns
    pub citation_matches: usize,

    /// The first numbers of the text, with `,` read as a decimal point
    pub example_values: Vec<f64>,
}

impl PageMetrics {
    /// Renders the vocabulary counts as `term:count; term:count`
    pub fn terms_summary(&self) -> String {
        self.actuarial_terms
            .iter()
            .map(|(term, count)| format!("{}:{}", term, count))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Extracts metrics from a page's text and its raw HTML
pub fn extract_metrics(parsed_text: &str, html: &str) -> PageMetrics {
    let lower_text = parsed_text.to_lowercase();
    let word_count = WORD_PATTERN.find_iter(&lower_text).count();

    let actuarial_terms = ACTUARIAL_TERMS
        .iter()
        .filter_map(|term| {
            let count = lower_text.matches(term).count();
            (count > 0).then(|| (term.to_string(), count))
        })
        .collect();

    let numbers: Vec<&str> = NUMBER_PATTERN
        .find_iter(parsed_text)
        .map(|m| m.as_str())
        .collect();
    let example_values = numbers
        .iter()
        .take(MAX_EXAMPLE_VALUES)
        .filter_map(|token| token.replace(',', ".").parse::<f64>().ok())
        .collect();

    let has_formula = FORMULA_PATTERNS
        .iter()
        .any(|pattern| pattern.is_match(parsed_text));

    let lower_html = html.to_lowercase();
    let has_table = lower_html.contains("<table");
    let has_list = lower_html.contains("<ul") || lower_html.contains("<ol");

    let citation_matches = CITATION_PATTERNS
        .iter()
        .map(|pattern| pattern.find_iter(parsed_text).count())
        .sum();

    PageMetrics {
        word_count,
        actuarial_terms,
        numeric_tokens: numbers.len(),
        has_formula,
        has_table,
        has_list,
        citation_matches,
        example_values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_and_number_counts() {
        let metrics = extract_metrics("Il tasso è 3,5 per cento nel 2024.", "");
        assert_eq!(metrics.word_count, 9);
        assert_eq!(metrics.numeric_tokens, 2);
        assert_eq!(metrics.example_values, vec![3.5, 2024.0]);
    }

    #[test]
    fn test_example_values_capped() {
        let text = (1..=30).map(|n| n.to_string()).collect::<Vec<_>>().join(" ");
        let metrics = extract_metrics(&text, "");
        assert_eq!(metrics.numeric_tokens, 30);
        assert_eq!(metrics.example_values.len(), 20);
        assert_eq!(metrics.example_values[19], 20.0);
    }

    #[test]
    fn test_actuarial_terms() {
        let metrics = extract_metrics(
            "La Riserva matematica e la riserva premi. Requisito SCR secondo Solvency II.",
            "",
        );
        assert_eq!(metrics.actuarial_terms.get("riserva"), Some(&2));
        assert_eq!(metrics.actuarial_terms.get("riserva matematica"), Some(&1));
        assert_eq!(metrics.actuarial_terms.get("solvency ii"), Some(&1));
        assert_eq!(metrics.actuarial_terms.get("solvency"), Some(&1));
        assert_eq!(metrics.actuarial_terms.get("scr"), Some(&1));
        assert_eq!(metrics.actuarial_terms.get("eiopa"), None);
    }

    #[test]
    fn test_terms_summary_sorted() {
        let metrics = extract_metrics("premio attuario premio", "");
        assert_eq!(metrics.terms_summary(), "attuario:1; premio:2");
    }

    #[test]
    fn test_formula_detection() {
        assert!(extract_metrics("BEL = somma dei flussi", "").has_formula);
        assert!(extract_metrics(r"\begin{equation} x \end{equation}", "").has_formula);
        assert!(extract_metrics(r"\[ a + b \]", "").has_formula);
        assert!(extract_metrics("x ≤ y", "").has_formula);
        assert!(!extract_metrics("nessuna formula qui", "").has_formula);
    }

    #[test]
    fn test_structure_detection() {
        let metrics = extract_metrics("", "<TABLE><tr><td>1</td></tr></TABLE><ol><li>a</li></ol>");
        assert!(metrics.has_table);
        assert!(metrics.has_list);

        let metrics = extract_metrics("", "<p>plain</p>");
        assert!(!metrics.has_table);
        assert!(!metrics.has_list);
    }

    #[test]
    fn test_citation_matches() {
        let metrics = extract_metrics(
            "Secondo IVASS e EIOPA, il Regolamento 38 e la circolare applicano Solvency II.",
            "",
        );
        // ivass, eiopa, solvency ii + regolamento, circolare
        assert_eq!(metrics.citation_matches, 5);
    }

    #[test]
    fn test_empty_text() {
        let metrics = extract_metrics("", "");
        assert_eq!(metrics, PageMetrics::default());
    }
}
