//! Heuristic page scoring
//!
//! Five components, each on a 0-100 scale, are combined with normalized
//! weights into a composite score and a quality class.

use crate::content::{PageMetadata, PageMetrics};
use crate::scoring::{ScoreWeights, ScoringError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Age at which freshness reaches its floor
const FRESHNESS_DECAY_DAYS: f64 = 365.0;

/// Individual component scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreComponents {
    /// Presence and density of numbers and formulas
    pub accuracy: f64,

    /// Regulatory citations
    pub transparency: f64,

    /// Tables, lists and actuarial vocabulary
    pub completeness: f64,

    /// Age of the last modification or publication
    pub freshness: f64,

    /// Balance between prose and numbers
    pub clarity: f64,
}

impl ScoreComponents {
    /// Weighted sum of the components, using normalized `weights`
    pub fn weighted(&self, weights: &ScoreWeights) -> Result<f64, ScoringError> {
        let w = weights.normalize()?;
        Ok(self.accuracy * w.accuracy
            + self.transparency * w.transparency
            + self.completeness * w.completeness
            + self.freshness * w.freshness
            + self.clarity * w.clarity)
    }

    fn rounded(&self) -> Self {
        Self {
            accuracy: round2(self.accuracy),
            transparency: round2(self.transparency),
            completeness: round2(self.completeness),
            freshness: round2(self.freshness),
            clarity: round2(self.clarity),
        }
    }
}

/// Quality class of a composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Classification {
    /// 85 and above
    Eccellente,
    /// 70 to 85
    Buono,
    /// 50 to 70
    Discreto,
    /// Below 50
    #[serde(rename = "Criticità")]
    Criticita,
}

impl Classification {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Self::Eccellente
        } else if score >= 70.0 {
            Self::Buono
        } else if score >= 50.0 {
            Self::Discreto
        } else {
            Self::Criticita
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eccellente => "Eccellente",
            Self::Buono => "Buono",
            Self::Discreto => "Discreto",
            Self::Criticita => "Criticità",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scoring result for one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageScore {
    pub url: String,

    /// Weighted score, rounded to two decimals
    pub composite: f64,

    /// Component scores, rounded to two decimals
    pub components: ScoreComponents,
    pub classification: Classification,
}

/// Scores a page against the current time
pub fn score_page(
    url: &str,
    metrics: &PageMetrics,
    metadata: &PageMetadata,
    weights: &ScoreWeights,
) -> Result<PageScore, ScoringError> {
    score_page_at(url, metrics, metadata, weights, Utc::now())
}

/// Scores a page, measuring freshness relative to `now`
pub fn score_page_at(
    url: &str,
    metrics: &PageMetrics,
    metadata: &PageMetadata,
    weights: &ScoreWeights,
    now: DateTime<Utc>,
) -> Result<PageScore, ScoringError> {
    let components = compute_components(metrics, metadata, now);
    let composite = components.weighted(weights)?;

    Ok(PageScore {
        url: url.to_string(),
        composite: round2(composite),
        components: components.rounded(),
        classification: Classification::from_score(composite),
    })
}

/// Computes the unrounded component scores
pub fn compute_components(
    metrics: &PageMetrics,
    metadata: &PageMetadata,
    now: DateTime<Utc>,
) -> ScoreComponents {
    let timestamp = metadata
        .modified
        .as_deref()
        .or(metadata.published.as_deref());

    ScoreComponents {
        accuracy: score_accuracy(metrics),
        transparency: score_transparency(metrics),
        completeness: score_completeness(metrics),
        freshness: score_freshness(timestamp, now),
        clarity: score_clarity(metrics),
    }
}

fn score_accuracy(metrics: &PageMetrics) -> f64 {
    if metrics.numeric_tokens == 0 {
        return 40.0;
    }
    let ratio = (metrics.numeric_tokens as f64 / metrics.word_count.max(1) as f64).min(0.2);
    let mut base = 60.0 + ratio * 200.0;
    if metrics.has_formula {
        base += 10.0;
    }
    base.min(100.0)
}

fn score_transparency(metrics: &PageMetrics) -> f64 {
    if metrics.citation_matches == 0 {
        return 30.0;
    }
    (30.0 + metrics.citation_matches as f64 * 15.0).min(100.0)
}

fn score_completeness(metrics: &PageMetrics) -> f64 {
    let mut bonus = 0.0;
    if metrics.has_table {
        bonus += 20.0;
    }
    if metrics.has_list {
        bonus += 10.0;
    }
    bonus += (metrics.actuarial_terms.len() as f64 * 5.0).min(30.0);
    (40.0 + bonus).min(100.0)
}

/// Freshness of an ISO-8601 timestamp relative to `now`
///
/// | Timestamp | Score |
/// |-----------|-------|
/// | missing | 50 |
/// | unparseable | 60 |
/// | in the future | 80 |
/// | `d` days old | `max(20, 100 * (1 - min(d / 365, 1)))` |
///
/// Timestamps without an offset are read as UTC.
pub fn score_freshness(timestamp: Option<&str>, now: DateTime<Utc>) -> f64 {
    let Some(timestamp) = timestamp.map(str::trim).filter(|t| !t.is_empty()) else {
        return 50.0;
    };
    let Some(parsed) = parse_timestamp(timestamp) else {
        return 60.0;
    };

    let age = now - parsed;
    if age < chrono::Duration::zero() {
        return 80.0;
    }
    let decay = (age.num_days() as f64 / FRESHNESS_DECAY_DAYS).min(1.0);
    (100.0 * (1.0 - decay)).max(20.0)
}

fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(parsed.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn score_clarity(metrics: &PageMetrics) -> f64 {
    if metrics.word_count == 0 {
        return 40.0;
    }
    let numbers_per_word = metrics.numeric_tokens as f64 / metrics.word_count as f64;
    if numbers_per_word > 0.15 {
        65.0
    } else {
        80.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    fn metrics() -> PageMetrics {
        PageMetrics {
            word_count: 100,
            numeric_tokens: 10,
            has_formula: true,
            has_table: true,
            has_list: true,
            citation_matches: 2,
            actuarial_terms: BTreeMap::from([
                ("scr".to_string(), 1),
                ("riserva".to_string(), 3),
            ]),
            example_values: vec![],
        }
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(score_accuracy(&PageMetrics::default()), 40.0);
        // ratio 0.1 -> 60 + 20 + 10 for the formula
        assert_eq!(score_accuracy(&metrics()), 90.0);

        let dense = PageMetrics {
            word_count: 10,
            numeric_tokens: 10,
            has_formula: true,
            ..PageMetrics::default()
        };
        assert_eq!(score_accuracy(&dense), 100.0);
    }

    #[test]
    fn test_transparency() {
        assert_eq!(score_transparency(&PageMetrics::default()), 30.0);
        assert_eq!(score_transparency(&metrics()), 60.0);
        let many = PageMetrics {
            citation_matches: 10,
            ..PageMetrics::default()
        };
        assert_eq!(score_transparency(&many), 100.0);
    }

    #[test]
    fn test_completeness() {
        assert_eq!(score_completeness(&PageMetrics::default()), 40.0);
        // 40 + 20 + 10 + 2 terms * 5
        assert_eq!(score_completeness(&metrics()), 80.0);
    }

    #[test]
    fn test_clarity() {
        assert_eq!(score_clarity(&PageMetrics::default()), 40.0);
        assert_eq!(score_clarity(&metrics()), 80.0);
        let numeric = PageMetrics {
            word_count: 10,
            numeric_tokens: 2,
            ..PageMetrics::default()
        };
        assert_eq!(score_clarity(&numeric), 65.0);
    }

    #[test]
    fn test_freshness() {
        assert_eq!(score_freshness(None, now()), 50.0);
        assert_eq!(score_freshness(Some("yesterday"), now()), 60.0);
        assert_eq!(score_freshness(Some("2026-01-01T00:00:00Z"), now()), 80.0);
        assert_eq!(score_freshness(Some("2025-01-01T12:00:00+00:00"), now()), 100.0);
        assert_eq!(score_freshness(Some("2020-01-01"), now()), 20.0);

        let half_year = score_freshness(Some("2024-07-05T12:00:00"), now());
        assert!((half_year - 100.0 * (1.0 - 180.0 / 365.0)).abs() < 1e-9);
    }

    #[test]
    fn test_freshness_naive_dates_are_utc() {
        assert_eq!(
            score_freshness(Some("2024-12-02"), now()),
            score_freshness(Some("2024-12-02T00:00:00Z"), now())
        );
    }

    #[test]
    fn test_classification_thresholds() {
        assert_eq!(Classification::from_score(85.0), Classification::Eccellente);
        assert_eq!(Classification::from_score(84.99), Classification::Buono);
        assert_eq!(Classification::from_score(70.0), Classification::Buono);
        assert_eq!(Classification::from_score(50.0), Classification::Discreto);
        assert_eq!(Classification::from_score(49.9), Classification::Criticita);
        assert_eq!(Classification::Criticita.to_string(), "Criticità");
    }

    #[test]
    fn test_score_page() {
        let metadata = PageMetadata {
            modified: Some("2024-12-02T12:00:00Z".to_string()),
            ..PageMetadata::default()
        };
        let score = score_page_at(
            "https://example.com/a",
            &metrics(),
            &metadata,
            &ScoreWeights::default(),
            now(),
        )
        .unwrap();

        // freshness: 30 days -> 100 * (1 - 30/365) = 91.78...
        assert_eq!(score.components.freshness, 91.78);
        // 0.4*90 + 0.2*60 + 0.2*80 + 0.1*91.78 + 0.1*80
        assert_eq!(score.composite, 81.18);
        assert_eq!(score.classification, Classification::Buono);
        assert_eq!(score.url, "https://example.com/a");
    }

    #[test]
    fn test_modified_preferred_over_published() {
        let metadata = PageMetadata {
            published: Some("2020-01-01".to_string()),
            modified: Some("2025-01-01T00:00:00Z".to_string()),
            ..PageMetadata::default()
        };
        let components = compute_components(&PageMetrics::default(), &metadata, now());
        assert_eq!(components.freshness, 100.0);
    }

    #[test]
    fn test_zero_weights_rejected() {
        let zero = ScoreWeights {
            accuracy: 0.0,
            transparency: 0.0,
            completeness: 0.0,
            freshness: 0.0,
            clarity: 0.0,
        };
        let result = score_page_at(
            "https://example.com/",
            &PageMetrics::default(),
            &PageMetadata::default(),
            &zero,
            now(),
        );
        assert!(matches!(result, Err(ScoringError::ZeroWeights)));
    }
}
