use crate::scoring::ScoringError;
use serde::{Deserialize, Serialize};

/// Relative weight of each score component
///
/// Weights need not sum to one; [`ScoreWeights::normalize`] rescales them.
/// Missing fields take their default when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub accuracy: f64,
    pub transparency: f64,
    pub completeness: f64,
    pub freshness: f64,
    pub clarity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            accuracy: 0.4,
            transparency: 0.2,
            completeness: 0.2,
            freshness: 0.1,
            clarity: 0.1,
        }
    }
}

impl ScoreWeights {
    /// Component names paired with their weights
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("accuracy", self.accuracy),
            ("transparency", self.transparency),
            ("completeness", self.completeness),
            ("freshness", self.freshness),
            ("clarity", self.clarity),
        ]
    }

    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, value)| value).sum()
    }

    /// Rescales the weights so they sum to one
    pub fn normalize(&self) -> Result<Self, ScoringError> {
        let total = self.total();
        if total == 0.0 {
            return Err(ScoringError::ZeroWeights);
        }
        Ok(Self {
            accuracy: self.accuracy / total,
            transparency: self.transparency / total,
            completeness: self.completeness / total,
            freshness: self.freshness / total,
            clarity: self.clarity / total,
        })
    }
}
