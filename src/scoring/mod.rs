//! Actuarial content scoring
//!
//! Page metrics and metadata are turned into five component scores, a weighted
//! composite and a quality classification.

mod score;
mod weights;

pub use score::{
    compute_components, score_freshness, score_page, score_page_at, Classification, PageScore,
    ScoreComponents,
};
pub use weights::ScoreWeights;

use thiserror::Error;

/// Errors raised while scoring
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Weights sum to zero")]
    ZeroWeights,
}
