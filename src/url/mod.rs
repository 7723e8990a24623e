//! URL handling module for Attuario
//!
//! This module provides URL normalization (the visited-set key) and the
//! same-host check that keeps a crawl on its target domain.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, TargetHost};
pub use normalize::normalize_url;
