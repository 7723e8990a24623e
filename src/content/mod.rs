//! Page content analysis
//!
//! - [`PageParser`] turns fetched HTML into main-content text and metadata
//! - [`extract_metrics`] derives the counts and flags that scoring consumes

mod metrics;
mod page;

pub use metrics::{extract_metrics, PageMetrics, ACTUARIAL_TERMS};
pub use page::{PageMetadata, PageParser, ParsedPage};
