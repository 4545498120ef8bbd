//! Data cleaning module for scraped listings.
//!
//! This module provides:
//! - Duplicate listing consolidation ([`Deduplicator`])
//! - Column type correction, gap filling and row filtering ([`ErrorCorrector`])

mod converters;
mod corrector;
mod dedup;
mod sanitizers;

pub use corrector::ErrorCorrector;
pub use dedup::{Deduplicator, MERGED_COUNT_COLUMN};
pub use sanitizers::MISSING_VALUE;
