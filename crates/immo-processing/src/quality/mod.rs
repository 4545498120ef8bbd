//! Data quality analysis module.
//!
//! Per-column completeness figures, computed before and after cleaning and
//! embedded in the JSON report.

mod analyzer;

pub use analyzer::{ColumnQuality, DataQualityAnalyzer};
