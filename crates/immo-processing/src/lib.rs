//! Property Listings Cleaning Library
//!
//! Turns a raw scrape of Belgian property listings into a deduplicated,
//! type-consistent table ready for analysis, built with Rust and Polars.
//!
//! # Overview
//!
//! The pipeline runs five stages in order:
//!
//! - **Loading**: CSV, TSV, JSON, Parquet, spreadsheets and XML, picked by extension
//! - **Deduplication**: listings of the same property collapse into one row
//!   carrying a merge count and every distinct source URL
//! - **Error Correction**: price and postal code repair, locality
//!   canonicalization, gap filling, flag coercion and room count inference
//! - **Normalization**: ordinal code columns for condition, EPC, heating,
//!   flood zone and kitchen
//! - **Export**: CSV with a header row
//!
//! Unreadable input or a missing key column never panics: the affected stage
//! logs the problem and the run continues with an empty table. Only invalid
//! configuration and failed writes are returned as errors.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use immo_processing::{CleaningConfig, Pipeline};
//!
//! let config = CleaningConfig::builder()
//!     .input_path("data/properties.csv")
//!     .output_path("data/cleaned_properties.csv")
//!     .build()?;
//!
//! let result = Pipeline::builder().config(config).build()?.run()?;
//!
//! println!(
//!     "{} listings -> {} properties",
//!     result.summary.rows_loaded, result.summary.rows_after
//! );
//! ```
//!
//! Each stage is also usable on its own:
//!
//! ```rust,ignore
//! use immo_processing::{Deduplicator, ErrorCorrector, Loader, Normalizer};
//!
//! let df = Loader::load("data/properties.csv");
//! let df = Deduplicator::default().deduplicate(&df);
//! let df = ErrorCorrector::default().correct(df);
//! let df = Normalizer::default().normalize(df);
//! ```
//!
//! # Progress Reporting
//!
//! ```rust,ignore
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod quality;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{Deduplicator, ErrorCorrector, MERGED_COUNT_COLUMN, MISSING_VALUE};
pub use config::{
    CleaningConfig, CleaningConfigBuilder, ColumnNames, ConfigValidationError, PostcodePolicy,
    ProjectListingPolicy,
};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use imputers::{GroupModeImputer, NOT_RECORDED, StatisticalImputer};
pub use loader::{FileFormat, Loader};
pub use normalizer::{CodeTable, NormalizationTables, Normalizer, Region};
pub use pipeline::{CleaningStage, Pipeline, PipelineBuilder, ProgressReporter, ProgressUpdate};
pub use quality::{ColumnQuality, DataQualityAnalyzer};
pub use reporting::{CleaningReport, ExportOutcome, Exporter};
pub use types::{PipelineResult, PipelineSummary};
pub use utils::{is_numeric_dtype, parse_boolean_like, parse_numeric_string};
