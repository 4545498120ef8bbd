//! Output module.
//!
//! [`Exporter`] writes the cleaned table to CSV. [`CleaningReport`] captures
//! the run (stage counts, actions taken, column quality before and after) as
//! JSON for the `--emit-report` CLI flag or programmatic use.
//!
//! # Example
//!
//! ```rust,ignore
//! use immo_processing::reporting::{CleaningReport, Exporter};
//!
//! Exporter::export(&mut df, "data/cleaned_properties.csv")?;
//!
//! let report = CleaningReport::build(input, &result);
//! report.write_to_file(CleaningReport::default_path(output))?;
//! ```

mod exporter;
mod report;

pub use exporter::{ExportOutcome, Exporter};
pub use report::CleaningReport;
