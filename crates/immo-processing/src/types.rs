//! Result types shared by the pipeline, the report and the CLI.

use crate::quality::ColumnQuality;
use crate::reporting::ExportOutcome;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Outcome of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Final table. Empty when the input held no usable rows.
    pub dataframe: DataFrame,
    /// Where the table was written, when it was.
    pub export: Option<ExportOutcome>,
    /// Human-readable audit trail of every action taken.
    pub processing_steps: Vec<String>,
    pub summary: PipelineSummary,
    /// Column quality of the table handed to the pipeline.
    pub quality_before: Vec<ColumnQuality>,
    /// Column quality of the final table.
    pub quality_after: Vec<ColumnQuality>,
}

impl PipelineResult {
    /// True when the run produced at least one row.
    pub fn has_data(&self) -> bool {
        self.dataframe.height() > 0
    }
}

/// Row and column counts at each stage of a run.
///
/// # Example
///
/// ```rust,ignore
/// let result = pipeline.run()?;
/// let summary = &result.summary;
/// println!(
///     "{} listings -> {} properties in {}ms",
///     summary.rows_loaded, summary.rows_after, summary.duration_ms
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Rows read by the loader.
    pub rows_loaded: usize,
    /// Rows left after deduplication.
    pub rows_after_dedup: usize,
    /// Rows left after error correction.
    pub rows_after_correction: usize,
    /// Rows in the final table.
    pub rows_after: usize,

    /// Columns read by the loader.
    pub columns_before: usize,
    /// Columns in the final table.
    pub columns_after: usize,

    /// Source rows merged into another row by deduplication.
    pub duplicates_merged: usize,
    /// Rows removed by the corrector (no price, no postal code, projects).
    pub rows_removed: usize,
    /// Ordinal code columns added by the normalizer.
    pub code_columns_added: usize,
    /// `-1` sentinels turned back into nulls.
    pub sentinels_restored: usize,

    /// Warnings and notes generated during the run.
    pub warnings: Vec<String>,
}

impl PipelineSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the summary.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Share of loaded rows that survived, as a percentage.
    pub fn retention_percentage(&self) -> f32 {
        if self.rows_loaded == 0 {
            0.0
        } else {
            (self.rows_after as f32 / self.rows_loaded as f32) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_percentage() {
        let summary = PipelineSummary {
            rows_loaded: 200,
            rows_after: 150,
            ..Default::default()
        };
        assert_eq!(summary.retention_percentage(), 75.0);
        assert_eq!(PipelineSummary::new().retention_percentage(), 0.0);
    }

    #[test]
    fn test_summary_serialization() {
        let mut summary = PipelineSummary::new();
        summary.add_warning("Input produced no rows");
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("rows_after_dedup"));
        assert!(json.contains("Input produced no rows"));
    }
}
