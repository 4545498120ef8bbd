use crate::cleaner::MISSING_VALUE;
use crate::error::Result;
use crate::imputers::NOT_RECORDED;
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Completeness figures for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnQuality {
    pub name: String,
    pub dtype: String,
    pub non_null: usize,
    pub missing: usize,
    pub missing_pct: f64,
    pub unique: usize,
    /// Cells holding a placeholder instead of a value: `-1` in numeric
    /// columns, `"missing value"` in text columns.
    pub placeholders: usize,
}

pub struct DataQualityAnalyzer;

impl DataQualityAnalyzer {
    /// Per-column completeness, sorted by missing percentage (highest first).
    /// Columns with equal percentages keep their table order.
    pub fn analyze(df: &DataFrame) -> Result<Vec<ColumnQuality>> {
        let rows = df.height();
        let mut report = Vec::with_capacity(df.width());

        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let missing = series.null_count();
            let missing_pct = if rows == 0 {
                0.0
            } else {
                missing as f64 / rows as f64 * 100.0
            };

            report.push(ColumnQuality {
                name: series.name().to_string(),
                dtype: series.dtype().to_string(),
                non_null: rows - missing,
                missing,
                missing_pct,
                unique: series.n_unique()?,
                placeholders: Self::count_placeholders(series)?,
            });
        }

        report.sort_by(|a, b| {
            b.missing_pct
                .partial_cmp(&a.missing_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!("Analyzed quality of {} columns", report.len());
        Ok(report)
    }

    fn count_placeholders(series: &Series) -> Result<usize> {
        let count = match series.dtype() {
            DataType::String => series
                .str()?
                .into_iter()
                .filter(|v| *v == Some(MISSING_VALUE))
                .count(),
            dtype if is_numeric_dtype(dtype) => series
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .filter(|v| *v == Some(NOT_RECORDED as f64))
                .count(),
            _ => 0,
        };
        Ok(count)
    }

    /// Total missing cells across the table.
    pub fn total_missing(report: &[ColumnQuality]) -> usize {
        report.iter().map(|c| c.missing).sum()
    }
}
