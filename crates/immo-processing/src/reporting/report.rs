//! JSON run report.

use crate::error::Result;
use crate::quality::ColumnQuality;
use crate::types::{PipelineResult, PipelineSummary};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything known about one cleaning run, written next to the export when
/// requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub input_file: String,
    pub output_file: Option<String>,
    pub summary: PipelineSummary,
    pub processing_steps: Vec<String>,
    /// Column quality of the loaded table
    pub quality_before: Vec<ColumnQuality>,
    /// Column quality of the final table
    pub quality_after: Vec<ColumnQuality>,
}

impl CleaningReport {
    pub fn build(input_file: &Path, result: &PipelineResult) -> Self {
        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.display().to_string(),
            output_file: result
                .export
                .as_ref()
                .map(|e| e.path.display().to_string()),
            summary: result.summary.clone(),
            processing_steps: result.processing_steps.clone(),
            quality_before: result.quality_before.clone(),
            quality_after: result.quality_after.clone(),
        }
    }

    /// Write the report as pretty JSON, creating parent directories.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(path)?;
        file.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;

        info!("Report saved: {}", path.display());
        Ok(path.to_path_buf())
    }

    /// Default report location: `<output stem>_report.json` beside the CSV.
    pub fn default_path(output_file: &Path) -> PathBuf {
        let stem = output_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cleaned".to_string());
        output_file.with_file_name(format!("{}_report.json", stem))
    }
}
