//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating load, deduplication, correction, normalization and export.

use crate::cleaner::{Deduplicator, ErrorCorrector};
use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result};
use crate::loader::Loader;
use crate::normalizer::{NormalizationTables, Normalizer};
use crate::pipeline::progress::{CleaningStage, ProgressReporter, ProgressUpdate};
use crate::quality::{ColumnQuality, DataQualityAnalyzer};
use crate::reporting::{CleaningReport, Exporter};
use crate::types::{PipelineResult, PipelineSummary};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The listings cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use immo_processing::{CleaningConfig, Pipeline};
///
/// // From the configured input file to the configured CSV
/// let result = Pipeline::builder()
///     .config(CleaningConfig::builder().input_path("data/properties.csv").build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run()?;
///
/// // In memory, nothing written
/// let result = Pipeline::builder().build()?.process(dataframe)?;
/// ```
pub struct Pipeline {
    config: CleaningConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    deduplicator: Deduplicator,
    corrector: ErrorCorrector,
    normalizer: Normalizer,
}

// Callers may hand the pipeline to a worker thread
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Load the configured input, clean it, and write the configured output.
    ///
    /// An unreadable input is not an error: it yields an empty result and no
    /// file. Failures to write the CSV or the JSON report are returned.
    pub fn run(&self) -> Result<PipelineResult> {
        self.finish(self.run_internal())
    }

    /// Clean an in-memory table without writing anything.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        self.finish(Ok(self.process_internal(df, Instant::now(), PipelineSummary::new())))
    }

    fn finish(&self, outcome: Result<PipelineResult>) -> Result<PipelineResult> {
        match outcome {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Pipeline completed: {} properties",
                    result.dataframe.height()
                )));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self) -> Result<PipelineResult> {
        let start = Instant::now();
        let input = &self.config.input_path;
        let mut summary = PipelineSummary::new();

        // ===== Stage 1: Loading =====
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Loading,
            0.0,
            format!("Reading {}", input.display()),
        ));
        let df = match Loader::try_load(input) {
            Ok(df) => df,
            Err(e) => {
                warn!("{}", e);
                summary.add_warning(e.to_string());
                DataFrame::empty()
            }
        };
        info!(
            "Loaded {} rows x {} columns from {}",
            df.height(),
            df.width(),
            input.display()
        );
        self.report_progress(
            ProgressUpdate::new(CleaningStage::Loading, 1.0, "Input loaded").with_rows(df.height()),
        );

        let mut result = self.process_internal(df, start, summary);

        // ===== Stage 5: Export =====
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Export,
            0.0,
            format!("Writing {}", self.config.output_path.display()),
        ));
        result.export = Exporter::export(&mut result.dataframe, &self.config.output_path)?;
        if result.export.is_none() {
            result
                .summary
                .add_warning("No data exported due to empty or invalid input");
        }

        if let Some(report_path) = &self.config.report_path {
            CleaningReport::build(input, &result).write_to_file(report_path)?;
        }

        result.summary.duration_ms = start.elapsed().as_millis() as u64;
        self.report_progress(
            ProgressUpdate::new(CleaningStage::Export, 1.0, "Export finished")
                .with_rows(result.dataframe.height()),
        );

        Ok(result)
    }

    /// Run the processing stages. Stage failures are logged, recorded as
    /// warnings and leave an empty table behind.
    fn process_internal(
        &self,
        df: DataFrame,
        start: Instant,
        mut summary: PipelineSummary,
    ) -> PipelineResult {
        let mut processing_steps = Vec::new();

        summary.rows_loaded = df.height();
        summary.columns_before = df.width();
        let quality_before = Self::quality_snapshot(&df, "before cleaning");

        // ===== Stage 2: Deduplication =====
        let df = if self.skip_if_empty(&df, CleaningStage::Deduplication, &mut summary) {
            df
        } else {
            self.report_progress(
                ProgressUpdate::new(CleaningStage::Deduplication, 0.0, "Merging duplicate listings")
                    .with_rows(df.height()),
            );
            let df = match self.deduplicator.try_deduplicate(&df) {
                Ok(merged) => {
                    summary.duplicates_merged = df.height().saturating_sub(merged.height());
                    if summary.duplicates_merged > 0 {
                        processing_steps.push(format!(
                            "Merged {} listings into {} properties",
                            df.height(),
                            merged.height()
                        ));
                    }
                    merged
                }
                Err(e) => Self::degrade("Deduplication", e, &mut summary),
            };
            summary.rows_after_dedup = df.height();
            self.report_progress(
                ProgressUpdate::new(CleaningStage::Deduplication, 1.0, "Duplicates merged")
                    .with_rows(df.height()),
            );
            df
        };

        // ===== Stage 3: Error correction =====
        let df = if self.skip_if_empty(&df, CleaningStage::ErrorCorrection, &mut summary) {
            df
        } else {
            self.report_progress(
                ProgressUpdate::new(CleaningStage::ErrorCorrection, 0.0, "Correcting values")
                    .with_rows(df.height()),
            );
            let before = df.height();
            let df = match self.corrector.try_correct(df) {
                Ok((corrected, steps)) => {
                    processing_steps.extend(steps);
                    corrected
                }
                Err(e) => Self::degrade("Error correction", e, &mut summary),
            };
            summary.rows_after_correction = df.height();
            summary.rows_removed = before.saturating_sub(df.height());
            self.report_progress(
                ProgressUpdate::new(CleaningStage::ErrorCorrection, 1.0, "Values corrected")
                    .with_rows(df.height()),
            );
            df
        };

        // ===== Stage 4: Normalization =====
        let mut df = if self.skip_if_empty(&df, CleaningStage::Normalization, &mut summary) {
            df
        } else {
            self.report_progress(
                ProgressUpdate::new(CleaningStage::Normalization, 0.0, "Adding category codes")
                    .with_rows(df.height()),
            );
            let width = df.width();
            let df = match self.normalizer.try_normalize(df) {
                Ok((normalized, steps)) => {
                    processing_steps.extend(steps);
                    summary.code_columns_added = normalized.width().saturating_sub(width);
                    normalized
                }
                Err(e) => Self::degrade("Normalization", e, &mut summary),
            };
            self.report_progress(
                ProgressUpdate::new(CleaningStage::Normalization, 1.0, "Categories normalized")
                    .with_rows(df.height()),
            );
            df
        };

        if self.config.restore_missing && df.height() > 0 {
            df = match Normalizer::restore_missing(df) {
                Ok((restored, count)) => {
                    summary.sentinels_restored = count;
                    if count > 0 {
                        processing_steps.push(format!("Restored {} placeholders to null", count));
                    }
                    restored
                }
                Err(e) => Self::degrade("Restoring missing values", e, &mut summary),
            };
        }

        summary.rows_after = df.height();
        summary.columns_after = df.width();
        summary.duration_ms = start.elapsed().as_millis() as u64;
        let quality_after = Self::quality_snapshot(&df, "after cleaning");

        info!(
            "Cleaning finished: {} listings -> {} properties ({:.1}% retained)",
            summary.rows_loaded,
            summary.rows_after,
            summary.retention_percentage()
        );

        PipelineResult {
            dataframe: df,
            export: None,
            processing_steps,
            summary,
            quality_before,
            quality_after,
        }
    }

    /// True when there is nothing left to process. Records a warning the first
    /// time a stage is skipped.
    fn skip_if_empty(
        &self,
        df: &DataFrame,
        stage: CleaningStage,
        summary: &mut PipelineSummary,
    ) -> bool {
        if df.height() > 0 {
            return false;
        }
        let note = "No rows to process; remaining stages skipped";
        if !summary.warnings.iter().any(|w| w == note) {
            warn!("{} (at {})", note, stage.display_name());
            summary.add_warning(note);
        }
        true
    }

    fn degrade(stage: &str, e: CleaningError, summary: &mut PipelineSummary) -> DataFrame {
        error!("{} failed: {}", stage, e);
        summary.add_warning(format!("{} failed: {}", stage, e));
        DataFrame::empty()
    }

    fn quality_snapshot(df: &DataFrame, label: &str) -> Vec<ColumnQuality> {
        match DataQualityAnalyzer::analyze(df) {
            Ok(report) => {
                debug!(
                    "{} missing cells {}",
                    DataQualityAnalyzer::total_missing(&report),
                    label
                );
                report
            }
            Err(e) => {
                warn!("Quality analysis {} failed: {}", label, e);
                Vec::new()
            }
        }
    }
}

/// Builder for creating a [`Pipeline`] with custom configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<CleaningConfig>,
    tables: Option<NormalizationTables>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the cleaning configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the normalization code tables.
    pub fn tables(mut self, tables: NormalizationTables) -> Self {
        self.tables = Some(tables);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a closure to receive progress updates.
    pub fn on_progress<F>(self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter(Arc::new(callback))
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config
            .validate()
            .map_err(|e| CleaningError::InvalidConfig(e.to_string()))?;

        let normalizer = Normalizer::from_config(&config, self.tables.unwrap_or_default());

        Ok(Pipeline {
            deduplicator: Deduplicator::new(config.columns.clone()),
            corrector: ErrorCorrector::new(config.clone()),
            normalizer,
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}
