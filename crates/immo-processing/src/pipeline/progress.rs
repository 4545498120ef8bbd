//! Progress reporting for the cleaning pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use immo_processing::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Reading the input file
    Loading,
    /// Collapsing duplicate listings
    Deduplication,
    /// Coercing types, filling gaps, filtering rows
    ErrorCorrection,
    /// Adding ordinal code columns
    Normalization,
    /// Writing the CSV
    Export,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl CleaningStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Deduplication => "Merging Duplicates",
            Self::ErrorCorrection => "Correcting Errors",
            Self::Normalization => "Normalizing Categories",
            Self::Export => "Exporting",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run spent in this stage. The processing stages
    /// sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.15,
            Self::Deduplication => 0.25,
            Self::ErrorCorrection => 0.35,
            Self::Normalization => 0.15,
            Self::Export => 0.10,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Deduplication => 0.15,
            Self::ErrorCorrection => 0.40,
            Self::Normalization => 0.75,
            Self::Export => 0.90,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// Progress update emitted at stage boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: CleaningStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,

    /// Rows in the table at the time of the update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
}

impl ProgressUpdate {
    pub fn new(stage: CleaningStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            rows: None,
        }
    }

    /// Attach the current row count.
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
            rows: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
            rows: None,
        }
    }
}

/// Receives progress updates during cleaning.
///
/// Implemented for any `Fn(ProgressUpdate) + Send + Sync` closure.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

impl<F> ProgressReporter for F
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        self(update)
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const PROCESSING: [CleaningStage; 5] = [
        CleaningStage::Loading,
        CleaningStage::Deduplication,
        CleaningStage::ErrorCorrection,
        CleaningStage::Normalization,
        CleaningStage::Export,
    ];

    #[test]
    fn test_update_position_within_stage() {
        let update = ProgressUpdate::new(CleaningStage::ErrorCorrection, 0.5, "Correcting")
            .with_rows(120);
        assert!((update.progress - 0.575).abs() < 1e-6);
        assert_eq!(update.rows, Some(120));

        let overshoot = ProgressUpdate::new(CleaningStage::Export, 3.0, "Writing");
        assert_eq!(overshoot.stage_progress, 1.0);
        assert!(overshoot.progress <= 1.0);
    }

    #[test]
    fn test_terminal_updates() {
        assert_eq!(ProgressUpdate::complete("done").progress, 1.0);
        let failed = ProgressUpdate::failed("disk full");
        assert_eq!(failed.stage, CleaningStage::Failed);
        assert_eq!(failed.message, "disk full");
    }

    #[test]
    fn test_closure_is_a_reporter() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = messages.clone();
        let reporter: Arc<dyn ProgressReporter> = Arc::new(move |update: ProgressUpdate| {
            sink.lock().unwrap().push(update.message);
        });

        reporter.report(ProgressUpdate::new(CleaningStage::Loading, 0.0, "start"));
        reporter.report(ProgressUpdate::complete("end"));

        assert_eq!(*messages.lock().unwrap(), vec!["start", "end"]);
    }

    #[test]
    fn test_stages_tile_the_run() {
        let total: f32 = PROCESSING.iter().map(|s| s.weight()).sum();
        assert!((total - 1.0).abs() < 1e-6);

        for pair in PROCESSING.windows(2) {
            let end = pair[0].base_progress() + pair[0].weight();
            assert!((end - pair[1].base_progress()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_stage_json_values() {
        let json = serde_json::to_string(&CleaningStage::ErrorCorrection).unwrap();
        assert_eq!(json, "\"error_correction\"");
    }
}
