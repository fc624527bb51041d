//! Progress reporting for the analysis pipeline.
//!
//! Each stage is atomic: an update is sent when a stage starts, then one
//! final `Complete` or `Failed` update. Overall progress is the share of the
//! run covered by the stages before the current one.
//!
//! ```rust,ignore
//! use burden_processing::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run();
//! ```

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    /// Reading the raw dataset
    Loading,
    /// Imputing, filtering, deduplicating and deriving features
    Cleaning,
    /// Writing the cleaned table
    Saving,
    /// Fitting the regression
    Analysis,
    /// Writing the report and appending correlations
    Reporting,
    Complete,
    Failed,
}

impl AnalysisStage {
    /// Working stages in run order with their share of the run.
    pub const PLAN: [(AnalysisStage, f32); 5] = [
        (Self::Loading, 0.15),
        (Self::Cleaning, 0.40),
        (Self::Saving, 0.15),
        (Self::Analysis, 0.20),
        (Self::Reporting, 0.10),
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Cleaning => "Cleaning Data",
            Self::Saving => "Saving Cleaned Data",
            Self::Analysis => "Running Statistics",
            Self::Reporting => "Writing Report",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Overall progress when this stage starts.
    ///
    /// `Complete` sits at 1.0; `Failed` reports 0.0.
    pub fn starts_at(&self) -> f32 {
        match self {
            Self::Complete => 1.0,
            Self::Failed => 0.0,
            stage => Self::PLAN
                .iter()
                .take_while(|(planned, _)| planned != stage)
                .map(|(_, share)| share)
                .sum(),
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: AnalysisStage,
    /// Overall progress (0.0 - 1.0)
    pub progress: f32,
    pub message: String,
    /// Set on `Failed` updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ProgressUpdate {
    /// A stage is starting.
    pub fn entering(stage: AnalysisStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: stage.starts_at(),
            message: message.into(),
            error_code: None,
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::entering(AnalysisStage::Complete, message)
    }

    pub fn failed(error: &AnalysisError) -> Self {
        Self {
            error_code: Some(error.error_code().to_string()),
            ..Self::entering(AnalysisStage::Failed, error.to_string())
        }
    }
}

/// Receives progress updates during a run.
///
/// Any `Fn(ProgressUpdate)` closure that is `Send + Sync` is a reporter.
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
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[test]
    fn test_stage_start_points() {
        assert_eq!(AnalysisStage::Loading.starts_at(), 0.0);
        assert!((AnalysisStage::Cleaning.starts_at() - 0.15).abs() < 1e-6);
        assert!((AnalysisStage::Saving.starts_at() - 0.55).abs() < 1e-6);
        assert!((AnalysisStage::Reporting.starts_at() - 0.90).abs() < 1e-6);
        assert_eq!(AnalysisStage::Complete.starts_at(), 1.0);

        let total: f32 = AnalysisStage::PLAN.iter().map(|(_, share)| share).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_failed_update_carries_code() {
        let update = ProgressUpdate::failed(&AnalysisError::MissingColumn("DALYs".to_string()));
        assert_eq!(update.stage, AnalysisStage::Failed);
        assert_eq!(update.error_code.as_deref(), Some("MISSING_COLUMN"));
        assert_eq!(update.message, "Required column 'DALYs' not found in dataset");
    }

    #[test]
    fn test_closures_are_reporters() {
        let seen = Mutex::new(Vec::new());
        let reporter = |update: ProgressUpdate| seen.lock().unwrap().push(update.stage);

        reporter.report(ProgressUpdate::entering(AnalysisStage::Loading, "Loading"));
        reporter.report(ProgressUpdate::complete("Done"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![AnalysisStage::Loading, AnalysisStage::Complete]
        );
    }

    #[test]
    fn test_update_json_shape() {
        let json = serde_json::to_value(ProgressUpdate::entering(
            AnalysisStage::Reporting,
            "Writing analysis report...",
        ))
        .unwrap();
        assert_eq!(json["stage"], "reporting");
        assert!(json.get("error_code").is_none());
        assert_eq!(AnalysisStage::Saving.label(), "Saving Cleaned Data");
    }
}
