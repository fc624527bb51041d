//! Pipeline module.
//!
//! This module provides the batch analysis pipeline and its progress hooks.

mod builder;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use progress::{AnalysisStage, ProgressReporter, ProgressUpdate};
