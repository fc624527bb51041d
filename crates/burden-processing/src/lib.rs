//! Disease-Burden Analysis Library
//!
//! Cleaning, feature derivation and statistics for global health datasets
//! measured in DALYs (disability-adjusted life years), built on Polars.
//!
//! # Overview
//!
//! - **Loading**: CSV input with required-column validation and an overview log
//! - **Cleaning**: median imputation, row filtering, deduplication, `Year` coercion
//! - **Feature Derivation**: z-scores, disease type, income terciles
//! - **Statistics**: Pearson correlation with p-values, OLS regression, IQR outliers
//! - **Reporting**: a plain-text report written in two ordered steps
//! - **Progress Reporting**: stage updates through a closure or a reporter trait
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use burden_processing::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .input_path("data/Global Health Statistics.csv")
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("R² = {:.4}", result.regression.r_squared);
//! ```
//!
//! The pieces can also be used on their own:
//!
//! ```rust,ignore
//! use burden_processing::{cleaner, loader, statistics};
//!
//! let raw = loader::load_table("data/raw.csv")?;
//! let cleaned = cleaner::clean(&raw)?;
//! let fit = statistics::fit_regression(&cleaned.df)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod reporting;
pub mod schema;
pub mod statistics;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DataCleaner, clean};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{AnalysisError, ErrorKind, Result as AnalysisResult, ResultExt};
pub use imputers::{ImputationRecord, StatisticalImputer};
pub use loader::{DatasetOverview, load_table, load_table_from_str, save_table};
pub use pipeline::{AnalysisStage, Pipeline, PipelineBuilder, ProgressReporter, ProgressUpdate};
pub use reporting::{AnalysisReport, FileSink, MemorySink, RegressionReport, ReportSink};
pub use statistics::{
    Correlation, DescriptiveSummary, HealthcareCorrelations, OutlierSummary, RegressionFit,
    correlate, describe, detect_outliers, fit_regression, healthcare_correlations,
};
pub use types::{CleanedTable, CleaningSummary, PipelineResult, RunSummary};
pub use utils::{DtypeCategory, get_dtype_category};
