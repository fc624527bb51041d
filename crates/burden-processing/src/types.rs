use crate::imputers::ImputationRecord;
use crate::statistics::{HealthcareCorrelations, OutlierSummary, RegressionFit};
use chrono::{DateTime, Utc};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A cleaned table together with what cleaning did to it.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub df: DataFrame,
    pub summary: CleaningSummary,
}

impl CleanedTable {
    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn into_inner(self) -> DataFrame {
        self.df
    }
}

/// Counts and statistics gathered while cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Rows in the raw table.
    pub rows_in: usize,
    /// Rows in the cleaned table.
    pub rows_out: usize,
    /// Rows dropped for a missing DALYs or income value.
    pub rows_dropped_missing: usize,
    pub duplicates_removed: usize,
    /// Missing-value count per column in the raw table.
    pub missing_before: Vec<(String, usize)>,
    /// Missing-value count per column of the final cleaned table, derived columns included.
    pub missing_after: Vec<(String, usize)>,
    pub imputations: Vec<ImputationRecord>,
    /// DALYs outlier fences; `None` when no row survived cleaning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outliers: Option<OutlierSummary>,
}

impl CleaningSummary {
    /// Total rows removed by cleaning.
    pub fn rows_removed(&self) -> usize {
        self.rows_in - self.rows_out
    }

    /// Calculate the percentage of rows removed.
    pub fn rows_removed_percentage(&self) -> f64 {
        if self.rows_in == 0 {
            0.0
        } else {
            (self.rows_removed() as f64 / self.rows_in as f64) * 100.0
        }
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub cleaned: CleanedTable,
    pub regression: RegressionFit,
    pub healthcare: HealthcareCorrelations,
    /// Report text when outputs are kept in memory.
    pub report: Option<String>,
    /// Where the cleaned CSV was written, if it was.
    pub cleaned_data_path: Option<PathBuf>,
    /// Where the report was written, if it was.
    pub report_path: Option<PathBuf>,
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Serializable digest of the run.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            generated_at: Utc::now(),
            duration_ms: self.duration_ms,
            rows_in: self.cleaned.summary.rows_in,
            rows_out: self.cleaned.summary.rows_out,
            columns: self.cleaned.df.width(),
            rows_dropped_missing: self.cleaned.summary.rows_dropped_missing,
            duplicates_removed: self.cleaned.summary.duplicates_removed,
            imputations: self.cleaned.summary.imputations.clone(),
            outliers: self.cleaned.summary.outliers.clone(),
            regression: self.regression.clone(),
            healthcare: self.healthcare.clone(),
            cleaned_data_path: self.cleaned_data_path.clone(),
            report_path: self.report_path.clone(),
        }
    }
}

/// JSON-friendly summary of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub rows_in: usize,
    pub rows_out: usize,
    pub columns: usize,
    pub rows_dropped_missing: usize,
    pub duplicates_removed: usize,
    pub imputations: Vec<ImputationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outliers: Option<OutlierSummary>,
    pub regression: RegressionFit,
    pub healthcare: HealthcareCorrelations,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaned_data_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}
