//! Tukey IQR outlier detection. Rows are counted, never removed.

use crate::error::{AnalysisError, Result};
use crate::statistics::descriptive::quantile_sorted;
use crate::utils::{present_values, sorted};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Quartiles, fences and the number of values outside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub multiplier: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub count: usize,
}

impl OutlierSummary {
    /// Whether `value` lies strictly outside the fences.
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower_bound || value > self.upper_bound
    }
}

/// Count values of `column` outside `[Q1 - k*IQR, Q3 + k*IQR]`.
pub fn detect_outliers(df: &DataFrame, column: &str, multiplier: f64) -> Result<OutlierSummary> {
    let values = sorted(&present_values(df, column)?);
    let (Some(q1), Some(q3)) = (quantile_sorted(&values, 0.25), quantile_sorted(&values, 0.75))
    else {
        return Err(AnalysisError::EmptyTable(format!(
            "outlier detection on '{column}'"
        )));
    };

    let iqr = q3 - q1;
    let mut summary = OutlierSummary {
        column: column.to_string(),
        q1,
        q3,
        iqr,
        multiplier,
        lower_bound: q1 - multiplier * iqr,
        upper_bound: q3 + multiplier * iqr,
        count: 0,
    };
    summary.count = values.iter().filter(|v| summary.is_outlier(**v)).count();

    debug!(
        column,
        lower = summary.lower_bound,
        upper = summary.upper_bound,
        count = summary.count,
        "outliers detected"
    );
    Ok(summary)
}
