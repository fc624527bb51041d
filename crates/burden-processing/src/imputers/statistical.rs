//! Median imputation for numeric columns.

use crate::error::Result;
use crate::statistics::descriptive::median;
use crate::utils::{numeric_values, series};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One column's median fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationRecord {
    pub column: String,
    pub median: f64,
    /// Number of cells replaced.
    pub filled: usize,
}

pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Replace missing values (null or NaN) in a numeric column with its median.
    ///
    /// The median is taken over the table as given. A column with no present
    /// value has no median; it is left untouched and `None` is returned.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
    ) -> Result<Option<ImputationRecord>> {
        let values = numeric_values(df, col_name)?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();

        let Some(median_val) = median(&present) else {
            warn!(column = col_name, "Column has no values; median imputation skipped");
            return Ok(None);
        };

        let filled = Self::fill_with_value(df, col_name, median_val, &values)?;
        debug!(column = col_name, median = median_val, filled, "median imputation");
        Ok(Some(ImputationRecord {
            column: col_name.to_string(),
            median: median_val,
            filled,
        }))
    }

    /// Fill missing entries of a numeric column with a specific value.
    fn fill_with_value(
        df: &mut DataFrame,
        col_name: &str,
        fill_value: f64,
        values: &[Option<f64>],
    ) -> Result<usize> {
        let filled = values.iter().filter(|v| v.is_none()).count();
        if filled == 0 && series(df, col_name)?.dtype() == &DataType::Float64 {
            return Ok(0);
        }

        let result: Vec<f64> = values.iter().map(|v| v.unwrap_or(fill_value)).collect();
        df.replace(col_name, Series::new(col_name.into(), result))?;
        Ok(filled)
    }
}
