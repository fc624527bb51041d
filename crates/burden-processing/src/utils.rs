//! Shared column helpers.
//!
//! Everything downstream of the loader works on plain `Vec`s extracted here, so
//! the "missing" rule (null or NaN) is applied in one place.

use crate::error::{AnalysisError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for coercion purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Signed or unsigned integers
    Integer,
    /// Floating point numbers
    Float,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_integer_dtype(dtype) {
        DtypeCategory::Integer
    } else if matches!(dtype, DataType::Float32 | DataType::Float64) {
        DtypeCategory::Float
    } else if matches!(dtype, DataType::String) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// Column Access
// =============================================================================

/// Look up a column, mapping absence to [`AnalysisError::MissingColumn`].
pub fn series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|column| column.as_materialized_series())
        .map_err(|_| AnalysisError::MissingColumn(name.to_string()))
}

/// Fail with the first of `columns` absent from `df`.
pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<()> {
    let present = df.get_column_names();
    match columns
        .iter()
        .find(|name| !present.iter().any(|p| p.as_str() == **name))
    {
        Some(missing) => Err(AnalysisError::MissingColumn((*missing).to_string())),
        None => Ok(()),
    }
}

/// Numeric values of a column with missing entries (null or NaN) as `None`.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let floats = series(df, name)?.cast(&DataType::Float64)?;
    let values = floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Numeric values of a column with missing entries skipped.
pub fn present_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    Ok(numeric_values(df, name)?.into_iter().flatten().collect())
}

/// String values of a column (non-string columns are formatted).
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let strings = series(df, name)?.cast(&DataType::String)?;
    let values = strings
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Paired values of two columns, keeping only rows where both are present.
pub fn paired_values(df: &DataFrame, x: &str, y: &str) -> Result<(Vec<f64>, Vec<f64>)> {
    let xs = numeric_values(df, x)?;
    let ys = numeric_values(df, y)?;
    Ok(xs
        .into_iter()
        .zip(ys)
        .filter_map(|pair| match pair {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        })
        .unzip())
}

/// Number of missing entries (null, or NaN for float columns).
pub fn missing_count(series: &Series) -> usize {
    let nans = match series.dtype() {
        DataType::Float32 | DataType::Float64 => series
            .cast(&DataType::Float64)
            .ok()
            .and_then(|s| {
                s.f64()
                    .ok()
                    .map(|ca| ca.into_iter().flatten().filter(|v| v.is_nan()).count())
            })
            .unwrap_or(0),
        _ => 0,
    };
    series.null_count() + nans
}

/// Missing-value count per column, in column order.
pub fn missing_counts(df: &DataFrame) -> Vec<(String, usize)> {
    df.get_columns()
        .iter()
        .map(|column| {
            (
                column.name().to_string(),
                missing_count(column.as_materialized_series()),
            )
        })
        .collect()
}

/// Sort a copy of `values` ascending. NaNs must already be filtered out.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}
