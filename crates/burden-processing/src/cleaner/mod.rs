//! Data cleaning and feature derivation.
//!
//! [`DataCleaner::clean`] runs the fixed sequence:
//!
//! 1. Median-impute education and urbanization (median over the raw table)
//! 2. Drop rows missing DALYs or income
//! 3. Remove exact duplicate rows, keeping the first
//! 4. Coerce `Year` to Int64
//! 5. Count DALYs outliers (reporting only)
//! 6. Derive z-scores, disease type and income group

pub mod coercion;
pub mod features;

pub use coercion::{coerce_year, parse_year};
pub use features::{classify_disease, derive_features, income_group, tercile_edges, zscores};

use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::schema::{DALYS, IMPUTED_COLUMNS, NON_IMPUTABLE_COLUMNS, REQUIRED_COLUMNS};
use crate::statistics::outliers::detect_outliers;
use crate::types::{CleanedTable, CleaningSummary};
use crate::utils::{missing_counts, numeric_values, require_columns};
use polars::prelude::*;
use tracing::{debug, info};

/// Data cleaner for the disease-burden dataset.
#[derive(Debug, Clone, Copy)]
pub struct DataCleaner {
    outlier_multiplier: f64,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self {
            outlier_multiplier: 1.5,
        }
    }
}

impl DataCleaner {
    /// Cleaner with a custom IQR whisker multiplier.
    pub fn with_outlier_multiplier(outlier_multiplier: f64) -> Self {
        Self { outlier_multiplier }
    }

    /// Clean a raw table. The input is not modified.
    ///
    /// An empty result is not an error: the returned table has every derived
    /// column, with no rows.
    pub fn clean(&self, raw: &DataFrame) -> Result<CleanedTable> {
        require_columns(raw, &REQUIRED_COLUMNS)?;

        let rows_in = raw.height();
        let missing_before = missing_counts(raw);
        let mut df = raw.clone();

        info!(rows = rows_in, "Cleaning dataset...");

        // 1. Impute before filtering so the median sees every row
        let mut imputations = Vec::new();
        for column in IMPUTED_COLUMNS {
            if let Some(record) = StatisticalImputer::apply_numeric_median(&mut df, column)? {
                imputations.push(record);
            }
        }

        // 2. Drop rows missing a non-imputable value
        let before_drop = df.height();
        df = drop_missing(&df, &NON_IMPUTABLE_COLUMNS)?;
        let rows_dropped_missing = before_drop - df.height();
        if rows_dropped_missing > 0 {
            debug!("Dropped {} rows missing DALYs or income", rows_dropped_missing);
        }

        // 3. Remove duplicate rows
        let before_duplicates = df.height();
        df = df
            .unique_stable(None, UniqueKeepStrategy::First, None)
            .context("Removing duplicate rows")?;
        let duplicates_removed = before_duplicates - df.height();
        if duplicates_removed > 0 {
            debug!("Removed {} duplicate rows", duplicates_removed);
        } else {
            debug!("No duplicate rows found");
        }

        // 4. Year as integer
        coerce_year(&mut df)?;

        // 5. Outliers are counted, never removed
        let outliers = if df.height() == 0 {
            None
        } else {
            Some(detect_outliers(&df, DALYS, self.outlier_multiplier)?)
        };
        if let Some(summary) = &outliers {
            info!(
                "Outliers in DALYs: {} rows outside [{:.2}, {:.2}]",
                summary.count, summary.lower_bound, summary.upper_bound
            );
        }

        // 6. Derived features
        derive_features(&mut df).context("Deriving features")?;
        let missing_after = missing_counts(&df);

        let summary = CleaningSummary {
            rows_in,
            rows_out: df.height(),
            rows_dropped_missing,
            duplicates_removed,
            missing_before,
            missing_after,
            imputations,
            outliers,
        };
        info!(
            rows_out = summary.rows_out,
            dropped = summary.rows_dropped_missing,
            duplicates = summary.duplicates_removed,
            removed_pct = format!("{:.1}", summary.rows_removed_percentage()),
            "Cleaning complete"
        );

        Ok(CleanedTable { df, summary })
    }
}

/// Keep rows where every column in `columns` is present (not null, not NaN).
fn drop_missing(df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];
    for column in columns {
        for (flag, value) in keep.iter_mut().zip(numeric_values(df, column)?) {
            *flag &= value.is_some();
        }
    }
    if keep.iter().all(|k| *k) {
        return Ok(df.clone());
    }
    let mask = BooleanChunked::from_slice("mask".into(), &keep);
    Ok(df.filter(&mask)?)
}

/// Clean with default settings.
pub fn clean(raw: &DataFrame) -> Result<CleanedTable> {
    DataCleaner::default().clean(raw)
}
