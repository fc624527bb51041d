//! Derived columns: z-scores, disease type and income terciles.
//!
//! Every derivation overwrites its target column, so running it twice gives the
//! same table.

use crate::error::{AnalysisError, Result};
use crate::schema::{
    COMMUNICABLE_CATEGORIES, DISEASE_CATEGORY, DISEASE_TYPE, INCOME, INCOME_GROUP,
    INCOME_GROUP_LABELS, INFECTIOUS, NON_COMMUNICABLE, NORMALIZED_PAIRS,
};
use crate::statistics::descriptive::{mean, quantile_sorted, sample_std};
use crate::utils::{numeric_values, sorted, string_values};
use polars::prelude::*;
use tracing::debug;

// =============================================================================
// Normalization
// =============================================================================

/// Add `Income_Norm`, `Education_Norm` and `Urbanization_Norm`.
///
/// An empty table gets empty columns.
pub fn add_normalized_columns(df: &mut DataFrame) -> Result<()> {
    for (source, target) in NORMALIZED_PAIRS {
        let values = numeric_values(df, source)?;
        let scores = if df.height() == 0 {
            Vec::new()
        } else {
            zscores(&values, source)?
        };
        df.with_column(Series::new(target.into(), scores))?;
    }
    Ok(())
}

/// `(x - mean) / std` with the sample standard deviation. Missing stays missing.
pub fn zscores(values: &[Option<f64>], column: &str) -> Result<Vec<Option<f64>>> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let (Some(m), Some(sd)) = (mean(&present), sample_std(&present)) else {
        return Err(AnalysisError::ZeroVariance(column.to_string()));
    };
    if sd == 0.0 || !sd.is_finite() {
        return Err(AnalysisError::ZeroVariance(column.to_string()));
    }
    Ok(values.iter().map(|v| v.map(|x| (x - m) / sd)).collect())
}

// =============================================================================
// Disease Type
// =============================================================================

/// Map a disease category to `Infectious` or `Non-Communicable`.
///
/// Matching is exact; missing and unknown categories are non-communicable.
pub fn classify_disease(category: Option<&str>) -> &'static str {
    match category {
        Some(c) if COMMUNICABLE_CATEGORIES.contains(&c) => INFECTIOUS,
        _ => NON_COMMUNICABLE,
    }
}

/// Add (or rewrite) the `Disease Type` column.
pub fn add_disease_type(df: &mut DataFrame) -> Result<()> {
    let types: Vec<&str> = string_values(df, DISEASE_CATEGORY)?
        .iter()
        .map(|c| classify_disease(c.as_deref()))
        .collect();
    df.with_column(Series::new(DISEASE_TYPE.into(), types))?;
    Ok(())
}

// =============================================================================
// Income Terciles
// =============================================================================

/// Edges at the 0, 1/3, 2/3 and 1 quantiles. Repeated edges are an error.
pub fn tercile_edges(values: &[f64], column: &str) -> Result<Option<[f64; 4]>> {
    let values = sorted(values);
    let edges = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0].map(|q| quantile_sorted(&values, q));
    let [Some(e0), Some(e1), Some(e2), Some(e3)] = edges else {
        return Ok(None);
    };
    let edges = [e0, e1, e2, e3];
    if edges.windows(2).any(|w| w[0] >= w[1]) {
        return Err(AnalysisError::DuplicateBinEdges(column.to_string()));
    }
    Ok(Some(edges))
}

/// Bin a value into `Low`, `Medium` or `High`.
///
/// Bins are right-closed and the lowest edge is included, so a value on a
/// boundary lands in the lower bin.
pub fn income_group(value: f64, edges: &[f64; 4]) -> &'static str {
    if value <= edges[1] {
        INCOME_GROUP_LABELS[0]
    } else if value <= edges[2] {
        INCOME_GROUP_LABELS[1]
    } else {
        INCOME_GROUP_LABELS[2]
    }
}

/// Add (or rewrite) the `Income Group` column from income terciles.
pub fn add_income_group(df: &mut DataFrame) -> Result<()> {
    let incomes = numeric_values(df, INCOME)?;
    let present: Vec<f64> = incomes.iter().flatten().copied().collect();

    let groups: Vec<Option<&str>> = match tercile_edges(&present, INCOME)? {
        Some(edges) => {
            debug!(?edges, "income tercile edges");
            incomes
                .iter()
                .map(|v| v.map(|x| income_group(x, &edges)))
                .collect()
        }
        None => vec![None; incomes.len()],
    };

    df.with_column(Series::new(INCOME_GROUP.into(), groups))?;
    Ok(())
}

/// Add every derived feature, in order.
pub fn derive_features(df: &mut DataFrame) -> Result<()> {
    add_normalized_columns(df)?;
    add_disease_type(df)?;
    add_income_group(df)?;
    Ok(())
}
