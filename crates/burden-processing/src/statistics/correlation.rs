//! Pearson correlation with a two-sided significance test.

use crate::error::{AnalysisError, Result};
use crate::schema::{DALYS, HEALTHCARE_ACCESS, HOSPITAL_BEDS};
use crate::statistics::descriptive::mean;
use crate::utils::paired_values;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Pearson coefficient between two columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub x: String,
    pub y: String,
    pub r: f64,
    pub p_value: f64,
    /// Number of complete pairs used.
    pub n: usize,
}

/// `1 - r²` at or below this counts as a perfect fit.
const PERFECT_FIT_TOLERANCE: f64 = 1e-12;

/// Correlations between healthcare infrastructure and burden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthcareCorrelations {
    pub access: Correlation,
    pub beds: Correlation,
}

/// Correlate two columns, skipping rows where either value is missing.
pub fn correlate(df: &DataFrame, x_col: &str, y_col: &str) -> Result<Correlation> {
    let (xs, ys) = paired_values(df, x_col, y_col)?;
    let (r, p_value) = pearson(&xs, &ys, x_col, y_col)?;
    Ok(Correlation {
        x: x_col.to_string(),
        y: y_col.to_string(),
        r,
        p_value,
        n: xs.len(),
    })
}

/// Healthcare access and hospital beds, each against DALYs.
pub fn healthcare_correlations(df: &DataFrame) -> Result<HealthcareCorrelations> {
    Ok(HealthcareCorrelations {
        access: correlate(df, HEALTHCARE_ACCESS, DALYS)?,
        beds: correlate(df, HOSPITAL_BEDS, DALYS)?,
    })
}

/// Pearson r and two-sided p-value of paired samples.
///
/// The p-value comes from Student's t with `n - 2` degrees of freedom. Two
/// points always line up, so `n == 2` yields `p = 1`; a perfect fit on more
/// points yields `p = 0`.
pub fn pearson(xs: &[f64], ys: &[f64], x_label: &str, y_label: &str) -> Result<(f64, f64)> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return Err(AnalysisError::InsufficientData {
            context: format!("Correlation of '{x_label}' and '{y_label}'"),
            required: 2,
            found: n,
        });
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);

    let mx = mean(xs).unwrap_or_default();
    let my = mean(ys).unwrap_or_default();
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 {
        return Err(AnalysisError::ZeroVariance(x_label.to_string()));
    }
    if syy == 0.0 {
        return Err(AnalysisError::ZeroVariance(y_label.to_string()));
    }

    let r = (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0);
    Ok((r, two_sided_p(r, n)))
}

fn two_sided_p(r: f64, n: usize) -> f64 {
    if n == 2 {
        return 1.0;
    }
    let residual = 1.0 - r * r;
    if residual <= PERFECT_FIT_TOLERANCE {
        return 0.0;
    }
    let dof = (n - 2) as f64;
    let t = r * (dof / residual).sqrt();
    match StudentsT::new(0.0, 1.0, dof) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}
