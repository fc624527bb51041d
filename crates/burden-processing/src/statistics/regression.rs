//! Ordinary least squares with an intercept.
//!
//! The normal equations are built on mean-centered predictors, which removes the
//! intercept column and keeps the system well scaled when predictors live on very
//! different ranges (income in dollars next to an index in `[0, 1]`). The reduced
//! system is solved by Gaussian elimination with partial pivoting.

use crate::error::{AnalysisError, Result};
use crate::schema::{DALYS, REGRESSION_PREDICTORS};
use crate::statistics::descriptive::mean;
use crate::utils::numeric_values;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Relative pivot size below which the design is treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// A fitted linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionFit {
    pub response: String,
    /// Predictor names, in coefficient order.
    pub predictors: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// In-sample coefficient of determination.
    pub r_squared: f64,
    pub n_observations: usize,
}

impl RegressionFit {
    /// Evaluate the model at one predictor vector.
    pub fn predict(&self, x: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(x)
                .map(|(b, v)| b * v)
                .sum::<f64>()
    }
}

/// Regress DALYs on income, education and urbanization over the whole table.
pub fn fit_regression(df: &DataFrame) -> Result<RegressionFit> {
    fit_columns(df, DALYS, &REGRESSION_PREDICTORS)
}

/// Regress `response` on `predictors`, using rows where every value is present.
pub fn fit_columns(df: &DataFrame, response: &str, predictors: &[&str]) -> Result<RegressionFit> {
    let y_raw = numeric_values(df, response)?;
    let x_raw = predictors
        .iter()
        .map(|name| numeric_values(df, name))
        .collect::<Result<Vec<_>>>()?;

    let mut y = Vec::with_capacity(y_raw.len());
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(y_raw.len()); predictors.len()];
    for (row, target) in y_raw.iter().enumerate() {
        let Some(target) = target else { continue };
        let values: Option<Vec<f64>> = x_raw.iter().map(|col| col[row]).collect();
        if let Some(values) = values {
            y.push(*target);
            for (column, v) in columns.iter_mut().zip(values) {
                column.push(v);
            }
        }
    }

    let (coefficients, intercept, r_squared) = ols(&columns, &y)?;
    debug!(
        response,
        n = y.len(),
        r_squared,
        "fitted linear model"
    );

    Ok(RegressionFit {
        response: response.to_string(),
        predictors: predictors.iter().map(|p| p.to_string()).collect(),
        coefficients,
        intercept,
        r_squared,
        n_observations: y.len(),
    })
}

/// Fit `y ~ columns` and return `(coefficients, intercept, r_squared)`.
///
/// Every column must have the same length as `y`.
pub fn ols(columns: &[Vec<f64>], y: &[f64]) -> Result<(Vec<f64>, f64, f64)> {
    let p = columns.len();
    let n = y.len();
    if n < p + 1 {
        return Err(AnalysisError::InsufficientData {
            context: "Linear regression".to_string(),
            required: p + 1,
            found: n,
        });
    }

    let y_mean = mean(y).unwrap_or_default();
    let x_means: Vec<f64> = columns
        .iter()
        .map(|c| mean(c).unwrap_or_default())
        .collect();
    let centered: Vec<Vec<f64>> = columns
        .iter()
        .zip(&x_means)
        .map(|(c, m)| c.iter().map(|v| v - m).collect())
        .collect();

    // Augmented system [X'X | X'y] on centered data.
    let mut system = vec![vec![0.0; p + 1]; p];
    for i in 0..p {
        for j in i..p {
            let s: f64 = centered[i].iter().zip(&centered[j]).map(|(a, b)| a * b).sum();
            system[i][j] = s;
            system[j][i] = s;
        }
        system[i][p] = centered[i]
            .iter()
            .zip(y)
            .map(|(a, b)| a * (b - y_mean))
            .sum();
    }

    let coefficients = solve(system)?;
    let intercept = y_mean
        - coefficients
            .iter()
            .zip(&x_means)
            .map(|(b, m)| b * m)
            .sum::<f64>();

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (row, target) in y.iter().enumerate() {
        let fitted = intercept
            + coefficients
                .iter()
                .zip(columns)
                .map(|(b, c)| b * c[row])
                .sum::<f64>();
        ss_res += (target - fitted).powi(2);
        ss_tot += (target - y_mean).powi(2);
    }

    let r_squared = if ss_tot == 0.0 {
        if ss_res <= SINGULAR_TOLERANCE { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok((coefficients, intercept, r_squared))
}

/// Solve an augmented `p x (p + 1)` system in place.
fn solve(mut a: Vec<Vec<f64>>) -> Result<Vec<f64>> {
    let p = a.len();
    let scale = (0..p).map(|i| a[i][i].abs()).fold(0.0_f64, f64::max);
    if p > 0 && scale == 0.0 {
        return Err(AnalysisError::SingularDesign);
    }

    for col in 0..p {
        let pivot_row = (col..p)
            .max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() <= SINGULAR_TOLERANCE * scale {
            return Err(AnalysisError::SingularDesign);
        }
        a.swap(col, pivot_row);

        for row in col + 1..p {
            let factor = a[row][col] / a[col][col];
            for k in col..=p {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    let mut x = vec![0.0; p];
    for row in (0..p).rev() {
        let tail: f64 = (row + 1..p).map(|k| a[row][k] * x[k]).sum();
        x[row] = (a[row][p] - tail) / a[row][row];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EDUCATION, INCOME, URBANIZATION};
    use polars::prelude::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_recovers_exact_linear_relationship() {
        let income = [100.0, 250.0, 400.0, 800.0, 1200.0, 3000.0, 50.0];
        let education = [0.2, 0.9, 0.4, 0.7, 0.1, 0.5, 0.3];
        let urbanization = [10.0, 35.0, 80.0, 20.0, 55.0, 40.0, 90.0];
        let dalys: Vec<f64> = income.iter().map(|x| 2.0 * x + 5.0).collect();
        let df = df!(
            DALYS => dalys,
            INCOME => income,
            EDUCATION => education,
            URBANIZATION => urbanization
        )
        .unwrap();

        let fit = fit_regression(&df).unwrap();
        assert_close(fit.coefficients[0], 2.0);
        assert_close(fit.coefficients[1], 0.0);
        assert_close(fit.coefficients[2], 0.0);
        assert_close(fit.intercept, 5.0);
        assert_close(fit.r_squared, 1.0);
        assert_eq!(fit.n_observations, 7);
        assert_eq!(fit.predictors, vec![INCOME, EDUCATION, URBANIZATION]);
    }

    #[test]
    fn test_simple_regression_with_noise() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 5.0, 4.0];
        let (coef, intercept, r2) = ols(&[x], &y).unwrap();
        assert_close(coef[0], 0.7);
        assert_close(intercept, 2.0);
        // ss_res = 2.3, ss_tot = 4.75
        assert_close(r2, 1.0 - 2.3 / 4.75);
    }

    #[test]
    fn test_too_few_rows() {
        let err = ols(&[vec![1.0, 2.0], vec![3.0, 1.0], vec![0.0, 5.0]], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData { required: 4, found: 2, .. }
        ));
    }

    #[test]
    fn test_collinear_predictors_are_singular() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let b: Vec<f64> = a.iter().map(|v| v * 3.0).collect();
        let err = ols(&[a, b], &[1.0, 3.0, 2.0, 5.0, 4.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::SingularDesign));
    }

    #[test]
    fn test_constant_predictor_is_singular() {
        let err = ols(&[vec![2.0; 5]], &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::SingularDesign));
    }

    #[test]
    fn test_constant_response_perfect_fit() {
        let (coef, intercept, r2) = ols(&[vec![1.0, 2.0, 3.0]], &[4.0, 4.0, 4.0]).unwrap();
        assert_close(coef[0], 0.0);
        assert_close(intercept, 4.0);
        assert_eq!(r2, 1.0);
    }

    #[test]
    fn test_rows_with_missing_values_are_skipped() {
        let df = df!(
            "y" => [Some(3.0), Some(5.0), None, Some(9.0), Some(11.0)],
            "x" => [Some(1.0), Some(2.0), Some(3.0), Some(4.0), None]
        )
        .unwrap();
        let fit = fit_columns(&df, "y", &["x"]).unwrap();
        assert_eq!(fit.n_observations, 3);
        assert_close(fit.coefficients[0], 2.0);
        assert_close(fit.predict(&[10.0]), 21.0);
    }
}
