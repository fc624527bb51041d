//! Statistics over a cleaned table.
//!
//! - [`descriptive`]: count, mean, median, sample std and interpolated quantiles
//! - [`correlation`]: Pearson r with a Student's t p-value
//! - [`regression`]: OLS with intercept and in-sample R²
//! - [`outliers`]: Tukey IQR fences

pub mod correlation;
pub mod descriptive;
pub mod outliers;
pub mod regression;

pub use correlation::{Correlation, HealthcareCorrelations, correlate, healthcare_correlations};
pub use descriptive::{DescriptiveSummary, describe};
pub use outliers::{OutlierSummary, detect_outliers};
pub use regression::{RegressionFit, fit_regression};
