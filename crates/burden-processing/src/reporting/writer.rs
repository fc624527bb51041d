//! Plain-text analysis report.
//!
//! The report is produced in two writes. [`AnalysisReport::write_regression`]
//! replaces the sink's content with the missing-value, outlier and regression
//! sections and hands back a [`RegressionReport`]; only that type can append the
//! healthcare correlations, so the second section can never precede the first.

use crate::error::Result;
use crate::reporting::sink::ReportSink;
use crate::statistics::{Correlation, HealthcareCorrelations, OutlierSummary, RegressionFit};
use crate::types::CleaningSummary;
use std::fmt::Write;

const MISSING_HEADER: &str = "========== MISSING DATA REPORT ==========";
const OUTLIER_HEADER: &str = "========== OUTLIER REPORT ==========";
const REGRESSION_HEADER: &str = "========== REGRESSION RESULTS ==========";
const HEALTHCARE_HEADER: &str = "========== HEALTHCARE INFRASTRUCTURE CORRELATIONS ==========";

/// A report that has not been written yet.
pub struct AnalysisReport<S: ReportSink> {
    sink: S,
}

/// A report holding the regression sections; the healthcare section may follow.
pub struct RegressionReport<S: ReportSink> {
    sink: S,
}

impl<S: ReportSink> AnalysisReport<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Overwrite the sink with missing values, outliers and regression results.
    pub fn write_regression(
        mut self,
        cleaning: &CleaningSummary,
        fit: &RegressionFit,
    ) -> Result<RegressionReport<S>> {
        self.sink.overwrite(&render_regression_sections(cleaning, fit))?;
        Ok(RegressionReport { sink: self.sink })
    }
}

impl<S: ReportSink> RegressionReport<S> {
    /// Append the healthcare correlations and return the sink.
    pub fn append_healthcare(mut self, correlations: &HealthcareCorrelations) -> Result<S> {
        self.sink.append(&render_healthcare_section(correlations))?;
        Ok(self.sink)
    }

    /// Stop without the healthcare section.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Text of the first write.
pub fn render_regression_sections(cleaning: &CleaningSummary, fit: &RegressionFit) -> String {
    let mut out = String::new();

    out.push_str(MISSING_HEADER);
    out.push('\n');
    out.push_str("\nBefore Cleaning:\n");
    out.push_str(&render_counts(&cleaning.missing_before));
    out.push_str("\n\nAfter Cleaning:\n");
    out.push_str(&render_counts(&cleaning.missing_after));
    out.push_str("\n\n");

    out.push_str(OUTLIER_HEADER);
    out.push('\n');
    out.push_str(&render_outliers(cleaning.outliers.as_ref()));
    out.push('\n');

    out.push_str(REGRESSION_HEADER);
    out.push('\n');
    let coefficients: Vec<String> = fit.coefficients.iter().map(|c| sci(*c, 8)).collect();
    let _ = writeln!(out, "Coefficients: [{}]", coefficients.join(" "));
    let _ = writeln!(out, "Intercept: {:.2}", fit.intercept);
    let _ = writeln!(
        out,
        "R² Score: {:.10}  (scientific: {})",
        fit.r_squared,
        sci(fit.r_squared, 2)
    );
    out
}

/// Text of the appended healthcare section.
pub fn render_healthcare_section(correlations: &HealthcareCorrelations) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(HEALTHCARE_HEADER);
    out.push('\n');
    out.push_str("Healthcare Access vs DALYs:\n");
    out.push_str(&render_correlation(&correlations.access));
    out.push_str("Hospital Beds per 1000 vs DALYs:\n");
    out.push_str(&render_correlation(&correlations.beds));
    out
}

fn render_correlation(c: &Correlation) -> String {
    format!("  Correlation: {:.4}, p-value: {}\n", c.r, sci(c.p_value, 4))
}

fn render_outliers(outliers: Option<&OutlierSummary>) -> String {
    match outliers {
        Some(o) => format!(
            "Lower Bound: {:.2}, Upper Bound: {:.2}\nOutliers Detected: {} rows\n",
            o.lower_bound, o.upper_bound, o.count
        ),
        None => "No rows available for outlier detection\n".to_string(),
    }
}

/// One `name  count` line per column, names left-aligned, counts right-aligned.
fn render_counts(counts: &[(String, usize)]) -> String {
    let name_width = counts.iter().map(|(n, _)| n.chars().count()).max().unwrap_or(0);
    let value_width = counts
        .iter()
        .map(|(_, c)| c.to_string().len())
        .max()
        .unwrap_or(1);
    counts
        .iter()
        .map(|(name, count)| format!("{name:<name_width$}    {count:>value_width$}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Scientific notation with a signed, at-least-two-digit exponent (`1.50e-05`).
pub fn sci(value: f64, precision: usize) -> String {
    let raw = format!("{value:.precision$e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::sink::MemorySink;
    use pretty_assertions::assert_eq;

    fn cleaning() -> CleaningSummary {
        CleaningSummary {
            rows_in: 7,
            rows_out: 6,
            rows_dropped_missing: 1,
            duplicates_removed: 0,
            missing_before: vec![("DALYs".to_string(), 1), ("Education Index".to_string(), 12)],
            missing_after: vec![("DALYs".to_string(), 0), ("Education Index".to_string(), 0)],
            imputations: vec![],
            outliers: Some(OutlierSummary {
                column: "DALYs".to_string(),
                q1: 2.25,
                q3: 4.75,
                iqr: 2.5,
                multiplier: 1.5,
                lower_bound: -1.5,
                upper_bound: 8.5,
                count: 1,
            }),
        }
    }

    fn fit() -> RegressionFit {
        RegressionFit {
            response: "DALYs".to_string(),
            predictors: vec!["a".into(), "b".into(), "c".into()],
            coefficients: vec![2.0, -0.000015, 0.0],
            intercept: 5.0,
            r_squared: 0.000123,
            n_observations: 6,
        }
    }

    fn correlation(r: f64, p_value: f64) -> Correlation {
        Correlation {
            x: "x".to_string(),
            y: "DALYs".to_string(),
            r,
            p_value,
            n: 6,
        }
    }

    #[test]
    fn test_sci_matches_python_layout() {
        assert_eq!(sci(0.000123, 2), "1.23e-04");
        assert_eq!(sci(12000.0, 2), "1.20e+04");
        assert_eq!(sci(0.5, 4), "5.0000e-01");
        assert_eq!(sci(0.0, 4), "0.0000e+00");
        assert_eq!(sci(1.5e-120, 1), "1.5e-120");
    }

    #[test]
    fn test_regression_sections() {
        let text = render_regression_sections(&cleaning(), &fit());
        let expected = "\
========== MISSING DATA REPORT ==========

Before Cleaning:
DALYs               1
Education Index    12

After Cleaning:
DALYs              0
Education Index    0

========== OUTLIER REPORT ==========
Lower Bound: -1.50, Upper Bound: 8.50
Outliers Detected: 1 rows

========== REGRESSION RESULTS ==========
Coefficients: [2.00000000e+00 -1.50000000e-05 0.00000000e+00]
Intercept: 5.00
R² Score: 0.0001230000  (scientific: 1.23e-04)
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_healthcare_section() {
        let text = render_healthcare_section(&HealthcareCorrelations {
            access: correlation(-0.01234, 0.5),
            beds: correlation(0.98766, 1.5e-8),
        });
        let expected = "
========== HEALTHCARE INFRASTRUCTURE CORRELATIONS ==========
Healthcare Access vs DALYs:
  Correlation: -0.0123, p-value: 5.0000e-01
Hospital Beds per 1000 vs DALYs:
  Correlation: 0.9877, p-value: 1.5000e-08
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_overwrite_then_append_order() {
        let mut sink = MemorySink::new();
        sink.overwrite("old content that must vanish").unwrap();

        let sink = AnalysisReport::new(sink)
            .write_regression(&cleaning(), &fit())
            .unwrap()
            .append_healthcare(&HealthcareCorrelations {
                access: correlation(0.1, 0.2),
                beds: correlation(0.3, 0.4),
            })
            .unwrap();

        let text = sink.contents();
        assert!(!text.contains("old content"));
        let regression = text.find(REGRESSION_HEADER).unwrap();
        let healthcare = text.find(HEALTHCARE_HEADER).unwrap();
        assert!(text.starts_with(MISSING_HEADER));
        assert!(regression < healthcare);
    }

    #[test]
    fn test_rewriting_replaces_previous_report() {
        let mut sink = MemorySink::new();
        let report = AnalysisReport::new(&mut sink)
            .write_regression(&cleaning(), &fit())
            .unwrap();
        report.into_sink();
        AnalysisReport::new(&mut sink)
            .write_regression(&cleaning(), &fit())
            .unwrap();
        assert_eq!(sink.contents().matches(MISSING_HEADER).count(), 1);
    }
}
