//! Report generation module.
//!
//! The analysis report is plain text written through a [`ReportSink`]:
//! [`FileSink`] for the on-disk report, [`MemorySink`] for tests and for runs
//! that keep outputs in memory.
//!
//! # Example
//!
//! ```rust,ignore
//! use burden_processing::reporting::{AnalysisReport, FileSink};
//!
//! let sink = AnalysisReport::new(FileSink::new("data/analysis_results.txt"))
//!     .write_regression(&cleaned.summary, &fit)?
//!     .append_healthcare(&correlations)?;
//! ```

mod sink;
mod writer;

pub use sink::{FileSink, MemorySink, ReportSink};
pub use writer::{
    AnalysisReport, RegressionReport, render_healthcare_section, render_regression_sections, sci,
};
