//! The batch analysis pipeline.
//!
//! load → clean → save → regression report → correlation append. The report
//! is written in two steps: the regression sections overwrite the target,
//! then the healthcare correlations are appended.

use crate::cleaner::DataCleaner;
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::error::{AnalysisError, Result, ResultExt};
use crate::loader::{load_table, save_table};
use crate::pipeline::progress::{AnalysisStage, ProgressReporter, ProgressUpdate};
use crate::reporting::{AnalysisReport, FileSink, MemorySink, ReportSink};
use crate::statistics::{
    HealthcareCorrelations, RegressionFit, fit_regression, healthcare_correlations,
};
use crate::types::{CleanedTable, PipelineResult};
use polars::prelude::DataFrame;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Runs one analysis over a dataset.
///
/// ```rust,ignore
/// use burden_processing::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().save_to_disk(false).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run()?;
///
/// println!("{}", result.report.unwrap_or_default());
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: DataCleaner,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the configured input file and analyse it.
    pub fn run(&self) -> Result<PipelineResult> {
        let input = &self.config.input_path;
        self.enter(
            AnalysisStage::Loading,
            format!("Loading data from {}", input.display()),
        );
        let df = load_table(input).map_err(|e| self.fail(e))?;
        self.process(df)
    }

    /// Analyse an already-loaded raw table.
    ///
    /// The first error aborts the run; outputs written before it stay on disk.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        let result = self.analyse(df).map_err(|e| self.fail(e))?;
        self.notify(ProgressUpdate::complete("Analysis complete"));
        Ok(result)
    }

    fn enter(&self, stage: AnalysisStage, message: impl Into<String>) {
        self.notify(ProgressUpdate::entering(stage, message));
    }

    fn notify(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.reporter {
            reporter.report(update);
        }
    }

    fn fail(&self, e: AnalysisError) -> AnalysisError {
        error!(code = e.error_code(), "Analysis failed: {}", e);
        self.notify(ProgressUpdate::failed(&e));
        e
    }

    fn analyse(&self, df: DataFrame) -> Result<PipelineResult> {
        let started = Instant::now();

        self.enter(AnalysisStage::Cleaning, "Cleaning dataset...");
        let mut cleaned = self.cleaner.clean(&df)?;
        drop(df);

        let cleaned_data_path = if self.config.save_to_disk {
            let path = &self.config.cleaned_data_path;
            self.enter(AnalysisStage::Saving, "Saving cleaned data...");
            save_table(&mut cleaned.df, path)?;
            info!("Cleaned data saved to: {}", path.display());
            Some(path.clone())
        } else {
            None
        };

        self.enter(AnalysisStage::Analysis, "Running statistical analysis...");
        let regression = fit_regression(&cleaned.df).context("Fitting regression")?;
        info!(
            coefficients = ?regression.coefficients,
            intercept = regression.intercept,
            r_squared = regression.r_squared,
            "Regression fitted"
        );

        self.enter(AnalysisStage::Reporting, "Writing analysis report...");
        let (report, report_path, healthcare) = if self.config.save_to_disk {
            let path = &self.config.report_path;
            let (_, healthcare) = write_report(FileSink::new(path), &cleaned, &regression)?;
            info!("Full summary saved to: {}", path.display());
            (None, Some(path.clone()), healthcare)
        } else {
            let (sink, healthcare) = write_report(MemorySink::new(), &cleaned, &regression)?;
            (Some(sink.into_string()), None, healthcare)
        };

        Ok(PipelineResult {
            cleaned,
            regression,
            healthcare,
            report,
            cleaned_data_path,
            report_path,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }
}

/// Regression sections first, then the correlations computed and appended.
fn write_report<S: ReportSink>(
    sink: S,
    cleaned: &CleanedTable,
    regression: &RegressionFit,
) -> Result<(S, HealthcareCorrelations)> {
    let report = AnalysisReport::new(sink).write_regression(&cleaned.summary, regression)?;

    let healthcare =
        healthcare_correlations(&cleaned.df).context("Computing healthcare correlations")?;
    info!(
        access_r = healthcare.access.r,
        access_p = healthcare.access.p_value,
        beds_r = healthcare.beds.r,
        beds_p = healthcare.beds.p_value,
        "Healthcare correlations computed"
    );

    let sink = report.append_healthcare(&healthcare)?;
    Ok((sink, healthcare))
}

#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Defaults to [`PipelineConfig::default()`].
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Share a reporter with other owners.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.reporter = Some(Arc::new(callback));
        self
    }

    /// Validate the configuration and build the pipeline.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            cleaner: DataCleaner::with_outlier_multiplier(config.outlier_multiplier),
            config,
            reporter: self.reporter,
        })
    }
}
