//! Batch Analysis
//!
//! Runs the full pipeline (load, clean, save, regression report, correlation
//! append) and then renders every chart in the catalogue. The first error
//! aborts the run; files written before it stay on disk.

use burden_charts::{FigureRenderer, PrepareOptions, render_catalogue};
use burden_processing::{Pipeline, PipelineConfig, PipelineResult};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::commands::ViewerError;
use crate::events::{AppEventEmitter, EventSink};

/// Everything a batch run produced.
pub struct BatchOutcome {
    pub result: PipelineResult,
    /// Chart images in catalogue order.
    pub charts: Vec<PathBuf>,
}

/// Run the pipeline and render all charts into the configured assets directory.
pub fn run_batch(
    config: &PipelineConfig,
    events: Arc<dyn EventSink>,
    renderer: &dyn FigureRenderer,
) -> Result<BatchOutcome, ViewerError> {
    let progress = Arc::clone(&events);
    let pipeline = Pipeline::builder()
        .config(config.clone())
        .on_progress(move |update| progress.emit_progress(&update))
        .build()
        .map_err(burden_processing::AnalysisError::from)?;

    let result = pipeline.run()?;

    info!("Generating visualizations...");
    let charts = render_catalogue(
        &result.cleaned.df,
        &PrepareOptions::from(config),
        renderer,
        &config.assets_dir,
    )?;
    events.emit_status(&format!("Rendered {} charts", charts.len()));

    Ok(BatchOutcome { result, charts })
}

/// The "Results saved to" listing printed after a successful run.
pub fn saved_locations(outcome: &BatchOutcome, config: &PipelineConfig) -> Vec<String> {
    let mut lines = vec!["Results saved to:".to_string()];
    if let Some(path) = &outcome.result.cleaned_data_path {
        lines.push(format!("- Cleaned data: {}", path.display()));
    }
    if let Some(path) = &outcome.result.report_path {
        lines.push(format!("- Analysis results: {}", path.display()));
    }
    lines.push(format!("- Visualizations: {}/", config.assets_dir.display()));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EVENT_PROGRESS, RecordingEvents};
    use burden_charts::{ChartKind, ChartResult, Figure};
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;

    struct NullRenderer;

    impl FigureRenderer for NullRenderer {
        fn render(&self, _figure: &Figure, _path: &Path) -> ChartResult<()> {
            Ok(())
        }
    }

    fn config_in(dir: &TempDir, input: PathBuf) -> PipelineConfig {
        PipelineConfig::builder()
            .input_path(input)
            .cleaned_data_path(dir.path().join("data/cleaned_data.csv"))
            .report_path(dir.path().join("data/analysis_results.txt"))
            .assets_dir(dir.path().join("assets"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_batch_missing_input_fails_before_charts() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, dir.path().join("missing.csv"));
        let events = Arc::new(RecordingEvents::new());

        let err = run_batch(&config, events.clone(), &NullRenderer)
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
        assert!(!dir.path().join("data/analysis_results.txt").exists());
        assert!(events.names().iter().all(|name| name == EVENT_PROGRESS));
    }

    #[test]
    fn test_batch_renders_whole_catalogue() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("raw.csv");
        std::fs::write(&input, include_str!("../assets/sample_health.csv")).unwrap();
        let config = config_in(&dir, input);
        let events = Arc::new(RecordingEvents::new());

        let outcome = run_batch(&config, events.clone(), &NullRenderer).unwrap();
        let expected: Vec<PathBuf> = ChartKind::ALL
            .iter()
            .map(|k| config.assets_dir.join(k.file_name()))
            .collect();
        assert_eq!(outcome.charts, expected);
        assert_eq!(events.statuses(), vec!["Rendered 16 charts"]);

        let lines = saved_locations(&outcome, &config);
        assert_eq!(lines[0], "Results saved to:");
        assert_eq!(lines.len(), 4);
        assert!(lines[2].ends_with("analysis_results.txt"));
    }
}
