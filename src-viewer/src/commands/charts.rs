//! Chart Commands
//!
//! Select a chart from the catalogue, generate it from the current table,
//! and export the generated figure to an image file.
//!
//! # Events Emitted
//!
//! - `chart:generated` - Figure prepared, with its statistical summary
//! - `chart:exported` - Image written
//! - `app:status` - "Generated: <chart>" / "Plot saved to <path>"
//! - `app:error` - When an error occurs

use burden_charts::{ChartKind, FigureRenderer};
use burden_processing::reporting::sci;
use burden_processing::schema::DALYS;
use burden_processing::utils::present_values;
use burden_processing::{AnalysisResult, correlate, describe};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{ViewerError, reported};
use crate::events::{AppEventEmitter, ChartExportedPayload, ChartGeneratedPayload, EventSink};
use crate::state::{AppState, GeneratedChart};

/// Select a chart by name or 1-based menu number.
pub fn select_chart(
    state: &AppState,
    events: &dyn EventSink,
    choice: &str,
) -> Result<ChartKind, ViewerError> {
    let kind = reported(events, choice.parse::<ChartKind>().map_err(ViewerError::from))?;
    *state.selected.write() = Some(kind);

    let status = format!("Selected: {kind}");
    state.set_status(&status);
    events.emit_status(&status);
    Ok(kind)
}

/// Prepare the selected chart and its statistical summary.
///
/// Needs a loaded table and a selected chart. On failure the previously
/// generated chart stays available for export.
pub fn generate_chart(
    state: &AppState,
    events: &dyn EventSink,
) -> Result<GeneratedChart, ViewerError> {
    let generated = reported(events, generate(state))?;
    *state.generated.write() = Some(generated.clone());

    let status = format!("Generated: {}", generated.kind);
    state.set_status(&status);
    events.emit_chart_generated(ChartGeneratedPayload {
        chart: generated.kind,
        title: generated.figure.title.clone(),
        stats: generated.stats.clone(),
    });
    events.emit_status(&status);
    Ok(generated)
}

fn generate(state: &AppState) -> Result<GeneratedChart, ViewerError> {
    let table = state.table.read();
    let table = table.as_ref().ok_or(ViewerError::NoDataLoaded)?;
    let kind = (*state.selected.read()).ok_or(ViewerError::NoChartSelected)?;

    let figure = kind.prepare(&table.df, &state.prepare_options())?;
    let stats = chart_statistics(kind, &table.df);
    info!(chart = %kind, "Chart generated");

    Ok(GeneratedChart {
        kind,
        figure,
        stats,
    })
}

/// Render the generated chart to `path`, or to `<assets>/<chart_name>.png`.
///
/// The format follows the file extension; parent directories are created.
pub fn export_chart(
    state: &AppState,
    events: &dyn EventSink,
    renderer: &dyn FigureRenderer,
    path: Option<&Path>,
) -> Result<PathBuf, ViewerError> {
    let (kind, path) = reported(events, export(state, renderer, path))?;

    let status = format!("Plot saved to {}", path.display());
    state.set_status(&status);
    events.emit_chart_exported(ChartExportedPayload {
        chart: kind,
        path: path.clone(),
    });
    events.emit_status(&status);
    Ok(path)
}

fn export(
    state: &AppState,
    renderer: &dyn FigureRenderer,
    path: Option<&Path>,
) -> Result<(ChartKind, PathBuf), ViewerError> {
    let generated = state.generated.read();
    let generated = generated.as_ref().ok_or(ViewerError::NoChartGenerated)?;

    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_export_path(state, generated.kind),
    };
    renderer.render(&generated.figure, &path)?;
    info!("Plot saved to {}", path.display());
    Ok((generated.kind, path))
}

/// `<assets>/<chart_name_snake>.png`
pub fn default_export_path(state: &AppState, kind: ChartKind) -> PathBuf {
    state
        .config
        .read()
        .assets_dir
        .join(format!("{}.png", kind.snake_name()))
}

/// Summary text shown next to a chart.
///
/// Scatter charts lead with the Pearson correlation of their x column and
/// DALYs. A statistic that cannot be computed is reported inline rather than
/// failing the chart.
pub fn chart_statistics(kind: ChartKind, df: &DataFrame) -> String {
    let mut text = format!("Analysis of {kind}:\n");
    if let Err(e) = append_statistics(&mut text, kind, df) {
        text.push_str(&format!("\nStatistical analysis failed: {e}"));
    }
    text
}

fn append_statistics(text: &mut String, kind: ChartKind, df: &DataFrame) -> AnalysisResult<()> {
    if let Some(x_col) = kind.scatter_column() {
        let corr = correlate(df, x_col, DALYS)?;
        text.push_str(&format!(
            "Pearson correlation: {:.5} (p={})\n",
            corr.r,
            sci(corr.p_value, 3)
        ));
    }

    let summary = describe(&present_values(df, DALYS)?)?;
    text.push_str(&format!(
        "\nGlobal Statistics:\nMean DALYs: {:.1}\nMedian DALYs: {:.1}\nStd Dev: {:.1}",
        summary.mean, summary.median, summary.std_dev
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EVENT_CHART_EXPORTED, RecordingEvents};
    use crate::state::{LoadedTable, TableSource};
    use burden_charts::{ChartResult, Figure};
    use burden_processing::PipelineConfig;
    use parking_lot::Mutex;
    use polars::prelude::df;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingRenderer {
        paths: Mutex<Vec<PathBuf>>,
    }

    impl FigureRenderer for RecordingRenderer {
        fn render(&self, _figure: &Figure, path: &Path) -> ChartResult<()> {
            self.paths.lock().push(path.to_path_buf());
            Ok(())
        }
    }

    fn table() -> DataFrame {
        df![
            "DALYs" => [10.0, 20.0, 30.0, 40.0],
            "Per Capita Income (USD)" => [1.0, 2.0, 3.0, 4.0],
            "Year" => [2000i64, 2000, 2001, 2001],
        ]
        .unwrap()
    }

    fn loaded_state() -> AppState {
        let state = AppState::new(PipelineConfig::builder().assets_dir("out").build().unwrap());
        state.set_table(LoadedTable {
            df: table(),
            source: TableSource::EmbeddedSample,
            cleaning: None,
        });
        state
    }

    #[test]
    fn test_statistics_for_scatter_chart() {
        let text = chart_statistics(ChartKind::IncomeVsDalys, &table());
        assert_eq!(
            text,
            "Analysis of Income vs DALYs:\n\
             Pearson correlation: 1.00000 (p=0.000e+00)\n\
             \nGlobal Statistics:\n\
             Mean DALYs: 25.0\n\
             Median DALYs: 25.0\n\
             Std Dev: 12.9"
        );
    }

    #[test]
    fn test_statistics_failure_is_inline() {
        let df = df!["DALYs" => [1.0, 2.0]].unwrap();
        let text = chart_statistics(ChartKind::IncomeVsDalys, &df);
        assert!(text.starts_with("Analysis of Income vs DALYs:\n"));
        assert!(text.contains("Statistical analysis failed: Required column"));
        assert!(!text.contains("Global Statistics"));
    }

    #[test]
    fn test_generate_requires_data_then_selection() {
        let state = AppState::default();
        let events = RecordingEvents::new();
        assert!(matches!(
            generate_chart(&state, &events),
            Err(ViewerError::NoDataLoaded)
        ));

        let state = loaded_state();
        assert!(matches!(
            generate_chart(&state, &events),
            Err(ViewerError::NoChartSelected)
        ));
        assert_eq!(
            events.error_codes(),
            vec!["NO_DATA_LOADED", "NO_CHART_SELECTED"]
        );
    }

    #[test]
    fn test_generate_and_export_default_path() {
        let state = loaded_state();
        let events = RecordingEvents::new();
        let renderer = RecordingRenderer::default();

        select_chart(&state, &events, "13").unwrap();
        let generated = generate_chart(&state, &events).unwrap();
        assert_eq!(generated.kind, ChartKind::DalysOverTime);
        assert!(state.can_export());

        let path = export_chart(&state, &events, &renderer, None).unwrap();
        assert_eq!(path, PathBuf::from("out/dalys_over_time.png"));
        assert_eq!(*renderer.paths.lock(), vec![path.clone()]);
        assert_eq!(
            events.statuses(),
            vec![
                "Selected: DALYs Over Time".to_string(),
                "Generated: DALYs Over Time".to_string(),
                "Plot saved to out/dalys_over_time.png".to_string(),
            ]
        );
        assert!(events.names().contains(&EVENT_CHART_EXPORTED.to_string()));
    }

    #[test]
    fn test_failed_generate_keeps_previous_chart() {
        let state = loaded_state();
        let events = RecordingEvents::new();

        select_chart(&state, &events, "DALYs Over Time").unwrap();
        generate_chart(&state, &events).unwrap();
        select_chart(&state, &events, "DALYs by Gender").unwrap();
        let err = generate_chart(&state, &events).unwrap_err();

        assert_eq!(err.error_code(), "MISSING_COLUMN");
        assert_eq!(
            state.generated.read().as_ref().map(|g| g.kind),
            Some(ChartKind::DalysOverTime)
        );
    }

    #[test]
    fn test_export_before_generate() {
        let state = loaded_state();
        let events = RecordingEvents::new();
        let err = export_chart(&state, &events, &RecordingRenderer::default(), None).unwrap_err();
        assert_eq!(err.error_code(), "NO_CHART_GENERATED");
    }

    #[test]
    fn test_unknown_chart_selection() {
        let state = loaded_state();
        let events = RecordingEvents::new();
        let err = select_chart(&state, &events, "Pie Chart").unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_CHART");
        assert_eq!(*state.selected.read(), None);
    }
}
