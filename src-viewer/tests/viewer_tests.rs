//! End-to-end viewer sessions over a temporary workspace.

use burden_charts::{ChartKind, ChartResult, Figure, FigureRenderer, PlottersRenderer};
use burden_processing::PipelineConfig;
use burden_viewer_lib::commands::{
    export_chart, generate_chart, load_cached_data, select_chart, upload_data,
};
use burden_viewer_lib::state::TableSource;
use burden_viewer_lib::{AppState, RecordingEvents};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SAMPLE: &str = include_str!("../assets/sample_health.csv");

struct NullRenderer;

impl FigureRenderer for NullRenderer {
    fn render(&self, _figure: &Figure, _path: &Path) -> ChartResult<()> {
        Ok(())
    }
}

fn workspace() -> (TempDir, PathBuf, PipelineConfig) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let raw = dir.path().join("raw.csv");
    std::fs::write(&raw, SAMPLE).expect("Failed to write raw file");
    let config = PipelineConfig::builder()
        .cleaned_data_path(dir.path().join("data/cleaned_data.csv"))
        .assets_dir(dir.path().join("assets"))
        .build()
        .expect("Failed to build config");
    (dir, raw, config)
}

#[test]
fn test_upload_saves_cleaned_table_for_next_session() {
    let (_dir, raw, config) = workspace();

    let first = AppState::new(config.clone());
    let events = RecordingEvents::new();
    let uploaded = upload_data(&first, &events, &raw).unwrap();
    assert_eq!(events.statuses(), vec!["Uploaded and processed: raw.csv"]);
    assert!(config.cleaned_data_path.exists());

    let second = AppState::new(config.clone());
    let events = RecordingEvents::new();
    let cached = load_cached_data(&second, &events).unwrap();

    assert_eq!(
        cached.source,
        TableSource::Cached(config.cleaned_data_path.clone())
    );
    assert_eq!(cached.rows, uploaded.rows);
    assert_eq!(cached.columns, uploaded.columns);
    assert_eq!(events.statuses(), vec!["Loaded preprocessed data"]);
}

#[test]
fn test_every_chart_generates_from_uploaded_data() {
    let (_dir, raw, config) = workspace();
    let state = AppState::new(config);
    let events = RecordingEvents::new();
    upload_data(&state, &events, &raw).unwrap();

    for kind in ChartKind::ALL {
        select_chart(&state, &events, kind.name()).unwrap();
        let generated = generate_chart(&state, &events)
            .unwrap_or_else(|e| panic!("{kind} failed: {e}"));
        assert!(generated.stats.contains("Mean DALYs:"), "{kind}");
        assert_eq!(
            generated.stats.contains("Pearson correlation:"),
            kind.scatter_column().is_some(),
            "{kind}"
        );
    }
    assert!(events.error_codes().is_empty());
}

#[test]
fn test_pdf_export_writes_document() {
    let (dir, raw, config) = workspace();
    let state = AppState::new(config);
    let events = RecordingEvents::new();
    upload_data(&state, &events, &raw).unwrap();
    select_chart(&state, &events, "Correlation Matrix").unwrap();
    generate_chart(&state, &events).unwrap();

    let target = dir.path().join("exports/matrix.pdf");
    let path = export_chart(&state, &events, &PlottersRenderer::default(), Some(&target)).unwrap();
    assert_eq!(path, target);
    let bytes = std::fs::read(&target).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(
        state.status(),
        format!("Plot saved to {}", target.display())
    );

    // The chart stays generated for another export.
    let path = export_chart(&state, &events, &NullRenderer, None).unwrap();
    assert_eq!(path, dir.path().join("assets/correlation_matrix.png"));
}
