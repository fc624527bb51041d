//! File I/O Commands
//!
//! Getting a cleaned table into the session:
//! - `upload_data` loads a raw CSV, cleans it and auto-saves the result
//! - `load_cached_data` reads the cleaned CSV written by an earlier run, or
//!   cleans the embedded sample when there is none
//!
//! # Events Emitted
//!
//! - `data:loaded` - When a table replaces the current one
//! - `app:status` - Status line after success
//! - `app:error` - When an error occurs

use burden_processing::{clean, load_table, load_table_from_str, save_table};
use std::path::Path;
use tracing::{debug, info};

use super::{ViewerError, reported};
use crate::events::{AppEventEmitter, DataLoadedPayload, EventSink};
use crate::state::{AppState, LoadedTable, TableSource};

/// Sample dataset used when no cleaned file exists yet.
const SAMPLE_CSV: &str = include_str!("../../assets/sample_health.csv");

/// Load and clean a raw CSV, save the cleaned table, and make it current.
///
/// The cleaned table is written to the configured cleaned-data path so a
/// later `load_cached_data` picks it up.
pub fn upload_data(
    state: &AppState,
    events: &dyn EventSink,
    path: &Path,
) -> Result<DataLoadedPayload, ViewerError> {
    reported(events, upload(state, path)).map(|table| {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        loaded(state, events, table, &format!("Uploaded and processed: {file_name}"))
    })
}

fn upload(state: &AppState, path: &Path) -> Result<LoadedTable, ViewerError> {
    let raw = load_table(path)?;
    let mut cleaned = clean(&raw)?;

    let cleaned_path = state.config.read().cleaned_data_path.clone();
    save_table(&mut cleaned.df, &cleaned_path)?;
    info!("Cleaned data saved to {}", cleaned_path.display());

    Ok(LoadedTable {
        df: cleaned.df,
        source: TableSource::Uploaded(path.to_path_buf()),
        cleaning: Some(cleaned.summary),
    })
}

/// Make the cached cleaned table current, falling back to the embedded sample.
pub fn load_cached_data(
    state: &AppState,
    events: &dyn EventSink,
) -> Result<DataLoadedPayload, ViewerError> {
    reported(events, load_cached(state)).map(|table| {
        let status = match &table.source {
            TableSource::EmbeddedSample => "Loaded sample data",
            _ => "Loaded preprocessed data",
        };
        loaded(state, events, table, status)
    })
}

fn load_cached(state: &AppState) -> Result<LoadedTable, ViewerError> {
    let cleaned_path = state.config.read().cleaned_data_path.clone();
    if cleaned_path.exists() {
        let df = load_table(&cleaned_path)?;
        return Ok(LoadedTable {
            df,
            source: TableSource::Cached(cleaned_path),
            cleaning: None,
        });
    }

    debug!(
        "No cleaned data at {}, cleaning embedded sample",
        cleaned_path.display()
    );
    let cleaned = clean(&load_table_from_str(SAMPLE_CSV)?)?;
    Ok(LoadedTable {
        df: cleaned.df,
        source: TableSource::EmbeddedSample,
        cleaning: Some(cleaned.summary),
    })
}

/// Store the table, then notify.
fn loaded(
    state: &AppState,
    events: &dyn EventSink,
    table: LoadedTable,
    status: &str,
) -> DataLoadedPayload {
    let payload = DataLoadedPayload {
        source: table.source.clone(),
        rows: table.df.height(),
        columns: table.df.width(),
    };
    state.set_table(table);
    state.set_status(status);

    events.emit_data_loaded(payload.clone());
    events.emit_status(status);
    payload
}
