//! Event System for Session → Display Communication
//!
//! Command handlers never print. They push notifications through an
//! [`EventSink`], and the display decides what to show:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        COMMAND HANDLERS                         │
//! │                                                                 │
//! │   upload_data() ──► emit("data:loaded", DataLoadedPayload)      │
//! │   generate_chart() ──► emit("chart:generated", ChartPayload)    │
//! │   export_chart() ──► emit("chart:exported", ExportPayload)      │
//! │   every action ──► emit("app:status", StatusPayload)            │
//! │   failures ──► emit("app:error", ErrorPayload)                  │
//! │   batch run ──► emit("analysis:progress", ProgressUpdate)       │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//!              │                                  │
//!              ▼                                  ▼
//!      TerminalEvents (stdout)          RecordingEvents (tests)
//! ```

use burden_charts::ChartKind;
use burden_processing::ProgressUpdate;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::warn;

use crate::state::TableSource;

// ============================================================================
// EVENT NAME CONSTANTS
// ============================================================================

/// A cleaned table is in memory.
/// Payload: `DataLoadedPayload`
pub const EVENT_DATA_LOADED: &str = "data:loaded";

/// A chart was prepared along with its statistical summary.
/// Payload: `ChartGeneratedPayload`
pub const EVENT_CHART_GENERATED: &str = "chart:generated";

/// The current chart was written to disk.
/// Payload: `ChartExportedPayload`
pub const EVENT_CHART_EXPORTED: &str = "chart:exported";

/// The status line changed.
/// Payload: `StatusPayload`
pub const EVENT_STATUS: &str = "app:status";

/// An action failed. The session continues.
/// Payload: `ErrorPayload`
pub const EVENT_ERROR: &str = "app:error";

/// Batch pipeline progress.
/// Payload: `ProgressUpdate` from burden-processing
pub const EVENT_PROGRESS: &str = "analysis:progress";

// ============================================================================
// EVENT PAYLOADS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DataLoadedPayload {
    pub source: TableSource,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartGeneratedPayload {
    pub chart: ChartKind,
    pub title: String,
    /// Statistical summary text.
    pub stats: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartExportedPayload {
    pub chart: ChartKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusPayload {
    pub message: String,
}

/// Structured error for display in the status area.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    /// Error code for programmatic handling (e.g., "FILE_NOT_FOUND")
    pub code: String,
    /// Human-readable error message for display
    pub message: String,
}

// ============================================================================
// SINKS
// ============================================================================

/// Receives serialized events.
pub trait EventSink: Send + Sync {
    fn emit_value(&self, event: &str, payload: Value);
}

/// Helper trait for emitting typed events.
///
/// Implemented for every [`EventSink`], so handlers take `&dyn EventSink`
/// and call these methods directly.
///
/// ```rust,ignore
/// use crate::events::AppEventEmitter;
///
/// fn some_command(events: &dyn EventSink) {
///     events.emit_status("Loaded preprocessed data");
///     events.emit_error("MISSING_COLUMN", "Required column 'DALYs' not found in dataset");
/// }
/// ```
pub trait AppEventEmitter {
    fn emit_data_loaded(&self, payload: DataLoadedPayload);

    fn emit_chart_generated(&self, payload: ChartGeneratedPayload);

    fn emit_chart_exported(&self, payload: ChartExportedPayload);

    fn emit_status(&self, message: &str);

    fn emit_error(&self, code: &str, message: &str);

    fn emit_progress(&self, update: &ProgressUpdate);
}

impl<T: EventSink + ?Sized> AppEventEmitter for T {
    fn emit_data_loaded(&self, payload: DataLoadedPayload) {
        emit_serialized(self, EVENT_DATA_LOADED, &payload);
    }

    fn emit_chart_generated(&self, payload: ChartGeneratedPayload) {
        emit_serialized(self, EVENT_CHART_GENERATED, &payload);
    }

    fn emit_chart_exported(&self, payload: ChartExportedPayload) {
        emit_serialized(self, EVENT_CHART_EXPORTED, &payload);
    }

    fn emit_status(&self, message: &str) {
        let payload = StatusPayload {
            message: message.to_string(),
        };
        emit_serialized(self, EVENT_STATUS, &payload);
    }

    fn emit_error(&self, code: &str, message: &str) {
        let payload = ErrorPayload {
            code: code.to_string(),
            message: message.to_string(),
        };
        emit_serialized(self, EVENT_ERROR, &payload);
    }

    fn emit_progress(&self, update: &ProgressUpdate) {
        emit_serialized(self, EVENT_PROGRESS, update);
    }
}

fn emit_serialized<S: EventSink + ?Sized, P: Serialize>(sink: &S, event: &str, payload: &P) {
    match serde_json::to_value(payload) {
        Ok(value) => sink.emit_value(event, value),
        Err(e) => warn!("Failed to serialize {} event: {}", event, e),
    }
}

/// Prints events to the terminal.
#[derive(Debug, Default)]
pub struct TerminalEvents;

impl EventSink for TerminalEvents {
    fn emit_value(&self, event: &str, payload: Value) {
        let text = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        match event {
            EVENT_STATUS => {
                let time = chrono::Local::now().format("%H:%M:%S");
                println!("[{time}] {}", text("message"));
            }
            EVENT_ERROR => eprintln!("error [{}]: {}", text("code"), text("message")),
            EVENT_CHART_GENERATED => println!("\n{}\n", text("stats")),
            EVENT_DATA_LOADED => {
                let count = |key: &str| payload.get(key).and_then(Value::as_u64).unwrap_or(0);
                println!("{} rows x {} columns", count("rows"), count("columns"));
            }
            EVENT_PROGRESS => {
                let progress = payload.get("progress").and_then(Value::as_f64).unwrap_or(0.0);
                println!("[{:>3.0}%] {}", progress * 100.0, text("message"));
            }
            _ => {}
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().clone()
    }

    /// Names of the recorded events, in order.
    pub fn names(&self) -> Vec<String> {
        self.events.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    /// Messages of every `app:status` event, in order.
    pub fn statuses(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|(name, _)| name == EVENT_STATUS)
            .filter_map(|(_, payload)| payload.get("message")?.as_str().map(String::from))
            .collect()
    }

    /// Codes of every `app:error` event, in order.
    pub fn error_codes(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|(name, _)| name == EVENT_ERROR)
            .filter_map(|(_, payload)| payload.get("code")?.as_str().map(String::from))
            .collect()
    }
}

impl EventSink for RecordingEvents {
    fn emit_value(&self, event: &str, payload: Value) {
        self.events.lock().push((event.to_string(), payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burden_processing::AnalysisStage;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_recorder_keeps_order_and_payloads() {
        let events = RecordingEvents::new();
        events.emit_status("Loaded preprocessed data");
        events.emit_error("NO_DATA", "Please load data first");
        events.emit_progress(&ProgressUpdate::entering(AnalysisStage::Cleaning, "Cleaning"));

        assert_eq!(
            events.names(),
            vec![EVENT_STATUS, EVENT_ERROR, EVENT_PROGRESS]
        );
        assert_eq!(events.statuses(), vec!["Loaded preprocessed data"]);
        assert_eq!(events.error_codes(), vec!["NO_DATA"]);
    }

    #[test]
    fn test_payloads_serialize_chart_and_source() {
        let events = RecordingEvents::new();
        events.emit_data_loaded(DataLoadedPayload {
            source: TableSource::EmbeddedSample,
            rows: 3,
            columns: 2,
        });
        events.emit_chart_exported(ChartExportedPayload {
            chart: ChartKind::DalysHistogram,
            path: PathBuf::from("assets/dalys_histogram.png"),
        });

        let recorded = events.events();
        assert_eq!(recorded[0].1["source"]["kind"], "embedded_sample");
        assert_eq!(recorded[0].1["rows"], 3);
        assert_eq!(recorded[1].1["chart"], "dalys_histogram");
        assert_eq!(recorded[1].1["path"], "assets/dalys_histogram.png");
    }
}
