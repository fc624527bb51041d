//! Viewer Session State
//!
//! All session data lives here. Command handlers read and replace it; the
//! shell only renders what they return.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                           AppState                             │
//! ├──────────────────────────────┬─────────────────────────────────┤
//! │  table: RwLock               │  selected: RwLock               │
//! │  ┌────────────────────────┐  │  Option<ChartKind>              │
//! │  │ LoadedTable            │  │                                 │
//! │  │ - df (cleaned)         │  ├─────────────────────────────────┤
//! │  │ - source               │  │  generated: RwLock              │
//! │  │ - cleaning summary     │  │  ┌───────────────────────────┐  │
//! │  └────────────────────────┘  │  │ GeneratedChart            │  │
//! ├──────────────────────────────┤  │ - kind, figure, stats     │  │
//! │  config: RwLock              │  └───────────────────────────┘  │
//! │  PipelineConfig (paths,      ├─────────────────────────────────┤
//! │  sample size, seed)          │  status: RwLock<String>         │
//! └──────────────────────────────┴─────────────────────────────────┘
//! ```
//!
//! # Thread Safety
//!
//! Every field sits behind a `parking_lot::RwLock`, so the state can be
//! shared with whatever drives the session.

use burden_charts::{ChartKind, Figure, PrepareOptions};
use burden_processing::{CleaningSummary, PipelineConfig};
use parking_lot::RwLock;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Status line shown before any action has run.
pub const READY_STATUS: &str = "Ready";

/// Where the table in memory came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum TableSource {
    /// A raw file that was cleaned on upload.
    Uploaded(PathBuf),
    /// A cleaned CSV read back from disk.
    Cached(PathBuf),
    /// The sample dataset compiled into the binary.
    EmbeddedSample,
}

impl fmt::Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uploaded(path) => write!(f, "uploaded {}", path.display()),
            Self::Cached(path) => write!(f, "cached {}", path.display()),
            Self::EmbeddedSample => f.write_str("embedded sample"),
        }
    }
}

/// A cleaned table and where it came from.
pub struct LoadedTable {
    pub df: DataFrame,
    pub source: TableSource,
    /// Present when the table was cleaned in this session.
    pub cleaning: Option<CleaningSummary>,
}

/// The last chart generated, ready for export.
#[derive(Debug, Clone)]
pub struct GeneratedChart {
    pub kind: ChartKind,
    pub figure: Figure,
    /// Statistical summary shown next to the chart.
    pub stats: String,
}

/// Snapshot of the session for the `status` command.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub status: String,
    pub source: Option<TableSource>,
    pub rows: usize,
    pub columns: usize,
    pub selected: Option<ChartKind>,
    pub generated: Option<ChartKind>,
    pub can_generate: bool,
    pub can_export: bool,
}

/// Shared session state.
pub struct AppState {
    pub table: RwLock<Option<LoadedTable>>,
    pub selected: RwLock<Option<ChartKind>>,
    pub generated: RwLock<Option<GeneratedChart>>,
    pub config: RwLock<PipelineConfig>,
    pub status: RwLock<String>,
}

impl AppState {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            table: RwLock::new(None),
            selected: RwLock::new(None),
            generated: RwLock::new(None),
            config: RwLock::new(config),
            status: RwLock::new(READY_STATUS.to_string()),
        }
    }

    /// Generating needs a table in memory.
    pub fn can_generate(&self) -> bool {
        self.table.read().is_some()
    }

    /// Exporting needs a generated chart.
    pub fn can_export(&self) -> bool {
        self.generated.read().is_some()
    }

    /// Replace the table. Any generated chart belonged to the old table and is dropped.
    pub fn set_table(&self, table: LoadedTable) {
        *self.table.write() = Some(table);
        *self.generated.write() = None;
    }

    pub fn set_status(&self, status: impl Into<String>) {
        *self.status.write() = status.into();
    }

    pub fn status(&self) -> String {
        self.status.read().clone()
    }

    pub fn prepare_options(&self) -> PrepareOptions {
        PrepareOptions::from(&*self.config.read())
    }

    pub fn session_info(&self) -> SessionInfo {
        let table = self.table.read();
        let (source, rows, columns) = match table.as_ref() {
            Some(t) => (Some(t.source.clone()), t.df.height(), t.df.width()),
            None => (None, 0, 0),
        };
        SessionInfo {
            status: self.status(),
            source,
            rows,
            columns,
            selected: *self.selected.read(),
            generated: self.generated.read().as_ref().map(|g| g.kind),
            can_generate: table.is_some(),
            can_export: self.can_export(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burden_charts::Plot;
    use polars::prelude::df;
    use pretty_assertions::assert_eq;

    fn chart() -> GeneratedChart {
        GeneratedChart {
            kind: ChartKind::DalysOverTime,
            figure: Figure::new("t", "x", "y", Plot::Lines { traces: vec![] }),
            stats: String::new(),
        }
    }

    #[test]
    fn test_new_state_gates_actions() {
        let state = AppState::default();
        assert!(!state.can_generate());
        assert!(!state.can_export());
        assert_eq!(state.status(), READY_STATUS);
    }

    #[test]
    fn test_new_table_drops_generated_chart() {
        let state = AppState::default();
        *state.generated.write() = Some(chart());
        assert!(state.can_export());

        state.set_table(LoadedTable {
            df: df!["DALYs" => [1.0]].unwrap(),
            source: TableSource::EmbeddedSample,
            cleaning: None,
        });
        assert!(state.can_generate());
        assert!(!state.can_export());
    }

    #[test]
    fn test_session_info_reflects_table() {
        let state = AppState::default();
        state.set_table(LoadedTable {
            df: df!["DALYs" => [1.0, 2.0], "Year" => [2000, 2001]].unwrap(),
            source: TableSource::Cached(PathBuf::from("data/cleaned_data.csv")),
            cleaning: None,
        });
        *state.selected.write() = Some(ChartKind::DalysHistogram);

        let info = state.session_info();
        assert_eq!(info.rows, 2);
        assert_eq!(info.columns, 2);
        assert_eq!(info.selected, Some(ChartKind::DalysHistogram));
        assert!(info.can_generate);
        assert!(!info.can_export);
    }
}
