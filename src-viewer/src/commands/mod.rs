//! Viewer Command Modules
//!
//! Each viewer action is a plain function over [`AppState`](crate::state::AppState)
//! and an [`EventSink`](crate::events::EventSink):
//!
//! - **file_io**: uploading a raw file, loading cached or sample data
//! - **charts**: selecting, generating and exporting charts
//!
//! A failing action emits an `app:error` event and returns the error; the
//! session state is left as it was before the action.

pub mod charts;
pub mod file_io;

pub use charts::*;
pub use file_io::*;

use burden_charts::ChartError;
use burden_processing::{AnalysisError, ErrorKind};
use serde::Serialize;
use serde::ser::SerializeStruct;

use crate::events::{AppEventEmitter, EventSink};

/// Error codes for failures that belong to the viewer itself.
pub mod error_codes {
    /// Generate was requested before any data was loaded
    pub const NO_DATA_LOADED: &str = "NO_DATA_LOADED";

    /// Generate was requested before a chart was selected
    pub const NO_CHART_SELECTED: &str = "NO_CHART_SELECTED";

    /// Export was requested before a chart was generated
    pub const NO_CHART_GENERATED: &str = "NO_CHART_GENERATED";

    /// The shell did not recognise the command
    pub const UNKNOWN_COMMAND: &str = "UNKNOWN_COMMAND";
}

/// Failure of a single viewer action.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("Please load data first")]
    NoDataLoaded,

    #[error("Please select a valid plot type")]
    NoChartSelected,

    #[error("Generate a plot before exporting")]
    NoChartGenerated,

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Chart(#[from] ChartError),
}

impl ViewerError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoDataLoaded => error_codes::NO_DATA_LOADED,
            Self::NoChartSelected => error_codes::NO_CHART_SELECTED,
            Self::NoChartGenerated => error_codes::NO_CHART_GENERATED,
            Self::Analysis(e) => e.error_code(),
            Self::Chart(e) => e.error_code(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoDataLoaded | Self::NoChartSelected | Self::NoChartGenerated => {
                ErrorKind::Input
            }
            Self::Analysis(e) => e.kind(),
            Self::Chart(e) => e.kind(),
        }
    }
}

impl Serialize for ViewerError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ViewerError", 3)?;
        state.serialize_field("code", self.error_code())?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Emit `app:error` for a failed action and pass the result through.
pub(crate) fn reported<T>(
    events: &dyn EventSink,
    result: Result<T, ViewerError>,
) -> Result<T, ViewerError> {
    result.inspect_err(|e| events.emit_error(e.error_code(), &e.to_string()))
}
