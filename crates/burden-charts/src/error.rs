//! Error types for chart preparation and rendering.

use burden_processing::{AnalysisError, ErrorKind};
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    /// No catalogue entry matches the requested name or number.
    #[error("Unknown chart: '{0}'")]
    UnknownChart(String),

    /// The table lacks a column the chart plots.
    #[error("Chart '{chart}' requires column '{column}'")]
    MissingColumn { chart: String, column: String },

    /// Nothing left to plot after dropping missing values.
    #[error("Chart '{0}' has no data to plot")]
    NoData(String),

    /// Export extension outside png, svg and pdf.
    #[error("Unsupported export format: '{0}' (supported: png, svg, pdf)")]
    UnsupportedFormat(String),

    /// The drawing backend failed.
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChartError {
    /// Get error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownChart(_) => "UNKNOWN_CHART",
            Self::MissingColumn { .. } => "MISSING_COLUMN",
            Self::NoData(_) => "NO_DATA",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::Render(_) => "RENDER_ERROR",
            Self::Analysis(e) => e.error_code(),
            Self::Polars(_) => "POLARS_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Classify the error using the analysis core's kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownChart(_) | Self::MissingColumn { .. } | Self::UnsupportedFormat(_) => {
                ErrorKind::Input
            }
            Self::NoData(_) => ErrorKind::StatisticalUndefined,
            Self::Analysis(e) => e.kind(),
            Self::Io(_) => ErrorKind::Io,
            Self::Render(_) | Self::Polars(_) => ErrorKind::Internal,
        }
    }
}

impl Serialize for ChartError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ChartError", 3)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for chart operations.
pub type Result<T> = std::result::Result<T, ChartError>;

/// Map any drawing-backend error into [`ChartError::Render`].
pub(crate) fn render_error<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Render(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_errors_keep_their_code() {
        let err = ChartError::from(AnalysisError::ZeroVariance("DALYs".to_string()));
        assert_eq!(err.error_code(), "ZERO_VARIANCE");
        assert_eq!(err.kind(), ErrorKind::StatisticalUndefined);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&ChartError::UnsupportedFormat("jpg".into())).unwrap();
        assert!(json.contains("\"code\":\"UNSUPPORTED_FORMAT\""));
        assert!(json.contains("\"kind\":\"input\""));
    }
}
