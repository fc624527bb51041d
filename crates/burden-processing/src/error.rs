//! Error types for the disease-burden analysis core.
//!
//! Errors fall into three kinds that callers react to differently:
//!
//! - [`ErrorKind::Input`]: the dataset or configuration is unusable (missing file,
//!   missing required column, unparseable `Year`).
//! - [`ErrorKind::StatisticalUndefined`]: a statistic cannot be computed for the
//!   data at hand (zero variance, too few values, empty table).
//! - [`ErrorKind::Io`]: an output could not be written.
//!
//! Errors are serializable so a front end can display `{code, kind, message}` records.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an [`AnalysisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Input,
    StatisticalUndefined,
    Io,
    Internal,
}

/// The main error type for loading, cleaning and analysing a dataset.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Input file does not exist.
    #[error("Data file not found at: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A column the analysis depends on is absent from the table.
    #[error("Required column '{0}' not found in dataset")]
    MissingColumn(String),

    /// A `Year` value could not be coerced to an integer.
    #[error("Column 'Year' has a non-integer value at row {row}: {value}")]
    InvalidYear { row: usize, value: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Column has no spread, so a z-score or correlation would divide by zero.
    #[error("Column '{0}' has zero variance; statistic is undefined")]
    ZeroVariance(String),

    /// Not enough values to compute a statistic.
    #[error("{context} needs at least {required} values, found {found}")]
    InsufficientData {
        context: String,
        required: usize,
        found: usize,
    },

    /// The table has no rows left to summarize.
    #[error("Table is empty: {0}")]
    EmptyTable(String),

    /// Regression design matrix has no unique least-squares solution.
    #[error("Regression design matrix is singular (collinear or constant predictors)")]
    SingularDesign,

    /// Equal-frequency binning produced repeated edges.
    #[error("Bin edges for '{0}' are not unique; too many tied values for tercile binning")]
    DuplicateBinEdges(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::MissingColumn(_) => "MISSING_COLUMN",
            Self::InvalidYear { .. } => "INVALID_YEAR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ZeroVariance(_) => "ZERO_VARIANCE",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::EmptyTable(_) => "EMPTY_TABLE",
            Self::SingularDesign => "SINGULAR_DESIGN",
            Self::DuplicateBinEdges(_) => "DUPLICATE_BIN_EDGES",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound(_)
            | Self::MissingColumn(_)
            | Self::InvalidYear { .. }
            | Self::InvalidConfig(_) => ErrorKind::Input,
            Self::ZeroVariance(_)
            | Self::InsufficientData { .. }
            | Self::EmptyTable(_)
            | Self::SingularDesign
            | Self::DuplicateBinEdges(_) => ErrorKind::StatisticalUndefined,
            Self::Io(_) => ErrorKind::Io,
            Self::Polars(_) | Self::Json(_) => ErrorKind::Internal,
            Self::WithContext { source, .. } => source.kind(),
        }
    }

    /// Check if this error was caused by the input data rather than the environment.
    pub fn is_input_error(&self) -> bool {
        self.kind() == ErrorKind::Input
    }
}

/// Errors are serialized as a struct with `code`, `kind` and `message` fields.
impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 3)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            AnalysisError::MissingColumn("DALYs".to_string()).error_code(),
            "MISSING_COLUMN"
        );
        assert_eq!(AnalysisError::SingularDesign.error_code(), "SINGULAR_DESIGN");
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            AnalysisError::InvalidYear {
                row: 3,
                value: "abc".to_string()
            }
            .kind(),
            ErrorKind::Input
        );
        assert_eq!(
            AnalysisError::ZeroVariance("x".to_string()).kind(),
            ErrorKind::StatisticalUndefined
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(AnalysisError::from(io).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_is_input_error() {
        assert!(AnalysisError::FileNotFound(PathBuf::from("missing.csv")).is_input_error());
        assert!(!AnalysisError::EmptyTable("describe".to_string()).is_input_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = AnalysisError::MissingColumn("Year".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("MISSING_COLUMN"));
        assert!(json.contains("\"kind\":\"input\""));
        assert!(json.contains("Year"));
    }

    #[test]
    fn test_with_context_preserves_code_and_kind() {
        let error = AnalysisError::ZeroVariance("Education Index".to_string())
            .with_context("While normalizing");
        assert!(error.to_string().contains("While normalizing"));
        assert_eq!(error.error_code(), "ZERO_VARIANCE");
        assert_eq!(error.kind(), ErrorKind::StatisticalUndefined);
    }
}
