//! Configuration types for the analysis pipeline.
//!
//! Output locations, sampling and outlier settings are carried explicitly in
//! [`PipelineConfig`] instead of living in process-wide constants, so the core
//! can run in tests without touching the filesystem.

use crate::error::{AnalysisError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the raw dataset.
pub const DEFAULT_INPUT_PATH: &str = "data/Global Health Statistics.csv";
/// Default location of the cleaned-data export.
pub const DEFAULT_CLEANED_DATA_PATH: &str = "data/cleaned_data.csv";
/// Default location of the plain-text analysis report.
pub const DEFAULT_REPORT_PATH: &str = "data/analysis_results.txt";
/// Default directory for chart images.
pub const DEFAULT_ASSETS_DIR: &str = "assets";

/// Configuration for the analysis pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API. Missing fields in a JSON config file fall back to defaults.
///
/// # Example
///
/// ```rust,ignore
/// use burden_processing::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .input_path("data/raw.csv")
///     .sample_seed(Some(7))
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw CSV to analyse.
    /// Default: "data/Global Health Statistics.csv"
    pub input_path: PathBuf,

    /// Where the cleaned table (with derived columns) is written.
    /// Default: "data/cleaned_data.csv"
    pub cleaned_data_path: PathBuf,

    /// Where the analysis report is written.
    /// Default: "data/analysis_results.txt"
    pub report_path: PathBuf,

    /// Directory receiving one image per chart.
    /// Default: "assets"
    pub assets_dir: PathBuf,

    /// Whisker multiplier for the IQR outlier rule.
    /// Default: 1.5
    pub outlier_multiplier: f64,

    /// Maximum number of rows drawn for scatter-style charts.
    /// Default: 5000
    pub sample_size: usize,

    /// Seed for scatter thinning. `None` draws a fresh sample each run.
    /// Default: Some(42)
    pub sample_seed: Option<u64>,

    /// Whether to write the cleaned CSV and the report to disk.
    /// When false, the report is kept in memory on the pipeline result.
    /// Default: true
    pub save_to_disk: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            cleaned_data_path: PathBuf::from(DEFAULT_CLEANED_DATA_PATH),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            outlier_multiplier: 1.5,
            sample_size: 5000,
            sample_seed: Some(42),
            save_to_disk: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Read a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .context(format!("Reading config file {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&raw)?;
        config
            .validate()
            .map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Turn this configuration back into a builder so individual fields can be overridden.
    pub fn to_builder(&self) -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            input_path: Some(self.input_path.clone()),
            cleaned_data_path: Some(self.cleaned_data_path.clone()),
            report_path: Some(self.report_path.clone()),
            assets_dir: Some(self.assets_dir.clone()),
            outlier_multiplier: Some(self.outlier_multiplier),
            sample_size: Some(self.sample_size),
            sample_seed: Some(self.sample_seed),
            save_to_disk: Some(self.save_to_disk),
        }
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if !self.outlier_multiplier.is_finite() || self.outlier_multiplier <= 0.0 {
            return Err(ConfigValidationError::InvalidOutlierMultiplier(
                self.outlier_multiplier,
            ));
        }

        if self.sample_size == 0 {
            return Err(ConfigValidationError::InvalidSampleSize(self.sample_size));
        }

        for (field, path) in [
            ("cleaned_data_path", &self.cleaned_data_path),
            ("report_path", &self.report_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigValidationError::EmptyPath(field.to_string()));
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid outlier multiplier: {0} (must be a positive number)")]
    InvalidOutlierMultiplier(f64),

    #[error("Invalid sample size: {0} (must be at least 1)")]
    InvalidSampleSize(usize),

    #[error("Path for '{0}' must not be empty")]
    EmptyPath(String),
}

impl From<ConfigValidationError> for AnalysisError {
    fn from(err: ConfigValidationError) -> Self {
        AnalysisError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    input_path: Option<PathBuf>,
    cleaned_data_path: Option<PathBuf>,
    report_path: Option<PathBuf>,
    assets_dir: Option<PathBuf>,
    outlier_multiplier: Option<f64>,
    sample_size: Option<usize>,
    sample_seed: Option<Option<u64>>,
    save_to_disk: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the raw dataset location.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set where the cleaned CSV is written.
    pub fn cleaned_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cleaned_data_path = Some(path.into());
        self
    }

    /// Set where the analysis report is written.
    pub fn report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    /// Set the chart output directory.
    pub fn assets_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.assets_dir = Some(path.into());
        self
    }

    /// Set the IQR whisker multiplier.
    pub fn outlier_multiplier(mut self, multiplier: f64) -> Self {
        self.outlier_multiplier = Some(multiplier);
        self
    }

    /// Set the maximum number of rows drawn for scatter charts.
    pub fn sample_size(mut self, size: usize) -> Self {
        self.sample_size = Some(size);
        self
    }

    /// Set the scatter sampling seed (`None` for unseeded sampling).
    pub fn sample_seed(mut self, seed: Option<u64>) -> Self {
        self.sample_seed = Some(seed);
        self
    }

    /// Enable or disable writing outputs to disk.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            cleaned_data_path: self.cleaned_data_path.unwrap_or(defaults.cleaned_data_path),
            report_path: self.report_path.unwrap_or(defaults.report_path),
            assets_dir: self.assets_dir.unwrap_or(defaults.assets_dir),
            outlier_multiplier: self
                .outlier_multiplier
                .unwrap_or(defaults.outlier_multiplier),
            sample_size: self.sample_size.unwrap_or(defaults.sample_size),
            sample_seed: self.sample_seed.unwrap_or(defaults.sample_seed),
            save_to_disk: self.save_to_disk.unwrap_or(defaults.save_to_disk),
        };

        config.validate()?;
        Ok(config)
    }
}
