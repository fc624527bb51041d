//! Reading and writing the record table.

use crate::error::{AnalysisError, Result, ResultExt};
use crate::schema::REQUIRED_COLUMNS;
use crate::utils::{missing_counts, require_columns};
use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Rows sampled for CSV schema inference.
const INFER_SCHEMA_ROWS: usize = 1000;

/// Shape, dtypes and missing counts of a table, as logged after loading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub dtypes: Vec<(String, String)>,
    pub missing: Vec<(String, usize)>,
}

impl DatasetOverview {
    pub fn of(df: &DataFrame) -> Self {
        Self {
            rows: df.height(),
            columns: df.width(),
            dtypes: df
                .get_columns()
                .iter()
                .map(|c| (c.name().to_string(), format!("{:?}", c.dtype())))
                .collect(),
            missing: missing_counts(df),
        }
    }

    /// Total number of missing cells.
    pub fn total_missing(&self) -> usize {
        self.missing.iter().map(|(_, n)| n).sum()
    }

    fn log(&self, label: &str) {
        info!(
            rows = self.rows,
            columns = self.columns,
            missing = self.total_missing(),
            "{label}"
        );
        for (name, dtype) in &self.dtypes {
            debug!(column = %name, dtype = %dtype, "column type");
        }
        for (name, count) in self.missing.iter().filter(|(_, n)| *n > 0) {
            debug!(column = %name, missing = count, "missing values");
        }
    }
}

/// Load a CSV dataset and check that every required column is present.
///
/// Extra columns are kept. A missing required column fails here, before any
/// derivation runs.
pub fn load_table(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AnalysisError::FileNotFound(path.to_path_buf()));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .try_into_reader_with_file_path(Some(path.into()))
        .context(format!("Opening {}", path.display()))?
        .finish()
        .context(format!("Parsing {}", path.display()))?;

    validated(df, &path.display().to_string())
}

/// Load a dataset from CSV text held in memory.
pub fn load_table_from_str(csv: &str) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .into_reader_with_file_handle(Cursor::new(csv.as_bytes().to_vec()))
        .finish()
        .context("Parsing in-memory dataset")?;

    validated(df, "in-memory dataset")
}

fn validated(df: DataFrame, source: &str) -> Result<DataFrame> {
    require_columns(&df, &REQUIRED_COLUMNS)?;
    DatasetOverview::of(&df).log(&format!("Loaded {source}"));
    Ok(df)
}

/// Write a table as CSV with a header row, creating parent directories.
pub fn save_table(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(format!("Creating {}", parent.display()))?;
    }

    let mut file = File::create(path).context(format!("Creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(df)
        .context(format!("Writing {}", path.display()))?;

    info!(path = %path.display(), rows = df.height(), "Saved table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DALYS, YEAR};

    const HEADER: &str = "DALYs,Per Capita Income (USD),Education Index,Urbanization Rate (%),Year,Country,Disease Category,Gender,Age Group,Treatment Type,Healthcare Access (%),Hospital Beds per 1000,Doctors per 1000";

    fn csv(rows: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text.push('\n');
        text
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_table("definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, AnalysisError::FileNotFound(_)));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_load_from_str_keeps_extra_columns() {
        let text = csv(&["100.5,2000,0.5,40,2010,India,Viral,Male,0-18,Vaccination,60,1.2,0.8"])
            .replacen(HEADER, &format!("{HEADER},Notes"), 1)
            .replace("0.8\n", "0.8,note\n");
        let df = load_table_from_str(&text).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 14);
        assert!(df.column("Notes").is_ok());
    }

    #[test]
    fn test_missing_required_column() {
        let text = "DALYs,Year\n1.0,2000\n";
        let err = load_table_from_str(text).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn(ref c) if c == "Per Capita Income (USD)"));
        assert_eq!(err.error_code(), "MISSING_COLUMN");
    }

    #[test]
    fn test_overview_counts_missing() {
        let text = csv(&[
            "100.5,2000,,40,2010,India,Viral,Male,0-18,Vaccination,60,1.2,0.8",
            ",3000,0.7,,2011,Brazil,Cancer,Female,19-35,Surgery,70,2.0,1.5",
        ]);
        let df = load_table_from_str(&text).unwrap();
        let overview = DatasetOverview::of(&df);
        assert_eq!(overview.rows, 2);
        assert_eq!(overview.columns, 13);
        assert_eq!(overview.total_missing(), 3);
        let dalys = overview.missing.iter().find(|(n, _)| n == DALYS).unwrap();
        assert_eq!(dalys.1, 1);
    }

    #[test]
    fn test_save_creates_parent_dirs_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/cleaned.csv");
        let mut df = load_table_from_str(&csv(&[
            "100.5,2000,0.5,40,2010,India,Viral,Male,0-18,Vaccination,60,1.2,0.8",
        ]))
        .unwrap();

        save_table(&mut df, &path).unwrap();
        let reloaded = load_table(&path).unwrap();
        assert_eq!(reloaded.height(), 1);
        assert_eq!(
            reloaded.column(YEAR).unwrap().dtype(),
            df.column(YEAR).unwrap().dtype()
        );
    }
}
