//! `Year` coercion to a 64-bit integer column.

use crate::error::{AnalysisError, Result};
use crate::schema::YEAR;
use crate::utils::{DtypeCategory, get_dtype_category, numeric_values, series, string_values};
use polars::prelude::*;

/// Rewrite the `Year` column as `Int64`.
///
/// Integer columns are cast. Float columns must hold finite whole numbers.
/// Text must parse as an integer after trimming; a trailing `.0` is accepted.
/// Any missing or unparseable value fails with the offending row.
pub fn coerce_year(df: &mut DataFrame) -> Result<()> {
    let dtype = series(df, YEAR)?.dtype().clone();
    let years = match get_dtype_category(&dtype) {
        DtypeCategory::Integer => {
            let column = series(df, YEAR)?;
            if let Some(row) = first_null(column) {
                return Err(invalid(row, "null"));
            }
            column.cast(&DataType::Int64)?
        }
        DtypeCategory::Float => {
            let values = numeric_values(df, YEAR)?;
            let years = values
                .iter()
                .enumerate()
                .map(|(row, v)| match v {
                    Some(x) if x.is_finite() && x.fract() == 0.0 => Ok(*x as i64),
                    Some(x) => Err(invalid(row, &x.to_string())),
                    None => Err(invalid(row, "null")),
                })
                .collect::<Result<Vec<i64>>>()?;
            Series::new(YEAR.into(), years)
        }
        DtypeCategory::String | DtypeCategory::Other => {
            let years = string_values(df, YEAR)?
                .iter()
                .enumerate()
                .map(|(row, v)| match v {
                    Some(text) => parse_year(text).ok_or_else(|| invalid(row, text)),
                    None => Err(invalid(row, "null")),
                })
                .collect::<Result<Vec<i64>>>()?;
            Series::new(YEAR.into(), years)
        }
    };

    df.replace(YEAR, years)?;
    Ok(())
}

/// Parse a textual year such as `"2015"`, `" 2015 "` or `"2015.0"`.
pub fn parse_year(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.strip_suffix(".0")?.parse::<i64>().ok())
}

fn first_null(column: &Series) -> Option<usize> {
    if column.null_count() == 0 {
        return None;
    }
    column.is_null().into_iter().position(|v| v == Some(true))
}

fn invalid(row: usize, value: &str) -> AnalysisError {
    AnalysisError::InvalidYear {
        row,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn years(df: &DataFrame) -> Vec<Option<i64>> {
        df.column(YEAR).unwrap().i64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2015"), Some(2015));
        assert_eq!(parse_year("  1999 "), Some(1999));
        assert_eq!(parse_year("2001.0"), Some(2001));
        assert_eq!(parse_year("2001.5"), None);
        assert_eq!(parse_year("abc"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn test_integer_column_is_cast() {
        let mut df = df!(YEAR => [2000i32, 2001, 2002]).unwrap();
        coerce_year(&mut df).unwrap();
        assert_eq!(df.column(YEAR).unwrap().dtype(), &DataType::Int64);
        assert_eq!(years(&df), vec![Some(2000), Some(2001), Some(2002)]);
    }

    #[test]
    fn test_whole_floats_accepted() {
        let mut df = df!(YEAR => [2000.0, 2010.0]).unwrap();
        coerce_year(&mut df).unwrap();
        assert_eq!(years(&df), vec![Some(2000), Some(2010)]);
    }

    #[test]
    fn test_fractional_float_rejected() {
        let mut df = df!(YEAR => [2000.0, 2010.5]).unwrap();
        let err = coerce_year(&mut df).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidYear { row: 1, ref value } if value == "2010.5"));
    }

    #[test]
    fn test_strings_parsed() {
        let mut df = df!(YEAR => [" 2003", "2004.0", "2005"]).unwrap();
        coerce_year(&mut df).unwrap();
        assert_eq!(years(&df), vec![Some(2003), Some(2004), Some(2005)]);
    }

    #[test]
    fn test_bad_string_names_row_and_value() {
        let mut df = df!(YEAR => ["2003", "twenty", "2005"]).unwrap();
        let err = coerce_year(&mut df).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidYear { row: 1, ref value } if value == "twenty"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_null_year_rejected() {
        let mut df = df!(YEAR => [Some(2000i64), None]).unwrap();
        let err = coerce_year(&mut df).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidYear { row: 1, ref value } if value == "null"));
    }

    #[test]
    fn test_idempotent_on_int64() {
        let mut df = df!(YEAR => [1990i64, 1991]).unwrap();
        coerce_year(&mut df).unwrap();
        coerce_year(&mut df).unwrap();
        assert_eq!(years(&df), vec![Some(1990), Some(1991)]);
    }
}
