//! The fixed catalogue of sixteen charts.
//!
//! Each entry has a display name, an image file name, a title and the columns
//! it reads. Charts are addressed by name (case-insensitive) or by their
//! 1-based position in [`ChartKind::ALL`].

use crate::error::{ChartError, Result};
use crate::figure::Figure;
use crate::prepare::{self, PrepareOptions};
use burden_processing::schema::{
    AGE_GROUP, COUNTRY, DALYS, DISEASE_CATEGORY, DOCTORS, EDUCATION, GENDER, HEALTHCARE_ACCESS,
    HOSPITAL_BEDS, INCOME, INCOME_GROUP, TREATMENT_TYPE, URBANIZATION, YEAR,
};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    DalysHistogram,
    DalysByGender,
    DalysByAgeGroup,
    DalysByCategory,
    DalysByDiseaseType,
    IncomeVsDalys,
    EducationVsDalys,
    UrbanizationVsDalys,
    CorrelationMatrix,
    DalysByTreatment,
    TopCountries,
    DalysVsDoctors,
    DalysOverTime,
    DalysOverTimeByIncome,
    DalysVsHospitalBeds,
    DalysVsHealthcareAccess,
}

impl ChartKind {
    /// Every chart, in menu order.
    pub const ALL: [ChartKind; 16] = [
        Self::DalysHistogram,
        Self::DalysByGender,
        Self::DalysByAgeGroup,
        Self::DalysByCategory,
        Self::DalysByDiseaseType,
        Self::IncomeVsDalys,
        Self::EducationVsDalys,
        Self::UrbanizationVsDalys,
        Self::CorrelationMatrix,
        Self::DalysByTreatment,
        Self::TopCountries,
        Self::DalysVsDoctors,
        Self::DalysOverTime,
        Self::DalysOverTimeByIncome,
        Self::DalysVsHospitalBeds,
        Self::DalysVsHealthcareAccess,
    ];

    /// Name shown in the chart menu.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DalysHistogram => "DALYs Histogram",
            Self::DalysByGender => "DALYs by Gender",
            Self::DalysByAgeGroup => "DALYs by Age Group",
            Self::DalysByCategory => "DALYs by Disease Category",
            Self::DalysByDiseaseType => "DALYs by Disease Type",
            Self::IncomeVsDalys => "Income vs DALYs",
            Self::EducationVsDalys => "Education vs DALYs",
            Self::UrbanizationVsDalys => "Urbanization vs DALYs",
            Self::CorrelationMatrix => "Correlation Matrix",
            Self::DalysByTreatment => "DALYs by Treatment",
            Self::TopCountries => "Top Countries by DALYs",
            Self::DalysVsDoctors => "DALYs vs Doctors",
            Self::DalysOverTime => "DALYs Over Time",
            Self::DalysOverTimeByIncome => "DALYs Over Time by Income",
            Self::DalysVsHospitalBeds => "DALYs vs Hospital Beds",
            Self::DalysVsHealthcareAccess => "DALYs vs Healthcare Access",
        }
    }

    /// Image file written by the batch run.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::DalysHistogram => "dalys_histogram.png",
            Self::DalysByGender => "dalys_by_gender.png",
            Self::DalysByAgeGroup => "dalys_by_age_group.png",
            Self::DalysByCategory => "dalys_by_category.png",
            Self::DalysByDiseaseType => "dalys_by_disease_type.png",
            Self::IncomeVsDalys => "income_regression.png",
            Self::EducationVsDalys => "education_vs_dalys.png",
            Self::UrbanizationVsDalys => "urbanization_vs_dalys.png",
            Self::CorrelationMatrix => "correlation_matrix.png",
            Self::DalysByTreatment => "dalys_by_treatment.png",
            Self::TopCountries => "top_countries_dalys.png",
            Self::DalysVsDoctors => "dalys_vs_doctors.png",
            Self::DalysOverTime => "dalys_over_time.png",
            Self::DalysOverTimeByIncome => "dalys_time_income.png",
            Self::DalysVsHospitalBeds => "dalys_vs_beds.png",
            Self::DalysVsHealthcareAccess => "dalys_vs_access.png",
        }
    }

    /// Title drawn above the plot.
    pub fn title(&self) -> &'static str {
        match self {
            Self::DalysHistogram => "Distribution of DALYs",
            Self::DalysByGender => "Average DALYs by Gender",
            Self::DalysByAgeGroup => "DALYs by Age Group",
            Self::DalysByCategory => "Average DALYs by Disease Category",
            Self::DalysByDiseaseType => "DALYs by Disease Type",
            Self::IncomeVsDalys => "Income vs DALYs with Regression Line",
            Self::EducationVsDalys => "DALYs vs Education Index",
            Self::UrbanizationVsDalys => "DALYs vs Urbanization Rate",
            Self::CorrelationMatrix => "Correlation Matrix",
            Self::DalysByTreatment => "DALYs by Treatment Type",
            Self::TopCountries => "Top 10 Countries by Avg DALYs",
            Self::DalysVsDoctors => "DALYs vs Doctor Availability",
            Self::DalysOverTime => "Average DALYs Over Time",
            Self::DalysOverTimeByIncome => "DALYs Over Time by Income Group",
            Self::DalysVsHospitalBeds => "DALYs vs Hospital Beds per 1000",
            Self::DalysVsHealthcareAccess => "DALYs vs Healthcare Access (%)",
        }
    }

    /// Columns the chart reads.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Self::DalysHistogram => &[DALYS],
            Self::DalysByGender => &[GENDER, DALYS],
            Self::DalysByAgeGroup => &[AGE_GROUP, DALYS],
            Self::DalysByCategory | Self::DalysByDiseaseType => &[DISEASE_CATEGORY, DALYS],
            Self::IncomeVsDalys => &[INCOME, DALYS],
            Self::EducationVsDalys => &[EDUCATION, DALYS, DISEASE_CATEGORY],
            Self::UrbanizationVsDalys => &[URBANIZATION, DALYS, DISEASE_CATEGORY],
            Self::CorrelationMatrix => &[DALYS, INCOME, EDUCATION, URBANIZATION],
            Self::DalysByTreatment => &[TREATMENT_TYPE, DALYS],
            Self::TopCountries => &[COUNTRY, DALYS],
            Self::DalysVsDoctors => &[DOCTORS, DALYS, DISEASE_CATEGORY],
            Self::DalysOverTime => &[YEAR, DALYS],
            Self::DalysOverTimeByIncome => &[YEAR, INCOME_GROUP, DALYS],
            Self::DalysVsHospitalBeds => &[HOSPITAL_BEDS, DALYS],
            Self::DalysVsHealthcareAccess => &[HEALTHCARE_ACCESS, DALYS],
        }
    }

    /// The x column of scatter charts, whose Pearson r the viewer reports.
    pub fn scatter_column(&self) -> Option<&'static str> {
        match self {
            Self::IncomeVsDalys => Some(INCOME),
            Self::EducationVsDalys => Some(EDUCATION),
            Self::UrbanizationVsDalys => Some(URBANIZATION),
            Self::DalysVsDoctors => Some(DOCTORS),
            Self::DalysVsHospitalBeds => Some(HOSPITAL_BEDS),
            Self::DalysVsHealthcareAccess => Some(HEALTHCARE_ACCESS),
            _ => None,
        }
    }

    /// 1-based menu position.
    pub fn number(&self) -> usize {
        Self::ALL
            .iter()
            .position(|kind| kind == self)
            .map_or(0, |i| i + 1)
    }

    pub fn from_number(number: usize) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Lower-cased name with spaces as underscores (`dalys_by_gender`).
    pub fn snake_name(&self) -> String {
        self.name().to_lowercase().replace(' ', "_")
    }

    /// Check the required columns, then build the figure.
    pub fn prepare(&self, df: &DataFrame, options: &PrepareOptions) -> Result<Figure> {
        if let Some(column) = self
            .required_columns()
            .iter()
            .find(|column| df.column(column).is_err())
        {
            return Err(ChartError::MissingColumn {
                chart: self.name().to_string(),
                column: (*column).to_string(),
            });
        }
        prepare::figure(*self, df, options)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a menu number or a chart name.
impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        let found = match s.trim().parse::<usize>() {
            Ok(number) => Self::from_number(number),
            Err(_) => Self::from_name(s),
        };
        found.ok_or_else(|| ChartError::UnknownChart(s.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_catalogue_entries_are_unique() {
        let names: HashSet<_> = ChartKind::ALL.iter().map(|k| k.name()).collect();
        let files: HashSet<_> = ChartKind::ALL.iter().map(|k| k.file_name()).collect();
        assert_eq!(names.len(), 16);
        assert_eq!(files.len(), 16);
        assert!(ChartKind::ALL.iter().all(|k| k.file_name().ends_with(".png")));
    }

    #[test]
    fn test_numbers_round_trip() {
        for (i, kind) in ChartKind::ALL.iter().enumerate() {
            assert_eq!(kind.number(), i + 1);
            assert_eq!(ChartKind::from_number(i + 1), Some(*kind));
        }
        assert_eq!(ChartKind::from_number(0), None);
        assert_eq!(ChartKind::from_number(17), None);
    }

    #[test]
    fn test_parse_name_or_number() {
        assert_eq!(
            "dalys over time by income".parse::<ChartKind>().unwrap(),
            ChartKind::DalysOverTimeByIncome
        );
        assert_eq!(" 9 ".parse::<ChartKind>().unwrap(), ChartKind::CorrelationMatrix);

        let err = "Pie Chart".parse::<ChartKind>().unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_CHART");
        assert!("0".parse::<ChartKind>().is_err());
    }

    #[test]
    fn test_snake_name() {
        assert_eq!(ChartKind::DalysByAgeGroup.snake_name(), "dalys_by_age_group");
        assert_eq!(ChartKind::IncomeVsDalys.snake_name(), "income_vs_dalys");
    }

    #[test]
    fn test_scatter_columns() {
        let scatter: Vec<_> = ChartKind::ALL
            .iter()
            .filter(|k| k.scatter_column().is_some())
            .collect();
        assert_eq!(scatter.len(), 6);
        assert_eq!(ChartKind::DalysByGender.scatter_column(), None);
    }

    #[test]
    fn test_prepare_reports_missing_column() {
        let df = df!["DALYs" => [1.0, 2.0]].unwrap();
        let err = ChartKind::DalysByGender
            .prepare(&df, &PrepareOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ChartError::MissingColumn { ref column, .. } if column == "Gender"
        ));
    }
}
