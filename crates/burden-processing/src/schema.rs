//! Column names of the disease-burden dataset.

pub const DALYS: &str = "DALYs";
pub const INCOME: &str = "Per Capita Income (USD)";
pub const EDUCATION: &str = "Education Index";
pub const URBANIZATION: &str = "Urbanization Rate (%)";
pub const YEAR: &str = "Year";
pub const COUNTRY: &str = "Country";
pub const DISEASE_CATEGORY: &str = "Disease Category";
pub const GENDER: &str = "Gender";
pub const AGE_GROUP: &str = "Age Group";
pub const TREATMENT_TYPE: &str = "Treatment Type";
pub const HEALTHCARE_ACCESS: &str = "Healthcare Access (%)";
pub const HOSPITAL_BEDS: &str = "Hospital Beds per 1000";
pub const DOCTORS: &str = "Doctors per 1000";

// Derived by the cleaner.
pub const INCOME_NORM: &str = "Income_Norm";
pub const EDUCATION_NORM: &str = "Education_Norm";
pub const URBANIZATION_NORM: &str = "Urbanization_Norm";
pub const DISEASE_TYPE: &str = "Disease Type";
pub const INCOME_GROUP: &str = "Income Group";

/// Columns every raw input must provide.
pub const REQUIRED_COLUMNS: [&str; 13] = [
    DALYS,
    INCOME,
    EDUCATION,
    URBANIZATION,
    YEAR,
    COUNTRY,
    DISEASE_CATEGORY,
    GENDER,
    AGE_GROUP,
    TREATMENT_TYPE,
    HEALTHCARE_ACCESS,
    HOSPITAL_BEDS,
    DOCTORS,
];

/// Columns appended by the cleaner, in the order they are added.
pub const DERIVED_COLUMNS: [&str; 5] = [
    INCOME_NORM,
    EDUCATION_NORM,
    URBANIZATION_NORM,
    DISEASE_TYPE,
    INCOME_GROUP,
];

/// Columns whose missing values are filled with the median.
pub const IMPUTED_COLUMNS: [&str; 2] = [EDUCATION, URBANIZATION];

/// Rows missing any of these are dropped; they are never imputed.
pub const NON_IMPUTABLE_COLUMNS: [&str; 2] = [DALYS, INCOME];

/// Regression predictors, in coefficient order.
pub const REGRESSION_PREDICTORS: [&str; 3] = [INCOME, EDUCATION, URBANIZATION];

/// Source and target column of each z-score.
pub const NORMALIZED_PAIRS: [(&str, &str); 3] = [
    (INCOME, INCOME_NORM),
    (EDUCATION, EDUCATION_NORM),
    (URBANIZATION, URBANIZATION_NORM),
];

/// Disease categories classified as communicable. Matching is exact and
/// case-sensitive; anything else is non-communicable.
pub const COMMUNICABLE_CATEGORIES: [&str; 4] = ["Parasitic", "Viral", "Bacterial", "Infectious"];

pub const INFECTIOUS: &str = "Infectious";
pub const NON_COMMUNICABLE: &str = "Non-Communicable";

/// Income tercile labels, lowest first.
pub const INCOME_GROUP_LABELS: [&str; 3] = ["Low", "Medium", "High"];
