//! Imputation module for handling missing values.
//!
//! Only median imputation is used: the education and urbanization columns are
//! filled before any row is dropped.

mod statistical;

pub use statistical::{ImputationRecord, StatisticalImputer};
