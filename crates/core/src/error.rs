use crate::constants::{INVALID_CREATININE_MESSAGE, PEDIATRIC_ADVISORY};

#[derive(Debug, thiserror::Error)]
pub enum EgfrError {
    /// Creatinine was not a finite number or was not positive.
    #[error("{}: '{input}'", INVALID_CREATININE_MESSAGE)]
    InvalidCreatinine { input: String },

    /// Age was below 18 or not a number. Callers route the user to a paediatric tool.
    #[error("{}", PEDIATRIC_ADVISORY)]
    PediatricNotSupported { age: Option<f64> },

    #[error(transparent)]
    MalformedRow(#[from] MalformedRow),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("wire error: {0}")]
    Wire(#[from] egfr_wire::WireError),
}

impl EgfrError {
    /// Text suitable for showing inline next to the calculator form.
    pub fn user_message(&self) -> String {
        match self {
            EgfrError::InvalidCreatinine { .. } => INVALID_CREATININE_MESSAGE.to_owned(),
            EgfrError::PediatricNotSupported { .. } => PEDIATRIC_ADVISORY.to_owned(),
            other => other.to_string(),
        }
    }
}

pub type EgfrResult<T> = std::result::Result<T, EgfrError>;

/// A CSV row that could not be turned into a calculation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("CSV row {line} is malformed ({defect}): {row}")]
pub struct MalformedRow {
    /// 1-based line number in the submitted text.
    pub line: usize,
    /// The row exactly as submitted.
    pub row: String,
    pub defect: RowDefect,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowDefect {
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("{field} is not a number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("creatinine must be positive, got {0}")]
    NonPositiveCreatinine(f64),
    #[error("year of birth {year} is after {reference_year}")]
    FutureBirthYear { year: i32, reference_year: i32 },
    #[error("year of birth {year} is before {oldest}")]
    ImplausibleBirthYear { year: i32, oldest: i32 },
    #[error("eGFR is not a finite number for creatinine {creatinine}")]
    NonFiniteEgfr { creatinine: f64 },
}
