//! Input validation utilities.
//!
//! This module checks raw calculator inputs before any formula runs. The two failure modes are
//! distinct error variants: a bad creatinine value is an inline form error, while an under-18
//! age redirects the user to a paediatric tool.

use crate::constants::ADULT_MIN_AGE_YEARS;
use crate::{EgfrError, EgfrResult};
use serde::Deserialize;

/// A numeric form field as received: either already a number or the text the user typed.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    /// The finite value, if there is one.
    ///
    /// Text is trimmed and must parse in full (`"1.2"` is accepted, `"1.2 mg"` is not).
    pub fn value(&self) -> Option<f64> {
        match self {
            RawNumber::Number(n) => Some(*n),
            RawNumber::Text(text) => text.trim().parse::<f64>().ok(),
        }
        .filter(|n| n.is_finite())
    }

    fn describe(&self) -> String {
        match self {
            RawNumber::Number(n) => n.to_string(),
            RawNumber::Text(text) => text.clone(),
        }
    }
}

impl Default for RawNumber {
    /// An empty form field.
    fn default() -> Self {
        RawNumber::Text(String::new())
    }
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        RawNumber::Number(value)
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_owned())
    }
}

impl From<String> for RawNumber {
    fn from(value: String) -> Self {
        RawNumber::Text(value)
    }
}

/// Creatinine and age that passed validation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidatedMeasurement {
    /// Creatinine in the unit it was entered in.
    pub creatinine: f64,
    /// Age in years, at least 18.
    pub age: f64,
}

/// Validates a creatinine input.
///
/// # Errors
///
/// Returns [`EgfrError::InvalidCreatinine`] if the value is not a finite number or is not
/// strictly positive.
pub fn validate_creatinine(raw: &RawNumber) -> EgfrResult<f64> {
    match raw.value() {
        Some(value) if value > 0.0 => Ok(value),
        _ => Err(EgfrError::InvalidCreatinine {
            input: raw.describe(),
        }),
    }
}

/// Validates an age input for the adult equations.
///
/// # Errors
///
/// Returns [`EgfrError::PediatricNotSupported`] if the value is not a finite number or is below
/// 18. The boundary is inclusive: 18 is accepted.
pub fn validate_age(raw: &RawNumber) -> EgfrResult<f64> {
    match raw.value() {
        Some(age) if age >= ADULT_MIN_AGE_YEARS => Ok(age),
        parsed => Err(EgfrError::PediatricNotSupported { age: parsed }),
    }
}

/// Validates both inputs, creatinine first.
///
/// # Errors
///
/// Returns the creatinine error when both inputs are bad.
pub fn validate_measurement(
    creatinine: &RawNumber,
    age: &RawNumber,
) -> EgfrResult<ValidatedMeasurement> {
    let creatinine = validate_creatinine(creatinine)?;
    let age = validate_age(age)?;
    Ok(ValidatedMeasurement { creatinine, age })
}
