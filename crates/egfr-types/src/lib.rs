//! # eGFR Types
//!
//! Validated primitives shared by the eGFR wire and core crates.
//!
//! Contains:
//! - [`NonEmptyText`] for identifiers and labels that must carry content
//! - Demographic categories that select formula coefficients ([`Sex`], [`Ethnicity`])
//! - Measurement tags ([`CreatinineUnit`]) and result codes ([`StageCode`], [`Formula`])

pub mod demographics;
pub mod stage;
pub mod units;

pub use demographics::{Ethnicity, Sex};
pub use stage::{Formula, StageCode};
pub use units::CreatinineUnit;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors raised when a textual code cannot be mapped onto one of the enumerations in this crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown creatinine unit: '{0}'")]
    UnknownUnit(String),
    #[error("unknown CKD stage: '{0}'")]
    UnknownStage(String),
    #[error("unknown formula: '{0}'")]
    UnknownFormula(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
/// Patient and clinician identifiers are carried as `NonEmptyText` so that a blank form field
/// never ends up stamped onto a calculation record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` if the trimmed input is non-empty,
    /// or `Err(TextError::Empty)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Like [`NonEmptyText::new`], but maps blank input to `None`.
    ///
    /// Optional identifiers arrive from forms and stored payloads as empty strings, so this is
    /// the usual way to lift them into the type.
    pub fn optional(input: impl AsRef<str>) -> Option<Self> {
        Self::new(input).ok()
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Upper-cases the first character of `input` and leaves the rest untouched.
///
/// Used for the display/storage echo of categorical inputs (`"female"` → `"Female"`).
pub fn capitalise_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
