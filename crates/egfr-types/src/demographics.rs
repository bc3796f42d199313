//! Demographic categories that select eGFR formula coefficients.
//!
//! Both enumerations keep an explicit `Unrecognised` branch. Values that do not match a known
//! category are not errors: they are carried verbatim for display and storage, and the
//! calculators apply the base coefficient for them.

use crate::capitalise_first;

/// Patient sex as entered on a form, imported from CSV or read from a profile.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
    /// Blank or unknown input, trimmed. Uses the male coefficient branch.
    Unrecognised(String),
}

impl Default for Sex {
    /// A blank selection.
    fn default() -> Self {
        Sex::Unrecognised(String::new())
    }
}

impl Sex {
    /// Parse a sex token, case-insensitively.
    ///
    /// Accepts `m`/`male` and `f`/`fm`/`female`. Anything else becomes
    /// [`Sex::Unrecognised`] holding the trimmed input.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "m" | "male" => Sex::Male,
            "f" | "fm" | "female" => Sex::Female,
            _ => Sex::Unrecognised(trimmed.to_owned()),
        }
    }

    pub fn is_female(&self) -> bool {
        matches!(self, Sex::Female)
    }

    pub fn is_recognised(&self) -> bool {
        !matches!(self, Sex::Unrecognised(_))
    }

    /// Human-readable label: `Male`, `Female`, `Unknown` for blank input, otherwise the raw
    /// value with its first letter capitalised.
    pub fn display_label(&self) -> String {
        match self {
            Sex::Male => "Male".to_owned(),
            Sex::Female => "Female".to_owned(),
            Sex::Unrecognised(raw) if raw.is_empty() => "Unknown".to_owned(),
            Sex::Unrecognised(raw) => capitalise_first(raw),
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_label())
    }
}

impl serde::Serialize for Sex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Sex::Unrecognised(raw) => serializer.serialize_str(raw),
            known => serializer.serialize_str(&known.display_label()),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Sex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Sex::parse(&s))
    }
}

/// Ethnicity category offered by the calculator.
///
/// Only [`Ethnicity::Black`] changes the formula result; every other category is equivalent to
/// "other" for the maths but is kept for display.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ethnicity {
    Black,
    White,
    Asian,
    Hispanic,
    Caucasian,
    Latino,
    Indian,
    Other,
    /// Input outside the known categories, kept verbatim (trimmed).
    Unrecognised(String),
}

impl Default for Ethnicity {
    /// A blank selection.
    fn default() -> Self {
        Ethnicity::Unrecognised(String::new())
    }
}

impl Ethnicity {
    /// Parse an ethnicity token, case-insensitively.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "black" => Ethnicity::Black,
            "white" => Ethnicity::White,
            "asian" => Ethnicity::Asian,
            "hispanic" => Ethnicity::Hispanic,
            "caucasian" => Ethnicity::Caucasian,
            "latino" => Ethnicity::Latino,
            "indian" => Ethnicity::Indian,
            "other" => Ethnicity::Other,
            _ => Ethnicity::Unrecognised(trimmed.to_owned()),
        }
    }

    pub fn is_black(&self) -> bool {
        matches!(self, Ethnicity::Black)
    }

    pub fn is_recognised(&self) -> bool {
        !matches!(self, Ethnicity::Unrecognised(_))
    }

    /// Collapse unknown values onto [`Ethnicity::Other`].
    ///
    /// Profile prefill uses this so the calculator never starts from a category it cannot offer.
    pub fn or_other(self) -> Self {
        match self {
            Ethnicity::Unrecognised(_) => Ethnicity::Other,
            known => known,
        }
    }

    /// Label used for display and storage. Unrecognised input is returned verbatim.
    pub fn label(&self) -> &str {
        match self {
            Ethnicity::Black => "Black",
            Ethnicity::White => "White",
            Ethnicity::Asian => "Asian",
            Ethnicity::Hispanic => "Hispanic",
            Ethnicity::Caucasian => "Caucasian",
            Ethnicity::Latino => "Latino",
            Ethnicity::Indian => "Indian",
            Ethnicity::Other => "Other",
            Ethnicity::Unrecognised(raw) => raw,
        }
    }
}

impl std::fmt::Display for Ethnicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl serde::Serialize for Ethnicity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> serde::Deserialize<'de> for Ethnicity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Ethnicity::parse(&s))
    }
}
