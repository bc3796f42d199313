//! CKD stage codes and formula identifiers.

use crate::ParseError;
use std::str::FromStr;

/// KDIGO glomerular filtration category.
///
/// Two textual forms exist: the display code (`G3A`) and the database value (`3A`). Records are
/// stored with the database value; [`StageCode::parse`] accepts either.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageCode {
    G1,
    G2,
    G3A,
    G3B,
    G4,
    G5,
}

impl StageCode {
    /// All stages, least to most severe.
    pub const ALL: [StageCode; 6] = [
        StageCode::G1,
        StageCode::G2,
        StageCode::G3A,
        StageCode::G3B,
        StageCode::G4,
        StageCode::G5,
    ];

    /// Display code, e.g. `G3A`.
    pub fn id(self) -> &'static str {
        match self {
            StageCode::G1 => "G1",
            StageCode::G2 => "G2",
            StageCode::G3A => "G3A",
            StageCode::G3B => "G3B",
            StageCode::G4 => "G4",
            StageCode::G5 => "G5",
        }
    }

    /// Storage value, e.g. `3A`.
    pub fn db_value(self) -> &'static str {
        match self {
            StageCode::G1 => "1",
            StageCode::G2 => "2",
            StageCode::G3A => "3A",
            StageCode::G3B => "3B",
            StageCode::G4 => "4",
            StageCode::G5 => "5",
        }
    }

    /// Resolve a stage from any of its textual forms.
    ///
    /// Resolution order:
    /// 1. exact database value (`"3A"`, `"4"`)
    /// 2. upper-cased input, with a leading `STAGE ` rewritten to `G`
    /// 3. the sub-stages `3A`/`3B` gain a `G` prefix
    /// 4. any other bare number gains a `G` prefix
    /// 5. match against the display codes
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let trimmed = input.trim();

        if let Some(code) = Self::ALL.iter().find(|c| c.db_value() == trimmed) {
            return Ok(*code);
        }

        let mut normalised = trimmed.to_uppercase();
        if let Some(rest) = normalised.strip_prefix("STAGE ") {
            normalised = format!("G{}", rest.trim_start());
        }

        if normalised == "3A" || normalised == "3B" {
            normalised.insert(0, 'G');
        } else if !normalised.starts_with('G') && normalised.parse::<f64>().is_ok() {
            normalised.insert(0, 'G');
        }

        Self::ALL
            .iter()
            .find(|c| c.id() == normalised)
            .copied()
            .ok_or_else(|| ParseError::UnknownStage(input.to_owned()))
    }
}

impl std::fmt::Display for StageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StageCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for StageCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.db_value())
    }
}

impl<'de> serde::Deserialize<'de> for StageCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        StageCode::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// The estimating equation that produced an eGFR value.
///
/// The two equations use different coefficients and give different results for the same
/// patient; a record always says which one it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Formula {
    /// Four-variable MDRD-style equation used by the interactive calculator.
    Mdrd,
    /// CKD-EPI-style equation used by bulk CSV import.
    CkdEpi,
}

impl Formula {
    pub fn as_str(self) -> &'static str {
        match self {
            Formula::Mdrd => "MDRD",
            Formula::CkdEpi => "CKD-EPI",
        }
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Formula {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MDRD" => Ok(Formula::Mdrd),
            "CKD-EPI" | "CKDEPI" => Ok(Formula::CkdEpi),
            _ => Err(ParseError::UnknownFormula(s.to_owned())),
        }
    }
}
