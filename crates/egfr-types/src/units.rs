//! Creatinine measurement units.

use crate::ParseError;
use std::str::FromStr;

/// Unit a serum creatinine value was entered in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CreatinineUnit {
    #[default]
    MgPerDl,
    UmolPerL,
}

impl CreatinineUnit {
    /// Display symbol, as offered by the calculator's unit selector.
    pub fn symbol(self) -> &'static str {
        match self {
            CreatinineUnit::MgPerDl => "mg/dL",
            CreatinineUnit::UmolPerL => "µmol/L",
        }
    }
}

impl std::fmt::Display for CreatinineUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for CreatinineUnit {
    type Err = ParseError;

    /// Accepts `mg/dL`, `µmol/L` (micro sign or Greek mu) and `umol/L`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mg/dl" => Ok(CreatinineUnit::MgPerDl),
            "\u{b5}mol/l" | "\u{3bc}mol/l" | "umol/l" => Ok(CreatinineUnit::UmolPerL),
            _ => Err(ParseError::UnknownUnit(s.to_owned())),
        }
    }
}

impl serde::Serialize for CreatinineUnit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> serde::Deserialize<'de> for CreatinineUnit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
