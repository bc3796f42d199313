//! Identity/profile record consumed to prefill calculator inputs.
//!
//! The identity service returns patient and clinician rows with many more columns than the
//! calculator needs (contact details, credentials, storage ids). Unlike the calculation payload
//! this model therefore ignores unknown keys; type mismatches on the keys it does read are still
//! reported with their path.

use crate::numeric::NumericWire;
use crate::{from_json_with_path, WireError, WireResult};
use chrono::{DateTime, NaiveDate};
use egfr_types::{Ethnicity, NonEmptyText, Sex};
use serde::Deserialize;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Demographics relevant to an eGFR calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileData {
    pub first_name: Option<NonEmptyText>,
    pub last_name: Option<NonEmptyText>,
    pub date_of_birth: Option<NaiveDate>,
    /// Age as stored on the profile, used only when there is no date of birth.
    pub age: Option<f64>,
    pub sex: Option<Sex>,
    pub ethnicity: Option<Ethnicity>,
    pub clinician_id: Option<NonEmptyText>,
}

// ============================================================================
// Public Profile operations
// ============================================================================

/// Profile record operations.
pub struct Profile;

impl Profile {
    /// Parse a profile record from JSON text.
    ///
    /// Blank strings are treated as absent. `DOB` accepts a plain date (`1980-05-17`) or an
    /// RFC 3339 timestamp, whose calendar date is used.
    ///
    /// # Errors
    ///
    /// Returns [`WireError`] if a read key has the wrong JSON type, or `DOB`/`Age` cannot be
    /// interpreted.
    pub fn parse(json_text: &str) -> WireResult<ProfileData> {
        let wire: ProfileWire = from_json_with_path(json_text, "Profile")?;
        wire_to_domain(wire)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, PartialEq)]
struct ProfileWire {
    #[serde(rename = "FirstName", default)]
    pub first_name: Option<String>,

    #[serde(rename = "LastName", default)]
    pub last_name: Option<String>,

    #[serde(rename = "DOB", default)]
    pub dob: Option<String>,

    #[serde(rename = "Age", default)]
    pub age: Option<NumericWire>,

    #[serde(rename = "Gender", default)]
    pub gender: Option<String>,

    #[serde(rename = "Ethnicity", default)]
    pub ethnicity: Option<String>,

    #[serde(rename = "ClinicianID", default)]
    pub clinician_id: Option<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_date_of_birth(raw: &str) -> WireResult<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|e| WireError::Translation(format!("Invalid DOB '{raw}': {e}")))
}

fn wire_to_domain(wire: ProfileWire) -> WireResult<ProfileData> {
    let date_of_birth = non_blank(wire.dob)
        .map(|dob| parse_date_of_birth(&dob))
        .transpose()?;

    let age = match wire.age {
        None => None,
        Some(NumericWire::Text(text)) if text.trim().is_empty() => None,
        Some(age) => Some(
            age.value()
                .ok_or_else(|| WireError::Translation(format!("Invalid Age: {age:?}")))?,
        ),
    };

    Ok(ProfileData {
        first_name: wire.first_name.as_deref().and_then(NonEmptyText::optional),
        last_name: wire.last_name.as_deref().and_then(NonEmptyText::optional),
        date_of_birth,
        age,
        sex: non_blank(wire.gender).map(|g| Sex::parse(&g)),
        ethnicity: non_blank(wire.ethnicity).map(|e| Ethnicity::parse(&e)),
        clinician_id: wire.clinician_id.as_deref().and_then(NonEmptyText::optional),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_patient_profile_and_ignores_extra_columns() {
        let json = r#"{
            "_id": "2000000001",
            "FirstName": "Sarah",
            "LastName": "Williams",
            "DOB": "1992-03-20",
            "Gender": "female",
            "Ethnicity": "Black",
            "ClinicianID": "H123456780",
            "Email": "sarah@example.org"
        }"#;

        let profile = Profile::parse(json).expect("parse profile");
        assert_eq!(profile.first_name.as_ref().map(|n| n.as_str()), Some("Sarah"));
        assert_eq!(
            profile.date_of_birth,
            NaiveDate::from_ymd_opt(1992, 3, 20)
        );
        assert_eq!(profile.sex, Some(Sex::Female));
        assert_eq!(profile.ethnicity, Some(Ethnicity::Black));
        assert_eq!(
            profile.clinician_id.as_ref().map(|c| c.as_str()),
            Some("H123456780")
        );
    }

    #[test]
    fn accepts_timestamp_dob_and_string_age() {
        let json = r#"{"DOB": "1980-05-17T00:00:00.000Z", "Age": "44"}"#;
        let profile = Profile::parse(json).expect("parse profile");
        assert_eq!(profile.date_of_birth, NaiveDate::from_ymd_opt(1980, 5, 17));
        assert_eq!(profile.age, Some(44.0));
    }

    #[test]
    fn blank_fields_are_absent() {
        let json = r#"{"FirstName": " ", "DOB": "", "Gender": "", "Age": "", "ClinicianID": ""}"#;
        let profile = Profile::parse(json).expect("parse profile");
        assert!(profile.first_name.is_none());
        assert!(profile.date_of_birth.is_none());
        assert!(profile.sex.is_none());
        assert!(profile.age.is_none());
        assert!(profile.clinician_id.is_none());
    }

    #[test]
    fn rejects_invalid_dob() {
        let err = Profile::parse(r#"{"DOB": "20/03/1992"}"#).expect_err("invalid dob");
        assert!(matches!(err, WireError::Translation(msg) if msg.contains("DOB")));
    }

    #[test]
    fn reports_wrong_type_with_path() {
        let err = Profile::parse(r#"{"Gender": 1}"#).expect_err("wrong type");
        assert!(matches!(err, WireError::Translation(msg) if msg.contains("Gender")));
    }
}
