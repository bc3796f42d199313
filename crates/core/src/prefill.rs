//! Calculator defaults derived from a signed-in user's profile.
//!
//! Prefill is a convenience: every value can be overwritten on the form, and a calculation with
//! no profile at all is always accepted.

use crate::calculator::CalculationRequest;
use crate::validation::RawNumber;
use crate::EgfrResult;
use chrono::{Datelike, NaiveDate, Utc};
use egfr_types::{Ethnicity, NonEmptyText, Sex};
use egfr_wire::{Profile, ProfileData};

/// Form values suggested by a profile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Prefill {
    /// Whole years, from the date of birth when known, else the stored age.
    pub age: Option<f64>,
    pub sex: Option<Sex>,
    /// Always one of the offered categories; unknown values become [`Ethnicity::Other`].
    pub ethnicity: Option<Ethnicity>,
    pub clinician_id: Option<NonEmptyText>,
}

impl Prefill {
    /// Derive defaults from a parsed profile as of `today`.
    pub fn from_profile(profile: &ProfileData, today: NaiveDate) -> Self {
        let age = match profile.date_of_birth {
            Some(dob) => age_on(dob, today),
            None => profile.age,
        };

        Self {
            age,
            sex: profile.sex.clone(),
            ethnicity: profile.ethnicity.clone().map(Ethnicity::or_other),
            clinician_id: profile.clinician_id.clone(),
        }
    }

    /// [`Prefill::from_profile`] as of today's UTC date.
    pub fn from_profile_now(profile: &ProfileData) -> Self {
        Self::from_profile(profile, Utc::now().date_naive())
    }

    /// Parse a profile record and derive defaults from it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EgfrError::Wire`] if the profile JSON cannot be read.
    pub fn from_profile_json(json_text: &str, today: NaiveDate) -> EgfrResult<Self> {
        let profile = Profile::parse(json_text)?;
        Ok(Self::from_profile(&profile, today))
    }

    /// Starting form contents: prefilled fields set, creatinine left blank in mg/dL.
    pub fn into_request(self) -> CalculationRequest {
        CalculationRequest {
            age: self.age.map(RawNumber::Number).unwrap_or_default(),
            sex: self.sex.unwrap_or_default(),
            ethnicity: self.ethnicity.unwrap_or_default(),
            clinician_id: self.clinician_id,
            ..CalculationRequest::default()
        }
    }
}

/// Completed years between `dob` and `today`; `None` for a birth date in the future.
fn age_on(dob: NaiveDate, today: NaiveDate) -> Option<f64> {
    let mut years = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    (years >= 0).then(|| f64::from(years))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EgfrError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn profile() -> ProfileData {
        ProfileData {
            first_name: NonEmptyText::optional("Sarah"),
            last_name: NonEmptyText::optional("Williams"),
            date_of_birth: Some(date(1980, 5, 17)),
            age: Some(99.0),
            sex: Some(Sex::Female),
            ethnicity: Some(Ethnicity::Black),
            clinician_id: NonEmptyText::optional("H123456780"),
        }
    }

    #[test]
    fn test_age_is_corrected_before_birthday() {
        let p = profile();
        assert_eq!(Prefill::from_profile(&p, date(2025, 5, 16)).age, Some(44.0));
        assert_eq!(Prefill::from_profile(&p, date(2025, 5, 17)).age, Some(45.0));
        assert_eq!(Prefill::from_profile(&p, date(2025, 12, 1)).age, Some(45.0));
    }

    #[test]
    fn test_stored_age_used_without_dob() {
        let mut p = profile();
        p.date_of_birth = None;
        assert_eq!(Prefill::from_profile(&p, date(2025, 1, 1)).age, Some(99.0));

        p.age = None;
        assert_eq!(Prefill::from_profile(&p, date(2025, 1, 1)).age, None);
    }

    #[test]
    fn test_future_dob_gives_no_age() {
        let mut p = profile();
        p.date_of_birth = Some(date(2030, 1, 1));
        assert_eq!(Prefill::from_profile(&p, date(2025, 1, 1)).age, None);
    }

    #[test]
    fn test_unknown_ethnicity_maps_to_other() {
        let mut p = profile();
        p.ethnicity = Some(Ethnicity::parse("Pacific Islander"));
        let prefill = Prefill::from_profile(&p, date(2025, 1, 1));
        assert_eq!(prefill.ethnicity, Some(Ethnicity::Other));
        assert_eq!(prefill.sex, Some(Sex::Female));
        assert_eq!(
            prefill.clinician_id.as_ref().map(|c| c.as_str()),
            Some("H123456780")
        );
    }

    #[test]
    fn test_from_profile_json() {
        let json = r#"{"DOB": "1992-03-20", "Gender": "fm", "Ethnicity": "white"}"#;
        let prefill = Prefill::from_profile_json(json, date(2025, 3, 19)).expect("prefill");
        assert_eq!(prefill.age, Some(32.0));
        assert_eq!(prefill.sex, Some(Sex::Female));
        assert_eq!(prefill.ethnicity, Some(Ethnicity::White));

        let err = Prefill::from_profile_json(r#"{"DOB": "soon"}"#, date(2025, 1, 1))
            .expect_err("bad dob");
        assert!(matches!(err, EgfrError::Wire(_)));
    }

    #[test]
    fn test_into_request_leaves_creatinine_blank() {
        let request = Prefill::from_profile(&profile(), date(2025, 6, 1)).into_request();
        assert_eq!(request.age, RawNumber::Number(45.0));
        assert_eq!(request.creatinine, RawNumber::default());
        assert!(request.ethnicity.is_black());

        let blank = Prefill::default().into_request();
        assert_eq!(blank.age, RawNumber::default());
        assert_eq!(blank.sex, Sex::default());
    }
}
