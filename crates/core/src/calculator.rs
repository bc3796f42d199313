//! Single-record (interactive) eGFR calculator.
//!
//! Pipeline: validate → convert creatinine to mg/dL → MDRD-style equation → round → classify →
//! assemble a [`CalculationRecord`]. The calculator keeps no state between calls; history is the
//! caller's (see [`crate::history::CalculationHistory`]).

use crate::formula::estimate;
use crate::units::to_mg_per_dl;
use crate::validation::{validate_measurement, RawNumber};
use crate::{EgfrError, EgfrResult};
use chrono::{DateTime, Utc};
use egfr_types::{CreatinineUnit, Ethnicity, Formula, NonEmptyText, Sex};
use egfr_wire::CalculationRecord;

/// Who is running the calculation. Decides which identifiers are stamped on the record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Caller {
    /// A signed-in patient calculating for themselves.
    Patient(NonEmptyText),
    /// A signed-in clinician calculating on behalf of an unnamed patient.
    Clinician(NonEmptyText),
    /// Nobody signed in; the record carries only what the form supplied.
    Guest,
}

/// Calculator form contents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalculationRequest {
    pub creatinine: RawNumber,
    pub creatinine_unit: CreatinineUnit,
    pub age: RawNumber,
    pub sex: Sex,
    pub ethnicity: Ethnicity,
    /// Clinician chosen on the form (or prefilled from the patient's profile).
    pub clinician_id: Option<NonEmptyText>,
}

/// Pure single-record calculation operations.
#[derive(Default, Clone, Debug)]
pub struct EgfrCalculator;

impl EgfrCalculator {
    /// Creates a new instance of EgfrCalculator.
    pub fn new() -> Self {
        Self
    }

    /// Calculate eGFR for one patient, stamping the record with the current time.
    ///
    /// # Errors
    ///
    /// See [`EgfrCalculator::calculate_at`].
    pub fn calculate(
        &self,
        caller: &Caller,
        request: &CalculationRequest,
    ) -> EgfrResult<CalculationRecord> {
        self.calculate_at(caller, request, Utc::now())
    }

    /// Calculate eGFR for one patient, stamping the record with `now`.
    ///
    /// # Arguments
    ///
    /// * `caller` - Signed-in user; a patient's own id becomes `PatientID`, a clinician's own id
    ///   becomes `ClinicianID` and overrides the form's clinician.
    /// * `request` - Raw form values.
    /// * `now` - Calculation time, recorded as `CreatedAt`.
    ///
    /// # Returns
    ///
    /// A record holding the MDRD eGFR rounded to two decimals, the stage classified from that
    /// rounded value, and creatinine echoed in mg/dL.
    ///
    /// # Errors
    ///
    /// - [`crate::EgfrError::InvalidCreatinine`] if creatinine is not a positive number, or is so
    ///   small that the equation has no finite result.
    /// - [`crate::EgfrError::PediatricNotSupported`] if age is under 18 or not a number.
    pub fn calculate_at(
        &self,
        caller: &Caller,
        request: &CalculationRequest,
        now: DateTime<Utc>,
    ) -> EgfrResult<CalculationRecord> {
        let measurement = validate_measurement(&request.creatinine, &request.age)?;
        let creatinine_mg_dl = to_mg_per_dl(measurement.creatinine, request.creatinine_unit);

        let result = estimate(
            Formula::Mdrd,
            creatinine_mg_dl,
            measurement.age,
            &request.sex,
            &request.ethnicity,
        );
        if !result.egfr.is_finite() {
            return Err(EgfrError::InvalidCreatinine {
                input: measurement.creatinine.to_string(),
            });
        }

        let (patient_id, clinician_id) = match caller {
            Caller::Patient(id) => (Some(id.clone()), request.clinician_id.clone()),
            Caller::Clinician(id) => (None, Some(id.clone())),
            Caller::Guest => (None, request.clinician_id.clone()),
        };

        tracing::debug!(
            egfr = result.egfr,
            stage = result.stage.id,
            unit = %request.creatinine_unit,
            "calculated eGFR"
        );

        Ok(CalculationRecord {
            patient_id,
            clinician_id,
            age: measurement.age,
            sex: request.sex.clone(),
            ethnicity: request.ethnicity.clone(),
            creatinine_mg_dl,
            egfr: result.egfr,
            stage: result.stage.code,
            formula: Some(Formula::Mdrd),
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use egfr_types::StageCode;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn request(creatinine: impl Into<RawNumber>, age: impl Into<RawNumber>) -> CalculationRequest {
        CalculationRequest {
            creatinine: creatinine.into(),
            age: age.into(),
            sex: Sex::Male,
            ethnicity: Ethnicity::Other,
            ..CalculationRequest::default()
        }
    }

    fn patient(id: &str) -> Caller {
        Caller::Patient(NonEmptyText::new(id).expect("valid id"))
    }

    #[test]
    fn calculates_reference_patient() {
        let record = EgfrCalculator::new()
            .calculate_at(&Caller::Guest, &request(1.0, 40.0), at())
            .expect("calculate");

        assert_eq!(record.egfr, 87.96);
        assert_eq!(record.stage, StageCode::G2);
        assert_eq!(record.formula, Some(Formula::Mdrd));
        assert_eq!(record.created_at, at());
        assert_eq!(record.egfr_display(), "87.96 ml/min/1.73m²");
    }

    #[test]
    fn converts_umol_before_applying_formula() {
        let calc = EgfrCalculator::new();
        let mut umol = request(106.08, "55");
        umol.creatinine_unit = CreatinineUnit::UmolPerL;
        umol.sex = Sex::Female;
        umol.ethnicity = Ethnicity::Black;

        let mut mgdl = umol.clone();
        mgdl.creatinine = 1.2.into();
        mgdl.creatinine_unit = CreatinineUnit::MgPerDl;

        let from_umol = calc.calculate_at(&Caller::Guest, &umol, at()).expect("umol");
        let from_mgdl = calc.calculate_at(&Caller::Guest, &mgdl, at()).expect("mgdl");

        assert!((from_umol.creatinine_mg_dl - 1.2).abs() < 1e-9);
        assert_eq!(from_umol.egfr, from_mgdl.egfr);
        assert_eq!(from_umol.egfr, 59.98);
        assert_eq!(from_umol.stage, StageCode::G3A);
    }

    #[test]
    fn rejects_invalid_creatinine_without_record() {
        let err = EgfrCalculator::new()
            .calculate_at(&Caller::Guest, &request("", 40.0), at())
            .expect_err("blank creatinine");
        assert!(matches!(err, EgfrError::InvalidCreatinine { .. }));
        assert_eq!(err.user_message(), "Invalid creatinine level");
    }

    #[test]
    fn rejects_creatinine_with_no_finite_egfr() {
        let err = EgfrCalculator::new()
            .calculate_at(&Caller::Guest, &request("1e-300", 40.0), at())
            .expect_err("eGFR overflows");
        assert!(matches!(err, EgfrError::InvalidCreatinine { .. }));
    }

    #[test]
    fn pediatric_boundary() {
        let calc = EgfrCalculator::new();
        let err = calc
            .calculate_at(&Caller::Guest, &request(1.0, 17.99), at())
            .expect_err("under 18");
        assert!(matches!(err, EgfrError::PediatricNotSupported { .. }));

        let record = calc
            .calculate_at(&Caller::Guest, &request(0.9, 18.0), at())
            .expect("18 is accepted");
        assert_eq!(record.egfr, 116.81);
        assert_eq!(record.stage, StageCode::G1);
    }

    #[test]
    fn patient_caller_keeps_form_clinician() {
        let mut req = request(1.0, 40.0);
        req.clinician_id = NonEmptyText::optional("H123456780");
        let record = EgfrCalculator::new()
            .calculate_at(&patient("2000000001"), &req, at())
            .expect("calculate");
        assert_eq!(record.patient_id.as_ref().map(|p| p.as_str()), Some("2000000001"));
        assert_eq!(record.clinician_id.as_ref().map(|c| c.as_str()), Some("H123456780"));
    }

    #[test]
    fn clinician_caller_stamps_own_id() {
        let mut req = request(1.0, 40.0);
        req.clinician_id = NonEmptyText::optional("H000000001");
        let clinician = Caller::Clinician(NonEmptyText::new("H123456780").expect("valid id"));
        let record = EgfrCalculator::new()
            .calculate_at(&clinician, &req, at())
            .expect("calculate");
        assert!(record.patient_id.is_none());
        assert_eq!(record.clinician_id.as_ref().map(|c| c.as_str()), Some("H123456780"));
    }

    #[test]
    fn stage_uses_rounded_value() {
        // Creatinine chosen so the unrounded eGFR sits just below 60 but rounds to 60.00.
        let calc = EgfrCalculator::new();
        let target = 59.996_f64;
        let creatinine = (target / (186.0 * 40f64.powf(-0.203))).powf(1.0 / -1.154);
        let record = calc
            .calculate_at(&Caller::Guest, &request(creatinine, 40.0), at())
            .expect("calculate");
        assert_eq!(record.egfr, 60.0);
        assert_eq!(record.stage, StageCode::G2);
    }

    #[test]
    fn identical_inputs_give_identical_records() {
        let calc = EgfrCalculator::new();
        let req = request("1.37", "63");
        let first = calc.calculate_at(&Caller::Guest, &req, at()).expect("first");
        let second = calc.calculate_at(&Caller::Guest, &req, at()).expect("second");
        assert_eq!(first, second);
    }
}
