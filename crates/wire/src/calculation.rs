//! Calculation record carriers and the persistence payload wire model.
//!
//! Responsibilities:
//! - Define the domain-level [`CalculationRecord`] produced by both calculators
//! - Define a strict wire model matching the stored payload keys
//! - Translate between the two in both directions
//!
//! Notes:
//! - A record is created once per successful calculation and never updated
//! - `CKD_Stage` is always written as the bare database value (`"3A"`, `"4"`)
//! - Readers accept `eGFR` as a number or as text, and tolerate the storage-assigned `id`

use crate::numeric::{serialize_number, NumericWire};
use crate::{from_json_with_path, WireError, WireResult};
use chrono::{DateTime, SecondsFormat, Utc};
use egfr_types::{Ethnicity, Formula, NonEmptyText, Sex, StageCode};
use serde::{Deserialize, Serialize};

/// Unit suffix used when an eGFR value is shown to a person.
pub const EGFR_UNIT: &str = "ml/min/1.73m²";

// ============================================================================
// Public domain-level types
// ============================================================================

/// Result of one eGFR calculation, ready to be handed to the persistence collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculationRecord {
    /// Patient the calculation is about, when known to the caller.
    pub patient_id: Option<NonEmptyText>,

    /// Clinician responsible for (or submitting) the calculation.
    pub clinician_id: Option<NonEmptyText>,

    /// Age in years used by the formula.
    pub age: f64,

    pub sex: Sex,

    pub ethnicity: Ethnicity,

    /// Serum creatinine after normalisation; always mg/dL.
    pub creatinine_mg_dl: f64,

    /// eGFR rounded to two decimal places, mL/min/1.73m².
    pub egfr: f64,

    /// Stage classified from the rounded `egfr`.
    pub stage: StageCode,

    /// Equation that produced `egfr`. Not persisted, so `None` for records read back from storage.
    pub formula: Option<Formula>,

    /// When the calculation ran.
    pub created_at: DateTime<Utc>,
}

impl CalculationRecord {
    /// eGFR with its unit, e.g. `87.96 ml/min/1.73m²`.
    pub fn egfr_display(&self) -> String {
        format!("{} {}", self.egfr, EGFR_UNIT)
    }
}

// ============================================================================
// Public Calculation operations
// ============================================================================

/// Calculation payload operations.
///
/// This is a zero-sized type used for namespacing payload-related operations.
pub struct Calculation;

impl Calculation {
    /// Parse a stored calculation payload from JSON text.
    ///
    /// `CKD_Stage` must be present and resolvable; use [`Calculation::parse_with`] to fall
    /// back to classifying the stored eGFR instead.
    ///
    /// # Errors
    ///
    /// Returns [`WireError`] if:
    /// - the JSON does not match the payload schema (unknown keys included),
    /// - `eGFR`, `CreatedAt` or `CKD_Stage` cannot be interpreted.
    pub fn parse(json_text: &str) -> WireResult<CalculationRecord> {
        let wire: CalculationWire = from_json_with_path(json_text, "Calculation")?;
        wire_to_domain(wire, None::<fn(f64) -> StageCode>)
    }

    /// Parse a stored calculation payload, deriving the stage from eGFR when `CKD_Stage` is
    /// missing or blank.
    ///
    /// An unrecognised (non-blank) `CKD_Stage` is still an error.
    pub fn parse_with<F>(json_text: &str, classify: F) -> WireResult<CalculationRecord>
    where
        F: Fn(f64) -> StageCode,
    {
        let wire: CalculationWire = from_json_with_path(json_text, "Calculation")?;
        wire_to_domain(wire, Some(classify))
    }

    /// Render a record as the JSON payload expected by the persistence collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Translation`] if `Age`, `Creatinine` or `eGFR` is not finite; JSON
    /// has no representation for them that [`Calculation::parse`] could read back.
    pub fn render(record: &CalculationRecord) -> WireResult<String> {
        let wire = domain_to_wire(record)?;
        serde_json::to_string(&wire)
            .map_err(|e| WireError::Translation(format!("Failed to serialise calculation: {e}")))
    }

    /// Render a record as a JSON value, for callers that batch several payloads together.
    pub fn to_value(record: &CalculationRecord) -> WireResult<serde_json::Value> {
        serde_json::to_value(domain_to_wire(record)?).map_err(WireError::from)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Exact stored payload shape.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct CalculationWire {
    /// Assigned by the store; read and discarded.
    #[serde(rename = "id", alias = "_id", default, skip_serializing)]
    pub storage_id: Option<serde_json::Value>,

    #[serde(rename = "PatientID", default)]
    pub patient_id: String,

    #[serde(rename = "ClinicianID", default)]
    pub clinician_id: String,

    #[serde(rename = "Age", serialize_with = "serialize_number")]
    pub age: f64,

    #[serde(rename = "Gender", default)]
    pub gender: String,

    #[serde(rename = "Ethnicity", default)]
    pub ethnicity: String,

    #[serde(rename = "Creatinine", serialize_with = "serialize_number")]
    pub creatinine: f64,

    #[serde(rename = "eGFR")]
    pub egfr: NumericWire,

    /// Frontend-only duplicate of `eGFR` that older clients sent along.
    #[serde(rename = "eGFR_numeric", default, skip_serializing)]
    pub egfr_numeric: Option<f64>,

    #[serde(rename = "CKD_Stage", default)]
    pub ckd_stage: String,

    #[serde(rename = "CreatedAt")]
    pub created_at: String,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain<F>(wire: CalculationWire, classify: Option<F>) -> WireResult<CalculationRecord>
where
    F: Fn(f64) -> StageCode,
{
    let egfr = wire
        .egfr
        .value()
        .or(wire.egfr_numeric)
        .ok_or_else(|| WireError::Translation(format!("Invalid eGFR value: {:?}", wire.egfr)))?;

    let stage = match (wire.ckd_stage.trim(), classify) {
        ("", Some(classify)) => classify(egfr),
        ("", None) => {
            return Err(WireError::InvalidInput(
                "CKD_Stage is required".into(),
            ))
        }
        (code, _) => StageCode::parse(code)
            .map_err(|e| WireError::Translation(format!("Invalid CKD_Stage: {e}")))?,
    };

    let created_at = wire
        .created_at
        .parse::<DateTime<Utc>>()
        .map_err(|e| WireError::Translation(format!("Invalid CreatedAt '{}': {e}", wire.created_at)))?;

    Ok(CalculationRecord {
        patient_id: NonEmptyText::optional(&wire.patient_id),
        clinician_id: NonEmptyText::optional(&wire.clinician_id),
        age: wire.age,
        sex: Sex::parse(&wire.gender),
        ethnicity: Ethnicity::parse(&wire.ethnicity),
        creatinine_mg_dl: wire.creatinine,
        egfr,
        stage,
        formula: None,
        created_at,
    })
}

fn finite(field: &str, value: f64) -> WireResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(WireError::Translation(format!(
            "{field} must be a finite number, got {value}"
        )))
    }
}

fn domain_to_wire(record: &CalculationRecord) -> WireResult<CalculationWire> {
    Ok(CalculationWire {
        storage_id: None,
        patient_id: record
            .patient_id
            .as_ref()
            .map(|id| id.as_str().to_owned())
            .unwrap_or_default(),
        clinician_id: record
            .clinician_id
            .as_ref()
            .map(|id| id.as_str().to_owned())
            .unwrap_or_default(),
        age: finite("Age", record.age)?,
        gender: match &record.sex {
            Sex::Unrecognised(raw) => raw.clone(),
            known => known.display_label(),
        },
        ethnicity: record.ethnicity.label().to_owned(),
        creatinine: finite("Creatinine", record.creatinine_mg_dl)?,
        egfr: NumericWire::Number(finite("eGFR", record.egfr)?),
        egfr_numeric: None,
        ckd_stage: record.stage.db_value().to_owned(),
        created_at: record
            .created_at
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
