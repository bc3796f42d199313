//! JSON wire/boundary support for eGFR calculation records.
//!
//! This crate provides **domain-level carriers** and **wire models** for the two JSON shapes the
//! engine exchanges with its collaborators:
//! - the calculation payload handed to the persistence service (and read back for history)
//! - the identity/profile record used to prefill calculator inputs
//!
//! This crate focuses on:
//! - exact key names of the stored payload (`PatientID`, `eGFR`, `CKD_Stage`, ...)
//! - serialisation/deserialisation
//! - translation between domain primitives and wire structs
//!
//! It performs no calculation and no I/O; storing and fetching records belongs to the
//! persistence collaborator.

pub mod calculation;
pub mod profile;

mod numeric;

// Re-export facades
pub use calculation::Calculation;
pub use profile::Profile;

// Re-export public domain-level types
pub use calculation::CalculationRecord;
pub use profile::ProfileData;

/// Errors returned by the `egfr-wire` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`WireError`].
pub type WireResult<T> = Result<T, WireError>;

/// Deserialize `json_text` into `T`, reporting the path of the first mismatching field.
pub(crate) fn from_json_with_path<T>(json_text: &str, what: &str) -> WireResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let mut deserializer = serde_json::Deserializer::from_str(json_text);
    match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(WireError::Translation(format!(
                "{what} schema mismatch at {path}: {source}"
            )))
        }
    }
}
