//! Constants used throughout the eGFR core crate.
//!
//! Formula coefficients for both equations live here side by side. The interactive and bulk
//! calculators use separate coefficient sets.

/// µmol/L per mg/dL for serum creatinine.
pub const CREATININE_UMOL_PER_MG: f64 = 88.4;

/// Youngest age (years, inclusive) the adult equations are used for.
pub const ADULT_MIN_AGE_YEARS: f64 = 18.0;

/// Oldest age (years) a batch row's year of birth may imply.
pub const MAX_AGE_YEARS: i32 = 150;

/// Message shown when a calculation is refused because the patient is under 18.
pub const PEDIATRIC_ADVISORY: &str =
    "For users under 18 years old, please use the Pediatric version of the calculator.";

/// Message shown when the creatinine input cannot be used.
pub const INVALID_CREATININE_MESSAGE: &str = "Invalid creatinine level";

// ----------------------------------------------------------------------------
// MDRD-style equation (interactive calculator)
// ----------------------------------------------------------------------------

pub const MDRD_CONSTANT: f64 = 186.0;
pub const MDRD_CREATININE_EXPONENT: f64 = -1.154;
pub const MDRD_AGE_EXPONENT: f64 = -0.203;
pub const MDRD_FEMALE_FACTOR: f64 = 0.742;
pub const MDRD_BLACK_FACTOR: f64 = 1.21;

// ----------------------------------------------------------------------------
// CKD-EPI-style equation (bulk import)
// ----------------------------------------------------------------------------

pub const CKD_EPI_CONSTANT: f64 = 141.0;
pub const CKD_EPI_KAPPA_FEMALE: f64 = 0.7;
pub const CKD_EPI_KAPPA_MALE: f64 = 0.9;
pub const CKD_EPI_ALPHA_FEMALE: f64 = -0.329;
pub const CKD_EPI_ALPHA_MALE: f64 = -0.411;
pub const CKD_EPI_MAX_EXPONENT: f64 = -1.209;
pub const CKD_EPI_AGE_BASE: f64 = 0.993;
pub const CKD_EPI_FEMALE_FACTOR: f64 = 1.018;
pub const CKD_EPI_BLACK_FACTOR: f64 = 1.159;

// ----------------------------------------------------------------------------
// Configuration defaults
// ----------------------------------------------------------------------------

/// Default case-insensitive marker identifying a CSV header row.
pub const DEFAULT_HEADER_MARKER: &str = "patientid";

/// Row count above which batch rows are computed on the rayon pool.
pub const DEFAULT_PARALLEL_ROW_THRESHOLD: usize = 256;

/// Days after which the most recent calculation is considered stale.
pub const DEFAULT_RECHECK_AFTER_DAYS: i64 = 90;

/// Longest accepted recheck window (days).
pub const MAX_RECHECK_AFTER_DAYS: i64 = 36_500;
