//! Serum creatinine unit conversion.
//!
//! All maths runs in mg/dL at full precision. Rounding to two decimals is for display only
//! (see [`round2`]).

use crate::constants::CREATININE_UMOL_PER_MG;
use egfr_types::CreatinineUnit;

pub fn mgdl_to_umol(mg_per_dl: f64) -> f64 {
    mg_per_dl * CREATININE_UMOL_PER_MG
}

pub fn umol_to_mgdl(umol_per_l: f64) -> f64 {
    umol_per_l / CREATININE_UMOL_PER_MG
}

/// Express `value`, measured in `from_unit`, in mg/dL.
pub fn to_mg_per_dl(value: f64, from_unit: CreatinineUnit) -> f64 {
    match from_unit {
        CreatinineUnit::MgPerDl => value,
        CreatinineUnit::UmolPerL => umol_to_mgdl(value),
    }
}

/// Re-express `value` when the user switches the unit selector from `from` to `to`.
pub fn convert(value: f64, from: CreatinineUnit, to: CreatinineUnit) -> f64 {
    match (from, to) {
        (CreatinineUnit::MgPerDl, CreatinineUnit::UmolPerL) => mgdl_to_umol(value),
        (CreatinineUnit::UmolPerL, CreatinineUnit::MgPerDl) => umol_to_mgdl(value),
        _ => value,
    }
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
