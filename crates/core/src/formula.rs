//! The two eGFR estimating equations.
//!
//! Both are pure functions of mg/dL creatinine, age and the two demographic categories. They are
//! not interchangeable: for the same patient they give different numbers, and each calculator
//! uses exactly one of them.
//!
//! Unrecognised sex or ethnicity falls back to the base coefficient (male, non-black) and logs a
//! warning so that miscategorised input can be traced.

use crate::constants::*;
use crate::stages::{classify, CkdStage};
use crate::units::round2;
use egfr_types::{Ethnicity, Formula, Sex};

/// A rounded eGFR and the stage classified from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// eGFR rounded to two decimals.
    pub egfr: f64,
    pub stage: &'static CkdStage,
}

fn uses_female_coefficients(sex: &Sex) -> bool {
    match sex {
        Sex::Female => true,
        Sex::Male => false,
        Sex::Unrecognised(raw) => {
            tracing::warn!(
                sex = %raw,
                "unrecognised sex, applying male coefficients"
            );
            false
        }
    }
}

fn uses_black_coefficient(ethnicity: &Ethnicity) -> bool {
    match ethnicity {
        Ethnicity::Black => true,
        Ethnicity::Unrecognised(raw) => {
            tracing::warn!(
                ethnicity = %raw,
                "unrecognised ethnicity, applying non-black coefficient"
            );
            false
        }
        _ => false,
    }
}

/// MDRD-style equation used by the interactive calculator (unrounded).
///
/// `eGFR = 186 × Scr^-1.154 × age^-0.203 × 0.742 [female] × 1.21 [black]`
///
/// A non-positive or non-finite `age` is replaced by 1 in the age term. Validated input is
/// always at least 18, so this only affects direct calls.
pub fn mdrd_egfr(creatinine_mg_dl: f64, age: f64, sex: &Sex, ethnicity: &Ethnicity) -> f64 {
    let age = if age.is_finite() && age > 0.0 { age } else { 1.0 };
    let sex_factor = if uses_female_coefficients(sex) {
        MDRD_FEMALE_FACTOR
    } else {
        1.0
    };
    let ethnicity_factor = if uses_black_coefficient(ethnicity) {
        MDRD_BLACK_FACTOR
    } else {
        1.0
    };

    MDRD_CONSTANT
        * creatinine_mg_dl.powf(MDRD_CREATININE_EXPONENT)
        * age.powf(MDRD_AGE_EXPONENT)
        * sex_factor
        * ethnicity_factor
}

/// CKD-EPI-style equation used by bulk import (unrounded).
///
/// ```text
/// eGFR = 141 × min(Scr/κ, 1)^α × max(Scr/κ, 1)^-1.209 × 0.993^age × 1.018 [female] × 1.159 [black]
/// κ = 0.7 (female) / 0.9 (male), α = -0.329 (female) / -0.411 (male)
/// ```
pub fn ckd_epi_egfr(creatinine_mg_dl: f64, age: f64, sex: &Sex, ethnicity: &Ethnicity) -> f64 {
    let female = uses_female_coefficients(sex);
    let (kappa, alpha, sex_factor) = if female {
        (CKD_EPI_KAPPA_FEMALE, CKD_EPI_ALPHA_FEMALE, CKD_EPI_FEMALE_FACTOR)
    } else {
        (CKD_EPI_KAPPA_MALE, CKD_EPI_ALPHA_MALE, 1.0)
    };
    let ethnicity_factor = if uses_black_coefficient(ethnicity) {
        CKD_EPI_BLACK_FACTOR
    } else {
        1.0
    };

    let ratio = creatinine_mg_dl / kappa;
    let min_term = ratio.min(1.0);
    let max_term = ratio.max(1.0);

    CKD_EPI_CONSTANT
        * min_term.powf(alpha)
        * max_term.powf(CKD_EPI_MAX_EXPONENT)
        * CKD_EPI_AGE_BASE.powf(age)
        * sex_factor
        * ethnicity_factor
}

/// Evaluate `formula`, round to two decimals, then classify the rounded value.
///
/// Rounding happens before classification so a value such as 59.996 is staged as 60.0 (G2).
pub fn estimate(
    formula: Formula,
    creatinine_mg_dl: f64,
    age: f64,
    sex: &Sex,
    ethnicity: &Ethnicity,
) -> Estimate {
    let raw = match formula {
        Formula::Mdrd => mdrd_egfr(creatinine_mg_dl, age, sex, ethnicity),
        Formula::CkdEpi => ckd_epi_egfr(creatinine_mg_dl, age, sex, ethnicity),
    };
    let egfr = round2(raw);
    Estimate {
        egfr,
        stage: classify(egfr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egfr_types::StageCode;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn mdrd_reference_patient() {
        let raw = mdrd_egfr(1.0, 40.0, &Sex::Male, &Ethnicity::Other);
        assert!((raw - 186.0 * 40f64.powf(-0.203)).abs() < TOLERANCE);

        let est = estimate(Formula::Mdrd, 1.0, 40.0, &Sex::Male, &Ethnicity::Other);
        assert_eq!(est.egfr, 87.96);
        assert_eq!(est.stage.code, StageCode::G2);
    }

    #[test]
    fn mdrd_applies_female_and_black_factors() {
        let est = estimate(Formula::Mdrd, 1.2, 55.0, &Sex::Female, &Ethnicity::Black);
        assert_eq!(est.egfr, 59.98);
        assert_eq!(est.stage.code, StageCode::G3A);

        let base = mdrd_egfr(1.2, 55.0, &Sex::Male, &Ethnicity::White);
        let adjusted = mdrd_egfr(1.2, 55.0, &Sex::Female, &Ethnicity::Black);
        assert!((adjusted / base - 0.742 * 1.21).abs() < TOLERANCE);
    }

    #[test]
    fn mdrd_age_fallback_only_for_non_positive_age() {
        let zero = mdrd_egfr(1.0, 0.0, &Sex::Male, &Ethnicity::Other);
        let one = mdrd_egfr(1.0, 1.0, &Sex::Male, &Ethnicity::Other);
        assert_eq!(zero, one);
        assert_eq!(one, 186.0);
    }

    #[test]
    fn ckd_epi_reference_row() {
        // P1,Female,1975,White,0.8 processed in 2025
        let est = estimate(Formula::CkdEpi, 0.8, 50.0, &Sex::Female, &Ethnicity::White);
        assert_eq!(est.egfr, 85.96);
        assert_eq!(est.stage.code, StageCode::G2);
    }

    #[test]
    fn ckd_epi_low_creatinine_uses_min_term() {
        let est = estimate(Formula::CkdEpi, 0.5, 30.0, &Sex::Female, &Ethnicity::Black);
        assert_eq!(est.egfr, 150.52);
        assert_eq!(est.stage.code, StageCode::G1);
    }

    #[test]
    fn ckd_epi_high_creatinine_male() {
        let est = estimate(Formula::CkdEpi, 2.5, 75.0, &Sex::Male, &Ethnicity::Other);
        assert_eq!(est.egfr, 24.21);
        assert_eq!(est.stage.code, StageCode::G4);
    }

    #[test]
    fn formulas_diverge_for_identical_inputs() {
        let mdrd = estimate(Formula::Mdrd, 1.0, 40.0, &Sex::Male, &Ethnicity::Other);
        let ckd_epi = estimate(Formula::CkdEpi, 1.0, 40.0, &Sex::Male, &Ethnicity::Other);
        assert_eq!(mdrd.egfr, 87.96);
        assert_eq!(ckd_epi.egfr, 93.73);
        assert_ne!(mdrd.egfr, ckd_epi.egfr);
    }

    #[test]
    fn formulas_are_deterministic() {
        let first = estimate(Formula::Mdrd, 1.37, 63.0, &Sex::Female, &Ethnicity::Asian);
        for _ in 0..10 {
            let again = estimate(Formula::Mdrd, 1.37, 63.0, &Sex::Female, &Ethnicity::Asian);
            assert_eq!(first, again);
        }
    }

    #[test]
    fn unrecognised_categories_use_base_coefficients() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let unknown = mdrd_egfr(
            1.0,
            40.0,
            &Sex::Unrecognised("x".into()),
            &Ethnicity::Unrecognised("martian".into()),
        );
        let base = mdrd_egfr(1.0, 40.0, &Sex::Male, &Ethnicity::Other);
        assert_eq!(unknown, base);

        let unknown = ckd_epi_egfr(1.0, 40.0, &Sex::Unrecognised(String::new()), &Ethnicity::Other);
        let base = ckd_epi_egfr(1.0, 40.0, &Sex::Male, &Ethnicity::Other);
        assert_eq!(unknown, base);
    }
}
