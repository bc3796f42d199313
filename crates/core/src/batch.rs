//! Bulk eGFR calculation from comma-delimited text.
//!
//! Each row is `patientID,gender,yearOfBirth,ethnicity,creatinine` with creatinine in mg/dL.
//! Rows go through the CKD-EPI-style equation and become one [`CalculationRecord`] each, all
//! stamped with the submitting clinician and the same processing time.
//!
//! Row failures are typed ([`MalformedRow`]). Under [`BatchFailurePolicy::Isolate`] they are
//! collected in the [`BatchReport`] next to the successful records; under
//! [`BatchFailurePolicy::Abort`] the first one fails the whole batch.

use crate::config::{BatchFailurePolicy, CoreConfig};
use crate::constants::MAX_AGE_YEARS;
use crate::error::{MalformedRow, RowDefect};
use crate::formula::estimate;
use crate::EgfrResult;
use chrono::{DateTime, Datelike, Utc};
use egfr_types::{Ethnicity, Formula, NonEmptyText, Sex};
use egfr_wire::CalculationRecord;
use rayon::prelude::*;
use std::sync::Arc;

const FIELD_DELIMITER: char = ',';

// ============================================================================
// Row schema
// ============================================================================

/// One parsed and validated input row.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchRow {
    pub patient_id: NonEmptyText,
    pub sex: Sex,
    pub year_of_birth: i32,
    pub ethnicity: Ethnicity,
    /// mg/dL, strictly positive.
    pub creatinine: f64,
}

impl BatchRow {
    /// Parse one non-blank line.
    ///
    /// Fields are trimmed; columns after the fifth are ignored. All five must be present and
    /// non-blank. A non-blank but unknown sex or ethnicity is kept and falls back to the base
    /// coefficients later.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRow`] describing the first defect found.
    pub fn parse(line: usize, row: &str, reference_year: i32) -> Result<Self, MalformedRow> {
        let malformed = |defect: RowDefect| MalformedRow {
            line,
            row: row.to_owned(),
            defect,
        };

        let mut fields = row.split(FIELD_DELIMITER).map(str::trim);
        let mut next = |name: &'static str| {
            fields
                .next()
                .ok_or_else(|| malformed(RowDefect::MissingField(name)))
        };

        let patient_id = next("patient id")?;
        let sex = next("gender")?;
        let year = next("year of birth")?;
        let ethnicity = next("ethnicity")?;
        let creatinine = next("creatinine")?;

        let patient_id = NonEmptyText::new(patient_id)
            .map_err(|_| malformed(RowDefect::MissingField("patient id")))?;
        if sex.is_empty() {
            return Err(malformed(RowDefect::MissingField("gender")));
        }
        if ethnicity.is_empty() {
            return Err(malformed(RowDefect::MissingField("ethnicity")));
        }

        if year.is_empty() {
            return Err(malformed(RowDefect::MissingField("year of birth")));
        }
        let year_of_birth = year.parse::<i32>().map_err(|_| {
            malformed(RowDefect::InvalidNumber {
                field: "year of birth",
                value: year.to_owned(),
            })
        })?;
        if year_of_birth > reference_year {
            return Err(malformed(RowDefect::FutureBirthYear {
                year: year_of_birth,
                reference_year,
            }));
        }
        let oldest = reference_year.saturating_sub(MAX_AGE_YEARS);
        if year_of_birth < oldest {
            return Err(malformed(RowDefect::ImplausibleBirthYear {
                year: year_of_birth,
                oldest,
            }));
        }

        if creatinine.is_empty() {
            return Err(malformed(RowDefect::MissingField("creatinine")));
        }
        let creatinine_value = creatinine
            .parse::<f64>()
            .ok()
            .filter(|c| c.is_finite())
            .ok_or_else(|| {
                malformed(RowDefect::InvalidNumber {
                    field: "creatinine",
                    value: creatinine.to_owned(),
                })
            })?;
        if creatinine_value <= 0.0 {
            return Err(malformed(RowDefect::NonPositiveCreatinine(creatinine_value)));
        }

        Ok(Self {
            patient_id,
            sex: Sex::parse(sex),
            year_of_birth,
            ethnicity: Ethnicity::parse(ethnicity),
            creatinine: creatinine_value,
        })
    }

    /// Whole years between the birth year and `reference_year`.
    pub fn age_in(&self, reference_year: i32) -> f64 {
        f64::from(reference_year.saturating_sub(self.year_of_birth))
    }
}

// ============================================================================
// Report
// ============================================================================

/// Outcome of one batch submission.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    /// One record per valid row, in input order.
    pub records: Vec<CalculationRecord>,
    /// Rows that could not be calculated, in input order.
    pub errors: Vec<MalformedRow>,
    pub header_skipped: bool,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Rows considered, header excluded.
    pub fn total_rows(&self) -> usize {
        self.records.len() + self.errors.len()
    }

    /// Short human-readable outcome, e.g. `3 of 4 rows calculated, 1 failed`.
    pub fn summary(&self) -> String {
        if self.is_clean() {
            format!("{} rows calculated", self.records.len())
        } else {
            format!(
                "{} of {} rows calculated, {} failed",
                self.records.len(),
                self.total_rows(),
                self.errors.len()
            )
        }
    }
}

// ============================================================================
// Service
// ============================================================================

/// CKD-EPI batch calculation service.
#[derive(Clone)]
pub struct BatchCalculator {
    cfg: Arc<CoreConfig>,
}

impl BatchCalculator {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Process a CSV submission, using the current time and year.
    ///
    /// # Errors
    ///
    /// See [`BatchCalculator::process_at`].
    pub fn process(
        &self,
        csv_text: &str,
        clinician_id: Option<&NonEmptyText>,
    ) -> EgfrResult<BatchReport> {
        self.process_at(csv_text, clinician_id, Utc::now())
    }

    /// Process a CSV submission as of `now`.
    ///
    /// Ages are computed against `now`'s calendar year and every record is stamped with `now`.
    ///
    /// # Errors
    ///
    /// Under [`BatchFailurePolicy::Abort`], returns [`crate::EgfrError::MalformedRow`] for the
    /// first bad row (in input order) and produces no records. Under the default policy this
    /// never fails.
    pub fn process_at(
        &self,
        csv_text: &str,
        clinician_id: Option<&NonEmptyText>,
        now: DateTime<Utc>,
    ) -> EgfrResult<BatchReport> {
        let reference_year = now.year();

        let mut lines: Vec<(usize, &str)> = csv_text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
            .filter(|(_, line)| !line.trim().is_empty())
            .collect();

        let header_skipped = lines
            .first()
            .is_some_and(|(_, line)| self.is_header(line));
        if header_skipped {
            lines.remove(0);
        }

        tracing::info!(
            rows = lines.len(),
            header_skipped,
            reference_year,
            "starting eGFR batch"
        );

        let calculate = |&(line, row): &(usize, &str)| {
            self.calculate_row(line, row, reference_year, clinician_id, now)
        };
        let outcomes: Vec<Result<CalculationRecord, MalformedRow>> =
            if lines.len() >= self.cfg.parallel_row_threshold() {
                lines.par_iter().map(calculate).collect()
            } else {
                lines.iter().map(calculate).collect()
            };

        let mut report = BatchReport {
            header_skipped,
            ..BatchReport::default()
        };
        for outcome in outcomes {
            match outcome {
                Ok(record) => report.records.push(record),
                Err(err) => {
                    tracing::warn!(
                        line = err.line,
                        defect = %err.defect,
                        "malformed CSV row"
                    );
                    if self.cfg.batch_failure_policy() == BatchFailurePolicy::Abort {
                        return Err(err.into());
                    }
                    report.errors.push(err);
                }
            }
        }

        tracing::info!(
            calculated = report.records.len(),
            failed = report.errors.len(),
            "finished eGFR batch"
        );

        Ok(report)
    }

    fn is_header(&self, line: &str) -> bool {
        line.to_lowercase().contains(self.cfg.header_marker())
    }

    fn calculate_row(
        &self,
        line: usize,
        row: &str,
        reference_year: i32,
        clinician_id: Option<&NonEmptyText>,
        now: DateTime<Utc>,
    ) -> Result<CalculationRecord, MalformedRow> {
        let parsed = BatchRow::parse(line, row, reference_year)?;
        let age = parsed.age_in(reference_year);
        let result = estimate(
            Formula::CkdEpi,
            parsed.creatinine,
            age,
            &parsed.sex,
            &parsed.ethnicity,
        );
        if !result.egfr.is_finite() {
            return Err(MalformedRow {
                line,
                row: row.to_owned(),
                defect: RowDefect::NonFiniteEgfr {
                    creatinine: parsed.creatinine,
                },
            });
        }

        Ok(CalculationRecord {
            patient_id: Some(parsed.patient_id),
            clinician_id: clinician_id.cloned(),
            age,
            sex: parsed.sex,
            ethnicity: parsed.ethnicity,
            creatinine_mg_dl: parsed.creatinine,
            egfr: result.egfr,
            stage: result.stage.code,
            formula: Some(Formula::CkdEpi),
            created_at: now,
        })
    }
}
