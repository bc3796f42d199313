//! Caller-owned calculation history.
//!
//! The engine never fetches records. Callers load stored payloads from the persistence
//! collaborator (by patient or by clinician) and hand them over; this module orders, filters and
//! summarises them for the results list, the trend chart and the "time for a new test" alert.

use crate::config::CoreConfig;
use crate::stages::{classify, CkdStage};
use crate::EgfrResult;
use chrono::{DateTime, Duration, Utc};
use egfr_wire::{Calculation, CalculationRecord};
use std::cmp::Ordering;

/// Column a history list can be ordered by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    Egfr,
    Creatinine,
    Age,
    /// Ascending order lists the most severe stage first.
    Stage,
    PatientId,
    Gender,
    Ethnicity,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// One point of the eGFR trend chart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartPoint {
    pub created_at: DateTime<Utc>,
    pub egfr: f64,
    /// Classified from `egfr`, so colours follow the value even if a stored stage disagrees.
    pub stage: &'static CkdStage,
}

/// An append-only list of calculation records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalculationHistory {
    records: Vec<CalculationRecord>,
}

impl CalculationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from stored JSON payloads.
    ///
    /// Payloads without a `CKD_Stage` are classified from their eGFR.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EgfrError::Wire`] for the first payload that cannot be read.
    pub fn from_payloads<'a, I>(payloads: I) -> EgfrResult<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut history = Self::new();
        for payload in payloads {
            history.push_payload(payload)?;
        }
        tracing::debug!(records = history.len(), "loaded calculation history");
        Ok(history)
    }

    /// Parse one stored payload and append it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EgfrError::Wire`] if the payload cannot be read.
    pub fn push_payload(&mut self, json_text: &str) -> EgfrResult<()> {
        let record = Calculation::parse_with(json_text, |egfr| classify(egfr).code)?;
        self.push(record);
        Ok(())
    }

    pub fn push(&mut self, record: CalculationRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[CalculationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records about one patient, in insertion order.
    pub fn for_patient(&self, patient_id: &str) -> Vec<&CalculationRecord> {
        self.records
            .iter()
            .filter(|r| r.patient_id.as_ref().is_some_and(|id| id.as_str() == patient_id))
            .collect()
    }

    /// Records submitted by or assigned to one clinician, in insertion order.
    pub fn for_clinician(&self, clinician_id: &str) -> Vec<&CalculationRecord> {
        self.records
            .iter()
            .filter(|r| {
                r.clinician_id
                    .as_ref()
                    .is_some_and(|id| id.as_str() == clinician_id)
            })
            .collect()
    }

    /// Records ordered by `field`. Ties keep insertion order.
    pub fn sorted(&self, field: SortField, direction: SortDirection) -> Vec<&CalculationRecord> {
        let mut out: Vec<&CalculationRecord> = self.records.iter().collect();
        out.sort_by(|a, b| {
            let ordering = compare(field, a, b);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        out
    }

    /// Trend chart points, oldest first.
    pub fn chart_series(&self) -> Vec<ChartPoint> {
        let mut points: Vec<ChartPoint> = self
            .records
            .iter()
            .map(|r| ChartPoint {
                created_at: r.created_at,
                egfr: r.egfr,
                stage: classify(r.egfr),
            })
            .collect();
        points.sort_by_key(|p| p.created_at);
        points
    }

    /// The most recent record.
    pub fn latest(&self) -> Option<&CalculationRecord> {
        self.records.iter().max_by_key(|r| r.created_at)
    }

    /// Whether the most recent calculation is more than `window_days` old at `now`.
    ///
    /// An empty history does not need a recheck, and neither does a window too long to
    /// represent as a duration.
    pub fn needs_recheck_at(&self, now: DateTime<Utc>, window_days: i64) -> bool {
        let Some(window) = Duration::try_days(window_days) else {
            return false;
        };
        self.latest()
            .is_some_and(|latest| now - latest.created_at > window)
    }

    /// [`CalculationHistory::needs_recheck_at`] using the current time and the configured window.
    pub fn needs_recheck(&self, cfg: &CoreConfig) -> bool {
        self.needs_recheck_at(Utc::now(), cfg.recheck_after_days())
    }
}

impl Extend<CalculationRecord> for CalculationHistory {
    fn extend<T: IntoIterator<Item = CalculationRecord>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}

impl FromIterator<CalculationRecord> for CalculationHistory {
    fn from_iter<T: IntoIterator<Item = CalculationRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

fn compare(field: SortField, a: &CalculationRecord, b: &CalculationRecord) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Egfr => a.egfr.total_cmp(&b.egfr),
        SortField::Creatinine => a.creatinine_mg_dl.total_cmp(&b.creatinine_mg_dl),
        SortField::Age => a.age.total_cmp(&b.age),
        // G5 sorts before G1.
        SortField::Stage => b.stage.cmp(&a.stage),
        SortField::PatientId => id_text(&a.patient_id).cmp(id_text(&b.patient_id)),
        SortField::Gender => a.sex.display_label().cmp(&b.sex.display_label()),
        SortField::Ethnicity => a.ethnicity.label().cmp(b.ethnicity.label()),
    }
}

fn id_text(id: &Option<egfr_types::NonEmptyText>) -> &str {
    id.as_ref().map(|id| id.as_str()).unwrap_or_default()
}
