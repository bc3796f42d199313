//! # eGFR Core
//!
//! Kidney-function calculation engine: estimated glomerular filtration rate (eGFR) from serum
//! creatinine and demographics, and classification into CKD stages G1–G5.
//!
//! This crate contains pure, synchronous computation:
//! - Creatinine unit conversion and input validation
//! - The interactive (MDRD-style) single-record calculator
//! - The bulk (CKD-EPI-style) CSV calculator with per-row error isolation
//! - CKD stage classification and display metadata
//! - Profile prefill and caller-owned history views
//!
//! **No storage, transport or UI**: records are handed to the caller as
//! [`CalculationRecord`] values (rendered to JSON by `egfr-wire`); fetching and persisting them is
//! the caller's job. No logging subscriber is installed here.

pub mod batch;
pub mod calculator;
pub mod config;
pub mod constants;
pub mod error;
pub mod formula;
pub mod history;
pub mod prefill;
pub mod stages;
pub mod units;
pub mod validation;

pub use batch::{BatchCalculator, BatchReport, BatchRow};
pub use calculator::{CalculationRequest, Caller, EgfrCalculator};
pub use config::{BatchFailurePolicy, CoreConfig};
pub use error::{EgfrError, EgfrResult, MalformedRow, RowDefect};
pub use formula::{ckd_epi_egfr, estimate, mdrd_egfr, Estimate};
pub use history::{CalculationHistory, ChartPoint, SortDirection, SortField};
pub use prefill::Prefill;
pub use stages::{by_id, classify, CkdStage, CKD_STAGES};
pub use units::{convert, mgdl_to_umol, round2, to_mg_per_dl, umol_to_mgdl};
pub use validation::{validate_age, validate_creatinine, validate_measurement, RawNumber};

pub use egfr_types::{CreatinineUnit, Ethnicity, Formula, NonEmptyText, Sex, StageCode};
pub use egfr_wire::{Calculation, CalculationRecord, Profile, ProfileData};
