//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the calculators. The core never reads process-wide environment variables itself;
//! the `*_from_env_value` helpers parse values the host application has already read.

use crate::constants::{
    DEFAULT_HEADER_MARKER, DEFAULT_PARALLEL_ROW_THRESHOLD, DEFAULT_RECHECK_AFTER_DAYS,
    MAX_RECHECK_AFTER_DAYS,
};
use crate::{EgfrError, EgfrResult};
use std::str::FromStr;

/// What the batch calculator does when a CSV row is malformed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BatchFailurePolicy {
    /// Record the failure, skip the row and keep going.
    #[default]
    Isolate,
    /// Fail the whole batch on the first malformed row.
    Abort,
}

impl FromStr for BatchFailurePolicy {
    type Err = EgfrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "isolate" => Ok(BatchFailurePolicy::Isolate),
            "abort" => Ok(BatchFailurePolicy::Abort),
            other => Err(EgfrError::InvalidInput(format!(
                "unknown batch failure policy '{other}' (expected 'isolate' or 'abort')"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    batch_failure_policy: BatchFailurePolicy,
    header_marker: String,
    parallel_row_threshold: usize,
    recheck_after_days: i64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            batch_failure_policy: BatchFailurePolicy::default(),
            header_marker: DEFAULT_HEADER_MARKER.to_owned(),
            parallel_row_threshold: DEFAULT_PARALLEL_ROW_THRESHOLD,
            recheck_after_days: DEFAULT_RECHECK_AFTER_DAYS,
        }
    }
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `header_marker` is matched case-insensitively and must not be blank;
    /// `recheck_after_days` must be between 1 and 36 500.
    pub fn new(
        batch_failure_policy: BatchFailurePolicy,
        header_marker: String,
        parallel_row_threshold: usize,
        recheck_after_days: i64,
    ) -> EgfrResult<Self> {
        let header_marker = header_marker.trim().to_lowercase();
        if header_marker.is_empty() {
            return Err(EgfrError::InvalidInput(
                "header_marker cannot be empty".into(),
            ));
        }
        if header_marker.contains(',') {
            return Err(EgfrError::InvalidInput(
                "header_marker cannot contain the field delimiter".into(),
            ));
        }

        let recheck_after_days = check_recheck_window(recheck_after_days)?;

        Ok(Self {
            batch_failure_policy,
            header_marker,
            parallel_row_threshold,
            recheck_after_days,
        })
    }

    pub fn batch_failure_policy(&self) -> BatchFailurePolicy {
        self.batch_failure_policy
    }

    /// Lower-cased header marker.
    pub fn header_marker(&self) -> &str {
        &self.header_marker
    }

    pub fn parallel_row_threshold(&self) -> usize {
        self.parallel_row_threshold
    }

    pub fn recheck_after_days(&self) -> i64 {
        self.recheck_after_days
    }
}

fn check_recheck_window(days: i64) -> EgfrResult<i64> {
    if (1..=MAX_RECHECK_AFTER_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(EgfrError::InvalidInput(format!(
            "recheck_after_days must be between 1 and {MAX_RECHECK_AFTER_DAYS}, got {days}"
        )))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the batch failure policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`BatchFailurePolicy::Isolate`].
pub fn batch_failure_policy_from_env_value(
    value: Option<String>,
) -> EgfrResult<BatchFailurePolicy> {
    let parsed = non_blank(value)
        .map(|v| v.parse::<BatchFailurePolicy>())
        .transpose()?;

    Ok(parsed.unwrap_or_default())
}

/// Parse the parallel row threshold from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default threshold.
pub fn parallel_row_threshold_from_env_value(value: Option<String>) -> EgfrResult<usize> {
    let parsed = non_blank(value)
        .map(|v| {
            v.parse::<usize>().map_err(|e| {
                EgfrError::InvalidInput(format!("invalid parallel row threshold '{v}': {e}"))
            })
        })
        .transpose()?;

    Ok(parsed.unwrap_or(DEFAULT_PARALLEL_ROW_THRESHOLD))
}

/// Parse the stale-history window (days) from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default of 90 days. Values outside
/// the range [`CoreConfig::new`] accepts are rejected.
pub fn recheck_after_days_from_env_value(value: Option<String>) -> EgfrResult<i64> {
    let parsed = non_blank(value)
        .map(|v| {
            v.parse::<i64>().map_err(|e| {
                EgfrError::InvalidInput(format!("invalid recheck window '{v}': {e}"))
            })
        })
        .transpose()?
        .map(check_recheck_window)
        .transpose()?;

    Ok(parsed.unwrap_or(DEFAULT_RECHECK_AFTER_DAYS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_isolates_bad_rows() {
        let cfg = CoreConfig::default();
        assert_eq!(cfg.batch_failure_policy(), BatchFailurePolicy::Isolate);
        assert_eq!(cfg.header_marker(), "patientid");
        assert_eq!(cfg.recheck_after_days(), 90);
    }

    #[test]
    fn new_normalises_header_marker() {
        let cfg = CoreConfig::new(BatchFailurePolicy::Abort, "  PatientID ".into(), 10, 30)
            .expect("valid config");
        assert_eq!(cfg.header_marker(), "patientid");
        assert_eq!(cfg.parallel_row_threshold(), 10);
    }

    #[test]
    fn new_rejects_blank_marker_and_bad_window() {
        let err = CoreConfig::new(BatchFailurePolicy::Isolate, "  ".into(), 10, 30)
            .expect_err("blank marker");
        assert!(matches!(err, EgfrError::InvalidInput(msg) if msg.contains("header_marker")));

        let err = CoreConfig::new(BatchFailurePolicy::Isolate, "id,name".into(), 10, 30)
            .expect_err("delimiter in marker");
        assert!(matches!(err, EgfrError::InvalidInput(msg) if msg.contains("delimiter")));

        let err = CoreConfig::new(BatchFailurePolicy::Isolate, "patientid".into(), 10, 0)
            .expect_err("zero window");
        assert!(matches!(err, EgfrError::InvalidInput(msg) if msg.contains("recheck_after_days")));
    }

    #[test]
    fn env_values_fall_back_to_defaults() {
        assert_eq!(
            batch_failure_policy_from_env_value(None).expect("default"),
            BatchFailurePolicy::Isolate
        );
        assert_eq!(
            batch_failure_policy_from_env_value(Some("  ".into())).expect("default"),
            BatchFailurePolicy::Isolate
        );
        assert_eq!(
            parallel_row_threshold_from_env_value(None).expect("default"),
            DEFAULT_PARALLEL_ROW_THRESHOLD
        );
        assert_eq!(recheck_after_days_from_env_value(None).expect("default"), 90);
    }

    #[test]
    fn env_values_are_parsed() {
        assert_eq!(
            batch_failure_policy_from_env_value(Some("ABORT".into())).expect("abort"),
            BatchFailurePolicy::Abort
        );
        assert_eq!(
            parallel_row_threshold_from_env_value(Some("1000".into())).expect("number"),
            1000
        );
        assert_eq!(recheck_after_days_from_env_value(Some("30".into())).expect("days"), 30);
    }

    #[test]
    fn env_values_reject_garbage() {
        assert!(batch_failure_policy_from_env_value(Some("sometimes".into())).is_err());
        assert!(parallel_row_threshold_from_env_value(Some("-1".into())).is_err());
        assert!(recheck_after_days_from_env_value(Some("ninety".into())).is_err());
    }

    #[test]
    fn recheck_window_is_bounded_in_both_entry_points() {
        for raw in ["0", "-5", "36501", "9223372036854775807"] {
            let err = recheck_after_days_from_env_value(Some(raw.into()))
                .expect_err("out of range");
            assert!(matches!(err, EgfrError::InvalidInput(msg) if msg.contains("recheck_after_days")));
        }
        assert_eq!(
            recheck_after_days_from_env_value(Some("36500".into())).expect("upper bound"),
            36_500
        );

        let err = CoreConfig::new(BatchFailurePolicy::Isolate, "patientid".into(), 10, i64::MAX)
            .expect_err("huge window");
        assert!(matches!(err, EgfrError::InvalidInput(msg) if msg.contains("recheck_after_days")));
    }
}
