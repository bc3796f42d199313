//! CKD stage classification table.
//!
//! Six KDIGO G-categories keyed by eGFR. Classification uses only the lower bound of each entry:
//! scanning from G1 downwards, the first stage whose `min_value` is at or below the value wins.
//! That makes the bins contiguous over `[0, +∞)`; a value such as 89.95, which the displayed
//! ranges ("60-89") do not mention, lands in G2.
//!
//! `max_value` is kept for legends and charts only.

use egfr_types::StageCode;

/// Static display and lookup metadata for one CKD stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CkdStage {
    pub code: StageCode,
    /// Display code, e.g. `G3A`.
    pub id: &'static str,
    /// Storage value, e.g. `3A`.
    pub db_value: &'static str,
    /// Short label, e.g. `G3A: Mildly to moderately decreased`.
    pub name: &'static str,
    /// Long label shown by the interactive calculator.
    pub full_name: &'static str,
    pub range: &'static str,
    /// Legend colour (hex RGB).
    pub color: &'static str,
    pub min_value: f64,
    pub max_value: f64,
    pub description: &'static str,
}

/// The classification table, ordered from G1 (highest eGFR) to G5.
pub static CKD_STAGES: [CkdStage; 6] = [
    CkdStage {
        code: StageCode::G1,
        id: "G1",
        db_value: "1",
        name: "G1: Normal",
        full_name: "Stage 1 (Normal or High)",
        range: "≥90",
        color: "#4caf50",
        min_value: 90.0,
        max_value: f64::INFINITY,
        description: "Normal or high kidney function",
    },
    CkdStage {
        code: StageCode::G2,
        id: "G2",
        db_value: "2",
        name: "G2: Mildly decreased",
        full_name: "Stage 2 (Mildly Decreased)",
        range: "60-89",
        color: "#8bc34a",
        min_value: 60.0,
        max_value: 89.9,
        description: "Mildly decreased kidney function",
    },
    CkdStage {
        code: StageCode::G3A,
        id: "G3A",
        db_value: "3A",
        name: "G3A: Mildly to moderately decreased",
        full_name: "Stage 3A (Mild to Moderate Decrease)",
        range: "45-59",
        color: "#ffeb3b",
        min_value: 45.0,
        max_value: 59.9,
        description: "Mildly to moderately decreased kidney function",
    },
    CkdStage {
        code: StageCode::G3B,
        id: "G3B",
        db_value: "3B",
        name: "G3B: Moderately to severely decreased",
        full_name: "Stage 3B (Moderate to Severe Decrease)",
        range: "30-44",
        color: "#ff9800",
        min_value: 30.0,
        max_value: 44.9,
        description: "Moderately to severely decreased kidney function",
    },
    CkdStage {
        code: StageCode::G4,
        id: "G4",
        db_value: "4",
        name: "G4: Severely decreased",
        full_name: "Stage 4 (Severely Decreased)",
        range: "15-29",
        color: "#ff5722",
        min_value: 15.0,
        max_value: 29.9,
        description: "Severely decreased kidney function",
    },
    CkdStage {
        code: StageCode::G5,
        id: "G5",
        db_value: "5",
        name: "G5: Kidney failure",
        full_name: "Stage 5 (Kidney Failure)",
        range: "<15",
        color: "#f44336",
        min_value: 0.0,
        max_value: 14.9,
        description: "Kidney failure",
    },
];

/// Classify a rounded eGFR value.
///
/// Total: negative and NaN input (never produced by validated measurements) fall through to G5.
pub fn classify(egfr_rounded: f64) -> &'static CkdStage {
    let most_severe = &CKD_STAGES[CKD_STAGES.len() - 1];
    CKD_STAGES
        .iter()
        .find(|stage| egfr_rounded >= stage.min_value)
        .unwrap_or(most_severe)
}

/// Metadata for a known stage code.
pub fn stage(code: StageCode) -> &'static CkdStage {
    match code {
        StageCode::G1 => &CKD_STAGES[0],
        StageCode::G2 => &CKD_STAGES[1],
        StageCode::G3A => &CKD_STAGES[2],
        StageCode::G3B => &CKD_STAGES[3],
        StageCode::G4 => &CKD_STAGES[4],
        StageCode::G5 => &CKD_STAGES[5],
    }
}

/// Look a stage up by display code, database value or "Stage N" text.
///
/// `"G3A"`, `"3A"`, `"g3a"` and `"stage 3a"` all resolve to the same entry.
pub fn by_id(stage_id: &str) -> Option<&'static CkdStage> {
    StageCode::parse(stage_id).ok().map(stage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_is_total_over_boundaries() {
        let cases = [
            (0.0, StageCode::G5),
            (14.9, StageCode::G5),
            (15.0, StageCode::G4),
            (29.9, StageCode::G4),
            (30.0, StageCode::G3B),
            (44.9, StageCode::G3B),
            (45.0, StageCode::G3A),
            (59.9, StageCode::G3A),
            (60.0, StageCode::G2),
            (89.9, StageCode::G2),
            (90.0, StageCode::G1),
            (1000.0, StageCode::G1),
        ];
        for (egfr, expected) in cases {
            assert_eq!(classify(egfr).code, expected, "eGFR {egfr}");
        }
    }

    #[test]
    fn adjacent_boundaries_fall_in_adjacent_stages() {
        let pairs = [(14.9, 15.0), (29.9, 30.0), (44.9, 45.0), (59.9, 60.0), (89.9, 90.0)];
        for (below, at) in pairs {
            let lower = classify(below).code;
            let upper = classify(at).code;
            assert_ne!(lower, upper);
            let lower_idx = StageCode::ALL.iter().position(|c| *c == lower).expect("known");
            let upper_idx = StageCode::ALL.iter().position(|c| *c == upper).expect("known");
            assert_eq!(lower_idx, upper_idx + 1, "{below} vs {at}");
        }
    }

    #[test]
    fn classify_has_no_gaps_between_display_ranges() {
        assert_eq!(classify(89.95).code, StageCode::G2);
        assert_eq!(classify(59.99).code, StageCode::G3A);
        assert_eq!(classify(14.99).code, StageCode::G5);
    }

    #[test]
    fn classify_out_of_domain_input_is_most_severe() {
        assert_eq!(classify(-1.0).code, StageCode::G5);
        assert_eq!(classify(f64::NAN).code, StageCode::G5);
        assert_eq!(classify(f64::INFINITY).code, StageCode::G1);
    }

    #[test]
    fn table_is_ordered_and_partitions_from_zero() {
        for pair in CKD_STAGES.windows(2) {
            assert!(pair[0].min_value > pair[1].min_value);
        }
        assert_eq!(CKD_STAGES[CKD_STAGES.len() - 1].min_value, 0.0);
        for entry in &CKD_STAGES {
            assert_eq!(stage(entry.code), entry);
            assert_eq!(entry.id, entry.code.id());
            assert_eq!(entry.db_value, entry.code.db_value());
        }
    }

    #[test]
    fn by_id_normalises_codes() {
        assert_eq!(by_id("3A"), by_id("G3A"));
        assert_eq!(by_id("stage 1"), by_id("G1"));
        assert_eq!(by_id("g3b").map(|s| s.code), Some(StageCode::G3B));
        assert_eq!(by_id("4").map(|s| s.name), Some("G4: Severely decreased"));
        assert!(by_id("G7").is_none());
        assert!(by_id("").is_none());
    }
}
