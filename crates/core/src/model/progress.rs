use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{CardId, Grade};

/// Learning state persisted per card, keyed by `CardId`.
///
/// A record is created lazily on the first grade and never deleted by the
/// scheduler. `Default` is the baseline used for absent records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressRecord {
    /// Urgency for probabilistic sampling, kept >= 1.
    pub weight: f64,
    pub interval_days: u32,
    pub streak: u32,
    pub fails: u32,
    pub pass_count: u32,
    pub fail_streak: u32,
    pub pass_streak: u32,
    /// Milliseconds since epoch; 0 means never scheduled (always due).
    pub due_at_ms: i64,
    pub last_grade: Option<Grade>,
    /// Milliseconds since epoch; 0 means never seen.
    pub last_seen_at_ms: i64,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            weight: 1.0,
            interval_days: 0,
            streak: 0,
            fails: 0,
            pass_count: 0,
            fail_streak: 0,
            pass_streak: 0,
            due_at_ms: 0,
            last_grade: None,
            last_seen_at_ms: 0,
        }
    }
}

impl ProgressRecord {
    /// Returns true once the card has been shown and graded at least once.
    #[must_use]
    pub fn has_been_seen(&self) -> bool {
        self.last_seen_at_ms > 0
    }
}

/// Snapshot of every persisted record, keyed by card id.
pub type ProgressMap = HashMap<CardId, ProgressRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_is_baseline() {
        let rec = ProgressRecord::default();
        assert_eq!(rec.weight, 1.0);
        assert_eq!(rec.due_at_ms, 0);
        assert_eq!(rec.last_grade, None);
        assert!(!rec.has_been_seen());
    }

    #[test]
    fn missing_fields_deserialize_to_baseline() {
        let rec: ProgressRecord = serde_json::from_str(r#"{"streak": 2}"#).unwrap();
        assert_eq!(rec.streak, 2);
        assert_eq!(rec.weight, 1.0);
        assert_eq!(rec.interval_days, 0);
    }
}
