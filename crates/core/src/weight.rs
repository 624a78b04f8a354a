//! Urgency weights for probabilistic sampling.
//!
//! A weight is a score, not a probability. It never drops below 1 so every
//! card keeps a nonzero chance of being drawn; fails push it up quickly and
//! passes decay it back toward 1.

use crate::model::{CardId, Grade, ProgressMap, ProgressRecord, StudySettings};

/// Weight of a stored record, or 1 when absent, non-finite or not positive.
#[must_use]
pub fn weight_of(record: Option<&ProgressRecord>) -> f64 {
    match record {
        Some(r) if r.weight.is_finite() && r.weight > 0.0 => r.weight,
        _ => 1.0,
    }
}

/// Looks up the urgency weight for `id` in a progress snapshot.
#[must_use]
pub fn get_weight(progress: &ProgressMap, id: &CardId) -> f64 {
    weight_of(progress.get(id))
}

/// Updates urgency weights and pass/fail counters after a grade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightModel {
    fail_mult: f64,
    fail_add: f64,
    fail_max: f64,
    pass_decay: f64,
}

impl WeightModel {
    #[must_use]
    pub fn new() -> Self {
        Self::from_settings(&StudySettings::default())
    }

    #[must_use]
    pub fn from_settings(settings: &StudySettings) -> Self {
        Self {
            fail_mult: settings.fail_mult(),
            fail_add: settings.fail_add(),
            fail_max: settings.fail_max(),
            pass_decay: settings.pass_decay(),
        }
    }

    /// Weight that follows `previous` after `grade`.
    ///
    /// - fail: `min(fail_max, w * fail_mult + fail_add)`
    /// - pass: `max(1, 1 + (w - 1) * pass_decay)`
    #[must_use]
    pub fn next_weight(&self, previous: f64, grade: Grade) -> f64 {
        match grade {
            Grade::Fail => (previous * self.fail_mult + self.fail_add).min(self.fail_max),
            Grade::Pass => (1.0 + (previous - 1.0) * self.pass_decay).max(1.0),
        }
    }

    /// Applies a grade to a single record in place.
    pub fn apply_to_record(&self, record: &mut ProgressRecord, grade: Grade, now_ms: i64) {
        let previous = weight_of(Some(record));
        record.weight = self.next_weight(previous, grade);

        match grade {
            Grade::Fail => {
                record.fails = record.fails.saturating_add(1);
                record.fail_streak = record.fail_streak.saturating_add(1);
                record.pass_streak = 0;
            }
            Grade::Pass => {
                record.pass_count = record.pass_count.saturating_add(1);
                record.pass_streak = record.pass_streak.saturating_add(1);
                record.fail_streak = 0;
            }
        }

        record.last_grade = Some(grade);
        record.last_seen_at_ms = now_ms;
    }

    /// Applies a grade to `id`, creating its record if absent.
    pub fn apply_grade<'a>(
        &self,
        progress: &'a mut ProgressMap,
        id: &CardId,
        grade: Grade,
        now_ms: i64,
    ) -> &'a ProgressRecord {
        let record = progress.entry(id.clone()).or_default();
        self.apply_to_record(record, grade, now_ms);
        record
    }
}

impl Default for WeightModel {
    fn default() -> Self {
        Self::new()
    }
}
