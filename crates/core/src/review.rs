use crate::model::{Grade, ProgressRecord, StudySettings};
use crate::scheduler::{ScheduleState, Scheduler};
use crate::weight::WeightModel;

/// Applies a grade to both halves of a progress record.
///
/// The schedule is computed from the record as it was before the grade; the
/// weight model then updates its counters, and the schedule slice is written
/// back on top. Both halves derive `fails` from the same prior value, so it
/// moves by exactly one per fail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reviewer {
    weights: WeightModel,
    scheduler: Scheduler,
}

impl Reviewer {
    #[must_use]
    pub fn new() -> Self {
        Self::from_settings(&StudySettings::default())
    }

    #[must_use]
    pub fn from_settings(settings: &StudySettings) -> Self {
        Self {
            weights: WeightModel::from_settings(settings),
            scheduler: Scheduler::from_settings(settings),
        }
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn weights(&self) -> &WeightModel {
        &self.weights
    }

    /// Returns the record that follows `previous` after `grade` at `now_ms`.
    ///
    /// An absent record starts from the baseline.
    #[must_use]
    pub fn apply(
        &self,
        previous: Option<&ProgressRecord>,
        grade: Grade,
        now_ms: i64,
    ) -> ProgressRecord {
        let schedule = self.scheduler.next_schedule(
            &ScheduleState::from_record(previous),
            grade,
            now_ms,
        );

        let mut record = previous.cloned().unwrap_or_default();
        self.weights.apply_to_record(&mut record, grade, now_ms);
        schedule.write_to(&mut record);
        record
    }
}

impl Default for Reviewer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience wrapper around `Reviewer::apply` for one-off updates.
#[must_use]
pub fn apply_review(
    previous: Option<&ProgressRecord>,
    grade: Grade,
    now_ms: i64,
    settings: &StudySettings,
) -> ProgressRecord {
    Reviewer::from_settings(settings).apply(previous, grade, now_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{MS_PER_DAY, fixed_now_ms};

    #[test]
    fn fresh_fail_creates_relearn_record() {
        let now = fixed_now_ms();
        let rec = apply_review(None, Grade::Fail, now, &StudySettings::default());
        assert_eq!(rec.fails, 1);
        assert_eq!(rec.fail_streak, 1);
        assert_eq!(rec.streak, 0);
        assert_eq!(rec.interval_days, 0);
        assert_eq!(rec.due_at_ms, now + 600_000);
        assert_eq!(rec.last_grade, Some(Grade::Fail));
        assert_eq!(rec.last_seen_at_ms, now);
    }

    #[test]
    fn fails_counted_once_per_fail() {
        let reviewer = Reviewer::new();
        let now = fixed_now_ms();
        let mut rec = None;
        for _ in 0..3 {
            rec = Some(reviewer.apply(rec.as_ref(), Grade::Fail, now));
        }
        assert_eq!(rec.unwrap().fails, 3);
    }

    #[test]
    fn pass_after_lapse_restarts_ladder() {
        let reviewer = Reviewer::new();
        let now = fixed_now_ms();
        let mut rec = reviewer.apply(None, Grade::Pass, now);
        rec = reviewer.apply(Some(&rec), Grade::Pass, now);
        assert_eq!(rec.interval_days, 3);

        rec = reviewer.apply(Some(&rec), Grade::Fail, now);
        rec = reviewer.apply(Some(&rec), Grade::Pass, now);
        assert_eq!(rec.interval_days, 1);
        assert_eq!(rec.streak, 1);
        assert_eq!(rec.pass_count, 3);
        assert_eq!(rec.due_at_ms, now + MS_PER_DAY);
    }

    #[test]
    fn malformed_previous_weight_is_neutralised() {
        let prev = ProgressRecord {
            weight: f64::NAN,
            ..ProgressRecord::default()
        };
        let rec = Reviewer::new().apply(Some(&prev), Grade::Pass, fixed_now_ms());
        assert_eq!(rec.weight, 1.0);
    }
}
