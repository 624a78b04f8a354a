use serde::{Deserialize, Serialize};

use crate::model::{Card, Grade, ProgressMap, ProgressRecord, StudySettings};
use crate::time::MS_PER_DAY;

//
// ─── SCHEDULE STATE ────────────────────────────────────────────────────────────
//

/// The due-date slice of a `ProgressRecord`.
///
/// Absent records map to all zeros, which also means "always due".
///
/// # Examples
///
/// ```
/// # use study_core::scheduler::ScheduleState;
/// let fresh = ScheduleState::from_record(None);
/// assert_eq!(fresh, ScheduleState::default());
/// assert_eq!(fresh.due_at_ms, 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleState {
    pub interval_days: u32,
    pub streak: u32,
    pub fails: u32,
    pub due_at_ms: i64,
}

impl ScheduleState {
    #[must_use]
    pub fn from_record(record: Option<&ProgressRecord>) -> Self {
        record.map_or_else(Self::default, |r| Self {
            interval_days: r.interval_days,
            streak: r.streak,
            fails: r.fails,
            due_at_ms: r.due_at_ms,
        })
    }

    /// Writes this schedule back into a record, leaving weight fields alone.
    pub fn write_to(&self, record: &mut ProgressRecord) {
        record.interval_days = self.interval_days;
        record.streak = self.streak;
        record.fails = self.fails;
        record.due_at_ms = self.due_at_ms;
    }
}

//
// ─── SCHEDULER ─────────────────────────────────────────────────────────────────
//

/// Interval-doubling spaced repetition ("tone") scheduler.
///
/// - A fail drops the card into a short relearn window (10 minutes by default)
///   and resets the streak and interval.
/// - Passes walk a fixed ladder of 1, 3 and 7 days, then double the previous
///   interval up to a cap (60 days by default).
///
/// # Examples
///
/// ```
/// # use study_core::scheduler::{Scheduler, ScheduleState};
/// # use study_core::model::Grade;
/// let scheduler = Scheduler::new();
/// let now = 1_700_000_000_000;
///
/// let first = scheduler.next_schedule(&ScheduleState::default(), Grade::Pass, now);
/// assert_eq!(first.interval_days, 1);
/// assert_eq!(first.due_at_ms, now + 86_400_000);
///
/// let lapsed = scheduler.next_schedule(&first, Grade::Fail, now);
/// assert_eq!(lapsed.interval_days, 0);
/// assert_eq!(lapsed.due_at_ms, now + 600_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduler {
    relearn_delay_ms: i64,
    max_interval_days: u32,
}

impl Scheduler {
    /// Scheduler with the stock relearn window and interval cap.
    #[must_use]
    pub fn new() -> Self {
        Self::from_settings(&StudySettings::default())
    }

    #[must_use]
    pub fn from_settings(settings: &StudySettings) -> Self {
        Self {
            relearn_delay_ms: settings.relearn_delay_ms(),
            max_interval_days: settings.max_interval_days(),
        }
    }

    #[must_use]
    pub fn max_interval_days(&self) -> u32 {
        self.max_interval_days
    }

    /// Compute the next schedule for a grade. Pure: persistence is the caller's job.
    #[must_use]
    pub fn next_schedule(
        &self,
        current: &ScheduleState,
        grade: Grade,
        now_ms: i64,
    ) -> ScheduleState {
        match grade {
            Grade::Fail => ScheduleState {
                interval_days: 0,
                streak: 0,
                fails: current.fails.saturating_add(1),
                due_at_ms: now_ms.saturating_add(self.relearn_delay_ms),
            },
            Grade::Pass => {
                let streak = current.streak.saturating_add(1);
                let interval_days = self.interval_for_streak(streak, current.interval_days);
                ScheduleState {
                    interval_days,
                    streak,
                    fails: current.fails,
                    due_at_ms: now_ms.saturating_add(i64::from(interval_days) * MS_PER_DAY),
                }
            }
        }
    }

    fn interval_for_streak(&self, streak: u32, previous_days: u32) -> u32 {
        match streak {
            0 | 1 => 1,
            2 => 3,
            3 => 7,
            // Integer doubling needs no rounding.
            _ => previous_days.saturating_mul(2).min(self.max_interval_days),
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

//
// ─── DUE QUERIES ───────────────────────────────────────────────────────────────
//

/// A card is due when it was never scheduled (`due_at_ms == 0`) or its due
/// time has passed. Absent records are always due.
#[must_use]
pub fn is_due(record: Option<&ProgressRecord>, now_ms: i64) -> bool {
    match record {
        None => true,
        Some(r) => r.due_at_ms == 0 || r.due_at_ms <= now_ms,
    }
}

/// Deterministic review queue: graded cards that are due, earliest due date
/// first, followed by never-graded cards in deck order.
///
/// Ties on the due date keep deck order.
#[must_use]
pub fn due_queue<'a>(cards: &'a [Card], progress: &ProgressMap, now_ms: i64) -> Vec<&'a Card> {
    let mut due: Vec<(&Card, i64)> = Vec::new();
    let mut fresh: Vec<&Card> = Vec::new();

    for card in cards {
        match progress.get(card.id()) {
            None => fresh.push(card),
            Some(record) if is_due(Some(record), now_ms) => due.push((card, record.due_at_ms)),
            Some(_) => {}
        }
    }

    due.sort_by_key(|(_, due_at)| *due_at);
    due.into_iter().map(|(card, _)| card).chain(fresh).collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
