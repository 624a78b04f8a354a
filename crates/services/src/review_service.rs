use chrono::{DateTime, Utc};
use tracing::debug;

use study_core::{
    model::{CardId, Grade, ProgressRecord, StudySettings},
    review::Reviewer,
    time::Clock,
};
use storage::repository::ProgressRepository;

pub use crate::error::ReviewServiceError;

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Coordinates applying a grade to a card's stored progress.
///
/// Owns the clock so every update in a session is stamped from one source of
/// time, and the settings that drive the weight model and tone scheduler.
#[derive(Debug, Clone)]
pub struct ReviewService {
    clock: Clock,
    settings: StudySettings,
    reviewer: Reviewer,
}

impl ReviewService {
    /// Create a review service with stock settings and a real-time clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(StudySettings::default())
    }

    /// Create a review service with custom settings (still uses default clock).
    #[must_use]
    pub fn with_settings(settings: StudySettings) -> Self {
        Self {
            clock: Clock::default(),
            reviewer: Reviewer::from_settings(&settings),
            settings,
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub(crate) fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn settings(&self) -> &StudySettings {
        &self.settings
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Current time according to the service's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Apply a grade to an in-memory record without touching storage.
    #[must_use]
    pub fn review(&self, previous: Option<&ProgressRecord>, grade: Grade) -> ProgressRecord {
        self.reviewer.apply(previous, grade, self.now_ms())
    }

    /// Load the record for `id`, apply `grade`, and persist the result.
    ///
    /// A card with no stored record starts from the baseline. The read and
    /// the write are separate calls; concurrent writers for the same id are
    /// last-writer-wins.
    ///
    /// # Errors
    ///
    /// Returns `ReviewServiceError::Storage` if the read or the write fails.
    /// Nothing is written when the read fails.
    pub async fn record_grade(
        &self,
        store: &dyn ProgressRepository,
        id: &CardId,
        grade: Grade,
    ) -> Result<ProgressRecord, ReviewServiceError> {
        let previous = store.get(id).await?;
        let next = self.review(previous.as_ref(), grade);

        debug!(
            card = %id,
            %grade,
            weight_before = previous.as_ref().map_or(1.0, |r| r.weight),
            weight_after = next.weight,
            interval_days = next.interval_days,
            due_at_ms = next.due_at_ms,
            "recorded grade"
        );

        store.set(id, &next).await?;
        Ok(next)
    }
}

impl Default for ReviewService {
    fn default() -> Self {
        Self::new()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use storage::repository::{InMemoryRepository, StorageError};
    use study_core::model::{ProgressMap, StudySettingsDraft};
    use study_core::time::{MS_PER_DAY, fixed_clock, fixed_now_ms};

    fn id(s: &str) -> CardId {
        CardId::new(s).unwrap()
    }

    /// Store whose reads always fail.
    struct BrokenRead;

    #[async_trait]
    impl ProgressRepository for BrokenRead {
        async fn get(&self, _id: &CardId) -> Result<Option<ProgressRecord>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn set(&self, _id: &CardId, _record: &ProgressRecord) -> Result<(), StorageError> {
            panic!("set must not be called after a failed read");
        }

        async fn get_all(&self) -> Result<ProgressMap, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
    }

    #[test]
    fn review_uses_service_clock() {
        let service = ReviewService::new().with_clock(fixed_clock());
        let rec = service.review(None, Grade::Pass);
        assert_eq!(rec.last_seen_at_ms, fixed_now_ms());
        assert_eq!(rec.due_at_ms, fixed_now_ms() + MS_PER_DAY);
    }

    #[tokio::test]
    async fn record_grade_creates_then_updates() {
        let repo = InMemoryRepository::new();
        let service = ReviewService::new().with_clock(fixed_clock());

        let first = service.record_grade(&repo, &id("a"), Grade::Fail).await.unwrap();
        assert_eq!(first.fails, 1);
        assert_eq!(first.due_at_ms, fixed_now_ms() + 600_000);

        let second = service.record_grade(&repo, &id("a"), Grade::Pass).await.unwrap();
        assert_eq!(second.fails, 1);
        assert_eq!(second.streak, 1);
        assert_eq!(second.pass_count, 1);

        assert_eq!(repo.get(&id("a")).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn record_grade_honours_custom_settings() {
        let settings = StudySettingsDraft {
            relearn_delay_ms: 60_000,
            ..StudySettingsDraft::default()
        }
        .validate()
        .unwrap();
        let repo = InMemoryRepository::new();
        let service = ReviewService::with_settings(settings).with_clock(fixed_clock());

        let rec = service.record_grade(&repo, &id("a"), Grade::Fail).await.unwrap();
        assert_eq!(rec.due_at_ms, fixed_now_ms() + 60_000);
    }

    #[tokio::test]
    async fn failed_read_is_reported_and_nothing_written() {
        let service = ReviewService::new().with_clock(fixed_clock());
        let err = service
            .record_grade(&BrokenRead, &id("a"), Grade::Pass)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReviewServiceError::Storage(StorageError::Connection(_))
        ));
    }
}
