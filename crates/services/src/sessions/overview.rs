use serde::Serialize;

use study_core::due::{due_now_count, likely_due_count};
use study_core::model::{Card, CardId, StudySettings};
use study_core::scheduler::due_queue;
use study_core::time::Clock;
use storage::repository::{ProgressRepository, StorageError};

/// Home-screen numbers for a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewReport {
    pub total: usize,
    /// Coarse estimate: unscheduled cards plus cards with elevated weight.
    pub likely_due: usize,
    /// Cards whose tone schedule says they are due right now.
    pub due_now: usize,
    /// Due cards by due date, then never-graded cards in deck order.
    pub queue: Vec<CardId>,
}

/// Read-only summaries over a deck and its stored progress.
#[derive(Debug, Clone, Default)]
pub struct DeckOverview {
    settings: StudySettings,
}

impl DeckOverview {
    #[must_use]
    pub fn new(settings: StudySettings) -> Self {
        Self { settings }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the progress snapshot cannot be read.
    pub async fn summarize(
        &self,
        cards: &[Card],
        store: &dyn ProgressRepository,
        clock: Clock,
    ) -> Result<OverviewReport, StorageError> {
        let progress = store.get_all().await?;
        let now_ms = clock.now_ms();

        Ok(OverviewReport {
            total: cards.len(),
            likely_due: likely_due_count(cards, &progress, &self.settings),
            due_now: due_now_count(cards, &progress, now_ms),
            queue: due_queue(cards, &progress, now_ms)
                .into_iter()
                .map(|c| c.id().clone())
                .collect(),
        })
    }
}
