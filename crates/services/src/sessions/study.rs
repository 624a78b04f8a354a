use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use study_core::model::{Card, CardId, Grade, ProgressRecord, SessionProgress, StudySettings};
use study_core::review::Reviewer;
use study_core::sampler::Sampler;
use study_core::session::SessionTracker;
use study_core::time::Clock;
use storage::repository::ProgressRepository;

use crate::error::StudyError;
use crate::review_service::ReviewService;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Open-ended probabilistic study session over a fixed deck.
///
/// Each `next_card` call snapshots the store, samples a card, and marks it as
/// shown; `grade` persists the outcome for that card. Cycle and seen-set state
/// lives only in this value and is gone when it is dropped. There is no
/// terminal state: the caller decides when to stop.
pub struct StudySession {
    cards: Vec<Card>,
    tracker: SessionTracker,
    store: Arc<dyn ProgressRepository>,
    review: ReviewService,
    rng: StdRng,
    current: Option<CardId>,
}

impl StudySession {
    /// Start a session over `cards` using stock settings.
    ///
    /// Ids must be unique within a session; repeated ids keep the first card.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Empty` if `cards` is empty.
    pub fn start(
        cards: Vec<Card>,
        store: Arc<dyn ProgressRepository>,
        clock: Clock,
    ) -> Result<Self, StudyError> {
        let cards = dedup_by_id(cards);
        if cards.is_empty() {
            return Err(StudyError::Empty);
        }

        info!(cards = cards.len(), "study session started");

        Ok(Self {
            cards,
            tracker: SessionTracker::default(),
            store,
            review: ReviewService::new().with_clock(clock),
            rng: StdRng::from_os_rng(),
            current: None,
        })
    }

    /// Replace the tuning settings. Resets the cycle state.
    #[must_use]
    pub fn with_settings(mut self, settings: StudySettings) -> Self {
        let clock = self.review.clock();
        self.tracker = SessionTracker::new(
            Sampler::from_settings(&settings),
            Reviewer::from_settings(&settings),
        );
        self.review = ReviewService::with_settings(settings).with_clock(clock);
        self
    }

    /// Seed the sampler so the sequence of picks is reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn settings(&self) -> &StudySettings {
        self.review.settings()
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&Card> {
        let id = self.current.as_ref()?;
        self.cards.iter().find(|c| c.id() == id)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.tracker.progress(self.cards.len())
    }

    /// Move the session clock forward; only affects fixed clocks.
    pub fn advance_clock(&mut self, delta: Duration) {
        self.review.clock_mut().advance(delta);
    }

    /// Sample the next card and mark it as shown.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Storage` if the progress snapshot cannot be read.
    pub async fn next_card(&mut self) -> Result<&Card, StudyError> {
        let progress = self.store.get_all().await?;
        let now_ms = self.review.now_ms();
        let cycle_before = self.tracker.cycle();

        let card = self
            .tracker
            .advance(&self.cards, &progress, now_ms, &mut self.rng)
            .ok_or(StudyError::Empty)?;

        debug!(
            card = %card.id(),
            cycle = self.tracker.cycle(),
            seen = self.tracker.cycle_seen().len(),
            "card shown"
        );
        if self.tracker.cycle() != cycle_before {
            info!(cycle = self.tracker.cycle(), "cycle complete");
        }

        self.current = Some(card.id().clone());
        Ok(card)
    }

    /// Grade the card currently shown.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::NoCurrentCard` if no card has been shown since the
    /// last grade, or a storage error if persisting fails.
    pub async fn grade(&mut self, grade: Grade) -> Result<ProgressRecord, StudyError> {
        let id = self.current.clone().ok_or(StudyError::NoCurrentCard)?;
        self.grade_card(&id, grade).await
    }

    /// Grade any card of this session by id.
    ///
    /// Clears the current card when it is the one graded.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::UnknownCard` if the id is not in the deck, or a
    /// storage error if persisting fails. The review counter only moves on
    /// success.
    pub async fn grade_card(
        &mut self,
        id: &CardId,
        grade: Grade,
    ) -> Result<ProgressRecord, StudyError> {
        if !self.cards.iter().any(|c| c.id() == id) {
            return Err(StudyError::UnknownCard(id.to_string()));
        }

        let record = self
            .review
            .record_grade(self.store.as_ref(), id, grade)
            .await?;
        self.tracker.note_reviewed();

        if self.current.as_ref() == Some(id) {
            self.current = None;
        }
        Ok(record)
    }
}

fn dedup_by_id(cards: Vec<Card>) -> Vec<Card> {
    let mut seen = HashSet::with_capacity(cards.len());
    cards
        .into_iter()
        .filter(|card| {
            let fresh = seen.insert(card.id().clone());
            if !fresh {
                warn!(card = %card.id(), "duplicate card id; keeping the first");
            }
            fresh
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
