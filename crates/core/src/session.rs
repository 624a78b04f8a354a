use std::collections::HashSet;

use rand::Rng;

use crate::model::{Card, CardId, Grade, ProgressMap, ProgressRecord, SessionProgress};
use crate::review::Reviewer;
use crate::sampler::Sampler;

/// Process-local state of a probabilistic study session.
///
/// Tracks the current cycle (a full pass over the deck), the ids shown in
/// that cycle, the number of grades recorded, and the last card shown. None
/// of this is persisted; it is discarded with the session.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    sampler: Sampler,
    reviewer: Reviewer,
    cycle: u32,
    cycle_seen: HashSet<CardId>,
    total_reviewed: u64,
    last_shown: Option<CardId>,
}

impl SessionTracker {
    #[must_use]
    pub fn new(sampler: Sampler, reviewer: Reviewer) -> Self {
        Self {
            sampler,
            reviewer,
            cycle: 1,
            cycle_seen: HashSet::new(),
            total_reviewed: 0,
            last_shown: None,
        }
    }

    #[must_use]
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    #[must_use]
    pub fn cycle_seen(&self) -> &HashSet<CardId> {
        &self.cycle_seen
    }

    #[must_use]
    pub fn total_reviewed(&self) -> u64 {
        self.total_reviewed
    }

    #[must_use]
    pub fn last_shown(&self) -> Option<&CardId> {
        self.last_shown.as_ref()
    }

    /// Pick the next card and record it as shown.
    ///
    /// When the pick completes the cycle, the cycle counter increments and the
    /// seen set clears afterwards, so the completing card counts toward the
    /// old cycle. A cycle is complete once every distinct id in `cards` has
    /// been shown, so repeated ids cannot stall it. Returns `None` only for an
    /// empty deck.
    pub fn advance<'a, R: Rng + ?Sized>(
        &mut self,
        cards: &'a [Card],
        progress: &ProgressMap,
        now_ms: i64,
        rng: &mut R,
    ) -> Option<&'a Card> {
        let card = self.sampler.pick_next(
            cards,
            progress,
            &self.cycle_seen,
            self.last_shown.as_ref(),
            now_ms,
            rng,
        )?;

        self.cycle_seen.insert(card.id().clone());
        self.last_shown = Some(card.id().clone());

        if cards.iter().all(|c| self.cycle_seen.contains(c.id())) {
            self.cycle = self.cycle.saturating_add(1);
            self.cycle_seen.clear();
        }

        Some(card)
    }

    /// Apply a grade to the card's record (weight and schedule, merged) and
    /// count the review.
    pub fn record_grade<'a>(
        &mut self,
        progress: &'a mut ProgressMap,
        id: &CardId,
        grade: Grade,
        now_ms: i64,
    ) -> &'a ProgressRecord {
        let record = progress.entry(id.clone()).or_default();
        *record = self.reviewer.apply(Some(&*record), grade, now_ms);
        self.note_reviewed();
        record
    }

    /// Count a review whose record was updated elsewhere (e.g. in a store).
    pub fn note_reviewed(&mut self) {
        self.total_reviewed = self.total_reviewed.saturating_add(1);
    }

    #[must_use]
    pub fn progress(&self, deck_size: usize) -> SessionProgress {
        SessionProgress {
            cycle: self.cycle,
            seen_in_cycle: self.cycle_seen.len(),
            deck_size,
            total_reviewed: self.total_reviewed,
        }
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new(Sampler::new(), Reviewer::new())
    }
}
