//! Coarse "how much is waiting" estimate for an overview screen.
//!
//! This is not used for sampling; it only counts cards a learner is likely
//! to want to look at right now.

use crate::model::{Card, ProgressMap, StudySettings};
use crate::scheduler::is_due;
use crate::weight::weight_of;

/// Counts cards that were never scheduled or whose weight exceeds the
/// settings' due-estimate threshold (1.2 by default).
#[must_use]
pub fn likely_due_count(cards: &[Card], progress: &ProgressMap, settings: &StudySettings) -> usize {
    let threshold = settings.due_estimate_threshold();
    cards
        .iter()
        .filter(|card| {
            let record = progress.get(card.id());
            let unscheduled = record.is_none_or(|r| r.due_at_ms == 0);
            unscheduled || weight_of(record) > threshold
        })
        .count()
}

/// Counts cards whose due date has passed (or that were never scheduled).
#[must_use]
pub fn due_now_count(cards: &[Card], progress: &ProgressMap, now_ms: i64) -> usize {
    cards
        .iter()
        .filter(|card| is_due(progress.get(card.id()), now_ms))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CardId, ProgressRecord};
    use crate::time::{MS_PER_DAY, fixed_now_ms};

    fn card(s: &str) -> Card {
        Card::new(CardId::new(s).unwrap(), s, s)
    }

    fn scheduled(weight: f64, due_at_ms: i64) -> ProgressRecord {
        ProgressRecord {
            weight,
            due_at_ms,
            last_seen_at_ms: fixed_now_ms(),
            ..ProgressRecord::default()
        }
    }

    #[test]
    fn counts_fresh_and_urgent_cards() {
        let now = fixed_now_ms();
        let cards = vec![card("fresh"), card("urgent"), card("calm"), card("edge")];
        let mut progress = ProgressMap::new();
        progress.insert(CardId::new("urgent").unwrap(), scheduled(2.8, now + 600_000));
        progress.insert(CardId::new("calm").unwrap(), scheduled(1.1, now + MS_PER_DAY));
        progress.insert(CardId::new("edge").unwrap(), scheduled(1.2, now + MS_PER_DAY));

        assert_eq!(likely_due_count(&cards, &progress, &StudySettings::default()), 2);
    }

    #[test]
    fn unscheduled_record_counts_even_with_low_weight() {
        let cards = vec![card("a")];
        let mut progress = ProgressMap::new();
        progress.insert(CardId::new("a").unwrap(), scheduled(1.0, 0));
        assert_eq!(likely_due_count(&cards, &progress, &StudySettings::default()), 1);
    }

    #[test]
    fn due_now_uses_due_dates() {
        let now = fixed_now_ms();
        let cards = vec![card("new"), card("past"), card("future")];
        let mut progress = ProgressMap::new();
        progress.insert(CardId::new("past").unwrap(), scheduled(1.0, now - 1));
        progress.insert(CardId::new("future").unwrap(), scheduled(1.0, now + 1));
        assert_eq!(due_now_count(&cards, &progress, now), 2);
    }
}
