use std::collections::HashSet;

use rand::Rng;

use crate::model::{Card, CardId, ProgressMap, StudySettings};
use crate::time::MS_PER_MINUTE;
use crate::weight::weight_of;

//
// ─── SAMPLER ───────────────────────────────────────────────────────────────────
//

/// Weighted random card picker.
///
/// Each candidate starts from its urgency weight, capped at the weight
/// model's `fail_max` so stored outliers cannot overflow the total, and is
/// then adjusted:
///
/// - not yet shown this cycle: `× coverage_boost` (2.5)
/// - shown on the previous step: `× same_card_penalty` (0.05)
/// - unseen for `m` minutes: `× (1 + min(age_boost_max, m))`, where a card that
///   was never seen gets the full boost
///
/// Selection is proportional to the adjusted weights. The random source is
/// injected so a seeded rng replays a session exactly.
///
/// # Examples
///
/// ```
/// # use std::collections::HashSet;
/// # use rand::{SeedableRng, rngs::StdRng};
/// # use study_core::model::{Card, CardId, ProgressMap};
/// # use study_core::sampler::Sampler;
/// let cards = vec![Card::new(CardId::new("only")?, "猫", "māo")];
/// let mut rng = StdRng::seed_from_u64(7);
///
/// let picked = Sampler::new().pick_next(
///     &cards,
///     &ProgressMap::new(),
///     &HashSet::new(),
///     None,
///     1_700_000_000_000,
///     &mut rng,
/// );
/// assert_eq!(picked.map(|c| c.id().as_str()), Some("only"));
/// # Ok::<(), study_core::model::ParseIdError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampler {
    weight_cap: f64,
    coverage_boost: f64,
    same_card_penalty: f64,
    age_boost_max: f64,
}

impl Sampler {
    #[must_use]
    pub fn new() -> Self {
        Self::from_settings(&StudySettings::default())
    }

    #[must_use]
    pub fn from_settings(settings: &StudySettings) -> Self {
        Self {
            weight_cap: settings.fail_max(),
            coverage_boost: settings.coverage_boost(),
            same_card_penalty: settings.same_card_penalty(),
            age_boost_max: settings.age_boost_max(),
        }
    }

    /// Adjusted selection weight of a single candidate.
    #[must_use]
    pub fn adjusted_weight(
        &self,
        id: &CardId,
        progress: &ProgressMap,
        cycle_seen: &HashSet<CardId>,
        last_shown: Option<&CardId>,
        now_ms: i64,
    ) -> f64 {
        let record = progress.get(id);
        let mut w = weight_of(record).min(self.weight_cap);

        if !cycle_seen.contains(id) {
            w *= self.coverage_boost;
        }

        if last_shown == Some(id) {
            w *= self.same_card_penalty;
        }

        let last_seen = record.map_or(0, |r| r.last_seen_at_ms);
        w * (1.0 + self.age_boost(last_seen, now_ms))
    }

    /// Linear in minutes since last seen, capped. Never-seen cards saturate.
    #[allow(clippy::cast_precision_loss)]
    fn age_boost(&self, last_seen_at_ms: i64, now_ms: i64) -> f64 {
        if last_seen_at_ms == 0 {
            return self.age_boost_max;
        }
        let age_ms = now_ms.saturating_sub(last_seen_at_ms).max(0);
        let minutes = age_ms as f64 / MS_PER_MINUTE as f64;
        minutes.min(self.age_boost_max)
    }

    /// Adjusted weights for every card, in deck order.
    #[must_use]
    pub fn candidate_weights(
        &self,
        cards: &[Card],
        progress: &ProgressMap,
        cycle_seen: &HashSet<CardId>,
        last_shown: Option<&CardId>,
        now_ms: i64,
    ) -> Vec<f64> {
        cards
            .iter()
            .map(|card| self.adjusted_weight(card.id(), progress, cycle_seen, last_shown, now_ms))
            .collect()
    }

    /// Pick the next card to show.
    ///
    /// Returns `None` only for an empty deck. A degenerate total weight falls
    /// back to the first card.
    pub fn pick_next<'a, R: Rng + ?Sized>(
        &self,
        cards: &'a [Card],
        progress: &ProgressMap,
        cycle_seen: &HashSet<CardId>,
        last_shown: Option<&CardId>,
        now_ms: i64,
        rng: &mut R,
    ) -> Option<&'a Card> {
        if cards.is_empty() {
            return None;
        }

        let weights = self.candidate_weights(cards, progress, cycle_seen, last_shown, now_ms);
        let total: f64 = weights.iter().sum();

        if !total.is_finite() || total <= 0.0 {
            return cards.first();
        }

        let r = rng.random::<f64>() * total;
        select_index(&weights, r).and_then(|idx| cards.get(idx))
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks `weights` in order, subtracting each from `r`, and returns the first
/// index where the remainder reaches zero or below.
///
/// Exact boundaries resolve to the earlier index. If rounding leaves nothing
/// selected, the last index is returned. `None` only for empty input.
#[must_use]
pub fn select_index(weights: &[f64], r: f64) -> Option<usize> {
    let mut remaining = r;
    for (idx, w) in weights.iter().enumerate() {
        remaining -= w;
        if remaining <= 0.0 {
            return Some(idx);
        }
    }
    weights.len().checked_sub(1)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
