use std::fmt;

/// Counter snapshot for a probabilistic study session, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    /// Current pass over the deck, starting at 1.
    pub cycle: u32,
    /// Distinct cards shown in the current cycle.
    pub seen_in_cycle: usize,
    pub deck_size: usize,
    pub total_reviewed: u64,
}

impl SessionProgress {
    /// Cards not yet shown in the current cycle.
    #[must_use]
    pub fn remaining_in_cycle(&self) -> usize {
        self.deck_size.saturating_sub(self.seen_in_cycle)
    }
}

impl fmt::Display for SessionProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cycle {} | Seen {}/{} | Reviewed {}",
            self.cycle, self.seen_in_cycle, self.deck_size, self.total_reviewed
        )
    }
}
