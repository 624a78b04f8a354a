use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::CardId;

//
// ─── CARD ──────────────────────────────────────────────────────────────────────
//

/// A flashcard as seen by the scheduler.
///
/// Only `id` matters for scheduling; the content fields are carried through
/// for display and are otherwise opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    front: String,
    back: String,
    detail: Option<String>,
}

impl Card {
    #[must_use]
    pub fn new(id: CardId, front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            id,
            front: front.into(),
            back: back.into(),
            detail: None,
        }
    }

    /// Builds a card from raw deck fields.
    ///
    /// An explicit, non-blank id wins. Otherwise the id is derived from
    /// `front` and `back` so it stays stable across reloads.
    ///
    /// # Errors
    ///
    /// Returns `CardError::MissingIdentity` if there is no explicit id and both
    /// content fields are blank.
    pub fn from_fields(
        explicit_id: Option<&str>,
        front: impl Into<String>,
        back: impl Into<String>,
        detail: Option<String>,
    ) -> Result<Self, CardError> {
        let front = front.into();
        let back = back.into();

        let id = explicit_id
            .and_then(|raw| CardId::new(raw).ok())
            .or_else(|| CardId::derive(&front, &back))
            .ok_or(CardError::MissingIdentity)?;

        Ok(Self {
            id,
            front,
            back,
            detail: detail.filter(|d| !d.trim().is_empty()),
        })
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &CardId {
        &self.id
    }

    #[must_use]
    pub fn front(&self) -> &str {
        &self.front
    }

    #[must_use]
    pub fn back(&self) -> &str {
        &self.back
    }

    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

//
// ─── CARD ERRORS ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardError {
    #[error("card has no id and no content to derive one from")]
    MissingIdentity,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
