use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Stable identifier for a card.
///
/// Ids are derived from stable card content (see `Card::from_fields`) and are
/// never regenerated once assigned, so progress keyed by a `CardId` survives
/// deck reloads.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardId(String);

impl CardId {
    /// Creates a new `CardId` from a non-blank string.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the value is empty after trimming.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ParseIdError> {
        let trimmed = id.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ParseIdError {
                kind: "CardId".to_string(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Derives an id from two content fields as `"{primary}|{secondary}"`.
    ///
    /// Returns `None` when both fields are blank.
    #[must_use]
    pub fn derive(primary: &str, secondary: &str) -> Option<Self> {
        let primary = primary.trim();
        let secondary = secondary.trim();
        if primary.is_empty() && secondary.is_empty() {
            return None;
        }
        Some(Self(format!("{primary}|{secondary}")))
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardId({:?})", self.0)
    }
}

// ─── Display / conversions ─────────────────────────────────────────────────────

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CardId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CardId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<CardId> for String {
    fn from(id: CardId) -> Self {
        id.0
    }
}

impl TryFrom<String> for CardId {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

// ─── FromStr ───────────────────────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for CardId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id_display() {
        let id = CardId::new("custom-42").unwrap();
        assert_eq!(id.to_string(), "custom-42");
    }

    #[test]
    fn test_card_id_trims_whitespace() {
        let id: CardId = "  hsk1-001 ".parse().unwrap();
        assert_eq!(id.as_str(), "hsk1-001");
    }

    #[test]
    fn test_card_id_rejects_blank() {
        assert!("   ".parse::<CardId>().is_err());
        assert!(CardId::new("").is_err());
    }

    #[test]
    fn test_derive_joins_fields() {
        let id = CardId::derive("你好", "nǐ hǎo").unwrap();
        assert_eq!(id.as_str(), "你好|nǐ hǎo");
    }

    #[test]
    fn test_derive_is_stable() {
        assert_eq!(CardId::derive("a", "b"), CardId::derive(" a ", "b"));
    }

    #[test]
    fn test_derive_requires_some_content() {
        assert!(CardId::derive(" ", "").is_none());
        assert_eq!(CardId::derive("", "x").unwrap().as_str(), "|x");
    }

    #[test]
    fn test_card_id_lookup_by_str() {
        let mut set = std::collections::HashSet::new();
        set.insert(CardId::new("abc").unwrap());
        assert!(set.contains("abc"));
    }
}
