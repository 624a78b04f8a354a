//! Deck JSON loading.
//!
//! Accepted shapes: a bare array of entries, `{ "cards": [...] }`, or
//! `{ "items": [...] }`. Entries carry `id`, `front`, `back` and `detail`,
//! with `hanzi`, `pinyin` and `english` accepted as aliases.
//!
//! Several files can make up one active deck (e.g. two levels plus a file of
//! custom cards). They are joined in order and the first card wins for each id.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use study_core::model::Card;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("cannot read deck {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid deck JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct DeckEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, alias = "hanzi")]
    front: Option<String>,
    #[serde(default, alias = "pinyin")]
    back: Option<String>,
    #[serde(default, alias = "english")]
    detail: Option<String>,
}

/// Load every deck file in order and join them into one deck.
///
/// Missing files contribute nothing. Ids repeated across or within files keep
/// the first card.
pub fn load_decks(paths: &[PathBuf]) -> Result<Vec<Card>, DeckError> {
    let mut cards = Vec::new();
    for path in paths {
        let loaded = read_cards(path)?;
        debug!(path = %path.display(), cards = loaded.len(), "deck file loaded");
        cards.extend(loaded);
    }
    Ok(dedup_by_id(cards))
}

/// Read and parse a single deck file. A missing file is an empty deck.
fn read_cards(path: &Path) -> Result<Vec<Card>, DeckError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => parse_cards(&raw, &path.display().to_string()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "deck file not found");
            Ok(Vec::new())
        }
        Err(source) => Err(DeckError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

/// Entries that are not objects or have no usable identity are skipped.
fn parse_cards(raw: &str, origin: &str) -> Result<Vec<Card>, DeckError> {
    let value: Value = serde_json::from_str(raw).map_err(|source| DeckError::Json {
        path: origin.to_string(),
        source,
    })?;

    let entries = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match (map.remove("cards"), map.remove("items")) {
            (Some(Value::Array(items)), _) | (_, Some(Value::Array(items))) => items,
            _ => {
                warn!(origin, "deck object has no cards or items array");
                Vec::new()
            }
        },
        _ => {
            warn!(origin, "deck JSON is neither an array nor an object");
            Vec::new()
        }
    };

    let mut cards = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let entry: DeckEntry = match serde_json::from_value(entry) {
            Ok(entry) => entry,
            Err(err) => {
                debug!(origin, index, %err, "skipping malformed deck entry");
                continue;
            }
        };

        match Card::from_fields(
            entry.id.as_deref(),
            entry.front.unwrap_or_default(),
            entry.back.unwrap_or_default(),
            entry.detail,
        ) {
            Ok(card) => cards.push(card),
            Err(err) => warn!(origin, index, %err, "skipping deck entry"),
        }
    }

    Ok(cards)
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

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_deck(raw: &str) -> Result<Vec<Card>, DeckError> {
        parse_cards(raw, "<inline>").map(dedup_by_id)
    }

    fn ids(cards: &[Card]) -> Vec<&str> {
        cards.iter().map(|c| c.id().as_str()).collect()
    }

    #[test]
    fn accepts_all_three_shapes() {
        let entry = r#"{"front":"a","back":"b"}"#;
        for raw in [
            format!("[{entry}]"),
            format!(r#"{{"cards":[{entry}]}}"#),
            format!(r#"{{"items":[{entry}]}}"#),
        ] {
            assert_eq!(ids(&parse_deck(&raw).unwrap()), vec!["a|b"]);
        }
    }

    #[test]
    fn unknown_shapes_are_empty() {
        assert!(parse_deck(r#"{"words":[]}"#).unwrap().is_empty());
        assert!(parse_deck("42").unwrap().is_empty());
        assert!(parse_deck(r#"{"cards":"nope"}"#).unwrap().is_empty());
    }

    #[test]
    fn hanzi_aliases_map_to_card_fields() {
        let raw = r#"[{"hanzi":"你好","pinyin":"nǐ hǎo","english":"hello"}]"#;
        let cards = parse_deck(raw).unwrap();
        assert_eq!(cards[0].id().as_str(), "你好|nǐ hǎo");
        assert_eq!(cards[0].front(), "你好");
        assert_eq!(cards[0].detail(), Some("hello"));
    }

    #[test]
    fn explicit_id_wins_and_duplicates_are_dropped() {
        let raw = r#"[
            {"id":"x1","front":"a","back":"b"},
            {"id":"x1","front":"c","back":"d"},
            {"front":"c","back":"d"},
            {"front":"","back":""},
            "not an object"
        ]"#;
        let cards = parse_deck(raw).unwrap();
        assert_eq!(ids(&cards), vec!["x1", "c|d"]);
        assert_eq!(cards[0].front(), "a");
    }

    #[test]
    fn broken_json_is_an_error() {
        assert!(matches!(parse_deck("[{"), Err(DeckError::Json { .. })));
    }

    #[test]
    fn multiple_files_join_in_order_with_first_id_winning() {
        let dir = std::env::temp_dir().join(format!("study-decks-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let level_one = dir.join("level1.json");
        let level_two = dir.join("level2.json");
        let custom = dir.join("custom.json");
        std::fs::write(
            &level_one,
            r#"[{"hanzi":"你","pinyin":"nǐ"},{"hanzi":"好","pinyin":"hǎo"}]"#,
        )
        .unwrap();
        std::fs::write(
            &level_two,
            r#"{"items": [
                {"hanzi": "好", "pinyin": "hǎo", "english": "again"},
                {"hanzi": "猫", "pinyin": "māo"}
            ]}"#,
        )
        .unwrap();
        std::fs::write(&custom, r#"{"cards":[{"id":"my-1","front":"书","back":"shū"}]}"#).unwrap();

        let paths = vec![level_one, level_two, dir.join("absent.json"), custom];
        let cards = load_decks(&paths).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(ids(&cards), vec!["你|nǐ", "好|hǎo", "猫|māo", "my-1"]);
        assert_eq!(cards[1].detail(), None);
    }

    #[test]
    fn missing_file_is_empty_deck() {
        let cards = load_decks(&[PathBuf::from("/definitely/not/here/deck.json")]).unwrap();
        assert!(cards.is_empty());
    }
}
