use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// 덱 디스크립터. 매치 시작 시 카탈로그 검증을 거친다.
///
/// BTreeMap keeps card iteration order stable, which keeps instance-id
/// minting deterministic for a given (deck, seed) pair.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DeckInfo {
    pub deck_id: String,
    pub oshi_id: String,
    pub deck: BTreeMap<String, u32>,
    pub cheer_deck: BTreeMap<String, u32>,
}

/// holoDelta 익스포트 형식. 수신 즉시 `DeckInfo` 로 정규화한다.
#[derive(Deserialize, Debug)]
pub struct HoloDeltaDeck {
    #[serde(rename = "deckName", default)]
    pub deck_name: String,
    /// `[card_id, alt_art_flag]`
    pub oshi: (String, u32),
    pub deck: Vec<HoloDeltaEntry>,
    #[serde(rename = "cheerDeck")]
    pub cheer_deck: Vec<(String, u32)>,
}

/// `[card_id, count]` or `[card_id, count, alt_art_flag]`.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum HoloDeltaEntry {
    Plain(String, u32),
    WithAlt(String, u32, u32),
}

impl DeckInfo {
    pub fn from_holodelta(raw: &HoloDeltaDeck) -> DeckInfo {
        DeckInfo {
            deck_id: if raw.deck_name.is_empty() {
                "unknown".to_string()
            } else {
                raw.deck_name.clone()
            },
            oshi_id: raw.oshi.0.clone(),
            // Alt-art flags select artwork only; the rules id stays the same.
            deck: raw
                .deck
                .iter()
                .map(|entry| match entry {
                    HoloDeltaEntry::Plain(id, count) => (id.clone(), *count),
                    HoloDeltaEntry::WithAlt(id, count, _) => (id.clone(), *count),
                })
                .collect(),
            cheer_deck: raw
                .cheer_deck
                .iter()
                .map(|(id, count)| (id.clone(), *count))
                .collect(),
        }
    }

    /// Parses either the native descriptor or a holoDelta export
    /// (recognized by its `cheerDeck` key).
    pub fn parse(json: &str) -> Result<DeckInfo, GameError> {
        if json.contains("\"cheerDeck\"") {
            let raw: HoloDeltaDeck =
                serde_json::from_str(json).map_err(|_| GameError::ParseError)?;
            Ok(DeckInfo::from_holodelta(&raw))
        } else {
            serde_json::from_str(json).map_err(|_| GameError::ParseError)
        }
    }
}
