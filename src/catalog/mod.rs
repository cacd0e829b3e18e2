use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::error::GameError;

pub mod deck;
pub mod defs;

pub use deck::DeckInfo;
pub use defs::*;

const MAIN_DECK_SIZE: u32 = 50;
const CHEER_DECK_SIZE: u32 = 20;
const MAX_COPIES: u32 = 4;

/// 카드 ID → 룰 데이터. 로드 이후 불변이며 모든 매치가 공유한다.
pub struct CardCatalog {
    cards: HashMap<String, CardDef>,
}

impl CardCatalog {
    pub fn from_defs(defs: Vec<CardDef>) -> Self {
        let cards = defs
            .into_iter()
            .map(|def| (def.card_id().to_string(), def))
            .collect();
        Self { cards }
    }

    pub fn from_json_str(json: &str) -> Result<Self, GameError> {
        let defs: Vec<CardDef> =
            serde_json::from_str(json).map_err(|e| GameError::CatalogLoad(e.to_string()))?;
        Ok(Self::from_defs(defs))
    }

    pub fn from_json_file(path: &Path) -> Result<Arc<Self>, GameError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| GameError::CatalogLoad(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_json_str(&raw)?;
        info!("Card catalog loaded: {} cards from {}", catalog.len(), path.display());
        Ok(Arc::new(catalog))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, card_id: &str) -> Option<&CardDef> {
        self.cards.get(card_id)
    }

    pub fn expect(&self, card_id: &str) -> Result<&CardDef, GameError> {
        self.cards
            .get(card_id)
            .ok_or_else(|| GameError::UnknownCard(card_id.to_string()))
    }

    /// Deck legality check, run before a room ever constructs an engine.
    /// An unknown card id can therefore never surface mid-match.
    pub fn validate_deck(&self, deck: &DeckInfo) -> Result<(), GameError> {
        match self.get(&deck.oshi_id) {
            Some(CardDef::Oshi { .. }) => {}
            Some(_) => {
                return Err(GameError::InvalidDeck(format!(
                    "{} is not an oshi card",
                    deck.oshi_id
                )))
            }
            None => return Err(GameError::UnknownCard(deck.oshi_id.clone())),
        }

        let mut main_total = 0u32;
        let mut debut_total = 0u32;
        for (card_id, count) in &deck.deck {
            let def = self.expect(card_id)?;
            let unlimited = matches!(
                def,
                CardDef::Support {
                    unlimited_copies: true,
                    ..
                }
            );
            if !def.is_holomem() && !def.is_support() {
                return Err(GameError::InvalidDeck(format!(
                    "{} is not a main deck card",
                    card_id
                )));
            }
            if *count == 0 || (!unlimited && *count > MAX_COPIES) {
                return Err(GameError::InvalidDeck(format!(
                    "illegal copy count {} for {}",
                    count, card_id
                )));
            }
            main_total += count;
            if def.is_debut_holomem() {
                debut_total += count;
            }
        }
        if debut_total == 0 {
            // The initial placement needs a center; a deck that cannot ever
            // produce one is illegal.
            return Err(GameError::InvalidDeck(
                "deck contains no debut holomem".to_string(),
            ));
        }
        if main_total != MAIN_DECK_SIZE {
            return Err(GameError::InvalidDeck(format!(
                "main deck has {} cards, expected {}",
                main_total, MAIN_DECK_SIZE
            )));
        }

        let mut cheer_total = 0u32;
        for (card_id, count) in &deck.cheer_deck {
            let def = self.expect(card_id)?;
            if !def.is_cheer() {
                return Err(GameError::InvalidDeck(format!(
                    "{} is not a cheer card",
                    card_id
                )));
            }
            cheer_total += count;
        }
        if cheer_total != CHEER_DECK_SIZE {
            return Err(GameError::InvalidDeck(format!(
                "cheer deck has {} cards, expected {}",
                cheer_total, CHEER_DECK_SIZE
            )));
        }

        Ok(())
    }
}
