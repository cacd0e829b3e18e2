use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use once_cell::sync::Lazy;
use tracing::{info, warn};

use crate::catalog::DeckInfo;

/// 자동 응답자 덱 설정. 이름 → 내장 덱 → 외부 파일 → 기본 덱 순서로
/// 해석한다. 전역 가변 상태 없이 생성자에 명시적으로 전달된다.
#[derive(Clone, Debug)]
pub struct AgentDeckConfig {
    pub deck_name: String,
    pub decks_directory: Option<PathBuf>,
}

impl Default for AgentDeckConfig {
    fn default() -> Self {
        Self {
            deck_name: DEFAULT_DECK_NAME.to_string(),
            decks_directory: None,
        }
    }
}

pub const DEFAULT_DECK_NAME: &str = "starter_azki";

fn counts(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
    pairs
        .iter()
        .map(|(id, count)| (id.to_string(), *count))
        .collect()
}

fn starter_list() -> BTreeMap<String, u32> {
    counts(&[
        ("hSD01-003", 4),
        ("hSD01-004", 3),
        ("hSD01-005", 3),
        ("hSD01-006", 2),
        ("hSD01-007", 2),
        ("hSD01-008", 4),
        ("hSD01-009", 3),
        ("hSD01-010", 3),
        ("hSD01-011", 2),
        ("hSD01-012", 2),
        ("hSD01-013", 2),
        ("hSD01-014", 2),
        ("hSD01-015", 2),
        ("hSD01-016", 3),
        ("hSD01-017", 3),
        ("hSD01-018", 3),
        ("hSD01-019", 3),
        ("hSD01-020", 2),
        ("hSD01-021", 2),
    ])
}

fn starter_cheer() -> BTreeMap<String, u32> {
    counts(&[("hY01-001", 10), ("hY02-001", 10)])
}

pub static BUILTIN_DECKS: Lazy<HashMap<String, DeckInfo>> = Lazy::new(|| {
    let mut decks = HashMap::new();
    decks.insert(
        "starter_sora".to_string(),
        DeckInfo {
            deck_id: "starter_sora".to_string(),
            oshi_id: "hSD01-001".to_string(),
            deck: starter_list(),
            cheer_deck: starter_cheer(),
        },
    );
    decks.insert(
        "starter_azki".to_string(),
        DeckInfo {
            deck_id: "starter_azki".to_string(),
            oshi_id: "hSD01-002".to_string(),
            deck: starter_list(),
            cheer_deck: starter_cheer(),
        },
    );
    decks
});

/// Ordered resolution: named built-in, then a deck file in the configured
/// directory (native or holoDelta format), then the default built-in.
pub fn resolve_deck(config: &AgentDeckConfig) -> DeckInfo {
    if let Some(deck) = BUILTIN_DECKS.get(&config.deck_name) {
        info!("Using builtin agent deck: {}", config.deck_name);
        return deck.clone();
    }

    if let Some(directory) = &config.decks_directory {
        let path = directory.join(format!("{}.json", config.deck_name));
        match std::fs::read_to_string(&path) {
            Ok(raw) => match DeckInfo::parse(&raw) {
                Ok(deck) => {
                    info!("Loaded agent deck from {}", path.display());
                    return deck;
                }
                Err(e) => warn!("Failed to parse deck file {}: {}", path.display(), e),
            },
            Err(_) => warn!("Deck file not found: {}", path.display()),
        }
    }

    warn!(
        "Failed to resolve deck '{}', using default deck",
        config.deck_name
    );
    BUILTIN_DECKS
        .get(DEFAULT_DECK_NAME)
        .cloned()
        .expect("default deck is always present")
}
