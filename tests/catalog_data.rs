mod common;

use duel_server::agent::BUILTIN_DECKS;
use duel_server::catalog::{CardCatalog, DeckInfo};
use duel_server::error::GameError;

use common::{counts, data_catalog};

#[test]
fn runtime_card_data_loads() {
    let catalog = data_catalog();
    assert!(!catalog.is_empty());
    assert!(catalog.get("hSD01-001").is_some());
    assert!(catalog.get("hY01-001").is_some());
}

#[test]
fn builtin_agent_decks_are_legal_against_the_runtime_data() {
    let catalog = data_catalog();
    for deck in BUILTIN_DECKS.values() {
        catalog.validate_deck(deck).expect("builtin deck is legal");
    }
}

#[test]
fn unknown_card_ids_are_rejected_before_match_start() {
    let catalog = data_catalog();
    let mut deck = BUILTIN_DECKS.get("starter_sora").unwrap().clone();
    deck.deck.insert("hXX99-999".to_string(), 1);
    assert!(matches!(
        catalog.validate_deck(&deck),
        Err(GameError::UnknownCard(_))
    ));
}

#[test]
fn wrong_deck_sizes_are_rejected() {
    let catalog = data_catalog();
    let mut deck = BUILTIN_DECKS.get("starter_sora").unwrap().clone();
    deck.deck.insert("hSD01-003".to_string(), 3);
    assert!(matches!(
        catalog.validate_deck(&deck),
        Err(GameError::InvalidDeck(_))
    ));

    let mut deck = BUILTIN_DECKS.get("starter_sora").unwrap().clone();
    deck.cheer_deck = counts(&[("hY01-001", 19)]);
    assert!(matches!(
        catalog.validate_deck(&deck),
        Err(GameError::InvalidDeck(_))
    ));
}

#[test]
fn copy_limit_is_enforced() {
    let catalog = data_catalog();
    let mut deck = BUILTIN_DECKS.get("starter_sora").unwrap().clone();
    // 5 copies of one card, shrinking another to keep the total at 50.
    deck.deck.insert("hSD01-003".to_string(), 5);
    deck.deck.insert("hSD01-004".to_string(), 2);
    assert!(matches!(
        catalog.validate_deck(&deck),
        Err(GameError::InvalidDeck(_))
    ));
}

#[test]
fn a_non_oshi_card_cannot_lead_a_deck() {
    let catalog = data_catalog();
    let mut deck = BUILTIN_DECKS.get("starter_sora").unwrap().clone();
    deck.oshi_id = "hSD01-003".to_string();
    assert!(matches!(
        catalog.validate_deck(&deck),
        Err(GameError::InvalidDeck(_))
    ));
}

#[test]
fn unknown_rule_constructs_fail_at_load_time() {
    // An effect kind outside the closed set must abort the load, never be
    // skipped at runtime.
    let result = CardCatalog::from_json_str(
        r#"[{
            "card_type": "support",
            "card_id": "bad-001",
            "name": "bad_card",
            "support_type": "event",
            "effects": [{ "effect_type": "summon_meteor", "amount": 3 }]
        }]"#,
    );
    assert!(matches!(result, Err(GameError::CatalogLoad(_))));

    let result = CardCatalog::from_json_str(
        r#"[{
            "card_type": "artifact",
            "card_id": "bad-002",
            "name": "bad_kind"
        }]"#,
    );
    assert!(matches!(result, Err(GameError::CatalogLoad(_))));
}

#[test]
fn holodelta_exports_normalize_into_the_native_descriptor() {
    let deck = DeckInfo::parse(
        r#"{
            "deckName": "Sora Deck",
            "oshi": ["hSD01-001", 1],
            "deck": [["hSD01-003", 4, 0], ["hSD01-016", 3]],
            "cheerDeck": [["hY01-001", 10], ["hY02-001", 10]]
        }"#,
    )
    .unwrap();
    assert_eq!(deck.deck_id, "Sora Deck");
    assert_eq!(deck.oshi_id, "hSD01-001");
    assert_eq!(deck.deck.get("hSD01-003"), Some(&4));
    assert_eq!(deck.deck.get("hSD01-016"), Some(&3));
    assert_eq!(deck.cheer_deck.get("hY02-001"), Some(&10));
}

#[test]
fn native_descriptors_parse_unchanged() {
    let deck = DeckInfo::parse(
        r#"{
            "deck_id": "native",
            "oshi_id": "hSD01-002",
            "deck": { "hSD01-007": 4 },
            "cheer_deck": { "hY02-001": 20 }
        }"#,
    )
    .unwrap();
    assert_eq!(deck.deck_id, "native");
    assert_eq!(deck.oshi_id, "hSD01-002");
}
