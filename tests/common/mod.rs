#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use duel_server::catalog::{
    ArtDef, CardCatalog, CardDef, CheerColor, DeckInfo, Effect, TargetSpec,
};
use duel_server::catalog::Amount;
use duel_server::engine::GameEngine;

/// 실제 런타임 카드 데이터. 스타터 덱 검증과 룸/매치메이킹 테스트에 쓴다.
pub fn data_catalog() -> Arc<CardCatalog> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/cards.json");
    CardCatalog::from_json_file(&path).expect("runtime card data loads")
}

pub fn counts(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
    pairs.iter().map(|(id, n)| (id.to_string(), *n)).collect()
}

fn debut(card_id: &str, name: &str, hp: u32, color: CheerColor, power: u32) -> CardDef {
    CardDef::Holomem {
        card_id: card_id.to_string(),
        name: name.to_string(),
        hp,
        bloom_level: 0,
        colors: vec![color],
        tags: vec![],
        arts: vec![ArtDef {
            art_id: format!("{}_art", name),
            power,
            costs: vec![CheerColor::Any],
            effects: vec![],
        }],
        baton_cost: 1,
        buzz: false,
        spot: false,
    }
}

/// 예측 가능한 미니 카탈로그. 전 카드가 데뷔 홀로멤이라 강제 멀리건이
/// 절대 일어나지 않는다.
pub fn small_catalog() -> Arc<CardCatalog> {
    let defs = vec![
        CardDef::Oshi {
            card_id: "oshi_test".to_string(),
            name: "test_oshi".to_string(),
            life: 3,
            skills: vec![],
        },
        debut("mem_a", "tokino_sora", 60, CheerColor::White, 30),
        debut("mem_b", "kureiji_ollie", 80, CheerColor::White, 20),
        debut("mem_c", "azki", 60, CheerColor::Green, 30),
        CardDef::Support {
            card_id: "sup_strike".to_string(),
            name: "surprise_strike".to_string(),
            support_type: duel_server::catalog::SupportType::Event,
            limited: false,
            effects: vec![Effect::DealDamage {
                target: TargetSpec::OpponentCenter,
                amount: Amount::Fixed(20),
            }],
            play_requirements: vec![],
            unlimited_copies: false,
        },
        CardDef::Cheer {
            card_id: "cheer_w".to_string(),
            name: "white_cheer".to_string(),
            color: CheerColor::White,
        },
    ];
    Arc::new(CardCatalog::from_defs(defs))
}

pub fn small_deck() -> DeckInfo {
    DeckInfo {
        deck_id: "small".to_string(),
        oshi_id: "oshi_test".to_string(),
        deck: counts(&[("mem_a", 4), ("mem_b", 2), ("mem_c", 2)]),
        cheer_deck: counts(&[("cheer_w", 6)]),
    }
}

pub fn small_engine(seed: u64) -> GameEngine {
    let deck = small_deck();
    GameEngine::new(small_catalog(), ["alice", "bob"], [&deck, &deck], seed)
        .expect("engine builds")
}

pub fn find_in_hand(engine: &GameEngine, seat: usize, definition_id: &str) -> Vec<String> {
    engine
        .player(seat)
        .hand
        .iter()
        .filter(|id| engine.player(seat).definition_id(id) == Some(definition_id))
        .cloned()
        .collect()
}
