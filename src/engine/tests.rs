use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{
    Amount, ArtDef, CardCatalog, CardDef, CheerColor, Condition, DeckInfo, Effect, Limitation,
    TargetSpec,
};
use crate::protocol::{ActionKind, GameAction, GameEvent};

use super::conditions;
use super::{GameEngine, GamePhase, PendingDecision};

// ============================================================
// Fixtures
// ============================================================

fn holomem(card_id: &str, name: &str, hp: u32, bloom_level: u8, color: CheerColor) -> CardDef {
    CardDef::Holomem {
        card_id: card_id.to_string(),
        name: name.to_string(),
        hp,
        bloom_level,
        colors: vec![color],
        tags: vec![],
        arts: vec![ArtDef {
            art_id: format!("{}_art", name),
            power: 30,
            costs: vec![CheerColor::Any],
            effects: vec![],
        }],
        baton_cost: 1,
        buzz: false,
        spot: false,
    }
}

fn test_catalog() -> Arc<CardCatalog> {
    let defs = vec![
        CardDef::Oshi {
            card_id: "oshi_a".to_string(),
            name: "tokino_sora".to_string(),
            life: 5,
            skills: vec![],
        },
        holomem("mem_sora", "tokino_sora", 60, 0, CheerColor::White),
        holomem("mem_ollie", "kureiji_ollie", 80, 0, CheerColor::White),
        holomem("mem_azki", "azki", 60, 0, CheerColor::Green),
        CardDef::Cheer {
            card_id: "cheer_w".to_string(),
            name: "white_cheer".to_string(),
            color: CheerColor::White,
        },
        CardDef::Cheer {
            card_id: "cheer_g".to_string(),
            name: "green_cheer".to_string(),
            color: CheerColor::Green,
        },
    ];
    Arc::new(CardCatalog::from_defs(defs))
}

fn counts(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
    pairs.iter().map(|(id, n)| (id.to_string(), *n)).collect()
}

fn test_deck() -> DeckInfo {
    DeckInfo {
        deck_id: "test".to_string(),
        oshi_id: "oshi_a".to_string(),
        deck: counts(&[("mem_sora", 4), ("mem_ollie", 2), ("mem_azki", 2)]),
        cheer_deck: counts(&[("cheer_w", 4), ("cheer_g", 2)]),
    }
}

fn new_engine() -> GameEngine {
    let catalog = test_catalog();
    let deck = test_deck();
    GameEngine::new(catalog, ["alice", "bob"], [&deck, &deck], 7).expect("engine builds")
}

fn find_in_hand(engine: &GameEngine, seat: usize, definition_id: &str) -> Vec<String> {
    engine.players[seat]
        .hand
        .iter()
        .filter(|id| engine.players[seat].definition_id(id) == Some(definition_id))
        .cloned()
        .collect()
}

/// Declines the mulligan and places the first debut as center with up to
/// five more filling the backstage.
fn place_seat(engine: &mut GameEngine, player_id: &str) {
    engine
        .handle_action(player_id, &GameAction::Mulligan { do_mulligan: false })
        .expect("mulligan accepted");
    let seat = engine.seat_of(player_id).unwrap();
    let debut = find_in_hand(engine, seat, "mem_sora")
        .first()
        .cloned()
        .or_else(|| find_in_hand(engine, seat, "mem_ollie").first().cloned())
        .or_else(|| find_in_hand(engine, seat, "mem_azki").first().cloned())
        .expect("a debut is in hand");
    let backstage: Vec<String> = engine.players[seat]
        .hand
        .iter()
        .filter(|id| {
            **id != debut
                && engine
                    .definition(seat, id)
                    .map(|d| d.is_debut_holomem())
                    .unwrap_or(false)
        })
        .take(5)
        .cloned()
        .collect();
    engine
        .handle_action(
            player_id,
            &GameAction::InitialPlacement {
                center_holomem_card_id: debut,
                backstage_holomem_card_ids: backstage,
            },
        )
        .expect("placement accepted");
}

/// Drives both seats through mulligan and placement so the board is set up
/// and the engine sits at player 1's cheer step.
fn place_both(engine: &mut GameEngine) {
    engine.begin_match();
    place_seat(engine, "alice");
    place_seat(engine, "bob");
}

// ============================================================
// Effect pipeline
// ============================================================

#[test]
fn restore_hp_with_name_limitation_heals_only_matching_members() {
    let mut engine = new_engine();
    engine.begin_match();

    // Alice places one matching and one non-matching member backstage.
    engine
        .handle_action("alice", &GameAction::Mulligan { do_mulligan: false })
        .unwrap();
    let center = find_in_hand(&engine, 0, "mem_sora")
        .first()
        .cloned()
        .expect("a sora copy is in hand");
    let ollie = find_in_hand(&engine, 0, "mem_ollie")
        .first()
        .cloned()
        .expect("an ollie copy is in hand");
    let other = find_in_hand(&engine, 0, "mem_azki")
        .first()
        .cloned()
        .expect("an azki copy is in hand");
    engine
        .handle_action(
            "alice",
            &GameAction::InitialPlacement {
                center_holomem_card_id: center,
                backstage_holomem_card_ids: vec![ollie.clone(), other.clone()],
            },
        )
        .unwrap();
    place_seat(&mut engine, "bob");

    engine.players[0].instance_mut(&ollie).unwrap().damage = 30;
    engine.players[0].instance_mut(&other).unwrap().damage = 20;

    engine.pending = None;
    engine.queue_effects_back(
        0,
        &[Effect::RestoreHp {
            target: TargetSpec::SelfBackstage,
            amount: Amount::All(crate::catalog::AllKeyword::All),
            limitation: Some(Limitation::NameIn {
                limitation_names: vec!["kureiji_ollie".to_string()],
            }),
            multiple_targets: true,
        }],
    );
    let mut events = Vec::new();
    engine.run(&mut events);

    assert_eq!(engine.players[0].instance(&ollie).unwrap().damage, 0);
    assert_eq!(engine.players[0].instance(&other).unwrap().damage, 20);
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::RestoreHp { card_id, .. } if *card_id == ollie)));
}

#[test]
fn lethal_damage_downs_the_center_and_asks_for_a_replacement() {
    let mut engine = new_engine();
    place_both(&mut engine);

    let center = engine.players[1].center.clone().unwrap();
    engine.pending = None;
    engine.queue_effects_back(
        0,
        &[Effect::DealDamage {
            target: TargetSpec::OpponentCenter,
            amount: Amount::Fixed(100),
        }],
    );
    let mut events = Vec::new();
    engine.run(&mut events);

    assert!(engine.players[1].archive.contains(&center));
    assert_eq!(engine.players[1].life, 4);
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::DownedHolomem { card_id, .. } if *card_id == center)));
    match engine.pending_decision() {
        Some(PendingDecision::SwapToCenter { player, can_choose }) => {
            assert_eq!(*player, 1);
            assert_eq!(*can_choose, engine.players[1].backstage);
        }
        other => panic!("expected swap decision, got {:?}", other.map(|p| p.player())),
    }
}

#[test]
fn damage_display_clamps_at_max_hp() {
    let mut engine = new_engine();
    place_both(&mut engine);

    let center = engine.players[1].center.clone().unwrap();
    engine.pending = None;
    engine.queue_effects_back(
        0,
        &[Effect::DealDamage {
            target: TargetSpec::OpponentCenter,
            amount: Amount::Fixed(999),
        }],
    );
    let mut events = Vec::new();
    engine.run(&mut events);
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::DownedHolomem { card_id, .. } if *card_id == center
    )));
    // The archived instance's counters were wiped on archive.
    assert_eq!(engine.players[1].instance(&center).unwrap().damage, 0);
}

#[test]
fn choose_cards_from_deck_top_orders_the_rest_to_the_bottom() {
    let mut engine = new_engine();
    place_both(&mut engine);

    let deck_before = engine.players[0].deck.clone();
    let top3: Vec<String> = deck_before.iter().rev().take(3).cloned().collect();

    engine.pending = None;
    engine.queue_effects_back(
        0,
        &[Effect::ChooseCards {
            from_zone: crate::catalog::ChooseSource::DeckTop { look_at: 3 },
            destination: crate::catalog::ChooseDestination::Hand,
            amount_min: 0,
            amount_max: 1,
            limitation: None,
            reveal_chosen: false,
        }],
    );
    let mut events = Vec::new();
    engine.run(&mut events);

    let chosen = vec![top3[0].clone()];
    engine
        .handle_action(
            "alice",
            &GameAction::EffectResolutionChooseCardsForEffect {
                card_ids: chosen.clone(),
            },
        )
        .unwrap();
    assert!(engine.players[0].hand.contains(&top3[0]));

    // The two untaken cards must now be ordered under the deck.
    let remainder = vec![top3[1].clone(), top3[2].clone()];
    match engine.pending_decision() {
        Some(PendingDecision::EffectOrderCards { card_ids, .. }) => {
            assert_eq!(card_ids.len(), 2);
        }
        other => panic!("expected order decision, got player {:?}", other.map(|p| p.player())),
    }
    engine
        .handle_action(
            "alice",
            &GameAction::EffectResolutionOrderCards {
                card_ids: remainder.clone(),
            },
        )
        .unwrap();
    assert_eq!(engine.players[0].deck[0], remainder[0]);
    assert_eq!(engine.players[0].deck[1], remainder[1]);
}

// ============================================================
// Conditions and costs
// ============================================================

#[test]
fn condition_predicates_read_board_and_turn_state() {
    let mut engine = new_engine();
    place_both(&mut engine);

    assert!(!conditions::evaluate(
        &engine.players,
        &engine.catalog,
        0,
        &Condition::CollabThisTurn
    ));
    engine.players[0].collabed_this_turn = true;
    assert!(conditions::evaluate(
        &engine.players,
        &engine.catalog,
        0,
        &Condition::CollabThisTurn
    ));

    assert!(!conditions::evaluate(
        &engine.players,
        &engine.catalog,
        0,
        &Condition::DamagedOpponentBackstageAtLeast { count: 1 }
    ));
    if let Some(id) = engine.players[1].backstage.first().cloned() {
        engine.players[1].instance_mut(&id).unwrap().damage = 10;
        assert!(conditions::evaluate(
            &engine.players,
            &engine.catalog,
            0,
            &Condition::DamagedOpponentBackstageAtLeast { count: 1 }
        ));
    }

    assert!(conditions::evaluate(
        &engine.players,
        &engine.catalog,
        0,
        &Condition::SelfHasHolomemNamed {
            names: vec![
                "tokino_sora".to_string(),
                "kureiji_ollie".to_string(),
                "azki".to_string()
            ]
        }
    ));
}

#[test]
fn art_cost_matching_consumes_specific_colors_before_wildcards() {
    let mut engine = new_engine();
    place_both(&mut engine);

    let center = engine.players[0].center.clone().unwrap();
    let white = engine.players[0]
        .cheer_deck
        .iter()
        .find(|id| engine.players[0].definition_id(id) == Some("cheer_w"))
        .cloned()
        .unwrap();
    engine.players[0].remove_from_zone(&white);
    engine.players[0]
        .instance_mut(&center)
        .unwrap()
        .attached_cheer
        .push(white);

    assert!(engine.cheer_covers_cost(0, &center, &[CheerColor::White]));
    assert!(engine.cheer_covers_cost(0, &center, &[CheerColor::Any]));
    assert!(!engine.cheer_covers_cost(0, &center, &[CheerColor::Green]));
    assert!(!engine.cheer_covers_cost(0, &center, &[CheerColor::White, CheerColor::Any]));
}

// ============================================================
// Zone bookkeeping
// ============================================================

#[test]
fn zone_membership_is_disjoint_after_setup() {
    let mut engine = new_engine();
    place_both(&mut engine);

    for seat in 0..2 {
        let ids = engine.players[seat].all_card_ids();
        let mut seen = std::collections::HashSet::new();
        for id in &ids {
            assert!(seen.insert(id.clone()), "{} appears in two zones", id);
        }
        // 8 main deck cards + 6 cheer, regardless of where they sit.
        assert_eq!(ids.len(), 14);
    }
}

#[test]
fn phase_reaches_cheer_step_after_placement() {
    let mut engine = new_engine();
    place_both(&mut engine);
    assert_eq!(engine.phase, GamePhase::Cheer);
    assert_eq!(
        engine.pending_decision().map(|p| p.desired_response()),
        Some(ActionKind::PlaceCheer)
    );
}
