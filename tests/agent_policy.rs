mod common;

use std::collections::BTreeMap;

use duel_server::agent::{resolve_deck, AgentDeckConfig, DecisionAgent, BUILTIN_DECKS};
use duel_server::protocol::{
    ActionKind, AvailableAction, GameAction, GameEvent, PlayRequirementDetail,
};

use common::small_deck;

fn agent() -> DecisionAgent {
    DecisionAgent::new("me", small_deck(), 9)
}

fn strings(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

// ============================================================
// Per-decision policies
// ============================================================

#[test]
fn mulligan_is_always_declined() {
    let mut agent = agent();
    let action = agent
        .process_events(&[GameEvent::MulliganDecision {
            event_player_id: "me".to_string(),
            active_player: "me".to_string(),
            desired_response: ActionKind::Mulligan,
        }])
        .unwrap();
    assert_eq!(action, Some(GameAction::Mulligan { do_mulligan: false }));
}

#[test]
fn initial_placement_takes_first_debut_and_fills_backstage() {
    let mut agent = agent();
    let action = agent
        .process_events(&[GameEvent::InitialPlacementBegin {
            event_player_id: "me".to_string(),
            active_player: "me".to_string(),
            desired_response: ActionKind::InitialPlacement,
            debut_options: strings(&["x", "y", "z"]),
            spot_options: strings(&["w"]),
        }])
        .unwrap();
    assert_eq!(
        action,
        Some(GameAction::InitialPlacement {
            center_holomem_card_id: "x".to_string(),
            backstage_holomem_card_ids: strings(&["y", "z", "w"]),
        })
    );
}

#[test]
fn initial_placement_backstage_is_capped_at_five() {
    let mut agent = agent();
    let action = agent
        .process_events(&[GameEvent::InitialPlacementBegin {
            event_player_id: "me".to_string(),
            active_player: "me".to_string(),
            desired_response: ActionKind::InitialPlacement,
            debut_options: strings(&["a", "b", "c", "d", "e", "f"]),
            spot_options: strings(&["g"]),
        }])
        .unwrap();
    match action {
        Some(GameAction::InitialPlacement {
            backstage_holomem_card_ids,
            ..
        }) => assert_eq!(backstage_holomem_card_ids.len(), 5),
        other => panic!("unexpected action: {:?}", other),
    }
}

#[test]
fn free_choice_picks_the_minimum_index() {
    let mut agent = agent();
    let action = agent
        .process_events(&[GameEvent::DecisionChoice {
            event_player_id: "me".to_string(),
            effect_player_id: "me".to_string(),
            desired_response: ActionKind::EffectResolutionMakeChoice,
            choices: strings(&["one", "two", "three"]),
            min_choice: 0,
            max_choice: 2,
        }])
        .unwrap();
    assert_eq!(
        action,
        Some(GameAction::EffectResolutionMakeChoice { choice_index: 0 })
    );
}

#[test]
fn bounded_multi_choose_takes_up_to_the_maximum_in_order() {
    let mut agent = agent();
    let action = agent
        .process_events(&[GameEvent::DecisionChooseCards {
            event_player_id: "me".to_string(),
            effect_player_id: "me".to_string(),
            desired_response: ActionKind::EffectResolutionChooseCardsForEffect,
            all_card_seen: strings(&["a", "b", "c", "d"]),
            cards_can_choose: strings(&["a", "b", "c"]),
            amount_min: 1,
            amount_max: 2,
        }])
        .unwrap();
    assert_eq!(
        action,
        Some(GameAction::EffectResolutionChooseCardsForEffect {
            card_ids: strings(&["a", "b"]),
        })
    );
}

#[test]
fn chosen_holomem_come_from_the_presented_candidates() {
    let mut agent = agent();
    let candidates = strings(&["m1", "m2", "m3"]);
    let action = agent
        .process_events(&[GameEvent::DecisionChooseHolomemForEffect {
            event_player_id: "me".to_string(),
            effect_player_id: "me".to_string(),
            desired_response: ActionKind::EffectResolutionChooseHolomemForEffect,
            cards_can_choose: candidates.clone(),
            amount_min: 1,
            amount_max: 1,
        }])
        .unwrap();
    match action {
        Some(GameAction::EffectResolutionChooseHolomemForEffect { card_ids }) => {
            assert_eq!(card_ids.len(), 1);
            assert!(candidates.contains(&card_ids[0]));
        }
        other => panic!("unexpected action: {:?}", other),
    }
}

#[test]
fn order_cards_keeps_the_presented_order() {
    let mut agent = agent();
    let action = agent
        .process_events(&[GameEvent::DecisionOrderCards {
            event_player_id: "me".to_string(),
            effect_player_id: "me".to_string(),
            desired_response: ActionKind::EffectResolutionOrderCards,
            card_ids: strings(&["c", "a", "b"]),
            to_zone: duel_server::protocol::ZoneName::Deck,
        }])
        .unwrap();
    assert_eq!(
        action,
        Some(GameAction::EffectResolutionOrderCards {
            card_ids: strings(&["c", "a", "b"]),
        })
    );
}

#[test]
fn main_step_prefers_placing_over_blooming() {
    let mut agent = agent();
    let action = agent
        .process_events(&[GameEvent::DecisionMainStep {
            event_player_id: "me".to_string(),
            active_player: "me".to_string(),
            desired_response: ActionKind::MainStepAction,
            available_actions: vec![
                AvailableAction::MainStepBloom {
                    card_id: "bloom1".to_string(),
                    target_id: "target1".to_string(),
                },
                AvailableAction::MainStepPlaceHolomem {
                    card_id: "place1".to_string(),
                },
                AvailableAction::MainStepEndTurn {},
            ],
        }])
        .unwrap();
    assert_eq!(
        action,
        Some(GameAction::MainStepPlaceHolomem {
            card_id: "place1".to_string(),
        })
    );
}

#[test]
fn main_step_oshi_skill_uses_the_last_listed_skill() {
    let mut agent = agent();
    let action = agent
        .process_events(&[GameEvent::DecisionMainStep {
            event_player_id: "me".to_string(),
            active_player: "me".to_string(),
            desired_response: ActionKind::MainStepAction,
            available_actions: vec![
                AvailableAction::MainStepOshiSkill {
                    skill_id: "per_turn".to_string(),
                    cost: 1,
                },
                AvailableAction::MainStepOshiSkill {
                    skill_id: "per_game".to_string(),
                    cost: 2,
                },
                AvailableAction::MainStepEndTurn {},
            ],
        }])
        .unwrap();
    assert_eq!(
        action,
        Some(GameAction::MainStepOshiSkill {
            skill_id: "per_game".to_string(),
        })
    );
}

#[test]
fn play_support_resolves_the_cheer_archive_requirement() {
    let mut agent = agent();
    let mut play_requirements = BTreeMap::new();
    play_requirements.insert(
        "cheer_to_archive_from_play".to_string(),
        PlayRequirementDetail {
            length: 2,
            content_type: "cheer".to_string(),
        },
    );
    let mut cheer_on_each_mem = BTreeMap::new();
    cheer_on_each_mem.insert("mem1".to_string(), strings(&["ch1", "ch2"]));
    cheer_on_each_mem.insert("mem2".to_string(), strings(&["ch3"]));

    let action = agent
        .process_events(&[GameEvent::DecisionMainStep {
            event_player_id: "me".to_string(),
            active_player: "me".to_string(),
            desired_response: ActionKind::MainStepAction,
            available_actions: vec![
                AvailableAction::MainStepPlaySupport {
                    card_id: "support1".to_string(),
                    play_requirements,
                    cheer_on_each_mem,
                },
                AvailableAction::MainStepEndTurn {},
            ],
        }])
        .unwrap();
    match action {
        Some(GameAction::MainStepPlaySupport {
            card_id,
            cheer_to_archive_from_play,
        }) => {
            assert_eq!(card_id, "support1");
            assert_eq!(cheer_to_archive_from_play.len(), 2);
        }
        other => panic!("unexpected action: {:?}", other),
    }
}

#[test]
fn performance_uses_the_last_art_on_its_first_valid_target() {
    let mut agent = agent();
    let action = agent
        .process_events(&[GameEvent::DecisionPerformanceStep {
            event_player_id: "me".to_string(),
            active_player: "me".to_string(),
            desired_response: ActionKind::PerformanceStepAction,
            available_actions: vec![
                AvailableAction::PerformanceStepUseArt {
                    performer_id: "center".to_string(),
                    art_id: "weak_art".to_string(),
                    power: 30,
                    valid_targets: strings(&["enemy1"]),
                },
                AvailableAction::PerformanceStepUseArt {
                    performer_id: "center".to_string(),
                    art_id: "strong_art".to_string(),
                    power: 100,
                    valid_targets: strings(&["enemy1", "enemy2"]),
                },
                AvailableAction::PerformanceStepEndTurn {},
            ],
        }])
        .unwrap();
    assert_eq!(
        action,
        Some(GameAction::PerformanceStepUseArt {
            performer_id: "center".to_string(),
            art_id: "strong_art".to_string(),
            target_id: "enemy1".to_string(),
        })
    );
}

#[test]
fn events_addressed_to_other_players_are_ignored() {
    let mut agent = agent();
    let action = agent
        .process_events(&[
            GameEvent::MulliganDecision {
                event_player_id: "someone_else".to_string(),
                active_player: "someone_else".to_string(),
                desired_response: ActionKind::Mulligan,
            },
            GameEvent::TurnStart {
                active_player: "someone_else".to_string(),
                turn_count: 1,
            },
        ])
        .unwrap();
    assert_eq!(action, None);
}

// ============================================================
// Deck resolution chain
// ============================================================

#[test]
fn named_builtin_deck_wins_over_everything() {
    let deck = resolve_deck(&AgentDeckConfig {
        deck_name: "starter_sora".to_string(),
        decks_directory: None,
    });
    assert_eq!(deck.oshi_id, "hSD01-001");
}

#[test]
fn unknown_name_without_directory_falls_back_to_default() {
    let deck = resolve_deck(&AgentDeckConfig {
        deck_name: "no_such_deck".to_string(),
        decks_directory: None,
    });
    assert_eq!(&deck, BUILTIN_DECKS.get("starter_azki").unwrap());
}

#[test]
#[serial_test::serial]
fn deck_files_are_loaded_and_holodelta_imports_are_normalized() {
    let directory = std::env::temp_dir().join(format!("duel_decks_{}", std::process::id()));
    std::fs::create_dir_all(&directory).unwrap();
    std::fs::write(
        directory.join("custom_whale.json"),
        r#"{
            "deckName": "Whale",
            "oshi": ["hSD01-001", 0],
            "deck": [["hSD01-003", 4], ["hSD01-016", 2, 1]],
            "cheerDeck": [["hY01-001", 20]]
        }"#,
    )
    .unwrap();

    let deck = resolve_deck(&AgentDeckConfig {
        deck_name: "custom_whale".to_string(),
        decks_directory: Some(directory.clone()),
    });
    assert_eq!(deck.deck_id, "Whale");
    assert_eq!(deck.oshi_id, "hSD01-001");
    assert_eq!(deck.deck.get("hSD01-003"), Some(&4));
    assert_eq!(deck.deck.get("hSD01-016"), Some(&2));
    assert_eq!(deck.cheer_deck.get("hY01-001"), Some(&20));

    std::fs::remove_dir_all(&directory).ok();
}
