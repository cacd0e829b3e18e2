use duel_server::protocol::{ActionKind, GameAction, GameEvent};

// 와이어 포맷 고정 테스트. 스키마 변경은 모든 클라이언트를 깨뜨리므로
// 직렬화 형태 자체를 고정한다.

#[test]
fn decision_events_carry_event_type_responder_and_desired_response() {
    let event = GameEvent::MulliganDecision {
        event_player_id: "p1".to_string(),
        active_player: "p1".to_string(),
        desired_response: ActionKind::Mulligan,
    };
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["event_type"], "mulligan_decision");
    assert_eq!(value["event_player_id"], "p1");
    assert_eq!(value["desired_response"], "mulligan");
}

#[test]
fn informational_events_have_no_event_player_id() {
    let event = GameEvent::TurnStart {
        active_player: "p1".to_string(),
        turn_count: 3,
    };
    assert_eq!(event.event_player_id(), None);
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["event_type"], "turn_start");
    assert!(value.get("event_player_id").is_none());
}

#[test]
fn actions_round_trip_through_the_action_type_action_data_envelope() {
    let action = GameAction::MainStepBloom {
        card_id: "p1_4".to_string(),
        target_id: "p1_2".to_string(),
    };
    let value = serde_json::to_value(&action).unwrap();
    assert_eq!(value["action_type"], "main_step_bloom");
    assert_eq!(value["action_data"]["card_id"], "p1_4");

    let parsed: GameAction = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, action);
}

#[test]
fn empty_payload_actions_still_carry_an_action_data_object() {
    let parsed: GameAction = serde_json::from_str(
        r#"{ "action_type": "main_step_end_turn", "action_data": {} }"#,
    )
    .unwrap();
    assert_eq!(parsed, GameAction::MainStepEndTurn {});
}

#[test]
fn responses_match_only_their_expected_kind() {
    let place = GameAction::MainStepPlaceHolomem {
        card_id: "x".to_string(),
    };
    assert!(place.matches(ActionKind::MainStepAction));
    assert!(!place.matches(ActionKind::PerformanceStepAction));
    assert!(!place.matches(ActionKind::Mulligan));

    let choice = GameAction::EffectResolutionMakeChoice { choice_index: 0 };
    assert!(choice.matches(ActionKind::EffectResolutionMakeChoice));
    assert!(!choice.matches(ActionKind::MainStepAction));
}

#[test]
fn placement_response_schema_is_a_flat_mapping() {
    let parsed: GameAction = serde_json::from_str(
        r#"{
            "action_type": "place_cheer",
            "action_data": { "placements": { "p1_30": "p1_2" } }
        }"#,
    )
    .unwrap();
    match parsed {
        GameAction::PlaceCheer { placements } => {
            assert_eq!(placements.get("p1_30").map(String::as_str), Some("p1_2"));
        }
        other => panic!("unexpected action: {:?}", other),
    }
}
