mod common;

use std::collections::HashSet;

use duel_server::agent::{DecisionAgent, BUILTIN_DECKS};
use duel_server::error::GameError;
use duel_server::protocol::{GameAction, GameEvent, GameOverReason};
use duel_server::room::{GameRoom, Seat};
use uuid::Uuid;

use common::{data_catalog, small_deck};

fn agent_seat(player_id: &str, deck_name: &str, seed: u64) -> Seat {
    let deck = BUILTIN_DECKS.get(deck_name).unwrap().clone();
    Seat::agent(DecisionAgent::new(player_id, deck, seed))
}

/// Two automated seats play a full match inside `start()`; nothing human
/// ever has to respond.
fn finished_self_play_room(seed: u64) -> GameRoom {
    let mut room = GameRoom::new(
        Uuid::new_v4(),
        "main_matchmaking_normal",
        data_catalog(),
        vec![
            agent_seat("ai_sora", "starter_sora", seed),
            agent_seat("ai_azki", "starter_azki", seed + 1),
        ],
        None,
    );
    room.start(seed).expect("room starts");
    room
}

#[test]
fn self_play_match_runs_to_completion() {
    let room = finished_self_play_room(20240811);

    assert!(room.is_ready_for_cleanup());
    assert!(matches!(
        room.all_events.last(),
        Some(GameEvent::GameOver { .. })
    ));
    // No agent response was ever rejected.
    assert!(!room
        .all_events
        .iter()
        .any(|e| matches!(e, GameEvent::GameError { .. })));

    // Card conservation holds for both seats at the end of the match.
    let engine = room.engine().expect("engine exists");
    for seat in 0..2 {
        let ids = engine.player(seat).all_card_ids();
        assert_eq!(ids.len(), 70, "50 deck + 20 cheer cards accounted for");
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), 70);
    }
}

#[test]
fn observer_catch_up_returns_a_contiguous_suffix() {
    let mut room = finished_self_play_room(77);
    room.join_as_observer("watcher");

    let total = room.all_events.len();
    assert!(total > 10);
    let suffix = room.events_from(total / 2);
    assert_eq!(suffix.len(), total - total / 2);
    assert_eq!(suffix[0], room.all_events[total / 2]);
    assert!(room.events_from(total).is_empty());
    assert_eq!(room.events_from(0).len(), total);
}

#[test]
fn replaying_the_log_reproduces_the_room_state() {
    let room = finished_self_play_room(31337);

    // Rebuild life/archive counts from the log alone and compare with the
    // engine's own state.
    let engine = room.engine().unwrap();
    for seat in 0..2 {
        let player = engine.player(seat);
        let life_lost: u32 = room
            .all_events
            .iter()
            .filter_map(|e| match e {
                GameEvent::LifeDamageDealt {
                    target_player,
                    life_lost,
                    ..
                } if *target_player == player.player_id => Some(*life_lost),
                _ => None,
            })
            .sum();
        let starting_life = match room.all_events.iter().find_map(|e| match e {
            GameEvent::InitialPlacementReveal { placement_info } => placement_info
                .iter()
                .find(|p| p.player_id == player.player_id)
                .map(|p| p.life),
            _ => None,
        }) {
            Some(life) => life,
            None => panic!("placement reveal missing from log"),
        };
        assert_eq!(player.life, starting_life.saturating_sub(life_lost));
    }
}

#[test]
fn invalid_decks_abort_the_room_before_any_engine_exists() {
    let mut bad_deck = small_deck();
    bad_deck.oshi_id = "hSD01-001".to_string();
    let mut room = GameRoom::new(
        Uuid::new_v4(),
        "main_matchmaking_normal",
        data_catalog(),
        vec![
            Seat::human("human_1", "Tester", bad_deck),
            agent_seat("ai_azki", "starter_azki", 5),
        ],
        None,
    );
    assert!(matches!(
        room.start(5),
        Err(GameError::UnknownCard(_) | GameError::InvalidDeck(_))
    ));
    assert!(room.engine().is_none());
}

#[test]
fn a_departing_player_forfeits_the_match() {
    let mut room = GameRoom::new(
        Uuid::new_v4(),
        "main_matchmaking_normal",
        data_catalog(),
        vec![
            Seat::human("human_1", "Tester", BUILTIN_DECKS.get("starter_sora").unwrap().clone()),
            agent_seat("ai_azki", "starter_azki", 5),
        ],
        None,
    );
    // The human seat is first, so the match halts at their mulligan.
    room.start(5).expect("room starts");
    assert!(!room.is_ready_for_cleanup());

    let events = room
        .handle_player_departure("human_1", GameOverReason::Resign)
        .unwrap();
    assert!(matches!(
        events.last(),
        Some(GameEvent::GameOver {
            winner_id: Some(winner),
            loser_id: Some(loser),
            reason: GameOverReason::Resign,
        }) if winner == "ai_azki" && loser == "human_1"
    ));
    assert!(room.is_ready_for_cleanup());
}

#[test]
fn messages_from_strangers_are_refused() {
    let mut room = finished_self_play_room(9);
    let result = room.handle_game_message(
        "not_seated",
        &GameAction::Mulligan { do_mulligan: false },
    );
    assert!(matches!(result, Err(GameError::UnknownPlayer(_))));
}

#[test]
fn game_messages_are_logged_in_arrival_order() {
    let mut room = GameRoom::new(
        Uuid::new_v4(),
        "main_matchmaking_normal",
        data_catalog(),
        vec![
            Seat::human("human_1", "Tester", BUILTIN_DECKS.get("starter_sora").unwrap().clone()),
            agent_seat("ai_azki", "starter_azki", 5),
        ],
        None,
    );
    room.start(5).expect("room starts");
    room.handle_game_message("human_1", &GameAction::Mulligan { do_mulligan: false })
        .unwrap();
    assert_eq!(room.all_game_messages.len(), 1);
    assert_eq!(room.all_game_messages[0].player_id, "human_1");
}
