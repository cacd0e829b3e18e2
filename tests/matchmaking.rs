mod common;

use std::time::Instant;

use duel_server::error::GameError;
use duel_server::matchmaker::{MatchQueues, QueueEntry};
use uuid::Uuid;

use common::small_deck;

fn queues() -> MatchQueues<()> {
    MatchQueues::new(
        vec!["main_matchmaking_normal".to_string()],
        "custom_".to_string(),
        vec!["versus".to_string(), "ai".to_string()],
    )
}

fn entry(queue_name: &str, game_type: &str, custom_game: bool) -> QueueEntry<()> {
    QueueEntry {
        player_id: Uuid::new_v4(),
        username: "tester".to_string(),
        deck: small_deck(),
        queue_name: queue_name.to_string(),
        game_type: game_type.to_string(),
        custom_game,
        enqueued_at: Instant::now(),
        handle: (),
    }
}

#[test]
fn two_compatible_entries_pair_oldest_first() {
    let mut queues = queues();
    let first = entry("main_matchmaking_normal", "versus", false);
    let first_id = first.player_id;
    assert!(queues.add_player(first).unwrap().is_none());

    let second = entry("main_matchmaking_normal", "versus", false);
    let second_id = second.player_id;
    let (a, b) = queues.add_player(second).unwrap().expect("paired");
    assert_eq!(a.player_id, first_id);
    assert_eq!(b.player_id, second_id);

    // Both entries left the queue on pairing.
    assert!(!queues.contains_player(first_id));
    assert!(!queues.contains_player(second_id));
}

#[test]
fn pairing_respects_game_type() {
    let mut queues = queues();
    assert!(queues
        .add_player(entry("main_matchmaking_normal", "versus", false))
        .unwrap()
        .is_none());
    // An ai-type entry in the same queue does not pair with a versus one.
    assert!(queues
        .add_player(entry("main_matchmaking_normal", "ai", false))
        .unwrap()
        .is_none());
}

#[test]
fn custom_games_pair_only_inside_their_invite_queue() {
    let mut queues = queues();
    assert!(queues
        .add_player(entry("custom_room_a", "versus", true))
        .unwrap()
        .is_none());
    assert!(queues
        .add_player(entry("custom_room_b", "versus", true))
        .unwrap()
        .is_none());
    let paired = queues
        .add_player(entry("custom_room_a", "versus", true))
        .unwrap();
    assert!(paired.is_some());
    let (a, b) = paired.unwrap();
    assert_eq!(a.queue_name, "custom_room_a");
    assert_eq!(b.queue_name, "custom_room_a");
}

#[test]
fn queue_membership_is_exclusive() {
    let mut queues = queues();
    let first = entry("main_matchmaking_normal", "versus", false);
    let player_id = first.player_id;
    queues.add_player(first).unwrap();

    let mut duplicate = entry("main_matchmaking_normal", "versus", false);
    duplicate.player_id = player_id;
    assert_eq!(
        queues.add_player(duplicate).unwrap_err(),
        GameError::AlreadyQueuedOrSeated
    );
}

#[test]
fn removal_is_idempotent() {
    let mut queues = queues();
    let waiting = entry("main_matchmaking_normal", "versus", false);
    let player_id = waiting.player_id;
    queues.add_player(waiting).unwrap();

    assert!(queues.remove_player(player_id).is_some());
    assert!(queues.remove_player(player_id).is_none());
    assert!(queues.remove_player(Uuid::new_v4()).is_none());
}

#[test]
fn invalid_names_and_game_types_are_rejected() {
    let mut queues = queues();
    assert!(matches!(
        queues.add_player(entry("main_matchmaking_normal", "ranked", false)),
        Err(GameError::InvalidGameType(_))
    ));
    assert!(matches!(
        queues.add_player(entry("secret_queue", "versus", false)),
        Err(GameError::InvalidQueueName(_))
    ));
    // A custom game must use the custom prefix.
    assert!(matches!(
        queues.add_player(entry("main_matchmaking_normal", "versus", true)),
        Err(GameError::InvalidQueueName(_))
    ));
    assert!(matches!(
        queues.add_player(entry("   ", "versus", false)),
        Err(GameError::InvalidQueueName(_))
    ));
}

#[test]
fn queue_info_reports_waiting_counts_per_game_type() {
    let mut queues = queues();
    queues
        .add_player(entry("main_matchmaking_normal", "versus", false))
        .unwrap();
    let info = queues.queue_info();
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].queue_name, "main_matchmaking_normal");
    assert_eq!(info[0].game_type, "versus");
    assert_eq!(info[0].players_count, 1);
}
