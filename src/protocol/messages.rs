use actix::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::actions::GameAction;
use super::events::GameEvent;
use crate::catalog::DeckInfo;

// --- Client to Server Messages ---

#[derive(Deserialize, Debug)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// 서버 접속 직후 로비 정보를 요청합니다.
    JoinServer {
        #[serde(default)]
        username: Option<String>,
    },

    /// 매칭 대기열 진입. 덱은 이 시점에 검증된다.
    JoinMatchmakingQueue {
        queue_name: String,
        game_type: String,
        #[serde(default)]
        custom_game: bool,
        #[serde(flatten)]
        deck: DeckInfo,
    },

    LeaveMatchmakingQueue {},

    ObserveRoom {
        room_id: Uuid,
    },

    ObserverGetEvents {
        next_event_index: usize,
    },

    GameAction {
        #[serde(flatten)]
        action: GameAction,
    },

    LeaveGame {},

    Emote {
        emote_id: String,
    },
}

// --- Server to Client Messages ---

#[derive(Serialize, Message, Clone, Debug)]
#[rtype(result = "()")]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum ServerMessage {
    ServerInfo {
        your_id: Uuid,
        players_online: usize,
        queue_info: Vec<QueueInfo>,
        room_info: Vec<RoomInfo>,
    },

    JoinedQueue {
        queue_name: String,
    },

    LeftQueue {},

    MatchStart {
        room_id: Uuid,
        your_seat: usize,
        player_ids: Vec<String>,
    },

    GameEvent {
        room_id: Uuid,
        event_index: usize,
        #[serde(flatten)]
        event: GameEvent,
    },

    ObserverEvents {
        room_id: Uuid,
        next_event_index: usize,
        events: Vec<GameEvent>,
    },

    ObserverJoined {
        room_id: Uuid,
    },

    Emote {
        player_id: String,
        emote_id: String,
    },

    Error {
        error_id: ErrorId,
        error_message: String,
    },
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorId {
    InvalidMessage,
    InvalidGameMessage,
    JoinmatchInvalidAlreadyinmatch,
    JoinmatchInvalidGametype,
    JoinmatchInvalidQueuename,
    JoinmatchInvaliddeck,
    InvalidRoom,
    NotInRoom,
}

#[derive(Serialize, Clone, Debug)]
pub struct QueueInfo {
    pub queue_name: String,
    pub game_type: String,
    pub players_count: usize,
}

#[derive(Serialize, Clone, Debug)]
pub struct RoomInfo {
    pub room_id: Uuid,
    pub queue_name: String,
    pub player_names: Vec<String>,
    pub observer_count: usize,
}
