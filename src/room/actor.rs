use std::collections::HashMap;

use actix::prelude::*;
use tracing::{info, warn};
use uuid::Uuid;

use crate::protocol::{ErrorId, GameAction, GameEvent, GameOverReason, ServerMessage};
use crate::session::registry::{DeregisterRoom, SessionRegistry};

use super::core::GameRoom;

// --- Messages ---

#[derive(Message)]
#[rtype(result = "()")]
pub struct StartRoom;

#[derive(Message)]
#[rtype(result = "()")]
pub struct RoomGameAction {
    pub player_id: String,
    pub action: GameAction,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct JoinObserver {
    pub observer_id: String,
    pub addr: Recipient<ServerMessage>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct ObserverGetEvents {
    pub observer_id: String,
    pub next_event_index: usize,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct PlayerDeparture {
    pub player_id: String,
    pub reason: GameOverReason,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct RoomEmote {
    pub player_id: String,
    pub emote_id: String,
}

/// 세션에게 자신의 방 주소를 알려주는 핸드셰이크 메시지.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RoomAssigned {
    pub room_id: Uuid,
    pub seat: usize,
    pub player_ids: Vec<String>,
    pub addr: Addr<MatchRoom>,
}

// --- Actor ---

/// 룸 액터. 메일박스가 곧 방 단위 직렬화 장치다: 한 액션이 (자동 응답
/// 체인을 포함해) 완전히 처리되기 전에는 다음 액션이 엔진에 닿지 않는다.
pub struct MatchRoom {
    core: GameRoom,
    participants: HashMap<String, Recipient<ServerMessage>>,
    observer_addrs: HashMap<String, Recipient<ServerMessage>>,
    registry: Addr<SessionRegistry>,
    seed: u64,
    fanned_out: usize,
}

impl MatchRoom {
    pub fn new(
        core: GameRoom,
        participants: HashMap<String, Recipient<ServerMessage>>,
        registry: Addr<SessionRegistry>,
        seed: u64,
    ) -> Self {
        Self {
            core,
            participants,
            observer_addrs: HashMap::new(),
            registry,
            seed,
            fanned_out: 0,
        }
    }

    pub fn room_id(&self) -> Uuid {
        self.core.room_id
    }

    /// Delivers every not-yet-delivered event, in log order, to all seated
    /// participants and observers.
    fn fan_out(&mut self) {
        let room_id = self.core.room_id;
        let total = self.core.all_events.len();
        for index in self.fanned_out..total {
            let event = self.core.all_events[index].clone();
            for recipient in self.participants.values() {
                recipient.do_send(ServerMessage::GameEvent {
                    room_id,
                    event_index: index,
                    event: event.clone(),
                });
            }
            for recipient in self.observer_addrs.values() {
                recipient.do_send(ServerMessage::GameEvent {
                    room_id,
                    event_index: index,
                    event: event.clone(),
                });
            }
        }
        self.fanned_out = total;
    }

    fn check_cleanup(&mut self, ctx: &mut Context<Self>) {
        if self.core.is_ready_for_cleanup() {
            info!("Room {} finished, cleaning up", self.core.room_id);
            self.registry.do_send(DeregisterRoom {
                room_id: self.core.room_id,
            });
            ctx.stop();
        }
    }
}

impl Actor for MatchRoom {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("MatchRoom {} started", self.core.room_id);
    }
}

impl Handler<StartRoom> for MatchRoom {
    type Result = ();

    fn handle(&mut self, _msg: StartRoom, ctx: &mut Self::Context) {
        match self.core.start(self.seed) {
            Ok(_) => {
                self.fan_out();
                self.check_cleanup(ctx);
            }
            Err(e) => {
                // A deck that fails validation aborts the room before any
                // engine exists.
                warn!("Room {} failed to start: {}", self.core.room_id, e);
                for recipient in self.participants.values() {
                    recipient.do_send(ServerMessage::Error {
                        error_id: ErrorId::JoinmatchInvaliddeck,
                        error_message: e.to_string(),
                    });
                }
                self.registry.do_send(DeregisterRoom {
                    room_id: self.core.room_id,
                });
                ctx.stop();
            }
        }
    }
}

impl Handler<RoomGameAction> for MatchRoom {
    type Result = ();

    fn handle(&mut self, msg: RoomGameAction, ctx: &mut Self::Context) {
        match self.core.handle_game_message(&msg.player_id, &msg.action) {
            Ok(_) => {
                self.fan_out();
                self.check_cleanup(ctx);
            }
            Err(e) => {
                if let Some(recipient) = self.participants.get(&msg.player_id) {
                    recipient.do_send(ServerMessage::Error {
                        error_id: ErrorId::InvalidGameMessage,
                        error_message: e.to_string(),
                    });
                }
            }
        }
    }
}

impl Handler<JoinObserver> for MatchRoom {
    type Result = ();

    fn handle(&mut self, msg: JoinObserver, _ctx: &mut Self::Context) {
        self.core.join_as_observer(&msg.observer_id);
        msg.addr.do_send(ServerMessage::ObserverJoined {
            room_id: self.core.room_id,
        });
        self.observer_addrs.insert(msg.observer_id, msg.addr);
    }
}

impl Handler<ObserverGetEvents> for MatchRoom {
    type Result = ();

    fn handle(&mut self, msg: ObserverGetEvents, _ctx: &mut Self::Context) {
        let events: Vec<GameEvent> = self.core.events_from(msg.next_event_index).to_vec();
        if let Some(recipient) = self.observer_addrs.get(&msg.observer_id) {
            recipient.do_send(ServerMessage::ObserverEvents {
                room_id: self.core.room_id,
                next_event_index: msg.next_event_index + events.len(),
                events,
            });
        }
    }
}

impl Handler<PlayerDeparture> for MatchRoom {
    type Result = ();

    fn handle(&mut self, msg: PlayerDeparture, ctx: &mut Self::Context) {
        if self.observer_addrs.remove(&msg.player_id).is_some() {
            self.core.remove_observer(&msg.player_id);
            return;
        }
        match self.core.handle_player_departure(&msg.player_id, msg.reason) {
            Ok(_) => {
                self.participants.remove(&msg.player_id);
                self.fan_out();
                self.check_cleanup(ctx);
            }
            Err(e) => warn!(
                "Room {}: departure of {} failed: {}",
                self.core.room_id, msg.player_id, e
            ),
        }
    }
}

impl Handler<RoomEmote> for MatchRoom {
    type Result = ();

    fn handle(&mut self, msg: RoomEmote, _ctx: &mut Self::Context) {
        // Cosmetic relay; the engine never sees it.
        if self.core.seat_of(&msg.player_id).is_none() {
            return;
        }
        let relayed = ServerMessage::Emote {
            player_id: msg.player_id,
            emote_id: msg.emote_id,
        };
        for recipient in self.participants.values() {
            recipient.do_send(relayed.clone());
        }
        for recipient in self.observer_addrs.values() {
            recipient.do_send(relayed.clone());
        }
    }
}
