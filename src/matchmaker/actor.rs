use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use actix::prelude::*;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::agent::{resolve_deck, AgentDeckConfig, DecisionAgent};
use crate::catalog::{CardCatalog, DeckInfo};
use crate::protocol::{ErrorId, ServerMessage};
use crate::room::{GameRoom, MatchLogSink, MatchRoom, RoomAssigned, Seat, StartRoom};
use crate::session::registry::{RegisterRoom, SessionRegistry, UpdateQueueInfo};

use super::queues::{MatchQueues, QueueEntry};

/// 에이전트가 즉시 상대로 배정되는 게임 타입.
pub const AI_GAME_TYPE: &str = "ai";

/// Transport handles a queue entry carries back to its session.
pub struct SessionHandles {
    pub notify: Recipient<ServerMessage>,
    pub control: Recipient<RoomAssigned>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct EnqueuePlayer {
    pub player_id: Uuid,
    pub username: String,
    pub deck: DeckInfo,
    pub queue_name: String,
    pub game_type: String,
    pub custom_game: bool,
    pub handles: SessionHandles,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct DequeuePlayer {
    pub player_id: Uuid,
}

/// 매치메이커 액터. 큐 변이는 전부 이 메일박스 안에서 일어나므로
/// check-then-act 페어링이 이중 매칭 없이 원자적으로 수행된다.
pub struct Matchmaker {
    queues: MatchQueues<SessionHandles>,
    catalog: Arc<CardCatalog>,
    registry: Addr<SessionRegistry>,
    agent_deck: AgentDeckConfig,
    log_sink: Option<Arc<dyn MatchLogSink>>,
}

impl Matchmaker {
    pub fn new(
        queues: MatchQueues<SessionHandles>,
        catalog: Arc<CardCatalog>,
        registry: Addr<SessionRegistry>,
        agent_deck: AgentDeckConfig,
        log_sink: Option<Arc<dyn MatchLogSink>>,
    ) -> Self {
        Self {
            queues,
            catalog,
            registry,
            agent_deck,
            log_sink,
        }
    }

    fn publish_queue_info(&self) {
        self.registry
            .do_send(UpdateQueueInfo(self.queues.queue_info()));
    }

    fn create_room(&self, queue_name: &str, entries: Vec<QueueEntry<SessionHandles>>, with_agent: bool) {
        let room_id = Uuid::new_v4();
        let seed: u64 = rand::thread_rng().gen();

        let mut seats = Vec::new();
        let mut participants = HashMap::new();
        let mut handles = Vec::new();
        for entry in entries {
            seats.push(Seat::human(
                &entry.player_id.to_string(),
                &entry.username,
                entry.deck.clone(),
            ));
            participants.insert(entry.player_id.to_string(), entry.handle.notify.clone());
            handles.push(entry.handle);
        }
        if with_agent {
            let agent_id = format!("ai_{}", Uuid::new_v4());
            let agent = DecisionAgent::new(&agent_id, resolve_deck(&self.agent_deck), seed);
            seats.push(Seat::agent(agent));
        }
        let player_ids: Vec<String> = seats.iter().map(|s| s.player_id.clone()).collect();
        let player_names: Vec<String> = seats.iter().map(|s| s.username.clone()).collect();

        let core = GameRoom::new(
            room_id,
            queue_name,
            self.catalog.clone(),
            seats,
            self.log_sink.clone(),
        );
        let addr = MatchRoom::new(core, participants, self.registry.clone(), seed).start();

        self.registry.do_send(RegisterRoom {
            room_id,
            addr: addr.clone(),
            queue_name: queue_name.to_string(),
            player_names,
        });
        for (seat, handle) in handles.into_iter().enumerate() {
            handle.control.do_send(RoomAssigned {
                room_id,
                seat,
                player_ids: player_ids.clone(),
                addr: addr.clone(),
            });
            handle.notify.do_send(ServerMessage::MatchStart {
                room_id,
                your_seat: seat,
                player_ids: player_ids.clone(),
            });
        }
        addr.do_send(StartRoom);
        info!("Room {} created from queue {}", room_id, queue_name);
    }
}

impl Actor for Matchmaker {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("Matchmaker actor started.");
    }
}

impl Handler<EnqueuePlayer> for Matchmaker {
    type Result = ();

    fn handle(&mut self, msg: EnqueuePlayer, _ctx: &mut Self::Context) {
        let queue_name = msg.queue_name.trim().to_string();

        if !self.queues.is_valid_game_type(&msg.game_type) {
            msg.handles.notify.do_send(ServerMessage::Error {
                error_id: ErrorId::JoinmatchInvalidGametype,
                error_message: "Invalid game type.".to_string(),
            });
            return;
        }
        if msg.game_type != AI_GAME_TYPE
            && !self.queues.is_valid_queue_name(&queue_name, msg.custom_game)
        {
            msg.handles.notify.do_send(ServerMessage::Error {
                error_id: ErrorId::JoinmatchInvalidQueuename,
                error_message: "Invalid queue name.".to_string(),
            });
            return;
        }
        if self.queues.contains_player(msg.player_id) {
            msg.handles.notify.do_send(ServerMessage::Error {
                error_id: ErrorId::JoinmatchInvalidAlreadyinmatch,
                error_message: "Already in a match.".to_string(),
            });
            return;
        }
        // Deck legality is checked at queue join so an invalid list never
        // reaches a room.
        if let Err(e) = self.catalog.validate_deck(&msg.deck) {
            msg.handles.notify.do_send(ServerMessage::Error {
                error_id: ErrorId::JoinmatchInvaliddeck,
                error_message: e.to_string(),
            });
            return;
        }

        let game_type = msg.game_type.clone();
        let entry = QueueEntry {
            player_id: msg.player_id,
            username: msg.username,
            deck: msg.deck,
            queue_name: queue_name.clone(),
            game_type: msg.game_type,
            custom_game: msg.custom_game,
            enqueued_at: Instant::now(),
            handle: msg.handles,
        };

        // Agent matches skip the queue entirely.
        if game_type == AI_GAME_TYPE {
            self.create_room(&queue_name, vec![entry], true);
            return;
        }

        let notify = entry.handle.notify.clone();
        match self.queues.add_player(entry) {
            Ok(None) => {
                notify.do_send(ServerMessage::JoinedQueue {
                    queue_name: queue_name.clone(),
                });
                self.publish_queue_info();
            }
            Ok(Some((first, second))) => {
                self.create_room(&queue_name, vec![first, second], false);
                self.publish_queue_info();
            }
            Err(e) => {
                // All refusal cases were pre-checked above.
                tracing::warn!("unexpected enqueue refusal: {}", e);
            }
        }
    }
}

impl Handler<DequeuePlayer> for Matchmaker {
    type Result = ();

    fn handle(&mut self, msg: DequeuePlayer, _ctx: &mut Self::Context) {
        if let Some(entry) = self.queues.remove_player(msg.player_id) {
            entry.handle.notify.do_send(ServerMessage::LeftQueue {});
            self.publish_queue_info();
        }
    }
}
