use std::collections::HashMap;

use actix::prelude::*;
use tracing::info;
use uuid::Uuid;

use crate::protocol::{QueueInfo, RoomInfo, ServerMessage};
use crate::room::MatchRoom;

// --- Messages ---

#[derive(Message)]
#[rtype(result = "()")]
pub struct RegisterSession {
    pub player_id: Uuid,
    pub addr: Recipient<ServerMessage>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct DeregisterSession {
    pub player_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct RegisterRoom {
    pub room_id: Uuid,
    pub addr: Addr<MatchRoom>,
    pub queue_name: String,
    pub player_names: Vec<String>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct DeregisterRoom {
    pub room_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "Option<Addr<MatchRoom>>")]
pub struct LookupRoom {
    pub room_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct UpdateQueueInfo(pub Vec<QueueInfo>);

/// 한 세션에게 현재 로비 정보를 보낸다.
#[derive(Message)]
#[rtype(result = "()")]
pub struct SendServerInfo {
    pub player_id: Uuid,
}

struct RoomEntry {
    addr: Addr<MatchRoom>,
    queue_name: String,
    player_names: Vec<String>,
}

/// 접속 중인 세션과 살아있는 룸의 디렉터리. 로비 브로드캐스트와 관전
/// 입장을 위한 room id → 주소 해석을 맡는다.
pub struct SessionRegistry {
    sessions: HashMap<Uuid, Recipient<ServerMessage>>,
    rooms: HashMap<Uuid, RoomEntry>,
    queue_info: Vec<QueueInfo>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            rooms: HashMap::new(),
            queue_info: Vec::new(),
        }
    }

    fn server_info(&self, your_id: Uuid) -> ServerMessage {
        ServerMessage::ServerInfo {
            your_id,
            players_online: self.sessions.len(),
            queue_info: self.queue_info.clone(),
            room_info: self
                .rooms
                .iter()
                .map(|(room_id, entry)| RoomInfo {
                    room_id: *room_id,
                    queue_name: entry.queue_name.clone(),
                    player_names: entry.player_names.clone(),
                    observer_count: 0,
                })
                .collect(),
        }
    }

    fn broadcast_server_info(&self) {
        for (player_id, recipient) in &self.sessions {
            recipient.do_send(self.server_info(*player_id));
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Actor for SessionRegistry {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("SessionRegistry actor started.");
    }
}

impl Handler<RegisterSession> for SessionRegistry {
    type Result = ();

    fn handle(&mut self, msg: RegisterSession, _ctx: &mut Self::Context) {
        self.sessions.insert(msg.player_id, msg.addr);
        self.broadcast_server_info();
    }
}

impl Handler<DeregisterSession> for SessionRegistry {
    type Result = ();

    fn handle(&mut self, msg: DeregisterSession, _ctx: &mut Self::Context) {
        self.sessions.remove(&msg.player_id);
        self.broadcast_server_info();
    }
}

impl Handler<RegisterRoom> for SessionRegistry {
    type Result = ();

    fn handle(&mut self, msg: RegisterRoom, _ctx: &mut Self::Context) {
        self.rooms.insert(
            msg.room_id,
            RoomEntry {
                addr: msg.addr,
                queue_name: msg.queue_name,
                player_names: msg.player_names,
            },
        );
        self.broadcast_server_info();
    }
}

impl Handler<DeregisterRoom> for SessionRegistry {
    type Result = ();

    fn handle(&mut self, msg: DeregisterRoom, _ctx: &mut Self::Context) {
        self.rooms.remove(&msg.room_id);
        self.broadcast_server_info();
    }
}

impl Handler<LookupRoom> for SessionRegistry {
    type Result = MessageResult<LookupRoom>;

    fn handle(&mut self, msg: LookupRoom, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.rooms.get(&msg.room_id).map(|entry| entry.addr.clone()))
    }
}

impl Handler<UpdateQueueInfo> for SessionRegistry {
    type Result = ();

    fn handle(&mut self, msg: UpdateQueueInfo, _ctx: &mut Self::Context) {
        self.queue_info = msg.0;
        self.broadcast_server_info();
    }
}

impl Handler<SendServerInfo> for SessionRegistry {
    type Result = ();

    fn handle(&mut self, msg: SendServerInfo, _ctx: &mut Self::Context) {
        if let Some(recipient) = self.sessions.get(&msg.player_id) {
            recipient.do_send(self.server_info(msg.player_id));
        }
    }
}
