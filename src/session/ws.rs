use std::time::{Duration, Instant};

use actix::{
    fut, Actor, ActorContext, ActorFutureExt, Addr, AsyncContext, Handler, Running, StreamHandler,
    WrapFuture,
};
use actix_web_actors::ws;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::SessionSettings;
use crate::matchmaker::{DequeuePlayer, EnqueuePlayer, Matchmaker, SessionHandles};
use crate::protocol::{
    ClientMessage, ErrorId, GameOverReason, ServerMessage,
};
use crate::room::{
    JoinObserver, MatchRoom, ObserverGetEvents, PlayerDeparture, RoomAssigned, RoomEmote,
    RoomGameAction,
};
use crate::session::registry::{
    DeregisterSession, LookupRoom, RegisterSession, SendServerInfo, SessionRegistry,
};

type Ctx = ws::WebsocketContext<PlayerSession>;

fn send_err(ctx: &mut Ctx, error_id: ErrorId, message: &str) {
    if let Ok(text) = serde_json::to_string(&ServerMessage::Error {
        error_id,
        error_message: message.to_string(),
    }) {
        ctx.text(text);
    }
}

/// Represents the state of the player session.
#[derive(Clone, Debug, PartialEq)]
enum SessionState {
    Idle,          // Connected, nothing in flight.
    InQueue,       // Waiting in a matchmaking queue.
    InRoom,        // Seated in a match.
    Observing,     // Watching someone else's match.
    Disconnecting, // Graceful shutdown under way.
}

/// 연결 1 개당 1 액터. 신원/마지막 활동 시각/현재 방을 들고,
/// 인바운드 메시지를 매치메이커나 자신의 룸으로 라우팅한다.
pub struct PlayerSession {
    player_id: Uuid,
    username: String,
    state: SessionState,
    hb: Instant,
    last_activity: Instant,
    matchmaker: Addr<Matchmaker>,
    registry: Addr<SessionRegistry>,
    room: Option<(Uuid, Addr<MatchRoom>)>,
    settings: SessionSettings,
}

impl PlayerSession {
    pub fn new(
        matchmaker: Addr<Matchmaker>,
        registry: Addr<SessionRegistry>,
        settings: SessionSettings,
    ) -> Self {
        let player_id = Uuid::new_v4();
        Self {
            player_id,
            username: format!("Player_{}", &player_id.to_string()[..8]),
            state: SessionState::Idle,
            hb: Instant::now(),
            last_activity: Instant::now(),
            matchmaker,
            registry,
            room: None,
            settings,
        }
    }

    fn hb(&self, ctx: &mut Ctx) {
        let timeout = Duration::from_secs(self.settings.client_timeout_seconds);
        ctx.run_interval(
            Duration::from_secs(self.settings.heartbeat_interval_seconds),
            move |act, ctx| {
                if Instant::now().duration_since(act.hb) > timeout {
                    info!("Websocket client heartbeat failed, disconnecting!");
                    ctx.stop();
                    return;
                }
                ctx.ping(b"");
            },
        );
    }

    /// Idle reclamation runs on its own timer, decoupled from message
    /// processing. A participant idle past the threshold is force-quit;
    /// the room turns that into a forfeit.
    fn idle_watch(&self, ctx: &mut Ctx) {
        let idle_timeout = Duration::from_secs(self.settings.idle_timeout_seconds);
        ctx.run_interval(
            Duration::from_secs(self.settings.idle_check_interval_seconds),
            move |act, ctx| {
                if Instant::now().duration_since(act.last_activity) > idle_timeout {
                    info!("Player timed out: {} - {}", act.username, act.player_id);
                    if let Some((_, room)) = act.room.take() {
                        room.do_send(PlayerDeparture {
                            player_id: act.player_id.to_string(),
                            reason: GameOverReason::ForfeitIdle,
                        });
                    }
                    act.matchmaker.do_send(DequeuePlayer {
                        player_id: act.player_id,
                    });
                    ctx.stop();
                }
            },
        );
    }

    fn handle_client_message(&mut self, message: ClientMessage, ctx: &mut Ctx) {
        match message {
            ClientMessage::JoinServer { username } => {
                if let Some(username) = username {
                    self.username = username;
                }
                self.registry.do_send(SendServerInfo {
                    player_id: self.player_id,
                });
            }

            ClientMessage::JoinMatchmakingQueue {
                queue_name,
                game_type,
                custom_game,
                deck,
            } => {
                if self.state != SessionState::Idle {
                    send_err(
                        ctx,
                        ErrorId::JoinmatchInvalidAlreadyinmatch,
                        "Already in a match.",
                    );
                    return;
                }
                self.matchmaker.do_send(EnqueuePlayer {
                    player_id: self.player_id,
                    username: self.username.clone(),
                    deck,
                    queue_name,
                    game_type,
                    custom_game,
                    handles: SessionHandles {
                        notify: ctx.address().recipient(),
                        control: ctx.address().recipient(),
                    },
                });
            }

            ClientMessage::LeaveMatchmakingQueue {} => {
                self.matchmaker.do_send(DequeuePlayer {
                    player_id: self.player_id,
                });
            }

            ClientMessage::ObserveRoom { room_id } => {
                if self.state != SessionState::Idle {
                    send_err(ctx, ErrorId::InvalidRoom, "Already engaged elsewhere.");
                    return;
                }
                let observer_id = self.player_id.to_string();
                let recipient = ctx.address().recipient();
                let lookup = self
                    .registry
                    .send(LookupRoom { room_id })
                    .into_actor(self)
                    .then(move |result, act, ctx| {
                        match result {
                            Ok(Some(addr)) => {
                                addr.do_send(JoinObserver {
                                    observer_id,
                                    addr: recipient,
                                });
                                act.room = Some((room_id, addr));
                                act.state = SessionState::Observing;
                            }
                            _ => send_err(ctx, ErrorId::InvalidRoom, "ERROR: Match not found."),
                        }
                        fut::ready(())
                    });
                ctx.spawn(lookup);
            }

            ClientMessage::ObserverGetEvents { next_event_index } => match &self.room {
                Some((_, room)) => room.do_send(ObserverGetEvents {
                    observer_id: self.player_id.to_string(),
                    next_event_index,
                }),
                None => send_err(ctx, ErrorId::NotInRoom, "ERROR: Not in a game room."),
            },

            ClientMessage::GameAction { action } => match &self.room {
                Some((_, room)) => room.do_send(RoomGameAction {
                    player_id: self.player_id.to_string(),
                    action,
                }),
                None => send_err(
                    ctx,
                    ErrorId::NotInRoom,
                    "ERROR: Not in a game room to send a game message.",
                ),
            },

            ClientMessage::LeaveGame {} => match self.room.take() {
                Some((_, room)) => {
                    room.do_send(PlayerDeparture {
                        player_id: self.player_id.to_string(),
                        reason: GameOverReason::Resign,
                    });
                    self.state = SessionState::Idle;
                }
                None => send_err(
                    ctx,
                    ErrorId::NotInRoom,
                    "ERROR: Not in a game room to leave.",
                ),
            },

            ClientMessage::Emote { emote_id } => match &self.room {
                Some((_, room)) => room.do_send(RoomEmote {
                    player_id: self.player_id.to_string(),
                    emote_id,
                }),
                None => send_err(ctx, ErrorId::NotInRoom, "ERROR: Not in a game room."),
            },
        }
    }
}

impl Actor for PlayerSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!("PlayerSession started: {}", self.player_id);
        self.hb(ctx);
        self.idle_watch(ctx);
        self.registry.do_send(RegisterSession {
            player_id: self.player_id,
            addr: ctx.address().recipient(),
        });
    }

    fn stopping(&mut self, _ctx: &mut Self::Context) -> Running {
        if self.state == SessionState::Disconnecting {
            return Running::Stop;
        }
        self.state = SessionState::Disconnecting;
        info!(
            "Client disconnected: {} - {}",
            self.username, self.player_id
        );
        self.matchmaker.do_send(DequeuePlayer {
            player_id: self.player_id,
        });
        if let Some((_, room)) = self.room.take() {
            room.do_send(PlayerDeparture {
                player_id: self.player_id.to_string(),
                reason: GameOverReason::ForfeitDisconnect,
            });
        }
        self.registry.do_send(DeregisterSession {
            player_id: self.player_id,
        });
        Running::Stop
    }
}

impl Handler<ServerMessage> for PlayerSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, ctx: &mut Self::Context) {
        match &msg {
            ServerMessage::JoinedQueue { .. } => self.state = SessionState::InQueue,
            ServerMessage::LeftQueue {} => {
                if self.state == SessionState::InQueue {
                    self.state = SessionState::Idle;
                }
            }
            ServerMessage::MatchStart { .. } => self.state = SessionState::InRoom,
            _ => {}
        }
        match serde_json::to_string(&msg) {
            Ok(text) => ctx.text(text),
            Err(e) => warn!("Failed to serialize ServerMessage for client: {}", e),
        }
    }
}

impl Handler<RoomAssigned> for PlayerSession {
    type Result = ();

    fn handle(&mut self, msg: RoomAssigned, _ctx: &mut Self::Context) {
        self.room = Some((msg.room_id, msg.addr));
        self.state = SessionState::InRoom;
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for PlayerSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.hb = Instant::now();
                self.last_activity = Instant::now();
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => self.handle_client_message(message, ctx),
                    Err(e) => {
                        warn!("Failed to parse client message: {}", e);
                        send_err(
                            ctx,
                            ErrorId::InvalidMessage,
                            &format!("ERROR: Invalid message: {}", e),
                        );
                    }
                }
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            _ => ctx.stop(),
        }
    }
}
