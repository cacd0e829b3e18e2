use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::agent::DecisionAgent;
use crate::catalog::{CardCatalog, DeckInfo};
use crate::engine::{GameEngine, GamePhase};
use crate::error::GameError;
use crate::protocol::{GameAction, GameEvent, GameOverReason};

use super::archive::{MatchLog, MatchLogSink};

/// 자동 응답 체인 상한. 정상 매치에서는 도달할 수 없는 값이다.
const AGENT_LOOP_LIMIT: usize = 5000;

pub enum SeatKind {
    Human,
    Agent(DecisionAgent),
}

pub struct Seat {
    pub player_id: String,
    pub username: String,
    pub deck: DeckInfo,
    pub kind: SeatKind,
    pub connected: bool,
}

impl Seat {
    pub fn human(player_id: &str, username: &str, deck: DeckInfo) -> Self {
        Self {
            player_id: player_id.to_string(),
            username: username.to_string(),
            deck,
            kind: SeatKind::Human,
            connected: true,
        }
    }

    pub fn agent(agent: DecisionAgent) -> Self {
        Self {
            player_id: agent.player_id().to_string(),
            username: "Weak AI".to_string(),
            deck: agent.deck().clone(),
            kind: SeatKind::Agent(agent),
            connected: true,
        }
    }

    pub fn is_agent(&self) -> bool {
        matches!(self.kind, SeatKind::Agent(_))
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct LoggedAction {
    pub player_id: String,
    pub action: GameAction,
    pub received_at: DateTime<Utc>,
}

/// 한 매치의 동기 코어. 액터 래퍼가 직렬화와 팬아웃을 맡고, 규칙 진행과
/// 로그는 전부 여기서 처리한다.
pub struct GameRoom {
    pub room_id: Uuid,
    pub queue_name: String,
    catalog: Arc<CardCatalog>,
    pub seats: Vec<Seat>,
    engine: Option<GameEngine>,
    pub observers: Vec<String>,
    pub all_events: Vec<GameEvent>,
    pub all_game_messages: Vec<LoggedAction>,
    log_sink: Option<Arc<dyn MatchLogSink>>,
    abandoned: bool,
    archived: bool,
}

impl GameRoom {
    pub fn new(
        room_id: Uuid,
        queue_name: &str,
        catalog: Arc<CardCatalog>,
        seats: Vec<Seat>,
        log_sink: Option<Arc<dyn MatchLogSink>>,
    ) -> Self {
        Self {
            room_id,
            queue_name: queue_name.to_string(),
            catalog,
            seats,
            engine: None,
            observers: Vec::new(),
            all_events: Vec::new(),
            all_game_messages: Vec::new(),
            log_sink,
            abandoned: false,
            archived: false,
        }
    }

    pub fn engine(&self) -> Option<&GameEngine> {
        self.engine.as_ref()
    }

    pub fn seat_of(&self, player_id: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.player_id == player_id)
    }

    pub fn player_ids(&self) -> Vec<String> {
        self.seats.iter().map(|s| s.player_id.clone()).collect()
    }

    /// Validates both decks, builds the engine, and runs the match up to the
    /// first human decision. Returns the events appended by this call.
    pub fn start(&mut self, seed: u64) -> Result<Vec<GameEvent>, GameError> {
        if self.engine.is_some() {
            return Err(GameError::MatchOver);
        }
        for seat in &self.seats {
            self.catalog.validate_deck(&seat.deck)?;
        }
        let player_ids: Vec<String> = self.player_ids();
        let decks: Vec<DeckInfo> = self.seats.iter().map(|s| s.deck.clone()).collect();
        let mut engine = GameEngine::new(
            self.catalog.clone(),
            [player_ids[0].as_str(), player_ids[1].as_str()],
            [&decks[0], &decks[1]],
            seed,
        )?;
        let mut events = engine.begin_match();
        self.engine = Some(engine);
        self.drive_agents(&mut events);
        self.append_events(&events);
        info!(
            "Room {} started: {} vs {}",
            self.room_id, player_ids[0], player_ids[1]
        );
        Ok(events)
    }

    /// One inbound action, processed to completion including any
    /// synchronous agent-response chain.
    pub fn handle_game_message(
        &mut self,
        player_id: &str,
        action: &GameAction,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.seat_of(player_id).is_none() {
            return Err(GameError::UnknownPlayer(player_id.to_string()));
        }
        let engine = self.engine.as_mut().ok_or(GameError::NotStarted)?;
        self.all_game_messages.push(LoggedAction {
            player_id: player_id.to_string(),
            action: action.clone(),
            received_at: Utc::now(),
        });
        let mut events = engine.handle_action(player_id, action)?;
        self.drive_agents(&mut events);
        self.append_events(&events);
        Ok(events)
    }

    /// While the pending decision is addressed to an agent seat, answer it
    /// synchronously. Ends at a human decision or at game over.
    fn drive_agents(&mut self, events: &mut Vec<GameEvent>) {
        let mut cursor = 0usize;
        for _ in 0..AGENT_LOOP_LIMIT {
            let engine = match self.engine.as_mut() {
                Some(engine) => engine,
                None => return,
            };
            if engine.phase == GamePhase::GameOver {
                return;
            }
            let responder = match engine.pending_decision() {
                Some(pending) => engine.player(pending.player()).player_id.clone(),
                None => return,
            };
            let seat = match self
                .seats
                .iter_mut()
                .find(|s| s.player_id == responder)
            {
                Some(seat) => seat,
                None => return,
            };
            let agent = match &mut seat.kind {
                SeatKind::Agent(agent) => agent,
                SeatKind::Human => return,
            };

            let batch = &events[cursor..];
            cursor = events.len();
            let action = match agent.process_events(batch) {
                Ok(Some(action)) => action,
                Ok(None) => return,
                Err(e) => {
                    // Silent skipping would desync rules from state; kill
                    // the match instead.
                    error!("Room {}: agent failed to respond: {}", self.room_id, e);
                    let mut over = Vec::new();
                    if let Some(engine) = self.engine.as_mut() {
                        if let Ok(mut conceded) =
                            engine.concede(&responder, GameOverReason::UnrecoverableError)
                        {
                            over.append(&mut conceded);
                        }
                    }
                    events.extend(over);
                    return;
                }
            };
            let engine = self.engine.as_mut().expect("engine exists");
            match engine.handle_action(&responder, &action) {
                Ok(mut produced) => {
                    if produced
                        .iter()
                        .any(|e| matches!(e, GameEvent::GameError { .. }))
                    {
                        // An agent that draws a rules rejection will loop
                        // forever; terminate instead.
                        error!("Room {}: agent action rejected by engine", self.room_id);
                        events.append(&mut produced);
                        if let Ok(mut conceded) =
                            engine.concede(&responder, GameOverReason::UnrecoverableError)
                        {
                            events.append(&mut conceded);
                        }
                        return;
                    }
                    events.append(&mut produced);
                }
                Err(e) => {
                    error!("Room {}: engine rejected agent action: {}", self.room_id, e);
                    return;
                }
            }
        }
        warn!("Room {}: agent loop limit reached", self.room_id);
    }

    fn append_events(&mut self, events: &[GameEvent]) {
        self.all_events.extend(events.iter().cloned());
        if events.iter().any(|e| e.is_game_over()) {
            self.archive_log();
        }
    }

    /// One-way archival sink; failures are logged and ignored.
    fn archive_log(&mut self) {
        if self.archived {
            return;
        }
        self.archived = true;
        if let Some(sink) = &self.log_sink {
            let log = MatchLog {
                room_id: self.room_id,
                queue_name: self.queue_name.clone(),
                finished_at: Utc::now(),
                events: &self.all_events,
                messages: &self.all_game_messages,
            };
            if let Err(e) = sink.archive(&log) {
                warn!("Room {}: match log archival failed: {}", self.room_id, e);
            }
        }
    }

    pub fn join_as_observer(&mut self, observer_id: &str) {
        if !self.observers.iter().any(|id| id == observer_id) {
            self.observers.push(observer_id.to_string());
        }
    }

    pub fn remove_observer(&mut self, observer_id: &str) {
        self.observers.retain(|id| id != observer_id);
    }

    /// Contiguous event suffix from `from_index`; never mutates state.
    pub fn events_from(&self, from_index: usize) -> &[GameEvent] {
        if from_index >= self.all_events.len() {
            &[]
        } else {
            &self.all_events[from_index..]
        }
    }

    /// Departure mid-match becomes a forfeit; before start it abandons the
    /// room outright.
    pub fn handle_player_departure(
        &mut self,
        player_id: &str,
        reason: GameOverReason,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.seat_of(player_id).is_none() {
            self.remove_observer(player_id);
            return Ok(Vec::new());
        }
        if let Some(seat) = self.seats.iter_mut().find(|s| s.player_id == player_id) {
            seat.connected = false;
        }
        match self.engine.as_mut() {
            Some(engine) if engine.phase != GamePhase::GameOver => {
                let events = engine.concede(player_id, reason)?;
                self.append_events(&events);
                Ok(events)
            }
            Some(_) => Ok(Vec::new()),
            None => {
                self.abandoned = true;
                Ok(Vec::new())
            }
        }
    }

    /// The room can be dropped once it is abandoned pre-start or the match
    /// is over (fan-out has already notified every participant).
    pub fn is_ready_for_cleanup(&self) -> bool {
        if self.abandoned {
            return true;
        }
        match &self.engine {
            Some(engine) => engine.phase == GamePhase::GameOver,
            None => false,
        }
    }
}
