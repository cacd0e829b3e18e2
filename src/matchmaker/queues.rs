use std::collections::HashMap;
use std::time::Instant;

use uuid::Uuid;

use crate::catalog::DeckInfo;
use crate::error::GameError;
use crate::protocol::QueueInfo;

/// 대기열의 한 항목. `H` 는 전송 계층 핸들(세션 수신자 등)로, 큐 로직은
/// 내용을 들여다보지 않는다.
#[derive(Debug)]
pub struct QueueEntry<H> {
    pub player_id: Uuid,
    pub username: String,
    pub deck: DeckInfo,
    pub queue_name: String,
    pub game_type: String,
    pub custom_game: bool,
    pub enqueued_at: Instant,
    pub handle: H,
}

/// 이름 있는 대기열 집합. 호출자가 단일 스레드(액터 메일박스)에서만
/// 사용하므로 enqueue-검사-pair 가 원자적이다.
pub struct MatchQueues<H> {
    queue_names: Vec<String>,
    custom_queue_prefix: String,
    game_types: Vec<String>,
    queues: HashMap<String, Vec<QueueEntry<H>>>,
}

impl<H> MatchQueues<H> {
    pub fn new(queue_names: Vec<String>, custom_queue_prefix: String, game_types: Vec<String>) -> Self {
        Self {
            queue_names,
            custom_queue_prefix,
            game_types,
            queues: HashMap::new(),
        }
    }

    pub fn is_valid_game_type(&self, game_type: &str) -> bool {
        self.game_types.iter().any(|g| g == game_type)
    }

    /// Custom games queue under caller-chosen invite names behind a fixed
    /// prefix; everything else must be a configured queue.
    pub fn is_valid_queue_name(&self, queue_name: &str, custom_game: bool) -> bool {
        let queue_name = queue_name.trim();
        if queue_name.is_empty() {
            return false;
        }
        if custom_game {
            queue_name.starts_with(&self.custom_queue_prefix)
        } else {
            self.queue_names.iter().any(|q| q == queue_name)
        }
    }

    pub fn contains_player(&self, player_id: Uuid) -> bool {
        self.queues
            .values()
            .any(|entries| entries.iter().any(|e| e.player_id == player_id))
    }

    /// Enqueues and immediately tries to pair with the longest-waiting
    /// compatible entry (same queue, game type, and custom flag). On a
    /// pair, both entries leave the queue; the older one is returned first.
    pub fn add_player(
        &mut self,
        entry: QueueEntry<H>,
    ) -> Result<Option<(QueueEntry<H>, QueueEntry<H>)>, GameError> {
        if !self.is_valid_game_type(&entry.game_type) {
            return Err(GameError::InvalidGameType(entry.game_type.clone()));
        }
        if !self.is_valid_queue_name(&entry.queue_name, entry.custom_game) {
            return Err(GameError::InvalidQueueName(entry.queue_name.clone()));
        }
        if self.contains_player(entry.player_id) {
            return Err(GameError::AlreadyQueuedOrSeated);
        }

        let queue_name = entry.queue_name.clone();
        let queue = self.queues.entry(queue_name).or_default();

        // Entries are appended in arrival order, so the first compatible
        // one is the longest waiting.
        let partner_index = queue.iter().position(|waiting| {
            waiting.game_type == entry.game_type && waiting.custom_game == entry.custom_game
        });
        match partner_index {
            Some(index) => {
                let partner = queue.remove(index);
                Ok(Some((partner, entry)))
            }
            None => {
                queue.push(entry);
                Ok(None)
            }
        }
    }

    /// Idempotent: removing an absent player is a no-op returning `None`.
    pub fn remove_player(&mut self, player_id: Uuid) -> Option<QueueEntry<H>> {
        for entries in self.queues.values_mut() {
            if let Some(index) = entries.iter().position(|e| e.player_id == player_id) {
                return Some(entries.remove(index));
            }
        }
        None
    }

    pub fn queue_info(&self) -> Vec<QueueInfo> {
        let mut info = Vec::new();
        for (queue_name, entries) in &self.queues {
            for game_type in &self.game_types {
                let players_count = entries
                    .iter()
                    .filter(|e| &e.game_type == game_type)
                    .count();
                if players_count > 0 {
                    info.push(QueueInfo {
                        queue_name: queue_name.clone(),
                        game_type: game_type.clone(),
                        players_count,
                    });
                }
            }
        }
        info.sort_by(|a, b| a.queue_name.cmp(&b.queue_name));
        info
    }
}
