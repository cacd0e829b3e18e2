use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::protocol::GameEvent;

use super::core::LoggedAction;

/// 매치 종료 후 한 방향으로만 흘러가는 기록. 실패해도 매치 결과에는
/// 영향이 없다.
#[derive(Serialize)]
pub struct MatchLog<'a> {
    pub room_id: Uuid,
    pub queue_name: String,
    pub finished_at: DateTime<Utc>,
    pub events: &'a [GameEvent],
    pub messages: &'a [LoggedAction],
}

pub trait MatchLogSink: Send + Sync {
    fn archive(&self, log: &MatchLog) -> io::Result<()>;
}

/// Writes one JSON file per finished match.
pub struct DirectoryLogSink {
    directory: PathBuf,
}

impl DirectoryLogSink {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }
}

impl MatchLogSink for DirectoryLogSink {
    fn archive(&self, log: &MatchLog) -> io::Result<()> {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(format!("{}.json", log.room_id));
        let payload = serde_json::to_vec_pretty(log)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(&path, payload)?;
        info!("Archived match log to {}", path.display());
        Ok(())
    }
}
