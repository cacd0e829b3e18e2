pub mod actor;
pub mod queues;

pub use actor::{DequeuePlayer, EnqueuePlayer, Matchmaker, SessionHandles, AI_GAME_TYPE};
pub use queues::{MatchQueues, QueueEntry};
