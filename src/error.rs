use thiserror::Error;

/// 서버/엔진 공용 오류 타입.
///
/// Recoverable rule violations (wrong responder, wrong action kind, illegal
/// targets) never surface here — the engine reports those as
/// `GameEvent::GameError` records so the sender can resubmit. This enum is
/// for failures that abort the operation itself.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("unknown card id: {0}")]
    UnknownCard(String),

    #[error("invalid deck: {0}")]
    InvalidDeck(String),

    #[error("card data load failed: {0}")]
    CatalogLoad(String),

    #[error("player {0} is not seated in this match")]
    UnknownPlayer(String),

    #[error("match has already ended")]
    MatchOver,

    #[error("match has not started")]
    NotStarted,

    #[error("agent cannot answer decision kind: {0}")]
    UnimplementedDecision(String),

    #[error("queue name is not allowed: {0}")]
    InvalidQueueName(String),

    #[error("game type is not allowed: {0}")]
    InvalidGameType(String),

    #[error("player is already queued or seated")]
    AlreadyQueuedOrSeated,

    #[error("parse error")]
    ParseError,
}
