//! 엔진 ↔ 룸 ↔ 응답자 사이의 공용 어휘.
//!
//! Everything on the wire is one of the closed tagged enums in this module.
//! Adding a card or an effect must never change an existing response
//! schema; it may only add option values inside one.

pub mod actions;
pub mod events;
pub mod messages;

pub use actions::{ActionKind, GameAction};
pub use events::{
    AvailableAction, GameEvent, GameOverReason, PlacementInfo, PlayRequirementDetail, ZoneName,
};
pub use messages::{ClientMessage, ErrorId, QueueInfo, RoomInfo, ServerMessage};
