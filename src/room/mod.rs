pub mod actor;
pub mod archive;
pub mod core;

pub use actor::{
    JoinObserver, MatchRoom, ObserverGetEvents, PlayerDeparture, RoomAssigned, RoomEmote,
    RoomGameAction, StartRoom,
};
pub use archive::{DirectoryLogSink, MatchLog, MatchLogSink};
pub use core::{GameRoom, LoggedAction, Seat, SeatKind};
