pub mod event;
pub mod net;
pub mod snapshot;

pub use event::{HostEvent, Intent, MapMetadata, Slot};
pub use net::{
    Action, Attack, ClientMessage, DecodeError, Direction, GameAction, GameEvent, GameState,
    InboundKind, LobbyEvent, Message, Move, OutboundFormat, Player, Position, ServerMessage,
};
pub use snapshot::{
    Category, EntityId, EntityKind, EntitySnapshot, ObstacleMaterial, ObstacleStatus, Shape,
    Snapshot, SnapshotError,
};
