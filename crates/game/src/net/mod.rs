mod protocol;
pub mod wire;

pub use protocol::{
    Action, Attack, ClientMessage, Direction, GameAction, GameEvent, GameState, InboundKind,
    LobbyEvent, Move, OutboundFormat, Player, Position, ServerMessage,
};
pub use wire::{DecodeError, Message};
