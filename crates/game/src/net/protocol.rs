use std::collections::BTreeMap;

use bytes::BufMut;
use glam::Vec2;

use super::wire::{
    DecodeError, Message, WireType, put_float, put_message, put_string, put_uint64,
    put_uint64_always, read_float, read_message, read_string, read_uint64, skip_field,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Direction {
    pub x: f32,
    pub y: f32,
}

impl Direction {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<Vec2> for Direction {
    fn from(value: Vec2) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Direction> for Vec2 {
    fn from(value: Direction) -> Self {
        Vec2::new(value.x, value.y)
    }
}

impl Message for Direction {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        put_float(1, self.x, buf);
        put_float(2, self.y, buf);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        match field {
            1 => self.x = read_float(field, wire_type, buf)?,
            2 => self.y = read_float(field, wire_type, buf)?,
            _ => skip_field(field, wire_type, buf)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl From<Position> for Vec2 {
    fn from(value: Position) -> Self {
        Vec2::new(value.x, value.y)
    }
}

impl Message for Position {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        put_float(1, self.x, buf);
        put_float(2, self.y, buf);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        match field {
            1 => self.x = read_float(field, wire_type, buf)?,
            2 => self.y = read_float(field, wire_type, buf)?,
            _ => skip_field(field, wire_type, buf)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
    pub id: u64,
    pub speed: f32,
    pub position: Option<Position>,
    pub size: f32,
    pub life: u64,
}

impl Message for Player {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        put_uint64(1, self.id, buf);
        put_float(2, self.speed, buf);
        if let Some(position) = &self.position {
            put_message(3, position, buf);
        }
        put_float(4, self.size, buf);
        put_uint64(5, self.life, buf);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        match field {
            1 => self.id = read_uint64(field, wire_type, buf)?,
            2 => self.speed = read_float(field, wire_type, buf)?,
            3 => self.position = Some(read_message(field, wire_type, buf)?),
            4 => self.size = read_float(field, wire_type, buf)?,
            5 => self.life = read_uint64(field, wire_type, buf)?,
            _ => skip_field(field, wire_type, buf)?,
        }
        Ok(())
    }
}

/// One `map<uint64, Player>` entry. Entries always carry both key and value.
#[derive(Debug, Default)]
struct PlayerEntry {
    key: u64,
    value: Player,
}

impl Message for PlayerEntry {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        put_uint64_always(1, self.key, buf);
        put_message(2, &self.value, buf);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        match field {
            1 => self.key = read_uint64(field, wire_type, buf)?,
            2 => self.value = read_message(field, wire_type, buf)?,
            _ => skip_field(field, wire_type, buf)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameState {
    pub game_id: String,
    pub players: BTreeMap<u64, Player>,
}

impl Message for GameState {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        put_string(1, &self.game_id, buf);
        for (key, value) in &self.players {
            let entry = PlayerEntry {
                key: *key,
                value: value.clone(),
            };
            put_message(2, &entry, buf);
        }
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        match field {
            1 => self.game_id = read_string(field, wire_type, buf)?,
            2 => {
                let entry: PlayerEntry = read_message(field, wire_type, buf)?;
                self.players.insert(entry.key, entry.value);
            }
            _ => skip_field(field, wire_type, buf)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Move {
    pub direction: Option<Direction>,
}

impl Message for Move {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        if let Some(direction) = &self.direction {
            put_message(1, direction, buf);
        }
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        match field {
            1 => self.direction = Some(read_message(field, wire_type, buf)?),
            _ => skip_field(field, wire_type, buf)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attack {
    pub skill: String,
}

impl Message for Attack {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        put_string(1, &self.skill, buf);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        match field {
            1 => self.skill = read_string(field, wire_type, buf)?,
            _ => skip_field(field, wire_type, buf)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Move(Move),
    Attack(Attack),
}

/// Outbound union. The selected member is always written, even when empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameAction {
    pub action: Option<Action>,
}

impl GameAction {
    pub fn movement(direction: Direction) -> Self {
        Self {
            action: Some(Action::Move(Move {
                direction: Some(direction),
            })),
        }
    }

    pub fn attack(skill: impl Into<String>) -> Self {
        Self {
            action: Some(Action::Attack(Attack {
                skill: skill.into(),
            })),
        }
    }
}

impl Message for GameAction {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        match &self.action {
            Some(Action::Move(movement)) => put_message(1, movement, buf),
            Some(Action::Attack(attack)) => put_message(2, attack, buf),
            None => {}
        }
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        match field {
            1 => self.action = Some(Action::Move(read_message(field, wire_type, buf)?)),
            2 => self.action = Some(Action::Attack(read_message(field, wire_type, buf)?)),
            _ => skip_field(field, wire_type, buf)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameEvent {
    pub game_state: Option<GameState>,
}

impl Message for GameEvent {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        if let Some(state) = &self.game_state {
            put_message(1, state, buf);
        }
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        match field {
            1 => self.game_state = Some(read_message(field, wire_type, buf)?),
            _ => skip_field(field, wire_type, buf)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LobbyEvent {
    pub game: Option<GameState>,
}

impl Message for LobbyEvent {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        if let Some(state) = &self.game {
            put_message(1, state, buf);
        }
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        match field {
            1 => self.game = Some(read_message(field, wire_type, buf)?),
            _ => skip_field(field, wire_type, buf)?,
        }
        Ok(())
    }
}

/// Which message a socket carries. Frames carry no type tag of their own,
/// so the decoder has to be told what to expect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InboundKind {
    #[default]
    GameState,
    GameEvent,
    LobbyEvent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    GameState(GameState),
    GameEvent(GameEvent),
    LobbyEvent(LobbyEvent),
}

impl ServerMessage {
    pub fn decode(kind: InboundKind, data: &[u8]) -> Result<Self, DecodeError> {
        Ok(match kind {
            InboundKind::GameState => Self::GameState(GameState::decode(data)?),
            InboundKind::GameEvent => Self::GameEvent(GameEvent::decode(data)?),
            InboundKind::LobbyEvent => Self::LobbyEvent(LobbyEvent::decode(data)?),
        })
    }

    pub fn game_state(&self) -> Option<&GameState> {
        match self {
            Self::GameState(state) => Some(state),
            Self::GameEvent(event) => event.game_state.as_ref(),
            Self::LobbyEvent(event) => event.game.as_ref(),
        }
    }
}

/// Outbound frame layout. Early arenas took a bare `Direction` per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundFormat {
    #[default]
    GameAction,
    BareDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Action(GameAction),
    Direction(Direction),
}

impl ClientMessage {
    pub fn encode_to_vec(&self) -> Vec<u8> {
        match self {
            Self::Action(action) => action.encode_to_vec(),
            Self::Direction(direction) => direction.encode_to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_player(id: u64) -> Player {
        Player {
            id,
            speed: 3.5,
            position: Some(Position { x: 120.0, y: -40.25 }),
            size: 80.0,
            life: 100,
        }
    }

    #[test]
    fn direction_wire_bytes() {
        let encoded = Direction::new(1.0, 0.0).encode_to_vec();
        assert_eq!(encoded, [0x0d, 0x00, 0x00, 0x80, 0x3f]);
    }

    #[test]
    fn player_roundtrip() {
        let player = sample_player(42);
        let decoded = Player::decode(&player.encode_to_vec()).unwrap();
        assert_eq!(decoded, player);
    }

    #[test]
    fn game_state_roundtrip() {
        let mut state = GameState {
            game_id: "a1b2".to_string(),
            players: BTreeMap::new(),
        };
        state.players.insert(1, sample_player(1));
        state.players.insert(7, sample_player(7));
        state.players.insert(0, Player::default());

        let decoded = GameState::decode(&state.encode_to_vec()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn game_action_roundtrip() {
        for action in [
            GameAction::movement(Direction::new(-1.0, 0.0)),
            GameAction::movement(Direction::ZERO),
            GameAction::attack("basic"),
            GameAction::attack(""),
        ] {
            let decoded = GameAction::decode(&action.encode_to_vec()).unwrap();
            assert_eq!(decoded, action);
        }
    }

    #[test]
    fn empty_oneof_member_is_still_written() {
        let action = GameAction::attack("");
        assert_eq!(action.encode_to_vec(), [0x12, 0x00]);
    }

    #[test]
    fn default_messages_encode_empty() {
        assert!(Direction::default().encode_to_vec().is_empty());
        assert!(Player::default().encode_to_vec().is_empty());
        assert!(GameState::default().encode_to_vec().is_empty());
        assert!(GameAction::default().encode_to_vec().is_empty());
        assert!(LobbyEvent::default().encode_to_vec().is_empty());
    }

    #[test]
    fn empty_input_decodes_to_defaults() {
        assert_eq!(Player::decode(&[]).unwrap(), Player::default());
        assert_eq!(GameState::decode(&[]).unwrap(), GameState::default());
        assert_eq!(GameEvent::decode(&[]).unwrap(), GameEvent::default());
    }

    #[test]
    fn wrong_wire_type_for_known_field_is_rejected() {
        // field 1 (x) sent as a varint
        let err = Direction::decode(&[0x08, 0x01]).unwrap_err();
        assert!(matches!(err, DecodeError::WireTypeMismatch { field: 1, .. }));
    }

    #[test]
    fn server_message_exposes_nested_state() {
        let state = GameState {
            game_id: "g".to_string(),
            players: BTreeMap::new(),
        };
        let event = LobbyEvent {
            game: Some(state.clone()),
        };

        let message = ServerMessage::decode(InboundKind::LobbyEvent, &event.encode_to_vec()).unwrap();
        assert_eq!(message.game_state(), Some(&state));

        let message = ServerMessage::decode(InboundKind::GameEvent, &[]).unwrap();
        assert_eq!(message.game_state(), None);
    }

    #[test]
    fn bare_direction_frames() {
        let message = ClientMessage::Direction(Direction::new(0.0, -1.0));
        assert_eq!(message.encode_to_vec(), [0x15, 0x00, 0x00, 0x80, 0xbf]);
    }
}
