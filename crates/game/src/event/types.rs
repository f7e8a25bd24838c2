use std::fmt;

use serde::{Deserialize, Serialize};

use crate::net::Direction;
use crate::snapshot::{EntityId, IdRepr, Snapshot, SnapshotError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MapMetadata {
    pub radius: f32,
}

/// Events the host page pushes into a session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    EntitiesUpdated(Snapshot),
    JoinedGame {
        map: MapMetadata,
    },
    DebugModeToggled {
        /// Absent means flip the current mode.
        #[serde(default)]
        enabled: Option<bool>,
    },
}

impl HostEvent {
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

/// A 1-based skill or inventory slot. Travels as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "IdRepr")]
pub struct Slot(pub u32);

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Slot> for String {
    fn from(value: Slot) -> Self {
        value.to_string()
    }
}

impl TryFrom<IdRepr> for Slot {
    type Error = SnapshotError;

    fn try_from(value: IdRepr) -> Result<Self, Self::Error> {
        let raw = EntityId::try_from(value)?;
        u32::try_from(raw)
            .map(Slot)
            .map_err(|_| SnapshotError::InvalidId(raw.to_string()))
    }
}

/// Client-originated requests handed to the host bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum Intent {
    Move(Direction),
    Attack(Slot),
    UseItem(Slot),
    JoinGame { game_id: String, player_id: EntityId },
}

impl Intent {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_events() {
        let event = HostEvent::from_json(
            r#"{"event": "entities_updated", "player_id": 3, "entities": [
                {"id": 3, "shape": "circle", "radius": 5, "category": "player", "x": 0, "y": 0}
            ]}"#,
        )
        .unwrap();
        match event {
            HostEvent::EntitiesUpdated(snapshot) => {
                assert_eq!(snapshot.player_id, 3);
                assert_eq!(snapshot.entities.len(), 1);
            }
            other => panic!("unexpected event {:?}", other),
        }

        let event = HostEvent::from_json(r#"{"event": "joined_game", "map": {"radius": 5000}}"#)
            .unwrap();
        assert_eq!(
            event,
            HostEvent::JoinedGame {
                map: MapMetadata { radius: 5000.0 }
            }
        );

        let event = HostEvent::from_json(r#"{"event": "debug_mode_toggled"}"#).unwrap();
        assert_eq!(event, HostEvent::DebugModeToggled { enabled: None });
    }

    #[test]
    fn unknown_host_event_is_an_error() {
        assert!(HostEvent::from_json(r#"{"event": "chat"}"#).is_err());
    }

    #[test]
    fn intents_serialize_like_page_events() {
        let json = Intent::Move(Direction::new(0.0, -1.0)).to_json().unwrap();
        assert_eq!(json, r#"{"event":"move","payload":{"x":0.0,"y":-1.0}}"#);

        let json = Intent::Attack(Slot(2)).to_json().unwrap();
        assert_eq!(json, r#"{"event":"attack","payload":"2"}"#);

        let json = Intent::JoinGame {
            game_id: "abc".to_string(),
            player_id: 4,
        }
        .to_json()
        .unwrap();
        assert_eq!(
            json,
            r#"{"event":"join_game","payload":{"game_id":"abc","player_id":4}}"#
        );
    }

    #[test]
    fn slot_accepts_numbers_and_strings() {
        let intent: Intent = serde_json::from_str(r#"{"event":"use_item","payload":1}"#).unwrap();
        assert_eq!(intent, Intent::UseItem(Slot(1)));

        let intent: Intent = serde_json::from_str(r#"{"event":"use_item","payload":"1"}"#).unwrap();
        assert_eq!(intent, Intent::UseItem(Slot(1)));
    }
}
