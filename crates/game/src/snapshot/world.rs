use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Deserializer};

use crate::net::GameState;

use super::entity::{EntityId, EntityKind, EntitySnapshot, Shape, deserialize_entity_id};

/// A point-in-time listing of every entity relevant to one client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Snapshot {
    #[serde(deserialize_with = "deserialize_entity_id")]
    pub player_id: EntityId,
    #[serde(default, deserialize_with = "deserialize_entities")]
    pub entities: Vec<EntitySnapshot>,
}

/// Converts entries one at a time. A malformed entity is logged and left
/// out rather than failing the whole snapshot.
fn deserialize_entities<'de, D>(deserializer: D) -> Result<Vec<EntitySnapshot>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    let mut entities = Vec::with_capacity(raw.len());
    for value in raw {
        match serde_json::from_value::<EntitySnapshot>(value) {
            Ok(entity) => entities.push(entity),
            Err(e) => log::warn!("Skipping malformed entity: {}", e),
        }
    }
    Ok(entities)
}

impl Snapshot {
    pub fn new(player_id: EntityId, entities: Vec<EntitySnapshot>) -> Self {
        Self {
            player_id,
            entities,
        }
    }

    /// Builds a snapshot from the arena's player map.
    ///
    /// The socket carries no visibility data, so the local player is given
    /// every other player as visible.
    pub fn from_game_state(state: &GameState, player_id: EntityId) -> Self {
        let all_ids: Vec<EntityId> = state.players.keys().copied().collect();

        let entities = state
            .players
            .iter()
            .map(|(&id, player)| {
                let visible_players = if id == player_id {
                    all_ids.clone()
                } else {
                    Vec::new()
                };
                let position = player.position.map(Vec2::from).unwrap_or(Vec2::ZERO);
                let mut entity = EntitySnapshot::new(
                    id,
                    EntityKind::Player { visible_players },
                    Shape::Circle {
                        radius: player.size.max(0.0),
                    },
                    position,
                );
                entity.health = Some(player.life as f32);
                entity
            })
            .collect();

        Self {
            player_id,
            entities,
        }
    }

    pub fn local_player(&self) -> Option<&EntitySnapshot> {
        self.entities.iter().find(|e| e.id == self.player_id)
    }

    /// Ids the local player currently sees, if it is part of the snapshot.
    pub fn visible_set(&self) -> Option<HashSet<EntityId>> {
        self.local_player()
            .map(|local| local.visible_players().iter().copied().collect())
    }
}
