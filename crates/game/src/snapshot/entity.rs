use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Deserializer};

pub type EntityId = u64;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error("entity id {0:?} is not an unsigned integer")]
    InvalidId(String),
    #[error("entity {id}: unknown shape {shape:?}")]
    UnknownShape { id: EntityId, shape: String },
    #[error("entity {id}: circle without a valid radius")]
    InvalidRadius { id: EntityId },
    #[error("entity {id}: polygon needs at least 3 vertices, got {vertices}")]
    DegeneratePolygon { id: EntityId, vertices: usize },
    #[error("entity {id}: position is not finite")]
    NonFinitePosition { id: EntityId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Player,
    Obstacle,
    Projectile,
    Item,
    Trap,
    Crate,
    Bush,
    Pool,
    Unknown,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Obstacle => "obstacle",
            Self::Projectile => "projectile",
            Self::Item => "item",
            Self::Trap => "trap",
            Self::Crate => "crate",
            Self::Bush => "bush",
            Self::Pool => "pool",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "player" => Self::Player,
            "obstacle" => Self::Obstacle,
            "projectile" => Self::Projectile,
            "item" => Self::Item,
            "trap" => Self::Trap,
            "crate" => Self::Crate,
            "bush" => Self::Bush,
            "pool" => Self::Pool,
            _ => Self::Unknown,
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ObstacleStatus {
    #[default]
    Active,
    Transitioning,
    Deactivated,
    Underground,
    Unrecognized,
}

impl ObstacleStatus {
    fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("active") => Self::Active,
            Some("transitioning") => Self::Transitioning,
            Some("deactivated") => Self::Deactivated,
            Some("underground") => Self::Underground,
            Some(_) => Self::Unrecognized,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ObstacleMaterial {
    #[default]
    Static,
    Lake,
    Dynamic,
    Unrecognized,
}

impl ObstacleMaterial {
    fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("static") => Self::Static,
            Some("lake") => Self::Lake,
            Some("dynamic") => Self::Dynamic,
            Some(_) => Self::Unrecognized,
        }
    }
}

/// Shape of an entity. Polygon vertices are offsets from the entity position.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Polygon { vertices: Vec<Vec2> },
}

/// Category-specific state carried by a snapshot entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Player { visible_players: Vec<EntityId> },
    Obstacle {
        status: ObstacleStatus,
        material: ObstacleMaterial,
    },
    Projectile,
    Item,
    Trap,
    Crate,
    Bush,
    Pool,
    Unknown,
}

impl EntityKind {
    pub fn category(&self) -> Category {
        match self {
            Self::Player { .. } => Category::Player,
            Self::Obstacle { .. } => Category::Obstacle,
            Self::Projectile => Category::Projectile,
            Self::Item => Category::Item,
            Self::Trap => Category::Trap,
            Self::Crate => Category::Crate,
            Self::Bush => Category::Bush,
            Self::Pool => Category::Pool,
            Self::Unknown => Category::Unknown,
        }
    }
}

/// A validated entity as reported by one snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawEntity")]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub name: String,
    pub shape: Shape,
    pub position: Vec2,
    pub kind: EntityKind,
    pub is_colliding: bool,
    pub health: Option<f32>,
    pub effects: Vec<String>,
}

impl EntitySnapshot {
    pub fn new(id: EntityId, kind: EntityKind, shape: Shape, position: Vec2) -> Self {
        Self {
            id,
            name: format!("{} {}", kind.category(), id),
            shape,
            position,
            kind,
            is_colliding: false,
            health: None,
            effects: Vec::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Ids this entity reports as visible. Only players carry a list.
    pub fn visible_players(&self) -> &[EntityId] {
        match &self.kind {
            EntityKind::Player { visible_players } => visible_players,
            _ => &[],
        }
    }
}

/// Entity ids arrive as JSON numbers from the server and as strings from
/// page attributes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
#[doc(hidden)]
pub enum IdRepr {
    Number(u64),
    Text(String),
}

impl TryFrom<IdRepr> for EntityId {
    type Error = SnapshotError;

    fn try_from(value: IdRepr) -> Result<Self, Self::Error> {
        match value {
            IdRepr::Number(id) => Ok(id),
            IdRepr::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| SnapshotError::InvalidId(text)),
        }
    }
}

pub fn deserialize_entity_id<'de, D>(deserializer: D) -> Result<EntityId, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = IdRepr::deserialize(deserializer)?;
    EntityId::try_from(repr).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Deserialize)]
#[doc(hidden)]
pub struct RawEntity {
    id: IdRepr,
    #[serde(default)]
    name: String,
    shape: String,
    category: String,
    x: f32,
    y: f32,
    #[serde(default)]
    coords: Vec<[f32; 2]>,
    #[serde(default)]
    radius: Option<f32>,
    #[serde(default)]
    is_colliding: Option<bool>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, rename = "type")]
    material: Option<String>,
    #[serde(default)]
    visible_players: Vec<IdRepr>,
    #[serde(default)]
    health: Option<f32>,
    #[serde(default)]
    effects: Vec<serde_json::Value>,
}

impl TryFrom<RawEntity> for EntitySnapshot {
    type Error = SnapshotError;

    fn try_from(raw: RawEntity) -> Result<Self, Self::Error> {
        let id = EntityId::try_from(raw.id)?;

        let position = Vec2::new(raw.x, raw.y);
        if !position.is_finite() {
            return Err(SnapshotError::NonFinitePosition { id });
        }

        let shape = match raw.shape.as_str() {
            "circle" => match raw.radius {
                Some(radius) if radius.is_finite() && radius >= 0.0 => Shape::Circle { radius },
                _ => return Err(SnapshotError::InvalidRadius { id }),
            },
            "polygon" => {
                if raw.coords.len() < 3 {
                    return Err(SnapshotError::DegeneratePolygon {
                        id,
                        vertices: raw.coords.len(),
                    });
                }
                Shape::Polygon {
                    vertices: raw.coords.into_iter().map(Vec2::from).collect(),
                }
            }
            other => {
                return Err(SnapshotError::UnknownShape {
                    id,
                    shape: other.to_string(),
                });
            }
        };

        let category = raw.category.parse().unwrap_or(Category::Unknown);
        let kind = match category {
            Category::Player => EntityKind::Player {
                visible_players: raw
                    .visible_players
                    .into_iter()
                    .map(EntityId::try_from)
                    .collect::<Result<_, _>>()?,
            },
            Category::Obstacle => EntityKind::Obstacle {
                status: ObstacleStatus::parse(raw.status.as_deref()),
                material: ObstacleMaterial::parse(raw.material.as_deref()),
            },
            Category::Projectile => EntityKind::Projectile,
            Category::Item => EntityKind::Item,
            Category::Trap => EntityKind::Trap,
            Category::Crate => EntityKind::Crate,
            Category::Bush => EntityKind::Bush,
            Category::Pool => EntityKind::Pool,
            Category::Unknown => {
                log::debug!("entity {} has unrecognized category {:?}", id, raw.category);
                EntityKind::Unknown
            }
        };

        let effects = raw
            .effects
            .into_iter()
            .map(|effect| match effect {
                serde_json::Value::String(name) => name,
                other => other.to_string(),
            })
            .collect();

        Ok(Self {
            id,
            name: raw.name,
            shape,
            position,
            kind,
            is_colliding: raw.is_colliding.unwrap_or(false),
            health: raw.health,
            effects,
        })
    }
}
