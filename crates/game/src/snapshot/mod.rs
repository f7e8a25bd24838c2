mod entity;
mod world;

pub use entity::{
    Category, EntityId, EntityKind, EntitySnapshot, IdRepr, ObstacleMaterial, ObstacleStatus,
    RawEntity, Shape, SnapshotError, deserialize_entity_id,
};
pub use world::Snapshot;
