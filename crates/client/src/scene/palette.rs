use serde::Deserialize;

use mirra::{EntityId, EntityKind, EntitySnapshot, ObstacleMaterial, ObstacleStatus};

/// 0xRRGGBB fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Self = Self(0xffffff);

    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xff) as u8,
            ((self.0 >> 8) & 0xff) as u8,
            (self.0 & 0xff) as u8,
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub board: Color,
    pub current_player: Color,
    pub players: Color,
    pub obstacle: Color,
    pub dynamic_obstacle: Color,
    pub lake: Color,
    pub transitioning_obstacle: Color,
    pub deactivated_obstacle: Color,
    pub underground_obstacle: Color,
    pub colliding: Color,
    pub projectile: Color,
    pub item: Color,
    pub trap: Color,
    #[serde(rename = "crate")]
    pub crate_: Color,
    pub bush: Color,
    pub pool: Color,
    /// Untinted base fill.
    pub neutral: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            board: Color(0xb5b8c8),
            current_player: Color(0x007cff),
            players: Color(0x000000),
            obstacle: Color(0x00aa77),
            dynamic_obstacle: Color(0x00aa77),
            lake: Color(0x3d7fd9),
            transitioning_obstacle: Color(0xff944d),
            deactivated_obstacle: Color(0xff0000),
            underground_obstacle: Color(0x7a6a58),
            colliding: Color(0xff0000),
            projectile: Color(0x0000ff),
            item: Color(0x238636),
            trap: Color(0x6600cc),
            crate_: Color(0xcc9900),
            bush: Color(0x4c9a2a),
            pool: Color(0x5fb3d9),
            neutral: Color::WHITE,
        }
    }
}

impl Palette {
    pub fn color_for(&self, entity: &EntitySnapshot, local_player: EntityId) -> Color {
        if entity.is_colliding {
            return self.colliding;
        }

        match &entity.kind {
            EntityKind::Player { .. } if entity.id == local_player => self.current_player,
            EntityKind::Player { .. } => self.players,
            EntityKind::Obstacle { status, material } => self.obstacle_color(*status, *material),
            EntityKind::Projectile => self.projectile,
            EntityKind::Item => self.item,
            EntityKind::Trap => self.trap,
            EntityKind::Crate => self.crate_,
            EntityKind::Bush => self.bush,
            EntityKind::Pool => self.pool,
            EntityKind::Unknown => self.neutral,
        }
    }

    fn obstacle_color(&self, status: ObstacleStatus, material: ObstacleMaterial) -> Color {
        // Unrecognized sub-states keep the material's base color.
        match (material, status) {
            (ObstacleMaterial::Lake, _) => self.lake,
            (ObstacleMaterial::Unrecognized, _) => self.neutral,
            (_, ObstacleStatus::Deactivated) => self.deactivated_obstacle,
            (_, ObstacleStatus::Transitioning) => self.transitioning_obstacle,
            (_, ObstacleStatus::Underground) => self.underground_obstacle,
            (ObstacleMaterial::Dynamic, _) => self.dynamic_obstacle,
            (ObstacleMaterial::Static, _) => self.obstacle,
        }
    }
}
