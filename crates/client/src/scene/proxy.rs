use glam::Vec2;

use mirra::{Category, EntityId, EntitySnapshot, Shape};

use super::palette::Color;

/// What the renderer draws for one proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayHandle {
    pub shape: Shape,
    pub fill: Color,
    /// Fixed at creation.
    pub depth: i32,
}

/// Client-side stand-in for a server entity.
///
/// `position` is what is on screen, `target` is the last authoritative
/// position. `step` moves the former toward the latter.
#[derive(Debug, Clone)]
pub struct RenderProxy {
    pub id: EntityId,
    pub name: String,
    pub category: Category,
    pub handle: DisplayHandle,
    pub position: Vec2,
    pub target: Vec2,
    health: Option<f32>,
    effects: Vec<String>,
    debug_text: Option<String>,
}

impl RenderProxy {
    pub fn new(entity: &EntitySnapshot, fill: Color, depth: i32) -> Self {
        Self {
            id: entity.id,
            name: entity.name.clone(),
            category: entity.category(),
            handle: DisplayHandle {
                shape: entity.shape.clone(),
                fill,
                depth,
            },
            position: entity.position,
            target: entity.position,
            health: entity.health,
            effects: entity.effects.clone(),
            debug_text: None,
        }
    }

    pub fn sync(&mut self, entity: &EntitySnapshot, fill: Color) {
        self.target = entity.position;
        self.handle.fill = fill;
        self.name.clone_from(&entity.name);
        self.health = entity.health;
        self.effects.clone_from(&entity.effects);
    }

    pub fn step(&mut self, easing: f32) {
        self.position += (self.target - self.position) * easing;
    }

    pub fn distance_to_target(&self) -> f32 {
        self.position.distance(self.target)
    }

    pub fn health(&self) -> Option<f32> {
        self.health
    }

    pub fn effects(&self) -> &[String] {
        &self.effects
    }

    pub fn debug_text(&self) -> Option<&str> {
        self.debug_text.as_deref()
    }

    pub(super) fn refresh_debug_text(&mut self, enabled: bool) {
        if !enabled {
            self.debug_text = None;
            return;
        }

        let mut text = format!(
            "{} - pos: [{},{}]",
            self.name,
            self.target.x.round(),
            self.target.y.round()
        );
        if let Some(health) = self.health {
            text.push_str(&format!(" hp: {}", health.round()));
        }
        if !self.effects.is_empty() {
            text.push_str(&format!(" effects: {}", self.effects.join(", ")));
        }
        self.debug_text = Some(text);
    }
}
