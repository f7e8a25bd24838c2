use glam::Vec2;
use serde::Deserialize;

use mirra::{Direction, Intent, Slot};

/// Key layout. Movement keys match regardless of case, action keys exactly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputBindings {
    pub up: char,
    pub left: char,
    pub down: char,
    pub right: char,
    /// Attack slot `n` is bound to `attacks[n - 1]`.
    pub attacks: Vec<char>,
    /// Item slot `n` is bound to `items[n - 1]`.
    pub items: Vec<char>,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            up: 'w',
            left: 'a',
            down: 's',
            right: 'd',
            attacks: vec!['i', 'o', 'p'],
            items: vec!['l'],
        }
    }
}

#[derive(Debug, Clone)]
struct MovementKey {
    key: char,
    direction: Vec2,
    held: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKey {
    Attack(Slot),
    UseItem(Slot),
}

/// Turns raw key transitions into movement and action intents.
#[derive(Debug, Clone)]
pub struct InputDispatcher {
    /// In declaration order, which decides the key-up fallback.
    movement: Vec<MovementKey>,
    actions: Vec<(char, ActionKey)>,
    debug_line: String,
}

impl Default for InputDispatcher {
    fn default() -> Self {
        Self::new(&InputBindings::default())
    }
}

impl InputDispatcher {
    pub fn new(bindings: &InputBindings) -> Self {
        let movement = [
            (bindings.up, Vec2::new(0.0, -1.0)),
            (bindings.left, Vec2::new(-1.0, 0.0)),
            (bindings.down, Vec2::new(0.0, 1.0)),
            (bindings.right, Vec2::new(1.0, 0.0)),
        ]
        .into_iter()
        .map(|(key, direction)| MovementKey {
            key: key.to_ascii_uppercase(),
            direction,
            held: false,
        })
        .collect();

        let attacks = bindings
            .attacks
            .iter()
            .zip(1..)
            .map(|(&key, slot)| (key, ActionKey::Attack(Slot(slot))));
        let items = bindings
            .items
            .iter()
            .zip(1..)
            .map(|(&key, slot)| (key, ActionKey::UseItem(Slot(slot))));

        Self {
            movement,
            actions: attacks.chain(items).collect(),
            debug_line: String::new(),
        }
    }

    pub fn key_down(&mut self, key: char, repeat: bool) -> Option<Intent> {
        if repeat {
            return None;
        }

        let label = key.to_ascii_uppercase();
        if let Some(binding) = self.movement.iter_mut().find(|m| m.key == label) {
            binding.held = true;
            let direction = binding.direction;
            return Some(self.emit_move(direction, Some(label)));
        }

        let (_, action) = self.actions.iter().find(|(bound, _)| *bound == key)?;
        let intent = match *action {
            ActionKey::Attack(slot) => Intent::Attack(slot),
            ActionKey::UseItem(slot) => Intent::UseItem(slot),
        };
        self.debug_line = format!("key: {}", label);
        Some(intent)
    }

    pub fn key_up(&mut self, key: char) -> Option<Intent> {
        let label = key.to_ascii_uppercase();
        let binding = self.movement.iter_mut().find(|m| m.key == label)?;
        if !binding.held {
            return None;
        }
        binding.held = false;

        let fallback = self
            .movement
            .iter()
            .find(|m| m.held)
            .map(|m| (m.direction, m.key));
        Some(match fallback {
            Some((direction, key)) => self.emit_move(direction, Some(key)),
            None => self.emit_move(Vec2::ZERO, None),
        })
    }

    /// Releases every held movement key, as when focus is lost.
    pub fn release_all(&mut self) -> Option<Intent> {
        let any_held = self.movement.iter().any(|m| m.held);
        for binding in &mut self.movement {
            binding.held = false;
        }
        any_held.then(|| self.emit_move(Vec2::ZERO, None))
    }

    pub fn is_held(&self, key: char) -> bool {
        let label = key.to_ascii_uppercase();
        self.movement.iter().any(|m| m.key == label && m.held)
    }

    pub fn debug_line(&self) -> &str {
        &self.debug_line
    }

    fn emit_move(&mut self, direction: Vec2, key: Option<char>) -> Intent {
        self.debug_line = key.map(|k| format!("key: {}", k)).unwrap_or_default();
        Intent::Move(Direction::from(direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(x: f32, y: f32) -> Option<Intent> {
        Some(Intent::Move(Direction::new(x, y)))
    }

    #[test]
    fn press_emits_direction() {
        let mut input = InputDispatcher::default();
        assert_eq!(input.key_down('w', false), moved(0.0, -1.0));
        assert_eq!(input.debug_line(), "key: W");
        assert_eq!(input.key_down('D', false), moved(1.0, 0.0));
        assert!(input.is_held('d'));
    }

    #[test]
    fn repeats_are_ignored() {
        let mut input = InputDispatcher::default();
        assert_eq!(input.key_down('w', true), None);
        assert!(!input.is_held('w'));
        assert_eq!(input.key_down('i', true), None);
    }

    #[test]
    fn release_falls_back_in_declaration_order() {
        let mut input = InputDispatcher::default();
        input.key_down('d', false);
        input.key_down('s', false);
        input.key_down('w', false);

        // W released: S comes before D.
        assert_eq!(input.key_up('w'), moved(0.0, 1.0));
        assert_eq!(input.debug_line(), "key: S");
        assert_eq!(input.key_up('s'), moved(1.0, 0.0));
        assert_eq!(input.key_up('d'), moved(0.0, 0.0));
        assert_eq!(input.debug_line(), "");
    }

    #[test]
    fn releasing_unheld_key_is_silent() {
        let mut input = InputDispatcher::default();
        assert_eq!(input.key_up('a'), None);
        assert_eq!(input.key_up('x'), None);
    }

    #[test]
    fn action_keys() {
        let mut input = InputDispatcher::default();
        assert_eq!(input.key_down('i', false), Some(Intent::Attack(Slot(1))));
        assert_eq!(input.key_down('o', false), Some(Intent::Attack(Slot(2))));
        assert_eq!(input.key_down('p', false), Some(Intent::Attack(Slot(3))));
        assert_eq!(input.key_down('l', false), Some(Intent::UseItem(Slot(1))));
        assert_eq!(input.debug_line(), "key: L");
        assert_eq!(input.key_down('I', false), None);
        assert_eq!(input.key_up('i'), None);
    }

    #[test]
    fn custom_bindings() {
        let bindings = InputBindings {
            up: 'k',
            left: 'h',
            down: 'j',
            right: 'l',
            attacks: vec!['1'],
            items: vec!['e'],
        };
        let mut input = InputDispatcher::new(&bindings);
        assert_eq!(input.key_down('h', false), moved(-1.0, 0.0));
        assert_eq!(input.key_down('1', false), Some(Intent::Attack(Slot(1))));
        assert_eq!(input.key_down('w', false), None);
    }

    #[test]
    fn release_all_stops_movement() {
        let mut input = InputDispatcher::default();
        assert_eq!(input.release_all(), None);
        input.key_down('a', false);
        assert_eq!(input.release_all(), moved(0.0, 0.0));
        assert!(!input.is_held('a'));
    }
}
