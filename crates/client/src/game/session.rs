use mirra::{EntityId, GameState, HostEvent, Intent, MapMetadata, Snapshot};

use crate::config::{ClientConfig, ConfigError, MountAttributes};
use crate::scene::{EntityRegistry, SnapshotReport};

use super::input::InputDispatcher;

/// Everything one mounted board owns: the scene, the keyboard, and the
/// intents waiting for the host to pick them up.
pub struct Session {
    mount: MountAttributes,
    player_id: EntityId,
    registry: EntityRegistry,
    input: InputDispatcher,
    map: Option<MapMetadata>,
    outbox: Vec<Intent>,
    frames: u64,
}

impl Session {
    pub fn mount(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let player_id = config.mount.player_id()?;

        log::info!(
            "Mounting session for player {} (game {})",
            player_id,
            config.mount.game_id.as_deref().unwrap_or("-")
        );

        Ok(Self {
            mount: config.mount.clone(),
            player_id,
            registry: EntityRegistry::new(config.scene.clone()),
            input: InputDispatcher::new(&config.input),
            map: config.mount.map_radius.map(|radius| MapMetadata { radius }),
            outbox: Vec::new(),
            frames: 0,
        })
    }

    pub fn unmount(self) {
        drop(self);
    }

    pub fn handle_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::EntitiesUpdated(snapshot) => {
                self.apply_snapshot(&snapshot);
            }
            HostEvent::JoinedGame { map } => {
                log::info!("Joined game, map radius {}", map.radius);
                self.map = Some(map);
            }
            HostEvent::DebugModeToggled { enabled } => {
                let enabled = enabled.unwrap_or(!self.registry.debug_overlay());
                self.registry.set_debug_overlay(enabled);
            }
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> SnapshotReport {
        let report = self.registry.apply_snapshot(snapshot);
        log::trace!(
            "Snapshot applied: +{} ~{} -{}",
            report.created,
            report.updated,
            report.removed
        );
        report
    }

    pub fn apply_game_state(&mut self, state: &GameState) -> SnapshotReport {
        let snapshot = Snapshot::from_game_state(state, self.player_id);
        self.apply_snapshot(&snapshot)
    }

    /// One render-loop iteration.
    pub fn frame(&mut self) {
        self.registry.tick();
        self.frames += 1;
    }

    pub fn key_down(&mut self, key: char, repeat: bool) {
        if let Some(intent) = self.input.key_down(key, repeat) {
            self.outbox.push(intent);
        }
    }

    pub fn key_up(&mut self, key: char) {
        if let Some(intent) = self.input.key_up(key) {
            self.outbox.push(intent);
        }
    }

    pub fn release_keys(&mut self) {
        if let Some(intent) = self.input.release_all() {
            self.outbox.push(intent);
        }
    }

    pub fn is_key_held(&self, key: char) -> bool {
        self.input.is_held(key)
    }

    pub fn drain_intents(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn player_id(&self) -> EntityId {
        self.player_id
    }

    pub fn mount_attributes(&self) -> &MountAttributes {
        &self.mount
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn map(&self) -> Option<MapMetadata> {
        self.map
    }

    pub fn debug_line(&self) -> &str {
        self.input.debug_line()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let stats = self.registry.stats();
        log::info!(
            "Unmounting session for player {}: {} proxies torn down after {} snapshots, {} frames",
            self.player_id,
            self.registry.len(),
            stats.snapshots_applied,
            self.frames
        );
        self.registry.clear();
        if !self.outbox.is_empty() {
            log::debug!("Discarding {} undelivered intents", self.outbox.len());
        }
    }
}
