use std::collections::{HashMap, HashSet};

use mirra::{Category, EntityId, EntitySnapshot, Snapshot};

use super::proxy::RenderProxy;
use super::{SceneConfig, SceneFeatures};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub snapshots_applied: u64,
    pub proxies_created: u64,
    pub proxies_removed: u64,
}

/// Keeps one render proxy per visible server entity.
pub struct EntityRegistry {
    proxies: HashMap<EntityId, RenderProxy>,
    config: SceneConfig,
    features: SceneFeatures,
    stats: RegistryStats,
}

impl EntityRegistry {
    pub fn new(config: SceneConfig) -> Self {
        let features = config.features();
        Self {
            proxies: HashMap::new(),
            config,
            features,
            stats: RegistryStats::default(),
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> SnapshotReport {
        let mut report = SnapshotReport::default();
        let visible = self
            .features
            .contains(SceneFeatures::VISIBILITY_RULE)
            .then(|| snapshot.visible_set().unwrap_or_default());
        let overlay = self.features.contains(SceneFeatures::DEBUG_OVERLAY);
        let mut seen = HashSet::with_capacity(snapshot.entities.len());

        for entity in &snapshot.entities {
            if !is_visible(entity, snapshot.player_id, visible.as_ref()) {
                if self.proxies.remove(&entity.id).is_some() {
                    log::debug!("Entity {} left view", entity.id);
                    report.removed += 1;
                }
                continue;
            }

            seen.insert(entity.id);
            let fill = self.config.palette.color_for(entity, snapshot.player_id);

            match self.proxies.get_mut(&entity.id) {
                Some(proxy) => {
                    proxy.sync(entity, fill);
                    proxy.refresh_debug_text(overlay);
                    report.updated += 1;
                }
                None => {
                    let depth = self.config.depth.tier(entity.category());
                    let mut proxy = RenderProxy::new(entity, fill, depth);
                    proxy.refresh_debug_text(overlay);
                    log::debug!(
                        "Created proxy for {} {} at depth {}",
                        entity.category(),
                        entity.id,
                        depth
                    );
                    self.proxies.insert(entity.id, proxy);
                    report.created += 1;
                }
            }
        }

        let before = self.proxies.len();
        self.proxies.retain(|id, _| seen.contains(id));
        report.removed += before - self.proxies.len();

        self.stats.snapshots_applied += 1;
        self.stats.proxies_created += report.created as u64;
        self.stats.proxies_removed += report.removed as u64;

        report
    }

    /// Eases every proxy toward its authoritative position.
    pub fn tick(&mut self) {
        let easing = self.config.easing;
        for proxy in self.proxies.values_mut() {
            proxy.step(easing);
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&RenderProxy> {
        self.proxies.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.proxies.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Proxies sorted bottom to top.
    pub fn draw_order(&self) -> Vec<&RenderProxy> {
        let mut proxies: Vec<_> = self.proxies.values().collect();
        proxies.sort_by_key(|proxy| (proxy.handle.depth, proxy.id));
        proxies
    }

    pub fn count(&self, category: Category) -> usize {
        self.proxies
            .values()
            .filter(|proxy| proxy.category == category)
            .count()
    }

    pub fn debug_overlay(&self) -> bool {
        self.features.contains(SceneFeatures::DEBUG_OVERLAY)
    }

    pub fn set_debug_overlay(&mut self, enabled: bool) {
        self.features.set(SceneFeatures::DEBUG_OVERLAY, enabled);
        for proxy in self.proxies.values_mut() {
            proxy.refresh_debug_text(enabled);
        }
        log::info!("Debug overlay {}", if enabled { "on" } else { "off" });
    }

    pub fn features(&self) -> SceneFeatures {
        self.features
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn stats(&self) -> RegistryStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.stats.proxies_removed += self.proxies.len() as u64;
        self.proxies.clear();
    }
}

fn is_visible(
    entity: &EntitySnapshot,
    local_player: EntityId,
    visible: Option<&HashSet<EntityId>>,
) -> bool {
    match visible {
        None => true,
        Some(_) if entity.category() != Category::Player => true,
        Some(_) if entity.id == local_player => true,
        Some(set) => set.contains(&entity.id),
    }
}
