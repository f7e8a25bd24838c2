mod depth;
mod palette;
mod proxy;
mod registry;

use bitflags::bitflags;
use serde::Deserialize;

use crate::config::ConfigError;

pub use depth::DepthTiers;
pub use palette::{Color, Palette};
pub use proxy::{DisplayHandle, RenderProxy};
pub use registry::{EntityRegistry, RegistryStats, SnapshotReport};

pub const DEFAULT_EASING: f32 = 0.4;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SceneFeatures: u8 {
        /// Hide players the local player cannot see.
        const VISIBILITY_RULE = 1 << 0;
        const DEBUG_OVERLAY = 1 << 1;
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Fraction of the remaining distance a proxy covers per frame, in (0, 1).
    pub easing: f32,
    pub visibility_rule: bool,
    pub debug_overlay: bool,
    pub depth: DepthTiers,
    pub palette: Palette,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            easing: DEFAULT_EASING,
            visibility_rule: true,
            debug_overlay: false,
            depth: DepthTiers::default(),
            palette: Palette::default(),
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.easing > 0.0 && self.easing < 1.0) {
            return Err(ConfigError::Invalid {
                field: "easing",
                reason: format!("{} is outside (0, 1)", self.easing),
            });
        }
        Ok(())
    }

    pub fn features(&self) -> SceneFeatures {
        let mut features = SceneFeatures::empty();
        features.set(SceneFeatures::VISIBILITY_RULE, self.visibility_rule);
        features.set(SceneFeatures::DEBUG_OVERLAY, self.debug_overlay);
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_bounds() {
        for easing in [0.0, -0.1, 1.0, 1.5, f32::NAN] {
            let config = SceneConfig {
                easing,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "easing {} accepted", easing);
        }
        for easing in [0.01, 0.4, 0.99] {
            let config = SceneConfig {
                easing,
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn features_follow_flags() {
        let config = SceneConfig::default();
        assert_eq!(config.features(), SceneFeatures::VISIBILITY_RULE);

        let config = SceneConfig {
            visibility_rule: false,
            debug_overlay: true,
            ..Default::default()
        };
        assert_eq!(config.features(), SceneFeatures::DEBUG_OVERLAY);
    }
}
