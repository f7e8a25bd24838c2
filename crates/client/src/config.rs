use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use mirra::EntityId;
use mirra::snapshot::IdRepr;

use crate::game::InputBindings;
use crate::net::ServerConfig;
use crate::scene::SceneConfig;

pub const DEFAULT_FRAME_RATE: u32 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing mount attribute `{0}`")]
    Missing(&'static str),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid socket url: {0}")]
    Url(#[from] url::ParseError),
}

/// Page-level attributes a session is mounted with.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MountAttributes {
    pub game_id: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub player_id: Option<EntityId>,
    pub character: Option<String>,
    pub player_name: Option<String>,
    pub game_mode: Option<String>,
    pub board_width: Option<u32>,
    pub board_height: Option<u32>,
    pub map_radius: Option<f32>,
    /// Forwarded to the arena untouched.
    pub gateway_jwt: Option<String>,
}

impl MountAttributes {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.player_id()?;

        for (field, value) in [
            ("game_id", &self.game_id),
            ("character", &self.character),
            ("player_name", &self.player_name),
            ("game_mode", &self.game_mode),
            ("gateway_jwt", &self.gateway_jwt),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be empty".to_string(),
                });
            }
        }

        for (field, value) in [
            ("board_width", self.board_width),
            ("board_height", self.board_height),
        ] {
            if value == Some(0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be positive".to_string(),
                });
            }
        }

        if let Some(radius) = self.map_radius {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(ConfigError::Invalid {
                    field: "map_radius",
                    reason: format!("{} is not a positive radius", radius),
                });
            }
        }

        Ok(())
    }

    pub fn player_id(&self) -> Result<EntityId, ConfigError> {
        self.player_id.ok_or(ConfigError::Missing("player_id"))
    }

    pub fn game_id(&self) -> Result<&str, ConfigError> {
        self.game_id.as_deref().ok_or(ConfigError::Missing("game_id"))
    }

    pub fn character(&self) -> Result<&str, ConfigError> {
        self.character
            .as_deref()
            .ok_or(ConfigError::Missing("character"))
    }

    pub fn game_mode(&self) -> Result<&str, ConfigError> {
        self.game_mode
            .as_deref()
            .ok_or(ConfigError::Missing("game_mode"))
    }
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<EntityId>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<IdRepr>::deserialize(deserializer)?
        .map(EntityId::try_from)
        .transpose()
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub frame_rate: u32,
    pub mount: MountAttributes,
    pub server: ServerConfig,
    pub scene: SceneConfig,
    pub input: InputBindings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            mount: MountAttributes::default(),
            server: ServerConfig::default(),
            scene: SceneConfig::default(),
            input: InputBindings::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_rate == 0 {
            return Err(ConfigError::Invalid {
                field: "frame_rate",
                reason: "must be positive".to_string(),
            });
        }
        self.mount.validate()?;
        self.scene.validate()
    }
}
