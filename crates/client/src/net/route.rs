use serde::Deserialize;
use url::Url;

use crate::config::{ConfigError, MountAttributes};

use super::config::{DEFAULT_ARENA_HOST, ServerConfig};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// `/play/<game_id>/<player_id>`
    #[default]
    Play,
    /// `/join/<player_id>/<character>`
    Join,
    /// `/<game_mode>/<player_id>/<character>[/<name>]`
    Mode,
}

/// Path of an arena socket, resolved from the mount attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketRoute {
    Play {
        game_id: String,
        player_id: u64,
    },
    Join {
        player_id: u64,
        character: String,
    },
    Mode {
        game_mode: String,
        player_id: u64,
        character: String,
        player_name: Option<String>,
    },
}

impl SocketRoute {
    pub fn resolve(kind: RouteKind, mount: &MountAttributes) -> Result<Self, ConfigError> {
        let player_id = mount.player_id()?;
        Ok(match kind {
            RouteKind::Play => Self::Play {
                game_id: mount.game_id()?.to_string(),
                player_id,
            },
            RouteKind::Join => Self::Join {
                player_id,
                character: mount.character()?.to_string(),
            },
            RouteKind::Mode => Self::Mode {
                game_mode: mount.game_mode()?.to_string(),
                player_id,
                character: mount.character()?.to_string(),
                player_name: mount.player_name.clone(),
            },
        })
    }

    pub fn segments(&self) -> Vec<String> {
        match self {
            Self::Play { game_id, player_id } => {
                vec!["play".to_string(), game_id.clone(), player_id.to_string()]
            }
            Self::Join {
                player_id,
                character,
            } => vec!["join".to_string(), player_id.to_string(), character.clone()],
            Self::Mode {
                game_mode,
                player_id,
                character,
                player_name,
            } => {
                let mut segments = vec![game_mode.clone(), player_id.to_string(), character.clone()];
                segments.extend(player_name.iter().cloned());
                segments
            }
        }
    }

    pub fn url(
        &self,
        host: &str,
        secure: bool,
        gateway_jwt: Option<&str>,
    ) -> Result<Url, ConfigError> {
        let scheme = if secure { "wss" } else { "ws" };
        let mut url = Url::parse(&format!("{}://{}/", scheme, arena_host(host)))?;

        url.path_segments_mut()
            .map_err(|_| ConfigError::Invalid {
                field: "host",
                reason: format!("{} cannot carry a path", host),
            })?
            .pop_if_empty()
            .extend(self.segments());

        if let Some(token) = gateway_jwt {
            url.query_pairs_mut().append_pair("gateway_jwt", token);
        }

        Ok(url)
    }
}

/// Full socket URL for a session.
pub fn socket_url(
    server: &ServerConfig,
    mount: &MountAttributes,
    kind: RouteKind,
) -> Result<Url, ConfigError> {
    SocketRoute::resolve(kind, mount)?.url(&server.host, server.secure, mount.gateway_jwt.as_deref())
}

/// Local pages talk to the arena on its dev port.
pub fn arena_host(page_host: &str) -> String {
    let hostname = page_host.split(':').next().unwrap_or(page_host);
    if hostname == "localhost" {
        DEFAULT_ARENA_HOST.to_string()
    } else {
        page_host.to_string()
    }
}
