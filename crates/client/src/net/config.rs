use serde::Deserialize;

use mirra::{InboundKind, OutboundFormat};

use super::route::RouteKind;

pub const DEFAULT_ARENA_HOST: &str = "localhost:4000";

/// Where the arena socket lives and what it speaks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub secure: bool,
    pub route: RouteKind,
    pub inbound: InboundKind,
    pub outbound: OutboundFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_ARENA_HOST.to_string(),
            secure: false,
            route: RouteKind::Play,
            inbound: InboundKind::GameState,
            outbound: OutboundFormat::GameAction,
        }
    }
}
