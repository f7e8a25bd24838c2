use url::Url;

use mirra::{EntityId, InboundKind, Intent, OutboundFormat, ServerMessage};

use crate::net::{NetworkClient, TransportError};

/// Watches the join socket until the arena assigns a game.
#[derive(Debug, Clone)]
pub struct QueueWatcher {
    player_id: EntityId,
    game_id: Option<String>,
}

impl QueueWatcher {
    pub fn new(player_id: EntityId) -> Self {
        Self {
            player_id,
            game_id: None,
        }
    }

    /// Emits `JoinGame` for the first state that names a game, then nothing.
    pub fn observe(&mut self, message: &ServerMessage) -> Option<Intent> {
        if self.game_id.is_some() {
            return None;
        }

        let state = message.game_state()?;
        if state.game_id.is_empty() {
            return None;
        }

        log::info!("Matched into game {}", state.game_id);
        self.game_id = Some(state.game_id.clone());
        Some(Intent::JoinGame {
            game_id: state.game_id.clone(),
            player_id: self.player_id,
        })
    }

    pub fn game_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }
}

/// Connects to the join socket and waits for a game assignment.
///
/// Returns `None` if the socket closes first.
pub async fn wait_for_match(
    url: &Url,
    player_id: EntityId,
    inbound: InboundKind,
    outbound: OutboundFormat,
) -> Result<Option<String>, TransportError> {
    let mut lobby = NetworkClient::connect(url, inbound, outbound).await?;
    let mut watcher = QueueWatcher::new(player_id);
    log::info!("Waiting for a match as player {}", player_id);

    while let Some(message) = lobby.next_message().await {
        if let Some(Intent::JoinGame { game_id, .. }) = watcher.observe(&message) {
            lobby.disconnect();
            return Ok(Some(game_id));
        }
    }

    Ok(None)
}
