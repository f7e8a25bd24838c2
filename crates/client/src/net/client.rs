use url::Url;

use mirra::{ClientMessage, GameAction, InboundKind, Intent, OutboundFormat, ServerMessage};

use super::transport::{ConnectionState, Inbound, Transport, TransportError};

/// Arena connection speaking in session intents.
pub struct NetworkClient {
    transport: Transport,
    outbound: OutboundFormat,
    closed: bool,
    frames_sent: u64,
    frames_received: u64,
}

impl NetworkClient {
    pub async fn connect(
        url: &Url,
        inbound: InboundKind,
        outbound: OutboundFormat,
    ) -> Result<Self, TransportError> {
        let transport = Transport::connect(url, inbound).await?;
        Ok(Self {
            transport,
            outbound,
            closed: false,
            frames_sent: 0,
            frames_received: 0,
        })
    }

    /// Wire form of an intent, if the arena has one for it.
    pub fn encode_intent(format: OutboundFormat, intent: &Intent) -> Option<ClientMessage> {
        match (intent, format) {
            (Intent::Move(direction), OutboundFormat::GameAction) => {
                Some(ClientMessage::Action(GameAction::movement(*direction)))
            }
            (Intent::Move(direction), OutboundFormat::BareDirection) => {
                Some(ClientMessage::Direction(*direction))
            }
            (Intent::Attack(slot), OutboundFormat::GameAction) => {
                Some(ClientMessage::Action(GameAction::attack(slot.to_string())))
            }
            _ => None,
        }
    }

    /// Returns `true` if a frame was handed to the socket.
    pub fn send_intent(&mut self, intent: &Intent) -> bool {
        let Some(message) = Self::encode_intent(self.outbound, intent) else {
            log::debug!("No wire form for {:?}", intent);
            return false;
        };
        let sent = self.transport.send(&message);
        if sent {
            self.frames_sent += 1;
        }
        sent
    }

    /// Drains decoded messages without blocking.
    pub fn poll(&mut self) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Some(inbound) = self.transport.try_recv() {
            match inbound {
                Inbound::Message(message) => {
                    self.frames_received += 1;
                    messages.push(message);
                }
                Inbound::Closed => self.mark_closed(),
            }
        }
        messages
    }

    /// Waits for the next decoded message. `None` once the socket is closed.
    pub async fn next_message(&mut self) -> Option<ServerMessage> {
        match self.transport.recv().await {
            Some(Inbound::Message(message)) => {
                self.frames_received += 1;
                Some(message)
            }
            Some(Inbound::Closed) | None => {
                self.mark_closed();
                None
            }
        }
    }

    fn mark_closed(&mut self) {
        if !self.closed {
            log::info!(
                "Connection closed after {} frames in, {} out",
                self.frames_received,
                self.frames_sent
            );
        }
        self.closed = true;
    }

    pub fn state(&self) -> ConnectionState {
        self.transport.state()
    }

    pub fn is_closed(&self) -> bool {
        self.closed || self.transport.state() == ConnectionState::Closed
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    pub fn disconnect(&mut self) {
        self.transport.close();
    }
}
