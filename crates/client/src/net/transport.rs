use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use url::Url;

use mirra::{ClientMessage, InboundKind, ServerMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Connecting = 0,
    Open = 1,
    Closed = 2,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Open,
            _ => Self::Closed,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SharedState(Arc<AtomicU8>);

impl SharedState {
    fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn set(&self, state: ConnectionState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

#[derive(Debug)]
pub enum Inbound {
    Message(ServerMessage),
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: Url,
        #[source]
        source: Box<tungstenite::Error>,
    },
}

/// A binary WebSocket to the arena.
///
/// Reading and writing happen on tokio tasks. The owner talks to them through
/// channels and never blocks: `send` hands a frame to the writer and
/// `try_recv` drains whatever the reader decoded so far.
pub struct Transport {
    outbound: Option<mpsc::UnboundedSender<Vec<u8>>>,
    inbound: mpsc::UnboundedReceiver<Inbound>,
    state: SharedState,
    reader: JoinHandle<()>,
}

impl Transport {
    pub async fn connect(url: &Url, kind: InboundKind) -> Result<Self, TransportError> {
        let state = SharedState::default();
        state.set(ConnectionState::Connecting);
        log::info!("Connecting to {}", url);

        let (socket, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|source| TransportError::Connect {
                url: url.clone(),
                source: Box::new(source),
            })?;
        state.set(ConnectionState::Open);
        log::info!("Socket open: {}", url);

        let (mut sink, mut stream) = socket.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let writer_state = state.clone();
        tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                if let Err(e) = sink.send(WsMessage::binary(frame)).await {
                    log::warn!("Socket write failed: {}", e);
                    writer_state.set(ConnectionState::Closed);
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let reader_state = state.clone();
        let reader = tokio::spawn(async move {
            while let Some(next) = stream.next().await {
                match next {
                    Ok(WsMessage::Binary(data)) => match ServerMessage::decode(kind, &data) {
                        Ok(message) => {
                            if inbound_tx.send(Inbound::Message(message)).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            log::warn!("Dropping malformed {:?} frame ({} bytes): {}", kind, data.len(), e);
                        }
                    },
                    Ok(WsMessage::Close(frame)) => {
                        log::info!("Socket closed by peer: {:?}", frame);
                        break;
                    }
                    Ok(WsMessage::Text(_)) => {
                        log::debug!("Ignoring text frame");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        log::warn!("Socket read failed: {}", e);
                        break;
                    }
                }
            }
            reader_state.set(ConnectionState::Closed);
            let _ = inbound_tx.send(Inbound::Closed);
        });

        Ok(Self {
            outbound: Some(outbound_tx),
            inbound: inbound_rx,
            state,
            reader,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Queues a frame for the writer. Frames sent while the socket is not
    /// open are dropped and `false` is returned.
    pub fn send(&self, message: &ClientMessage) -> bool {
        let state = self.state();
        let Some(outbound) = self.outbound.as_ref().filter(|_| state == ConnectionState::Open)
        else {
            log::debug!("Dropping outbound frame, socket is {:?}", state);
            return false;
        };
        outbound.send(message.encode_to_vec()).is_ok()
    }

    pub fn try_recv(&mut self) -> Option<Inbound> {
        self.inbound.try_recv().ok()
    }

    pub async fn recv(&mut self) -> Option<Inbound> {
        self.inbound.recv().await
    }

    /// Closes the socket. Further sends are dropped.
    pub fn close(&mut self) {
        if self.outbound.take().is_some() {
            log::info!("Closing socket");
        }
        self.state.set(ConnectionState::Closed);
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.close();
        self.reader.abort();
    }
}
