mod client;
mod config;
mod route;
mod transport;

pub use client::NetworkClient;
pub use config::{DEFAULT_ARENA_HOST, ServerConfig};
pub use route::{RouteKind, SocketRoute, arena_host, socket_url};
pub use transport::{ConnectionState, Inbound, Transport, TransportError};
