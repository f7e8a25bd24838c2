pub mod config;
pub mod debug;
pub mod game;
pub mod net;
pub mod replay;
pub mod scene;
pub mod tui;

pub use config::{ClientConfig, ConfigError, MountAttributes};
pub use game::{InputBindings, InputDispatcher, QueueWatcher, Session};
pub use net::{NetworkClient, SocketRoute, Transport};
pub use scene::{EntityRegistry, RenderProxy, SceneConfig};
