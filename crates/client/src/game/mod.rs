mod input;
mod queue;
mod session;

pub use input::{InputBindings, InputDispatcher};
pub use queue::{QueueWatcher, wait_for_match};
pub use session::Session;
