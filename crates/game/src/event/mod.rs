mod types;

pub use types::{HostEvent, Intent, MapMetadata, Slot};
