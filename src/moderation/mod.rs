//! Moderation: mute records, their lifecycle and persistence.

mod duration;
mod persistence;
mod store;

pub use duration::{format_duration, parse_duration};
pub use persistence::{BackgroundWriter, JsonFileRepository, MuteRepository, NoOpRepository};
pub use store::{MuteRecord, MuteStore, now_millis};
