//! Broadcast scheduling: delayed queue, autobroadcast rotation, the tick
//! driver and user-facing notices.

mod notify;
mod queue;
mod rotation;
mod scheduler;

pub use notify::Notifier;
pub use queue::DelayedBroadcastQueue;
pub use rotation::AutoBroadcaster;
pub use scheduler::{PeriodicScheduler, TickReport};
