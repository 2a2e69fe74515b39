//! Chat pipeline: routing, throttling and rendering.

pub mod antispam;
pub mod format;
mod router;

pub use antispam::{SpamGuard, SpamKind};
pub use router::{BlockReason, ChatOutcome, ChatRouter, resolve_mode};
