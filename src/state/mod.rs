//! State management module.
//!
//! Principals, positions, the online-session registry and the collaborator
//! traits the chat core talks to.

mod dashmap_ext;
mod principal;
mod roster;
mod session;

pub use dashmap_ext::DashMapExt;
pub use principal::{ChatMode, Position, Principal, PrincipalId, RosterEntry};
pub use roster::{Broadcaster, Roster};
pub use session::{Session, SessionError, SessionRegistry};
